//! The `CorrectedIntensity` metric family: per-base called/corrected intensities and call
//! counts, one record per tile per cycle.

use crate::error::{Error, Result};
use crate::ids::CycleId;
use crate::io::{Data, RecordReader};
use crate::metric_set::{Metric, MetricSet};

use super::{read_fixed_records, read_prefix, write_prefix};

const FILE_NAME: &str = "CorrectedIntMetricsOut.bin";
const V2_RECORD_SIZE: usize = 46;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectedIntensityRecord {
    pub id: CycleId,
    /// Per-base (A, C, G, T) called intensity.
    pub called_intensity: [u16; 4],
    /// Per-base corrected intensity, all clusters.
    pub corrected_intensity_all: [u16; 4],
    /// Per-base call counts, no-call first then A, C, G, T.
    pub called_counts: [u32; 5],
    pub signal_to_noise: f32,
}

impl Metric for CorrectedIntensityRecord {
    fn key(&self) -> u64 {
        self.id.key()
    }
    fn lane(&self) -> u16 {
        self.id.lane
    }
    fn tile(&self) -> u32 {
        self.id.tile
    }
    fn cycle(&self) -> Option<u16> {
        Some(self.id.cycle)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CorrectedIntensityHeader {
    pub version: u8,
    pub record_size: u8,
}

pub type CorrectedIntensityMetricSet = MetricSet<CorrectedIntensityRecord, CorrectedIntensityHeader>;

pub fn read(bytes: &[u8], set: &mut CorrectedIntensityMetricSet) -> Result<()> {
    let (version, record_size, body) = read_prefix(bytes, FILE_NAME)?;

    match version {
        2 => {
            if record_size != V2_RECORD_SIZE {
                return Err(Error::bad_format(
                    FILE_NAME,
                    format!("v2 record size must be {V2_RECORD_SIZE}, found {record_size}"),
                ));
            }
        }
        1 => return Err(Error::bad_format(FILE_NAME, "version 1 is no longer supported")),
        other => {
            return Err(Error::bad_format(FILE_NAME, format!("unsupported version {other}")))
        }
    }

    set.header = CorrectedIntensityHeader { version, record_size: record_size as u8 };

    read_fixed_records(body, record_size, FILE_NAME, set, read_record)
}

fn read_record(reader: &mut RecordReader<'_>) -> Result<CorrectedIntensityRecord> {
    let id = CycleId::read_wire(reader)?;
    let called_intensity = reader.read_array::<u16, 4>()?;
    let corrected_intensity_all = reader.read_array::<u16, 4>()?;
    let called_counts = reader.read_array::<u32, 5>()?;
    let signal_to_noise = reader.read::<f32>()?;
    Ok(CorrectedIntensityRecord {
        id,
        called_intensity,
        corrected_intensity_all,
        called_counts,
        signal_to_noise,
    })
}

pub fn write(set: &CorrectedIntensityMetricSet) -> Vec<u8> {
    let mut out = Vec::new();
    write_prefix(set.header.version, set.header.record_size, &mut out);

    for record in set.iter() {
        record.id.write_wire(&mut out).unwrap();
        u16::write_slice(&mut out, &record.called_intensity).unwrap();
        u16::write_slice(&mut out, &record.corrected_intensity_all).unwrap();
        u32::write_slice(&mut out, &record.called_counts).unwrap();
        record.signal_to_noise.write(&mut out).unwrap();
    }

    out
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_bytes() -> Vec<u8> {
        let mut bytes = vec![2u8, V2_RECORD_SIZE as u8];
        1u16.write(&mut bytes).unwrap();
        1101u16.write(&mut bytes).unwrap();
        1u16.write(&mut bytes).unwrap();
        u16::write_slice(&mut bytes, &[100, 200, 300, 400]).unwrap();
        u16::write_slice(&mut bytes, &[90, 190, 290, 390]).unwrap();
        u32::write_slice(&mut bytes, &[1, 2, 3, 4, 5]).unwrap();
        3.5f32.write(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn reads_per_base_fields() {
        let bytes = sample_bytes();
        let mut set = CorrectedIntensityMetricSet::default();
        read(&bytes, &mut set).unwrap();

        let record = set.iter().next().unwrap();
        assert_eq!(record.called_intensity, [100, 200, 300, 400]);
        assert_eq!(record.called_counts, [1, 2, 3, 4, 5]);
        assert_eq!(record.signal_to_noise, 3.5);
    }

    #[test]
    fn round_trip_reproduces_bytes_exactly() {
        let bytes = sample_bytes();
        let mut set = CorrectedIntensityMetricSet::default();
        read(&bytes, &mut set).unwrap();
        assert_eq!(write(&set), bytes);
    }

    #[test]
    fn version_one_is_rejected() {
        let mut bytes = sample_bytes();
        bytes[0] = 1;
        let mut set = CorrectedIntensityMetricSet::default();
        assert!(read(&bytes, &mut set).is_err());
    }
}
