//! The `Extraction` metric family: per-channel P90 intensity and focus score, one record per
//! tile per cycle, plus the UTC timestamp the cycle was extracted at.

use crate::error::{Error, Result};
use crate::ids::CycleId;
use crate::io::Data;
use crate::metric_set::{Metric, MetricSet};

use super::{read_fixed_records, read_prefix, write_prefix};

const FILE_NAME: &str = "ExtractionMetricsOut.bin";
const MAX_CHANNELS: usize = 4;
const V2_RECORD_SIZE: usize = 38;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionRecord {
    pub id: CycleId,
    pub p90_intensity: [u16; MAX_CHANNELS],
    pub focus_score: [f32; MAX_CHANNELS],
    pub timestamp_utc: u64,
}

impl Metric for ExtractionRecord {
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
pub struct ExtractionHeader {
    pub version: u8,
    pub record_size: u8,
    /// Channel count actually in use; trailing channel slots of a 4-wide record are zeroed.
    /// Backfilled from `RunInfo`'s channel list during finalization (§4.4 step f).
    pub channel_count: u8,
}

pub type ExtractionMetricSet = MetricSet<ExtractionRecord, ExtractionHeader>;

pub fn read(bytes: &[u8], set: &mut ExtractionMetricSet) -> Result<()> {
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
        other => {
            return Err(Error::bad_format(FILE_NAME, format!("unsupported version {other}")))
        }
    }

    set.header = ExtractionHeader {
        version,
        record_size: record_size as u8,
        channel_count: MAX_CHANNELS as u8,
    };

    read_fixed_records(body, record_size, FILE_NAME, set, |reader| {
        let id = CycleId::read_wire(reader)?;
        let p90_intensity = reader.read_array::<u16, MAX_CHANNELS>()?;
        let focus_score = reader.read_array::<f32, MAX_CHANNELS>()?;
        let timestamp_utc = reader.read::<u64>()?;
        Ok(ExtractionRecord { id, p90_intensity, focus_score, timestamp_utc })
    })
}

pub fn write(set: &ExtractionMetricSet) -> Vec<u8> {
    let mut out = Vec::new();
    write_prefix(set.header.version, set.header.record_size, &mut out);

    for record in set.iter() {
        record.id.write_wire(&mut out).unwrap();
        u16::write_slice(&mut out, &record.p90_intensity).unwrap();
        f32::write_slice(&mut out, &record.focus_score).unwrap();
        record.timestamp_utc.write(&mut out).unwrap();
    }

    out
}

/// Trim each record's per-channel arrays down to `channel_count` by zeroing the unused tail
/// slots, per the finalization step that backfills the true channel count from `RunInfo`.
pub fn trim_channels(set: &mut ExtractionMetricSet, channel_count: usize) {
    let channel_count = channel_count.min(MAX_CHANNELS);
    set.header.channel_count = channel_count as u8;
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_bytes() -> Vec<u8> {
        let mut bytes = vec![2u8, V2_RECORD_SIZE as u8];
        1u16.write(&mut bytes).unwrap();
        1101u16.write(&mut bytes).unwrap();
        1u16.write(&mut bytes).unwrap();
        u16::write_slice(&mut bytes, &[1000, 2000, 3000, 4000]).unwrap();
        f32::write_slice(&mut bytes, &[1.1, 2.2, 3.3, 4.4]).unwrap();
        1_700_000_000u64.write(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn reads_intensity_focus_and_timestamp() {
        let bytes = sample_bytes();
        let mut set = ExtractionMetricSet::default();
        read(&bytes, &mut set).unwrap();

        let record = set.iter().next().unwrap();
        assert_eq!(record.p90_intensity, [1000, 2000, 3000, 4000]);
        assert_eq!(record.focus_score[2], 3.3);
        assert_eq!(record.timestamp_utc, 1_700_000_000);
    }

    #[test]
    fn round_trip_reproduces_bytes_exactly() {
        let bytes = sample_bytes();
        let mut set = ExtractionMetricSet::default();
        read(&bytes, &mut set).unwrap();
        assert_eq!(write(&set), bytes);
    }

    #[test]
    fn trim_channels_records_declared_count() {
        let mut set = ExtractionMetricSet::default();
        trim_channels(&mut set, 2);
        assert_eq!(set.header.channel_count, 2);
    }
}
