//! The `Image` metric family: per-channel contrast range used to render cycle thumbnails.

use crate::error::{Error, Result};
use crate::ids::CycleId;
use crate::io::Data;
use crate::metric_set::{Metric, MetricSet};

use super::{read_fixed_records, read_prefix, write_prefix};

const FILE_NAME: &str = "ImageMetricsOut.bin";
const MAX_CHANNELS: usize = 4;
const V1_RECORD_SIZE: usize = 22;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageRecord {
    pub id: CycleId,
    pub min_contrast: [u16; MAX_CHANNELS],
    pub max_contrast: [u16; MAX_CHANNELS],
}

impl Metric for ImageRecord {
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
pub struct ImageHeader {
    pub version: u8,
    pub record_size: u8,
}

pub type ImageMetricSet = MetricSet<ImageRecord, ImageHeader>;

pub fn read(bytes: &[u8], set: &mut ImageMetricSet) -> Result<()> {
    let (version, record_size, body) = read_prefix(bytes, FILE_NAME)?;

    match version {
        1 => {
            if record_size != V1_RECORD_SIZE {
                return Err(Error::bad_format(
                    FILE_NAME,
                    format!("v1 record size must be {V1_RECORD_SIZE}, found {record_size}"),
                ));
            }
        }
        other => {
            return Err(Error::bad_format(FILE_NAME, format!("unsupported version {other}")))
        }
    }

    set.header = ImageHeader { version, record_size: record_size as u8 };

    read_fixed_records(body, record_size, FILE_NAME, set, |reader| {
        let id = CycleId::read_wire(reader)?;
        let min_contrast = reader.read_array::<u16, MAX_CHANNELS>()?;
        let max_contrast = reader.read_array::<u16, MAX_CHANNELS>()?;
        Ok(ImageRecord { id, min_contrast, max_contrast })
    })
}

pub fn write(set: &ImageMetricSet) -> Vec<u8> {
    let mut out = Vec::new();
    write_prefix(set.header.version, set.header.record_size, &mut out);

    for record in set.iter() {
        record.id.write_wire(&mut out).unwrap();
        u16::write_slice(&mut out, &record.min_contrast).unwrap();
        u16::write_slice(&mut out, &record.max_contrast).unwrap();
    }

    out
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_bytes() -> Vec<u8> {
        let mut bytes = vec![1u8, V1_RECORD_SIZE as u8];
        1u16.write(&mut bytes).unwrap();
        1101u16.write(&mut bytes).unwrap();
        1u16.write(&mut bytes).unwrap();
        u16::write_slice(&mut bytes, &[10, 20, 30, 40]).unwrap();
        u16::write_slice(&mut bytes, &[1000, 2000, 3000, 4000]).unwrap();
        bytes
    }

    #[test]
    fn reads_min_and_max_contrast() {
        let bytes = sample_bytes();
        let mut set = ImageMetricSet::default();
        read(&bytes, &mut set).unwrap();

        let record = set.iter().next().unwrap();
        assert_eq!(record.min_contrast, [10, 20, 30, 40]);
        assert_eq!(record.max_contrast, [1000, 2000, 3000, 4000]);
    }

    #[test]
    fn round_trip_reproduces_bytes_exactly() {
        let bytes = sample_bytes();
        let mut set = ImageMetricSet::default();
        read(&bytes, &mut set).unwrap();
        assert_eq!(write(&set), bytes);
    }
}
