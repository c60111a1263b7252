//! The `Q` metric family: a Q-score histogram per tile per cycle.
//!
//! Version 4 ships the full uncompressed 50-bin histogram with no header metadata. Version 6
//! compresses the histogram into a handful of bins and carries the bin table (lower, upper,
//! representative) in the file header; legacy synthesis of an equivalent table for version 4
//! files with few non-zero bins happens later, in [`crate::quality`].

use crate::error::{Error, Result};
use crate::ids::CycleId;
use crate::io::{Data, RecordReader};
use crate::metric_set::{Metric, MetricSet};

use super::{read_fixed_records, read_prefix, write_prefix};

const FILE_NAME: &str = "QMetricsOut.bin";
const UNCOMPRESSED_BIN_COUNT: usize = 50;
const KEY_SIZE: usize = 6;

/// One Q-score bin, as carried by a version 6 header: `[lower, upper]` collapse into `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QBin {
    pub lower: u8,
    pub upper: u8,
    pub value: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QRecord {
    pub id: CycleId,
    pub histogram: Vec<u32>,
}

impl Metric for QRecord {
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

#[derive(Debug, Clone, Default)]
pub struct QHeader {
    pub version: u8,
    pub record_size: u8,
    pub bins: Vec<QBin>,
}

pub type QMetricSet = MetricSet<QRecord, QHeader>;

fn bin_count_for(version: u8, record_size: usize, header_bins: usize) -> Result<usize> {
    match version {
        4 => Ok(UNCOMPRESSED_BIN_COUNT),
        6 => {
            if header_bins == 0 {
                return Err(Error::bad_format(FILE_NAME, "v6 header declares zero bins"));
            }
            Ok(header_bins)
        }
        other => Err(Error::bad_format(FILE_NAME, format!("unsupported version {other}"))),
    }
    .and_then(|count| {
        let expected = KEY_SIZE + count * 4;
        if expected != record_size {
            return Err(Error::bad_format(
                FILE_NAME,
                format!("record size {record_size} does not match {count} bins (expected {expected})"),
            ));
        }
        Ok(count)
    })
}

pub fn read(bytes: &[u8], set: &mut QMetricSet) -> Result<()> {
    let (version, record_size, rest) = read_prefix(bytes, FILE_NAME)?;

    let (bins, body) = match version {
        6 => {
            if rest.is_empty() {
                return Err(Error::bad_format(FILE_NAME, "missing v6 bin count header byte"));
            }
            let bin_count = rest[0] as usize;
            let header_len = 1 + bin_count * 3;
            if rest.len() < header_len {
                return Err(Error::bad_format(FILE_NAME, "truncated v6 bin table header"));
            }

            let mut bins = Vec::with_capacity(bin_count);
            let mut reader = RecordReader::new(&rest[1..header_len]);
            for _ in 0..bin_count {
                let lower = reader.read::<u8>()?;
                let upper = reader.read::<u8>()?;
                let value = reader.read::<u8>()?;
                bins.push(QBin { lower, upper, value });
            }
            (bins, &rest[header_len..])
        }
        _ => (Vec::new(), rest),
    };

    let bin_count = bin_count_for(version, record_size, bins.len())?;
    set.header = QHeader { version, record_size: record_size as u8, bins };

    read_fixed_records(body, record_size, FILE_NAME, set, |reader| {
        let id = CycleId::read_wire(reader)?;
        let histogram = reader.read_vec::<u32>(bin_count)?;
        Ok(QRecord { id, histogram })
    })
}

pub fn write(set: &QMetricSet) -> Vec<u8> {
    let mut out = Vec::new();
    write_prefix(set.header.version, set.header.record_size, &mut out);

    if set.header.version == 6 {
        out.push(set.header.bins.len() as u8);
        for bin in &set.header.bins {
            out.push(bin.lower);
            out.push(bin.upper);
            out.push(bin.value);
        }
    }

    for record in set.iter() {
        record.id.write_wire(&mut out).unwrap();
        for &count in &record.histogram {
            count.write(&mut out).unwrap();
        }
    }

    out
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_v4_bytes(bin_values: &[u32]) -> Vec<u8> {
        assert_eq!(bin_values.len(), UNCOMPRESSED_BIN_COUNT);
        let record_size = KEY_SIZE + UNCOMPRESSED_BIN_COUNT * 4;
        let mut bytes = vec![4u8, record_size as u8];
        1u16.write(&mut bytes).unwrap();
        1101u16.write(&mut bytes).unwrap();
        1u16.write(&mut bytes).unwrap();
        for &v in bin_values {
            v.write(&mut bytes).unwrap();
        }
        bytes
    }

    #[test]
    fn v4_reads_full_uncompressed_histogram() {
        let mut values = [0u32; UNCOMPRESSED_BIN_COUNT];
        values[29] = 70;
        let bytes = sample_v4_bytes(&values);

        let mut set = QMetricSet::default();
        read(&bytes, &mut set).unwrap();

        assert_eq!(set.header.version, 4);
        assert!(set.header.bins.is_empty());
        let record = set.iter().next().unwrap();
        assert_eq!(record.histogram.len(), UNCOMPRESSED_BIN_COUNT);
        assert_eq!(record.histogram[29], 70);
    }

    #[test]
    fn v6_reads_bin_table_and_compressed_histogram() {
        let bin_count = 3usize;
        let record_size = KEY_SIZE + bin_count * 4;
        let mut bytes = vec![6u8, record_size as u8, bin_count as u8];
        bytes.extend_from_slice(&[0, 9, 7, 10, 29, 20, 30, 49, 36]);
        1u16.write(&mut bytes).unwrap();
        1101u16.write(&mut bytes).unwrap();
        1u16.write(&mut bytes).unwrap();
        10u32.write(&mut bytes).unwrap();
        20u32.write(&mut bytes).unwrap();
        70u32.write(&mut bytes).unwrap();

        let mut set = QMetricSet::default();
        read(&bytes, &mut set).unwrap();

        assert_eq!(set.header.bins.len(), 3);
        assert_eq!(set.header.bins[2], QBin { lower: 30, upper: 49, value: 36 });
        let record = set.iter().next().unwrap();
        assert_eq!(record.histogram, vec![10, 20, 70]);
    }

    #[test]
    fn round_trip_reproduces_bytes_exactly() {
        let values = [1u32; UNCOMPRESSED_BIN_COUNT];
        let bytes = sample_v4_bytes(&values);
        let mut set = QMetricSet::default();
        read(&bytes, &mut set).unwrap();
        assert_eq!(write(&set), bytes);
    }

    #[test]
    fn record_size_mismatch_is_bad_format() {
        let mut bytes = sample_v4_bytes(&[0u32; UNCOMPRESSED_BIN_COUNT]);
        bytes[1] = 10;
        let mut set = QMetricSet::default();
        assert!(read(&bytes, &mut set).is_err());
    }
}
