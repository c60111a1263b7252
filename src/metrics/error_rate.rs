//! The `Error` metric family: one error rate per tile per cycle.

use crate::error::{Error, Result};
use crate::ids::CycleId;
use crate::io::Data;
use crate::metric_set::{Metric, MetricSet};

use super::{read_fixed_records, read_prefix, write_prefix};

const FILE_NAME: &str = "ErrorMetricsOut.bin";

/// Version 3 is the only format currently shipped; the record is 48 bytes wide, of which this
/// reader interprets the first 10 (the 6-byte key and the error rate) and skips the rest.
const V3_RECORD_SIZE: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorRecord {
    pub id: CycleId,
    pub error_rate: f32,
}

impl Metric for ErrorRecord {
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
pub struct ErrorHeader {
    pub version: u8,
    pub record_size: u8,
}

pub type ErrorMetricSet = MetricSet<ErrorRecord, ErrorHeader>;

pub fn read(bytes: &[u8], set: &mut ErrorMetricSet) -> Result<()> {
    let (version, record_size, body) = read_prefix(bytes, FILE_NAME)?;

    match version {
        3 => {
            if record_size != V3_RECORD_SIZE {
                return Err(Error::bad_format(
                    FILE_NAME,
                    format!("v3 record size must be {V3_RECORD_SIZE}, found {record_size}"),
                ));
            }
        }
        other => {
            return Err(Error::bad_format(FILE_NAME, format!("unsupported version {other}")))
        }
    }

    set.header = ErrorHeader { version, record_size: record_size as u8 };

    read_fixed_records(body, record_size, FILE_NAME, set, |reader| {
        let id = CycleId::read_wire(reader)?;
        let error_rate = reader.read::<f32>()?;
        reader.skip(record_size - 10);
        Ok(ErrorRecord { id, error_rate })
    })
}

pub fn write(set: &ErrorMetricSet) -> Vec<u8> {
    let mut out = Vec::new();
    write_prefix(set.header.version, set.header.record_size, &mut out);

    for record in set.iter() {
        record.id.write_wire(&mut out).unwrap();
        record.error_rate.write(&mut out).unwrap();
        out.extend(std::iter::repeat(0u8).take(V3_RECORD_SIZE - 10));
    }

    out
}
