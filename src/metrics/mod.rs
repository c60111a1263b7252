//! Version-dispatched binary codec and record types for every metric family (C3).
//!
//! Every InterOp file starts with a one-byte version and a one-byte record size, optionally
//! followed by family-specific header bytes, then a sequence of fixed-size records (§4.1).
//! Each family module owns its own record struct, header struct, and `read`/`write` pair; this
//! module only provides the shared framing helpers both file header parsing, and fixed-size
//! record iteration, boil down to.

pub mod corrected_intensity;
pub mod error_rate;
pub mod extraction;
pub mod image;
pub mod index;
pub mod q;
pub mod q_by_lane;
pub mod q_collapsed;
pub mod tile;

use crate::error::{Error, Result};
use crate::io::RecordReader;
use crate::metric_set::{Metric, MetricSet};

/// Split the two-byte file prefix (`version`, `record_size`) from the header+record body.
pub fn read_prefix<'a>(bytes: &'a [u8], file_name: &str) -> Result<(u8, usize, &'a [u8])> {
    if bytes.len() < 2 {
        return Err(Error::bad_format(file_name, "file is shorter than the 2-byte prefix"));
    }

    Ok((bytes[0], bytes[1] as usize, &bytes[2..]))
}

/// Serialize the two-byte file prefix.
pub fn write_prefix(version: u8, record_size: u8, out: &mut Vec<u8>) {
    out.push(version);
    out.push(record_size);
}

/// Parse every fixed-size record in `body`, pushing each into `set` as it is read.
///
/// On success every record in `body` was a complete, well-formed record. If `body`'s length is
/// not a multiple of `record_size`, every complete leading record is still pushed into `set`
/// before this returns `Err(Error::IncompleteRecord)` — the tolerance policy of §4.1: "read all
/// complete records, stop cleanly at first incomplete one".
pub fn read_fixed_records<M: Metric, H>(
    body: &[u8],
    record_size: usize,
    file_name: &str,
    set: &mut MetricSet<M, H>,
    mut parse_one: impl FnMut(&mut RecordReader<'_>) -> Result<M>,
) -> Result<()> {
    if record_size == 0 {
        return Err(Error::bad_format(file_name, "declared record size is zero"));
    }

    let mut offset = 0;
    while offset + record_size <= body.len() {
        let mut reader = RecordReader::new(&body[offset..offset + record_size]);
        let record = parse_one(&mut reader)?;
        set.push(record)?;
        offset += record_size;
    }

    if offset != body.len() {
        return Err(Error::IncompleteRecord { file: file_name.to_string(), offset });
    }

    Ok(())
}
