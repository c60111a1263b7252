//! The `Index` metric family: one tile can carry many demultiplexed samples, so unlike every
//! other family its records are variable-length — a tile key followed by a list of
//! (index-sequence, sample-id, project, cluster-count) entries. The fixed-size record framing in
//! [`super::read_fixed_records`] does not apply here; this module implements its own tolerant
//! read loop directly over the byte stream.

use crate::error::{Error, Result};
use crate::ids::TileId;
use crate::io::{Data, RecordReader};
use crate::metric_set::{Metric, MetricSet};

use super::{read_prefix, write_prefix};

const FILE_NAME: &str = "IndexMetricsOut.bin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub index_sequence: String,
    pub sample_id: String,
    pub project: String,
    pub cluster_count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexRecord {
    pub id: TileId,
    pub entries: Vec<IndexEntry>,
}

impl Metric for IndexRecord {
    fn key(&self) -> u64 {
        self.id.key()
    }
    fn lane(&self) -> u16 {
        self.id.lane
    }
    fn tile(&self) -> u32 {
        self.id.tile
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IndexHeader {
    pub version: u8,
}

pub type IndexMetricSet = MetricSet<IndexRecord, IndexHeader>;

/// Unlike fixed-size families, nothing here bounds how many bytes a declared string or entry
/// count can claim, so every read that lets the wire data choose its own length must be checked
/// against what's actually left before it's attempted — a record truncated mid-entry must
/// surface as `IncompleteRecord`, not a panic in [`RecordReader`]'s slice indexing.
fn need(reader: &RecordReader<'_>, count: usize, file_name: &str) -> Result<()> {
    if reader.remaining() < count {
        Err(Error::bad_format(file_name, "declared length exceeds remaining bytes"))
    } else {
        Ok(())
    }
}

fn read_string(reader: &mut RecordReader<'_>) -> Result<String> {
    need(reader, 2, FILE_NAME)?;
    let len = reader.read::<u16>()? as usize;
    need(reader, len, FILE_NAME)?;
    let bytes = reader.read_vec::<u8>(len)?;
    String::from_utf8(bytes).map_err(|_| Error::bad_format(FILE_NAME, "string field is not valid UTF-8"))
}

fn write_string(value: &str, out: &mut Vec<u8>) -> Result<()> {
    (value.len() as u16).write(out)?;
    out.extend_from_slice(value.as_bytes());
    Ok(())
}

pub fn read(bytes: &[u8], set: &mut IndexMetricSet) -> Result<()> {
    let (version, _, body) = read_prefix(bytes, FILE_NAME)?;

    if version != 1 {
        return Err(Error::bad_format(FILE_NAME, format!("unsupported version {version}")));
    }

    set.header = IndexHeader { version };

    let mut offset = 0;
    while offset < body.len() {
        match read_one_record(&body[offset..]) {
            Ok((record, consumed)) => {
                set.push(record)?;
                offset += consumed;
            }
            Err(_) => return Err(Error::IncompleteRecord { file: FILE_NAME.to_string(), offset }),
        }
    }

    Ok(())
}

fn read_one_record(bytes: &[u8]) -> Result<(IndexRecord, usize)> {
    let mut reader = RecordReader::new(bytes);
    need(&reader, 4, FILE_NAME)?;
    let id = TileId::read_wire(&mut reader)?;
    need(&reader, 2, FILE_NAME)?;
    let entry_count = reader.read::<u16>()? as usize;

    let mut entries = Vec::with_capacity(entry_count);
    for _ in 0..entry_count {
        let index_sequence = read_string(&mut reader)?;
        let sample_id = read_string(&mut reader)?;
        let project = read_string(&mut reader)?;
        need(&reader, 8, FILE_NAME)?;
        let cluster_count = reader.read::<u64>()?;
        entries.push(IndexEntry { index_sequence, sample_id, project, cluster_count });
    }

    Ok((IndexRecord { id, entries }, reader.position()))
}

pub fn write(set: &IndexMetricSet) -> Vec<u8> {
    let mut out = Vec::new();
    write_prefix(set.header.version, 0, &mut out);

    for record in set.iter() {
        record.id.write_wire(&mut out).unwrap();
        (record.entries.len() as u16).write(&mut out).unwrap();
        for entry in &record.entries {
            write_string(&entry.index_sequence, &mut out).unwrap();
            write_string(&entry.sample_id, &mut out).unwrap();
            write_string(&entry.project, &mut out).unwrap();
            entry.cluster_count.write(&mut out).unwrap();
        }
    }

    out
}
