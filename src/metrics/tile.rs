//! The `Tile` metric family: per-tile cluster density and, per sequencing read, alignment and
//! phasing percentages. One record per tile; the number of per-read triples is inferred from the
//! declared record size rather than from `RunInfo`, so the file stays self-describing.

use crate::error::{Error, Result};
use crate::ids::TileId;
use crate::io::Data;
use crate::metric_set::{Metric, MetricSet};

use super::{read_fixed_records, read_prefix, write_prefix};

const FILE_NAME: &str = "TileMetricsOut.bin";
const KEY_SIZE: usize = 4;
const FIXED_FIELDS_SIZE: usize = 16;
const PER_READ_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadStats {
    pub percent_aligned: f32,
    pub percent_phasing: f32,
    pub percent_prephasing: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileRecord {
    pub id: TileId,
    pub cluster_count: f32,
    pub cluster_count_pf: f32,
    pub density: f32,
    pub density_pf: f32,
    pub reads: Vec<ReadStats>,
}

impl Metric for TileRecord {
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
pub struct TileHeader {
    pub version: u8,
    pub record_size: u8,
}

pub type TileMetricSet = MetricSet<TileRecord, TileHeader>;

pub fn read(bytes: &[u8], set: &mut TileMetricSet) -> Result<()> {
    let (version, record_size, body) = read_prefix(bytes, FILE_NAME)?;

    if version != 2 {
        return Err(Error::bad_format(FILE_NAME, format!("unsupported version {version}")));
    }
    if record_size < KEY_SIZE + FIXED_FIELDS_SIZE
        || (record_size - KEY_SIZE - FIXED_FIELDS_SIZE) % PER_READ_SIZE != 0
    {
        return Err(Error::bad_format(
            FILE_NAME,
            format!("record size {record_size} does not decompose into fixed fields plus whole per-read triples"),
        ));
    }
    let read_count = (record_size - KEY_SIZE - FIXED_FIELDS_SIZE) / PER_READ_SIZE;

    set.header = TileHeader { version, record_size: record_size as u8 };

    read_fixed_records(body, record_size, FILE_NAME, set, |reader| {
        let id = TileId::read_wire(reader)?;
        let cluster_count = reader.read::<f32>()?;
        let cluster_count_pf = reader.read::<f32>()?;
        let density = reader.read::<f32>()?;
        let density_pf = reader.read::<f32>()?;

        let mut reads = Vec::with_capacity(read_count);
        for _ in 0..read_count {
            let percent_aligned = reader.read::<f32>()?;
            let percent_phasing = reader.read::<f32>()?;
            let percent_prephasing = reader.read::<f32>()?;
            reads.push(ReadStats { percent_aligned, percent_phasing, percent_prephasing });
        }

        Ok(TileRecord { id, cluster_count, cluster_count_pf, density, density_pf, reads })
    })
}

pub fn write(set: &TileMetricSet) -> Vec<u8> {
    let mut out = Vec::new();
    write_prefix(set.header.version, set.header.record_size, &mut out);

    for record in set.iter() {
        record.id.write_wire(&mut out).unwrap();
        record.cluster_count.write(&mut out).unwrap();
        record.cluster_count_pf.write(&mut out).unwrap();
        record.density.write(&mut out).unwrap();
        record.density_pf.write(&mut out).unwrap();
        for read in &record.reads {
            read.percent_aligned.write(&mut out).unwrap();
            read.percent_phasing.write(&mut out).unwrap();
            read.percent_prephasing.write(&mut out).unwrap();
        }
    }

    out
}
