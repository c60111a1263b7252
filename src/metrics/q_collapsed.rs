//! The `Q-collapsed` metric family: per-tile-per-cycle counts above Q20/Q30, total count, and
//! median Q. Not read from its own file — built from the full [`super::q`] histogram during
//! finalization (§4.4 step b), so this module only exposes the builder, not a codec.

use crate::ids::CycleId;
use crate::metric_set::{Metric, MetricSet};

use super::q::{QBin, QMetricSet, QRecord};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QCollapsedRecord {
    pub id: CycleId,
    pub count_q20: u64,
    pub count_q30: u64,
    pub total: u64,
    pub median_q: u32,
}

impl Metric for QCollapsedRecord {
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

pub type QCollapsedMetricSet = MetricSet<QCollapsedRecord>;

/// The Q-score each histogram bin represents: the header's declared value for compressed files,
/// or the bin's own index for the uncompressed 50-column layout.
fn representative_values(bins: &[QBin], histogram_len: usize) -> Vec<u32> {
    if bins.is_empty() {
        (0..histogram_len as u32).collect()
    } else {
        bins.iter().map(|bin| bin.value as u32).collect()
    }
}

fn median_q(histogram: &[u32], values: &[u32]) -> u32 {
    let total: u64 = histogram.iter().map(|&c| c as u64).sum();
    if total == 0 {
        return 0;
    }

    let half = total.div_ceil(2);
    let mut cumulative = 0u64;
    for (count, &value) in histogram.iter().zip(values) {
        cumulative += *count as u64;
        if cumulative >= half {
            return value;
        }
    }
    *values.last().unwrap_or(&0)
}

fn collapse_one(record: &QRecord, bins: &[QBin]) -> QCollapsedRecord {
    let values = representative_values(bins, record.histogram.len());
    let total: u64 = record.histogram.iter().map(|&c| c as u64).sum();
    let count_q20: u64 = record
        .histogram
        .iter()
        .zip(&values)
        .filter(|(_, &v)| v >= 20)
        .map(|(&c, _)| c as u64)
        .sum();
    let count_q30: u64 = record
        .histogram
        .iter()
        .zip(&values)
        .filter(|(_, &v)| v >= 30)
        .map(|(&c, _)| c as u64)
        .sum();

    QCollapsedRecord {
        id: record.id,
        count_q20,
        count_q30,
        total,
        median_q: median_q(&record.histogram, &values),
    }
}

/// Build the collapsed set from a fully-populated Q set. A no-op if `q_set` is empty.
pub fn build(q_set: &QMetricSet) -> QCollapsedMetricSet {
    let mut collapsed = QCollapsedMetricSet::default();
    for record in q_set.iter() {
        collapsed.push(collapse_one(record, &q_set.header.bins)).expect("Q keys are already unique");
    }
    collapsed
}
