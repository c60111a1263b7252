//! The `Q-by-lane` metric family: Q histograms summed across every tile of a lane, one record
//! per (lane, cycle). Built during finalization (§4.4 step c), not read from its own file.

use std::collections::BTreeMap;

use crate::metric_set::{Metric, MetricSet};

use super::q::QMetricSet;

/// A lane and cycle pair — the key for this family. Unlike [`crate::ids::CycleId`] there is no
/// tile component: every tile of the lane has already been summed away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LaneCycleId {
    pub lane: u16,
    pub cycle: u16,
}

impl LaneCycleId {
    pub fn key(self) -> u64 {
        (self.lane as u64) << 16 | self.cycle as u64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QByLaneRecord {
    pub id: LaneCycleId,
    pub histogram: Vec<u32>,
}

impl Metric for QByLaneRecord {
    fn key(&self) -> u64 {
        self.id.key()
    }
    fn lane(&self) -> u16 {
        self.id.lane
    }
    fn tile(&self) -> u32 {
        0
    }
    fn cycle(&self) -> Option<u16> {
        Some(self.id.cycle)
    }
}

pub type QByLaneMetricSet = MetricSet<QByLaneRecord>;

/// Sum every tile's histogram within a lane at a given cycle. Bin counts are assumed uniform
/// across the set's records (the same header governs every tile of a run).
pub fn build(q_set: &QMetricSet) -> QByLaneMetricSet {
    let mut sums: BTreeMap<LaneCycleId, Vec<u32>> = BTreeMap::new();

    for record in q_set.iter() {
        let id = LaneCycleId { lane: record.id.lane, cycle: record.id.cycle };
        let entry = sums.entry(id).or_insert_with(|| vec![0u32; record.histogram.len()]);
        for (sum, &count) in entry.iter_mut().zip(&record.histogram) {
            *sum += count;
        }
    }

    let mut by_lane = QByLaneMetricSet::default();
    for (id, histogram) in sums {
        by_lane.push(QByLaneRecord { id, histogram }).expect("lane/cycle keys are unique by construction");
    }
    by_lane
}
