//! Quality-metric logic (C7): legacy Q-score bin synthesis, bin-based percentage helpers, and
//! cumulative Q-distribution accumulation across cycles.

use std::collections::BTreeSet;

use crate::enums::InstrumentType;
use crate::metrics::q::{QBin, QMetricSet};

/// A bin table is required when the format version predates header bin metadata (≤4) and the
/// header itself carries no bins. Counts the number of histogram columns with at least one
/// non-zero entry, capped at 7 — above that the histogram is considered already "unbinned".
pub fn count_legacy_bins(set: &QMetricSet) -> usize {
    if set.header.version > 4 || !set.header.bins.is_empty() {
        return 0;
    }

    const MAX_BIN_COUNT: usize = 7;
    let mut found = BTreeSet::new();

    for record in set.iter() {
        for (index, &count) in record.histogram.iter().enumerate() {
            if count > 0 {
                found.insert(index);
            }
        }
        if found.len() > MAX_BIN_COUNT {
            return 0;
        }
    }

    found.len()
}

/// The canonical bin table for a given non-zero-bin count and instrument, per §4.5. Returns an
/// empty vec for a count of zero (no synthesis needed) or a count above 7 ("unbinned").
pub fn legacy_bin_table(count: usize, instrument: InstrumentType) -> Vec<QBin> {
    fn bins(rows: &[(u8, u8, u8)]) -> Vec<QBin> {
        rows.iter().map(|&(lower, upper, value)| QBin { lower, upper, value }).collect()
    }

    if count == 0 || count > 7 {
        return Vec::new();
    }

    if instrument == InstrumentType::NextSeq {
        return bins(&[(0, 9, 8), (10, 19, 13), (20, 24, 22), (25, 29, 27), (30, 34, 32), (35, 39, 37)]);
    }

    match count {
        7 => bins(&[
            (0, 9, 6),
            (10, 19, 15),
            (20, 24, 22),
            (25, 29, 27),
            (30, 34, 33),
            (35, 39, 37),
            (40, 49, 40),
        ]),
        6 => bins(&[(0, 9, 7), (10, 19, 16), (20, 26, 24), (27, 29, 29), (30, 34, 33), (35, 49, 38)]),
        5 => bins(&[(0, 9, 7), (10, 19, 16), (20, 29, 25), (30, 34, 33), (35, 49, 38)]),
        4 => bins(&[(0, 9, 7), (10, 29, 20), (30, 34, 33), (35, 49, 38)]),
        3 => bins(&[(0, 9, 7), (10, 29, 20), (30, 49, 36)]),
        2 => bins(&[(0, 27, 13), (28, 49, 35)]),
        _ => bins(&[(0, 50, 20)]),
    }
}

/// Synthesize and install bins on `set` if the header needs them (§4.4 step a). A no-op if bins
/// are already present, the version is too new to need them, or the set has more than 7 distinct
/// non-zero columns.
pub fn synthesize_bins(set: &mut QMetricSet, instrument: InstrumentType) {
    let count = count_legacy_bins(set);
    if count == 0 {
        return;
    }
    set.header.bins = legacy_bin_table(count, instrument);
}

/// `percent_over_q(t)`: the fraction of total count whose representative bin value is `>= t`.
pub fn percent_over_q(histogram: &[u32], bins: &[QBin], threshold: u32) -> f64 {
    let total: u64 = histogram.iter().map(|&c| c as u64).sum();
    if total == 0 {
        return 0.0;
    }

    let over: u64 = histogram
        .iter()
        .enumerate()
        .filter(|(index, _)| representative_value(bins, *index) >= threshold)
        .map(|(_, &c)| c as u64)
        .sum();

    (over as f64 / total as f64) * 100.0
}

fn representative_value(bins: &[QBin], index: usize) -> u32 {
    if bins.is_empty() {
        index as u32
    } else {
        bins.get(index).map(|b| b.value as u32).unwrap_or(0)
    }
}

/// Populate cumulative Q-score distributions in place (§4.4 step d, §4.5): for consecutive
/// records of the same tile in ascending cycle order, `histogram[c] += cumulative[c-1]`; the
/// first cycle of a tile accumulates with itself.
pub fn populate_cumulative_distributions(set: &mut QMetricSet) {
    let mut ordered: Vec<u64> = set.keys().collect();
    ordered.sort_unstable();

    let mut previous: Option<(u64, u64, Vec<u32>)> = None; // (lane_tile_key, cycle, cumulative histogram)

    for key in ordered {
        let (lane, tile, cycle) = {
            let record = set.get(key).expect("key came from this set's own index");
            (record.id.lane, record.id.tile, record.id.cycle)
        };
        let lane_tile_key = (lane as u64) << 32 | tile as u64;

        let cumulative = match &previous {
            Some((prev_lane_tile, prev_cycle, prev_hist)) if *prev_lane_tile == lane_tile_key && *prev_cycle + 1 == cycle as u64 => {
                let record = set.get(key).unwrap();
                accumulate(&record.histogram, prev_hist)
            }
            _ => set.get(key).unwrap().histogram.clone(),
        };

        if let Some(record) = set.get_mut(key) {
            record.histogram = cumulative.clone();
        }
        previous = Some((lane_tile_key, cycle as u64, cumulative));
    }
}

fn accumulate(current: &[u32], previous: &[u32]) -> Vec<u32> {
    current.iter().zip(previous).map(|(&a, &b)| a + b).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ids::CycleId;
    use crate::metrics::q::QRecord;

    fn histogram_with_nonzero(indices: &[usize], len: usize) -> Vec<u32> {
        let mut h = vec![0u32; len];
        for &i in indices {
            h[i] = 1;
        }
        h
    }

    #[test]
    fn legacy_bin_7_matches_literal_scenario() {
        let table = legacy_bin_table(7, InstrumentType::HiSeq);
        assert_eq!(
            table,
            vec![
                QBin { lower: 0, upper: 9, value: 6 },
                QBin { lower: 10, upper: 19, value: 15 },
                QBin { lower: 20, upper: 24, value: 22 },
                QBin { lower: 25, upper: 29, value: 27 },
                QBin { lower: 30, upper: 34, value: 33 },
                QBin { lower: 35, upper: 39, value: 37 },
                QBin { lower: 40, upper: 49, value: 40 },
            ]
        );
    }

    #[test]
    fn percent_over_q30_matches_literal_scenario() {
        let bins = vec![
            QBin { lower: 10, upper: 19, value: 15 },
            QBin { lower: 20, upper: 29, value: 25 },
            QBin { lower: 30, upper: 39, value: 35 },
        ];
        let histogram = vec![10u32, 20, 70];
        assert_eq!(percent_over_q(&histogram, &bins, 30), 70.0);
    }

    #[test]
    fn more_than_seven_bins_is_unbinned() {
        let mut set = QMetricSet::default();
        set.push(QRecord {
            id: CycleId::new(1, 1101, 1).unwrap(),
            histogram: histogram_with_nonzero(&[1, 2, 3, 4, 5, 6, 7, 8], 50),
        })
        .unwrap();
        assert_eq!(count_legacy_bins(&set), 0);
    }

    #[test]
    fn cumulative_distribution_adds_previous_cycle() {
        let mut set = QMetricSet::default();
        set.push(QRecord { id: CycleId::new(1, 1101, 1).unwrap(), histogram: vec![1, 2, 3] }).unwrap();
        set.push(QRecord { id: CycleId::new(1, 1101, 2).unwrap(), histogram: vec![4, 5, 6] }).unwrap();

        populate_cumulative_distributions(&mut set);

        let cycle1 = set.get(CycleId::new(1, 1101, 1).unwrap().key()).unwrap();
        assert_eq!(cycle1.histogram, vec![1, 2, 3]);
        let cycle2 = set.get(CycleId::new(1, 1101, 2).unwrap().key()).unwrap();
        assert_eq!(cycle2.histogram, vec![5, 7, 9]);
    }
}
