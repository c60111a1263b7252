//! Q-score heatmap (§4.6): rows are cycles, columns are Q-score bins remapped to full 0..=Q_max
//! resolution (a compressed bin's percentage is spread evenly across the Q values it covers),
//! normalized so the largest cell is 100.

use std::collections::BTreeMap;

use crate::metrics::q::QBin;

use super::{Axis, HeatmapData};

/// Build a heatmap from `(cycle, histogram)` pairs, one row per cycle, where `histogram[i]`
/// corresponds to `bins[i]`.
pub fn build(bins: &[QBin], rows: impl Iterator<Item = (u16, Vec<u32>)>) -> HeatmapData {
    let q_max = bins.iter().map(|b| b.upper).max().unwrap_or(0) as usize;
    let columns = q_max + 1;

    let mut by_cycle: BTreeMap<u16, Vec<u32>> = BTreeMap::new();
    for (cycle, histogram) in rows {
        let entry = by_cycle.entry(cycle).or_insert_with(|| vec![0u32; histogram.len()]);
        for (i, count) in histogram.into_iter().enumerate() {
            if i < entry.len() {
                entry[i] += count;
            }
        }
    }

    let mut matrix = Vec::with_capacity(by_cycle.len());
    for histogram in by_cycle.values() {
        let total: u64 = histogram.iter().map(|&c| c as u64).sum();
        let mut row = vec![0.0f64; columns];
        for (bin_index, &count) in histogram.iter().enumerate() {
            let Some(bin) = bins.get(bin_index) else { continue };
            if total == 0 {
                continue;
            }
            let percent = count as f64 / total as f64 * 100.0;
            let span = (bin.upper - bin.lower + 1).max(1) as f64;
            for q in bin.lower..=bin.upper {
                if (q as usize) < columns {
                    row[q as usize] += percent / span;
                }
            }
        }
        matrix.push(row);
    }

    let max_cell = matrix.iter().flatten().copied().fold(0.0f64, f64::max);
    if max_cell > 0.0 {
        for row in &mut matrix {
            for cell in row {
                *cell = *cell / max_cell * 100.0;
            }
        }
    }

    HeatmapData {
        x_axis: Axis { label: "Q score", min: 0.0, max: columns as f64 },
        y_axis: Axis { label: "cycle", min: 0.0, max: by_cycle.len() as f64 },
        matrix,
        color_range: (0.0, 100.0),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn heatmap_is_normalized_to_one_hundred() {
        let bins =
            vec![QBin { lower: 0, upper: 9, value: 6 }, QBin { lower: 10, upper: 19, value: 15 }];
        let rows = vec![(1u16, vec![10u32, 90u32])];
        let heatmap = build(&bins, rows.into_iter());
        let max = heatmap.matrix.iter().flatten().copied().fold(0.0f64, f64::max);
        assert!((max - 100.0).abs() < 1e-9);
    }

    #[test]
    fn row_count_matches_distinct_cycles() {
        let bins = vec![QBin { lower: 0, upper: 1, value: 0 }];
        let rows = vec![(1u16, vec![5u32]), (2u16, vec![7u32])];
        let heatmap = build(&bins, rows.into_iter());
        assert_eq!(heatmap.matrix.len(), 2);
    }
}
