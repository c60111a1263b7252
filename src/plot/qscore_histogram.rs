//! Q-score histogram (§4.6): sum of Q histograms over the filtered tiles/cycles, scaled to
//! millions or billions, one bar per bin. An optional Q threshold splits each bar into a
//! below/above-threshold pair of series.

use crate::enums::PlotColor;
use crate::metrics::q::QBin;

use super::{Axis, PlotPoint, Series, SeriesKind, SeriesPlot};

enum Scale {
    Ones,
    Millions,
    Billions,
}

impl Scale {
    fn pick(total: u64) -> Self {
        if total >= 1_000_000_000 {
            Scale::Billions
        } else if total >= 1_000_000 {
            Scale::Millions
        } else {
            Scale::Ones
        }
    }

    fn divisor(&self) -> f64 {
        match self {
            Scale::Ones => 1.0,
            Scale::Millions => 1_000_000.0,
            Scale::Billions => 1_000_000_000.0,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Scale::Ones => "count",
            Scale::Millions => "count (M)",
            Scale::Billions => "count (B)",
        }
    }
}

/// Sum every histogram and emit one bar per bin, optionally split at `threshold` (a Q value) into
/// "below" and "above" series.
pub fn build(bins: &[QBin], histograms: impl Iterator<Item = Vec<u32>>, threshold: Option<u8>) -> SeriesPlot {
    let mut sums = vec![0u64; bins.len()];
    for histogram in histograms {
        for (i, count) in histogram.into_iter().enumerate() {
            if i < sums.len() {
                sums[i] += count as u64;
            }
        }
    }

    let total: u64 = sums.iter().sum();
    let scale = Scale::pick(total);

    let mut below = Vec::new();
    let mut above = Vec::new();
    for (i, &sum) in sums.iter().enumerate() {
        let x = i as f64;
        let height = sum as f64 / scale.divisor();
        let point = PlotPoint::Bar { x, height };
        match threshold {
            Some(t) if bins[i].lower >= t => above.push(point),
            Some(_) => below.push(point),
            None => below.push(point),
        }
    }

    let mut series = vec![Series { title: "< threshold".to_string(), color: PlotColor::Blue, kind: SeriesKind::Bar, points: below }];
    if threshold.is_some() {
        series.push(Series { title: ">= threshold".to_string(), color: PlotColor::Green, kind: SeriesKind::Bar, points: above });
    }

    let max_height =
        series.iter().flat_map(|s| &s.points).map(|p| match p { PlotPoint::Bar { height, .. } => *height, _ => 0.0 }).fold(0.0f64, f64::max);

    SeriesPlot {
        title: "Q-score histogram".to_string(),
        x_axis: Axis { label: "Q score", min: 0.0, max: bins.len() as f64 },
        y_axis: Axis { label: scale.label(), min: 0.0, max: 1.1 * max_height + 1e-4 },
        series,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sums_histograms_into_one_bar_per_bin() {
        let bins = vec![QBin { lower: 0, upper: 9, value: 6 }, QBin { lower: 30, upper: 39, value: 36 }];
        let histograms = vec![vec![10u32, 20u32], vec![5u32, 15u32]];
        let plot = build(&bins, histograms.into_iter(), None);
        assert_eq!(plot.series.len(), 1);
        let PlotPoint::Bar { height, .. } = plot.series[0].points[0] else { panic!() };
        assert_eq!(height, 15.0);
    }

    #[test]
    fn threshold_splits_into_two_series() {
        let bins = vec![QBin { lower: 0, upper: 9, value: 6 }, QBin { lower: 30, upper: 39, value: 36 }];
        let histograms = vec![vec![10u32, 20u32]];
        let plot = build(&bins, histograms.into_iter(), Some(30));
        assert_eq!(plot.series.len(), 2);
        assert_eq!(plot.series[0].points.len(), 1);
        assert_eq!(plot.series[1].points.len(), 1);
    }
}
