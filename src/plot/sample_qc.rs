//! Sample QC (§4.6): for one lane, group index-metric entries by `(index sequence, sample id)`,
//! sum their cluster counts, and express each group as a fraction of the lane's PF cluster count.

use std::collections::BTreeMap;

use crate::enums::PlotColor;
use crate::metrics::index::IndexRecord;

use super::{Axis, PlotPoint, Series, SeriesKind, SeriesPlot};

pub fn build(title: &str, lane_records: &[IndexRecord], lane_pf_cluster_count: f64) -> SeriesPlot {
    let mut groups: BTreeMap<(String, String), u64> = BTreeMap::new();
    for record in lane_records {
        for entry in &record.entries {
            *groups.entry((entry.index_sequence.clone(), entry.sample_id.clone())).or_insert(0) +=
                entry.cluster_count;
        }
    }

    let points: Vec<PlotPoint> = groups
        .values()
        .enumerate()
        .map(|(i, &count)| {
            let fraction = if lane_pf_cluster_count > 0.0 { count as f64 / lane_pf_cluster_count } else { 0.0 };
            PlotPoint::Bar { x: i as f64, height: fraction }
        })
        .collect();

    let max_height = points.iter().map(|p| match p { PlotPoint::Bar { height, .. } => *height, _ => 0.0 }).fold(0.0f64, f64::max);

    SeriesPlot {
        title: title.to_string(),
        x_axis: Axis { label: "sample", min: 0.0, max: groups.len() as f64 },
        y_axis: Axis { label: "% of PF clusters", min: 0.0, max: 1.1 * max_height + 1e-4 },
        series: vec![Series { title: title.to_string(), color: PlotColor::Red, kind: SeriesKind::Bar, points }],
    }
}
