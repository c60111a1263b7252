//! By-lane plot (§4.6): one candlestick point per lane, summarizing across tiles. Metrics whose
//! kind is cycle-indexed are rejected outright — a by-lane view only makes sense for metrics
//! that already collapse cycles away (e.g. per-tile density, not per-cycle error rate).

use std::collections::BTreeMap;

use crate::enums::{MetricKind, PlotColor};
use crate::error::{Error, Result};
use crate::math::Candlestick;

use super::{autoscale, PlotPoint, Series, SeriesKind, SeriesPlot};

pub fn candlestick_by_lane(
    title: &str,
    metric_kind: MetricKind,
    values: impl Iterator<Item = (u16, f64)>,
) -> Result<SeriesPlot> {
    if metric_kind.is_cycle_metric() {
        return Err(Error::InvalidMetricType(format!(
            "{} is a cycle metric and cannot be projected by lane",
            metric_kind.name()
        )));
    }

    let mut groups: BTreeMap<u16, Vec<f64>> = BTreeMap::new();
    for (lane, value) in values {
        groups.entry(lane).or_default().push(value);
    }

    let mut points = Vec::with_capacity(groups.len());
    for (lane, mut group) in groups {
        if let Some(stick) = Candlestick::from_values(&mut group) {
            points.push(PlotPoint::Candlestick { x: lane as f64, stick });
        }
    }

    let (x_axis, y_axis) = autoscale(
        points.iter().map(|p| match p {
            PlotPoint::Candlestick { x, .. } => *x,
            _ => unreachable!(),
        }),
        points.iter().flat_map(|p| match p {
            PlotPoint::Candlestick { stick, .. } => vec![stick.min, stick.max],
            _ => unreachable!(),
        }),
    );

    Ok(SeriesPlot {
        title: title.to_string(),
        x_axis,
        y_axis,
        series: vec![Series { title: title.to_string(), color: PlotColor::Red, kind: SeriesKind::Candlestick, points }],
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cycle_metric_is_rejected() {
        let result = candlestick_by_lane("Error Rate", MetricKind::ErrorRate, std::iter::empty());
        assert!(result.is_err());
    }

    #[test]
    fn density_groups_by_lane() {
        let values = vec![(1, 900.0), (1, 950.0), (2, 800.0)];
        let plot = candlestick_by_lane("Density", MetricKind::Density, values.into_iter()).unwrap();
        assert_eq!(plot.series[0].points.len(), 2);
    }
}
