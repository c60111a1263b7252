//! By-cycle plot (§4.6): one point per cycle, aggregating across tiles. A distribution plot
//! summarizes each cycle's values as a candlestick; an average plot reduces to the mean.

use std::collections::BTreeMap;

use crate::enums::PlotColor;
use crate::math::Candlestick;

use super::{autoscale, PlotPoint, Series, SeriesKind, SeriesPlot};

/// Group `(cycle, value)` pairs by cycle, in ascending cycle order.
fn group_by_cycle(values: impl Iterator<Item = (u16, f64)>) -> BTreeMap<u16, Vec<f64>> {
    let mut groups: BTreeMap<u16, Vec<f64>> = BTreeMap::new();
    for (cycle, value) in values {
        groups.entry(cycle).or_default().push(value);
    }
    groups
}

/// One candlestick per cycle, summarizing the distribution of `values` across tiles.
pub fn distribution_plot(title: &str, values: impl Iterator<Item = (u16, f64)>) -> SeriesPlot {
    let groups = group_by_cycle(values);

    let mut points = Vec::with_capacity(groups.len());
    for (cycle, mut group) in groups {
        if let Some(stick) = Candlestick::from_values(&mut group) {
            points.push(PlotPoint::Candlestick { x: cycle as f64, stick });
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

    SeriesPlot {
        title: title.to_string(),
        x_axis,
        y_axis,
        series: vec![Series { title: title.to_string(), color: PlotColor::Blue, kind: SeriesKind::Candlestick, points }],
    }
}

/// One point per cycle, the mean of `values` across tiles.
pub fn average_plot(title: &str, values: impl Iterator<Item = (u16, f64)>) -> SeriesPlot {
    let groups = group_by_cycle(values);

    let points: Vec<PlotPoint> = groups
        .into_iter()
        .map(|(cycle, group)| PlotPoint::Line { x: cycle as f64, y: crate::math::nan_mean(group.into_iter()) })
        .collect();

    let (x_axis, y_axis) = autoscale(
        points.iter().map(|p| match p {
            PlotPoint::Line { x, .. } => *x,
            _ => unreachable!(),
        }),
        points.iter().map(|p| match p {
            PlotPoint::Line { y, .. } => *y,
            _ => unreachable!(),
        }),
    );

    SeriesPlot {
        title: title.to_string(),
        x_axis,
        y_axis,
        series: vec![Series { title: title.to_string(), color: PlotColor::Blue, kind: SeriesKind::Line, points }],
    }
}
