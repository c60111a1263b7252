//! Plot projection (C9): candlestick/line/bar series, heatmaps, and the flowcell map, built from
//! already-loaded metric sets plus filter selection.

pub mod by_cycle;
pub mod by_lane;
pub mod flowcell;
pub mod qscore_heatmap;
pub mod qscore_histogram;
pub mod sample_qc;

use crate::enums::PlotColor;
use crate::math::Candlestick;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Line,
    Bar,
    Candlestick,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlotPoint {
    Line { x: f64, y: f64 },
    Bar { x: f64, height: f64 },
    Candlestick { x: f64, stick: Candlestick },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub title: String,
    pub color: PlotColor,
    pub kind: SeriesKind,
    pub points: Vec<PlotPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPlot {
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapData {
    pub x_axis: Axis,
    pub y_axis: Axis,
    /// Row-major: `matrix[row][col]`.
    pub matrix: Vec<Vec<f64>>,
    /// `[min, max]` color scale, distinct from the axis ranges (§4.6).
    pub color_range: (f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowcellData {
    pub heatmap: HeatmapData,
    /// Parallel to `heatmap.matrix`: the tile number occupying each cell, or `None` if empty.
    pub tile_ids: Vec<Vec<Option<u32>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlotData {
    Series(SeriesPlot),
    Heatmap(HeatmapData),
    Flowcell(FlowcellData),
}

/// y-range `[0 (or min y), 1.1 * max y + 1e-4]`, x-range `[0 (or min x), max x]`; NaN excluded
/// before scaling (§4.6).
pub fn autoscale(x_values: impl Iterator<Item = f64>, y_values: impl Iterator<Item = f64>) -> (Axis, Axis) {
    let x_range = crate::math::autoscale_x(x_values);
    let y_range = crate::math::autoscale_y(y_values);
    (
        Axis { label: "", min: x_range.min, max: x_range.max },
        Axis { label: "", min: y_range.min, max: y_range.max },
    )
}
