//! Flowcell heatmap (§4.6): rows are lanes, columns are `swaths_in_use * tiles_per_lane`, laid
//! out by decoding each tile's number into its spatial coordinates.

use crate::enums::TileNamingMethod;
use crate::ids::{decode_tile_number, TileId};
use crate::math::percentile_sorted;

use super::{Axis, FlowcellData, HeatmapData};

/// Column index for `tile` within a flowcell of `swath_count` swaths and `tiles_per_swath` tiles,
/// `all_surfaces` selecting whether both surfaces share one row block or get separate ones.
fn column_for(method: TileNamingMethod, tile: u32, swath_count: u32, tiles_per_swath: u32) -> Option<u32> {
    let location = decode_tile_number(method, tile).ok()?;
    if location.swath == 0 || location.swath > swath_count {
        return None;
    }
    Some((location.swath - 1) * tiles_per_swath + (location.tile_within_swath - 1))
}

/// Build a flowcell heatmap from `(TileId, value)` pairs, one cell per tile.
///
/// `error_rate_cap` caps the color range only (per the ErrorRate special case), never the
/// stored cell values.
pub fn build(
    method: TileNamingMethod,
    lane_count: u16,
    swath_count: u16,
    tiles_per_swath: u32,
    values: impl Iterator<Item = (TileId, f64)>,
    error_rate_cap: Option<f64>,
) -> FlowcellData {
    let columns = swath_count as u32 * tiles_per_swath;
    let mut matrix = vec![vec![f64::NAN; columns as usize]; lane_count as usize];
    let mut tile_ids = vec![vec![None; columns as usize]; lane_count as usize];

    for (id, value) in values {
        if id.lane == 0 || id.lane as usize > lane_count as usize {
            continue;
        }
        let Some(column) = column_for(method, id.tile, swath_count as u32, tiles_per_swath) else { continue };
        let row = id.lane as usize - 1;
        matrix[row][column as usize] = value;
        tile_ids[row][column as usize] = Some(id.tile);
    }

    let mut sorted: Vec<f64> = matrix.iter().flatten().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let (color_min, color_max) = if sorted.is_empty() {
        (0.0, 0.0)
    } else {
        let p25 = percentile_sorted(&sorted, 25);
        let p75 = percentile_sorted(&sorted, 75);
        let iqr = p75 - p25;
        let min = sorted[0];
        let mut max = sorted[sorted.len() - 1];
        if let Some(cap) = error_rate_cap {
            max = max.min(cap);
        }
        ((p25 - 2.0 * iqr).max(min), (p75 + 2.0 * iqr).min(max))
    };

    FlowcellData {
        heatmap: HeatmapData {
            x_axis: Axis { label: "tile", min: 0.0, max: columns as f64 },
            y_axis: Axis { label: "lane", min: 0.0, max: lane_count as f64 },
            matrix,
            color_range: (color_min, color_max),
        },
        tile_ids,
    }
}
