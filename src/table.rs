//! Imaging table projection (C8): one row per (lane, tile, cycle), one column per configured
//! metric field, values rounded to a fixed per-column precision.

use std::collections::BTreeMap;

use crate::ids::{decode_tile_number, CycleId};
use crate::math::round_half_away_from_zero;
use crate::metrics::corrected_intensity::CorrectedIntensityMetricSet;
use crate::metrics::error_rate::ErrorMetricSet;
use crate::metrics::extraction::ExtractionMetricSet;
use crate::metrics::image::ImageMetricSet;
use crate::metrics::q_collapsed::QCollapsedMetricSet;
use crate::metrics::tile::TileMetricSet;
use crate::run_info::RunInfo;

/// What shape of value a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Scalar,
    PerChannel,
    PerBase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub id: &'static str,
    pub kind: ColumnType,
    pub precision: u32,
}

impl ColumnSpec {
    pub fn width(self) -> usize {
        match self.kind {
            ColumnType::Scalar => 1,
            ColumnType::PerChannel | ColumnType::PerBase => 4,
        }
    }

    /// Derive the display header from the column id by the fixed textual substitutions of §4.8:
    /// "Percent" -> "%", "GreaterThan" -> "≥", CamelCase -> spaced words. Word-boundary spacing
    /// only fires on a lowercase-to-uppercase transition, so it never splits the symbols that
    /// the named substitutions just produced.
    pub fn header_name(self) -> String {
        let expanded = self.id.replace("GreaterThan", "\u{2265}").replace("Percent", "%");

        let mut spaced = String::with_capacity(expanded.len() + 8);
        let mut previous: Option<char> = None;
        for ch in expanded.chars() {
            if ch.is_ascii_uppercase() && previous.is_some_and(|p| p.is_ascii_lowercase()) {
                spaced.push(' ');
            }
            spaced.push(ch);
            previous = Some(ch);
        }
        spaced
    }
}

/// Columns present whenever the backing metric set is non-empty (§4.8 step 1 filters this list
/// down to the families a given run actually shipped).
const ALL_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { id: "ErrorRate", kind: ColumnType::Scalar, precision: 2 },
    ColumnSpec { id: "PercentGreaterThanQ20", kind: ColumnType::Scalar, precision: 2 },
    ColumnSpec { id: "PercentGreaterThanQ30", kind: ColumnType::Scalar, precision: 2 },
    ColumnSpec { id: "ClusterCount", kind: ColumnType::Scalar, precision: 0 },
    ColumnSpec { id: "ClusterCountPf", kind: ColumnType::Scalar, precision: 0 },
    ColumnSpec { id: "Density", kind: ColumnType::Scalar, precision: 0 },
    ColumnSpec { id: "DensityPf", kind: ColumnType::Scalar, precision: 0 },
    ColumnSpec { id: "PercentPassFilter", kind: ColumnType::Scalar, precision: 1 },
    ColumnSpec { id: "PercentAligned", kind: ColumnType::Scalar, precision: 1 },
    ColumnSpec { id: "PercentPhasing", kind: ColumnType::Scalar, precision: 3 },
    ColumnSpec { id: "PercentPrephasing", kind: ColumnType::Scalar, precision: 3 },
    ColumnSpec { id: "SignalToNoise", kind: ColumnType::Scalar, precision: 2 },
    ColumnSpec { id: "CorrectedIntensity", kind: ColumnType::PerBase, precision: 1 },
    ColumnSpec { id: "Intensity", kind: ColumnType::PerChannel, precision: 0 },
    ColumnSpec { id: "PercentNoCalls", kind: ColumnType::Scalar, precision: 1 },
    ColumnSpec { id: "PercentBase", kind: ColumnType::PerBase, precision: 1 },
    ColumnSpec { id: "Called", kind: ColumnType::PerBase, precision: 0 },
    ColumnSpec { id: "Fwhm", kind: ColumnType::PerChannel, precision: 2 },
    ColumnSpec { id: "MinimumContrast", kind: ColumnType::PerChannel, precision: 0 },
    ColumnSpec { id: "MaximumContrast", kind: ColumnType::PerChannel, precision: 0 },
    ColumnSpec { id: "Surface", kind: ColumnType::Scalar, precision: 0 },
    ColumnSpec { id: "Swath", kind: ColumnType::Scalar, precision: 0 },
    ColumnSpec { id: "Section", kind: ColumnType::Scalar, precision: 0 },
    ColumnSpec { id: "TileNumber", kind: ColumnType::Scalar, precision: 0 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct RowKey {
    lane: u16,
    tile: u32,
    cycle: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImagingRow {
    pub lane: u16,
    pub tile: u32,
    pub cycle: u16,
    /// Contiguous row buffer; absent cells are `NaN`. Column `i`'s values start at
    /// `columns[..i].iter().map(ColumnSpec::width).sum()`.
    pub cells: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImagingTable {
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<ImagingRow>,
}

/// Everything the table builder needs, borrowed rather than owned — mirrors the facade's
/// internal metric sets without requiring a dependency on `facade` itself.
#[derive(Debug, Default)]
pub struct TableSources<'a> {
    pub error: Option<&'a ErrorMetricSet>,
    pub q_collapsed: Option<&'a QCollapsedMetricSet>,
    pub tile: Option<&'a TileMetricSet>,
    pub corrected_intensity: Option<&'a CorrectedIntensityMetricSet>,
    pub extraction: Option<&'a ExtractionMetricSet>,
    pub image: Option<&'a ImageMetricSet>,
    /// Needed to map a row's cycle to its read (`PercentAligned`/`Phasing`/`Prephasing`) and to
    /// decode a row's tile number into its spatial components (`Surface`/`Swath`/`Section`/
    /// `TileNumber`).
    pub run_info: Option<&'a RunInfo>,
}

fn row_offset(columns: &[ColumnSpec], index: usize) -> usize {
    columns[..index].iter().map(|c| c.width()).sum()
}

pub fn build(sources: &TableSources<'_>) -> ImagingTable {
    let tile_present = sources.tile.is_some_and(|s| !s.is_empty());
    let corrected_intensity_present = sources.corrected_intensity.is_some_and(|s| !s.is_empty());
    let extraction_present = sources.extraction.is_some_and(|s| !s.is_empty());
    let image_present = sources.image.is_some_and(|s| !s.is_empty());
    let any_family_present = sources.error.is_some_and(|s| !s.is_empty())
        || sources.q_collapsed.is_some_and(|s| !s.is_empty())
        || tile_present
        || corrected_intensity_present
        || extraction_present
        || image_present;

    let columns: Vec<ColumnSpec> = ALL_COLUMNS
        .iter()
        .copied()
        .filter(|c| match c.id {
            "ErrorRate" => sources.error.is_some_and(|s| !s.is_empty()),
            "PercentGreaterThanQ20" | "PercentGreaterThanQ30" => {
                sources.q_collapsed.is_some_and(|s| !s.is_empty())
            }
            "ClusterCount" | "ClusterCountPf" | "Density" | "DensityPf" | "PercentPassFilter" => {
                tile_present
            }
            "PercentAligned" | "PercentPhasing" | "PercentPrephasing" => {
                tile_present && sources.run_info.is_some()
            }
            "SignalToNoise" | "CorrectedIntensity" => corrected_intensity_present,
            "PercentNoCalls" | "PercentBase" | "Called" => corrected_intensity_present,
            "Intensity" => extraction_present,
            "Fwhm" => extraction_present,
            "MinimumContrast" | "MaximumContrast" => image_present,
            "Surface" | "Swath" | "Section" | "TileNumber" => {
                any_family_present && sources.run_info.is_some()
            }
            _ => false,
        })
        .collect();

    let width: usize = columns.iter().map(|c| c.width()).sum();
    let mut rows: BTreeMap<RowKey, Vec<f32>> = BTreeMap::new();

    fn ensure_row(rows: &mut BTreeMap<RowKey, Vec<f32>>, lane: u16, tile: u32, cycle: u16, width: usize) -> &mut Vec<f32> {
        rows.entry(RowKey { lane, tile, cycle }).or_insert_with(|| vec![f32::NAN; width])
    }

    if let (Some(index), Some(set)) = (column_index(&columns, "ErrorRate"), sources.error) {
        for record in set.iter() {
            let offset = row_offset(&columns, index);
            ensure_row(&mut rows, record.id.lane, record.id.tile, record.id.cycle, width)[offset] = record.error_rate;
        }
    }

    if let Some(set) = sources.q_collapsed {
        for record in set.iter() {
            let total = record.total as f64;
            let q20 = if total > 0.0 { record.count_q20 as f64 / total * 100.0 } else { 0.0 };
            let q30 = if total > 0.0 { record.count_q30 as f64 / total * 100.0 } else { 0.0 };
            if let Some(index) = column_index(&columns, "PercentGreaterThanQ20") {
                let offset = row_offset(&columns, index);
                ensure_row(&mut rows, record.id.lane, record.id.tile, record.id.cycle, width)[offset] = q20 as f32;
            }
            if let Some(index) = column_index(&columns, "PercentGreaterThanQ30") {
                let offset = row_offset(&columns, index);
                ensure_row(&mut rows, record.id.lane, record.id.tile, record.id.cycle, width)[offset] = q30 as f32;
            }
        }
    }

    if let Some(set) = sources.corrected_intensity {
        for record in set.iter() {
            let row = ensure_row(&mut rows, record.id.lane, record.id.tile, record.id.cycle, width);
            if let Some(index) = column_index(&columns, "SignalToNoise") {
                row[row_offset(&columns, index)] = record.signal_to_noise;
            }
            if let Some(index) = column_index(&columns, "CorrectedIntensity") {
                let offset = row_offset(&columns, index);
                for (i, &v) in record.corrected_intensity_all.iter().enumerate() {
                    row[offset + i] = v as f32;
                }
            }
            if let Some(index) = column_index(&columns, "Called") {
                let offset = row_offset(&columns, index);
                for (i, &v) in record.called_intensity.iter().enumerate() {
                    row[offset + i] = v as f32;
                }
            }

            let total: u32 = record.called_counts.iter().sum();
            if let Some(index) = column_index(&columns, "PercentNoCalls") {
                let percent = if total > 0 { record.called_counts[0] as f64 / total as f64 * 100.0 } else { 0.0 };
                row[row_offset(&columns, index)] = percent as f32;
            }
            if let Some(index) = column_index(&columns, "PercentBase") {
                let offset = row_offset(&columns, index);
                for (i, &count) in record.called_counts[1..].iter().enumerate() {
                    let percent = if total > 0 { count as f64 / total as f64 * 100.0 } else { 0.0 };
                    row[offset + i] = percent as f32;
                }
            }
        }
    }

    if let Some(set) = sources.extraction {
        for record in set.iter() {
            let row = ensure_row(&mut rows, record.id.lane, record.id.tile, record.id.cycle, width);
            if let Some(index) = column_index(&columns, "Intensity") {
                let offset = row_offset(&columns, index);
                for (i, &v) in record.p90_intensity.iter().enumerate() {
                    row[offset + i] = v as f32;
                }
            }
            if let Some(index) = column_index(&columns, "Fwhm") {
                let offset = row_offset(&columns, index);
                for (i, &v) in record.focus_score.iter().enumerate() {
                    row[offset + i] = v;
                }
            }
        }
    }

    if let Some(set) = sources.image {
        for record in set.iter() {
            let row = ensure_row(&mut rows, record.id.lane, record.id.tile, record.id.cycle, width);
            if let Some(index) = column_index(&columns, "MinimumContrast") {
                let offset = row_offset(&columns, index);
                for (i, &v) in record.min_contrast.iter().enumerate() {
                    row[offset + i] = v as f32;
                }
            }
            if let Some(index) = column_index(&columns, "MaximumContrast") {
                let offset = row_offset(&columns, index);
                for (i, &v) in record.max_contrast.iter().enumerate() {
                    row[offset + i] = v as f32;
                }
            }
        }
    }

    // Tile-level columns have no cycle of their own; broadcast across every cycle row already
    // present for that tile.
    if let Some(set) = sources.tile {
        let tile_values: Vec<_> = set.iter().map(|r| (r.id.lane, r.id.tile, r.clone())).collect();
        let percent_pf = |record: &crate::metrics::tile::TileRecord| {
            if record.cluster_count > 0.0 { record.cluster_count_pf / record.cluster_count * 100.0 } else { 0.0 }
        };

        for (lane, tile, record) in tile_values {
            let matching_keys: Vec<RowKey> =
                rows.keys().copied().filter(|k| k.lane == lane && k.tile == tile).collect();
            for key in matching_keys {
                let row = rows.get_mut(&key).unwrap();
                if let Some(index) = column_index(&columns, "ClusterCount") {
                    row[row_offset(&columns, index)] = record.cluster_count;
                }
                if let Some(index) = column_index(&columns, "ClusterCountPf") {
                    row[row_offset(&columns, index)] = record.cluster_count_pf;
                }
                if let Some(index) = column_index(&columns, "Density") {
                    row[row_offset(&columns, index)] = record.density;
                }
                if let Some(index) = column_index(&columns, "DensityPf") {
                    row[row_offset(&columns, index)] = record.density_pf;
                }
                if let Some(index) = column_index(&columns, "PercentPassFilter") {
                    row[row_offset(&columns, index)] = percent_pf(&record);
                }

                if let Some(run_info) = sources.run_info {
                    if let Some(read) = run_info.read_for_cycle(key.cycle) {
                        if let Some(stats) = record.reads.get(read.number as usize - 1) {
                            if let Some(index) = column_index(&columns, "PercentAligned") {
                                row[row_offset(&columns, index)] = stats.percent_aligned;
                            }
                            if let Some(index) = column_index(&columns, "PercentPhasing") {
                                row[row_offset(&columns, index)] = stats.percent_phasing;
                            }
                            if let Some(index) = column_index(&columns, "PercentPrephasing") {
                                row[row_offset(&columns, index)] = stats.percent_prephasing;
                            }
                        }
                    }
                }
            }
        }
    }

    // Id-type columns are derived from the row's own tile number rather than read from a metric
    // family, so they fill in after every data-bearing family has had a chance to create a row.
    if let Some(run_info) = sources.run_info {
        let surface_index = column_index(&columns, "Surface");
        let swath_index = column_index(&columns, "Swath");
        let section_index = column_index(&columns, "Section");
        let tile_number_index = column_index(&columns, "TileNumber");

        if surface_index.is_some() || swath_index.is_some() || section_index.is_some() || tile_number_index.is_some()
        {
            for (key, row) in rows.iter_mut() {
                let Ok(location) = decode_tile_number(run_info.layout.naming_method, key.tile) else { continue };
                if let Some(index) = surface_index {
                    row[row_offset(&columns, index)] = location.surface as f32;
                }
                if let Some(index) = swath_index {
                    row[row_offset(&columns, index)] = location.swath as f32;
                }
                if let Some(index) = section_index {
                    row[row_offset(&columns, index)] = location.section.map_or(f32::NAN, |s| s as f32);
                }
                if let Some(index) = tile_number_index {
                    row[row_offset(&columns, index)] = location.tile_within_swath as f32;
                }
            }
        }
    }

    let rows = rows
        .into_iter()
        .map(|(key, mut cells)| {
            round_row(&columns, &mut cells);
            ImagingRow { lane: key.lane, tile: key.tile, cycle: key.cycle, cells }
        })
        .collect();

    ImagingTable { columns, rows }
}

fn column_index(columns: &[ColumnSpec], id: &str) -> Option<usize> {
    columns.iter().position(|c| c.id == id)
}

fn round_row(columns: &[ColumnSpec], cells: &mut [f32]) {
    let mut offset = 0;
    for column in columns {
        for cell in &mut cells[offset..offset + column.width()] {
            if !cell.is_nan() {
                *cell = round_half_away_from_zero(*cell, column.precision);
            }
        }
        offset += column.width();
    }
}

/// Look up `record`'s cycle key to find which row it belongs in — used by callers that already
/// hold a [`CycleId`] and want the matching row without re-scanning the table.
pub fn row_index_for(table: &ImagingTable, id: CycleId) -> Option<usize> {
    table.rows.iter().position(|r| r.lane == id.lane && r.tile == id.tile && r.cycle == id.cycle)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::enums::TileNamingMethod;
    use crate::ids::{CycleId, TileId};
    use crate::metrics::corrected_intensity::{CorrectedIntensityMetricSet, CorrectedIntensityRecord};
    use crate::metrics::error_rate::ErrorRecord;
    use crate::metrics::image::{ImageMetricSet, ImageRecord};
    use crate::metrics::tile::{ReadStats, TileRecord};
    use crate::run_info::{FlowcellLayout, ReadDescriptor};

    fn sample_run_info() -> RunInfo {
        RunInfo {
            version: 0,
            layout: FlowcellLayout {
                lane_count: 1,
                surface_count: 2,
                swath_count: 2,
                tile_count: 2,
                sections_per_lane: 1,
                naming_method: TileNamingMethod::FourDigit,
                barcode: "H00001".to_string(),
            },
            reads: vec![ReadDescriptor { number: 1, num_cycles: 2, is_indexed: false }],
            channels: vec!["A".to_string(), "C".to_string()],
        }
    }

    fn offset_of(table: &ImagingTable, id: &str) -> usize {
        let index = table.columns.iter().position(|c| c.id == id).unwrap();
        row_offset(&table.columns, index)
    }

    #[test]
    fn header_name_applies_textual_substitutions() {
        let spec = ColumnSpec { id: "PercentGreaterThanQ30", kind: ColumnType::Scalar, precision: 2 };
        assert_eq!(spec.header_name(), "%\u{2265}Q30");
    }

    #[test]
    fn absent_family_leaves_column_out_and_rounds_present_cells() {
        let mut error = ErrorMetricSet::default();
        error.push(ErrorRecord { id: CycleId::new(1, 1101, 1).unwrap(), error_rate: 0.12345 }).unwrap();

        let sources = TableSources { error: Some(&error), ..Default::default() };
        let table = build(&sources);

        assert_eq!(table.columns.len(), 1);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].cells[0], 0.12);
    }

    #[test]
    fn row_index_for_finds_matching_cycle_row() {
        let mut error = ErrorMetricSet::default();
        error.push(ErrorRecord { id: CycleId::new(1, 1101, 1).unwrap(), error_rate: 1.0 }).unwrap();
        let sources = TableSources { error: Some(&error), ..Default::default() };
        let table = build(&sources);

        let index = row_index_for(&table, CycleId::new(1, 1101, 1).unwrap());
        assert_eq!(index, Some(0));
    }

    #[test]
    fn tile_columns_broadcast_across_every_cycle_of_that_tile() {
        let mut error = ErrorMetricSet::default();
        error.push(ErrorRecord { id: CycleId::new(1, 1101, 1).unwrap(), error_rate: 1.0 }).unwrap();
        error.push(ErrorRecord { id: CycleId::new(1, 1101, 2).unwrap(), error_rate: 1.0 }).unwrap();

        let mut tile = TileMetricSet::default();
        tile.push(TileRecord {
            id: TileId::new(1, 1101).unwrap(),
            cluster_count: 1000.0,
            cluster_count_pf: 900.0,
            density: 200_000.0,
            density_pf: 180_000.0,
            reads: vec![ReadStats { percent_aligned: 98.0, percent_phasing: 0.1, percent_prephasing: 0.2 }],
        })
        .unwrap();

        let run_info = sample_run_info();
        let sources = TableSources { error: Some(&error), tile: Some(&tile), run_info: Some(&run_info), ..Default::default() };
        let table = build(&sources);

        let pf_index = offset_of(&table, "PercentPassFilter");
        let aligned_index = offset_of(&table, "PercentAligned");
        let phasing_index = offset_of(&table, "PercentPhasing");

        for row in &table.rows {
            assert_eq!(row.cells[pf_index], 90.0);
            assert_eq!(row.cells[aligned_index], 98.0);
            assert_eq!(row.cells[phasing_index], 0.1);
        }
    }

    #[test]
    fn percent_no_calls_and_percent_base_are_computed_from_called_counts() {
        let mut corrected_intensity = CorrectedIntensityMetricSet::default();
        corrected_intensity
            .push(CorrectedIntensityRecord {
                id: CycleId::new(1, 1101, 1).unwrap(),
                called_intensity: [10, 20, 30, 40],
                corrected_intensity_all: [10, 20, 30, 40],
                called_counts: [10, 20, 30, 20, 20], // no-call, A, C, G, T; total 100
                signal_to_noise: 5.0,
            })
            .unwrap();

        let sources = TableSources { corrected_intensity: Some(&corrected_intensity), ..Default::default() };
        let table = build(&sources);

        let no_call_index = offset_of(&table, "PercentNoCalls");
        let base_index = offset_of(&table, "PercentBase");
        let called_index = offset_of(&table, "Called");

        assert_eq!(table.rows[0].cells[no_call_index], 10.0);
        assert_eq!(table.rows[0].cells[base_index], 20.0);
        assert_eq!(table.rows[0].cells[base_index + 1], 30.0);
        assert_eq!(table.rows[0].cells[called_index], 10.0);
    }

    #[test]
    fn image_contrast_columns_are_surfaced() {
        let mut image = ImageMetricSet::default();
        image
            .push(ImageRecord {
                id: CycleId::new(1, 1101, 1).unwrap(),
                min_contrast: [1, 2, 3, 4],
                max_contrast: [10, 20, 30, 40],
            })
            .unwrap();

        let sources = TableSources { image: Some(&image), ..Default::default() };
        let table = build(&sources);

        let min_index = offset_of(&table, "MinimumContrast");
        let max_index = offset_of(&table, "MaximumContrast");
        assert_eq!(table.rows[0].cells[min_index], 1.0);
        assert_eq!(table.rows[0].cells[max_index], 10.0);
    }

    #[test]
    fn tile_id_columns_decode_surface_swath_and_tile_number() {
        let mut error = ErrorMetricSet::default();
        error.push(ErrorRecord { id: CycleId::new(1, 2316, 1).unwrap(), error_rate: 1.0 }).unwrap();

        let run_info = sample_run_info();
        let sources = TableSources { error: Some(&error), run_info: Some(&run_info), ..Default::default() };
        let table = build(&sources);

        let surface_index = offset_of(&table, "Surface");
        let swath_index = offset_of(&table, "Swath");
        let tile_number_index = offset_of(&table, "TileNumber");
        let section_index = offset_of(&table, "Section");

        assert_eq!(table.rows[0].cells[surface_index], 2.0);
        assert_eq!(table.rows[0].cells[swath_index], 3.0);
        assert_eq!(table.rows[0].cells[tile_number_index], 16.0);
        assert!(table.rows[0].cells[section_index].is_nan());
    }

    #[test]
    fn no_run_info_means_no_id_columns() {
        let mut error = ErrorMetricSet::default();
        error.push(ErrorRecord { id: CycleId::new(1, 1101, 1).unwrap(), error_rate: 1.0 }).unwrap();
        let sources = TableSources { error: Some(&error), ..Default::default() };
        let table = build(&sources);
        assert!(!table.columns.iter().any(|c| c.id == "Surface" || c.id == "TileNumber"));
    }
}
