//! Run metrics facade (C6): owns every metric set plus the run descriptor, and orchestrates
//! `load` and the finalization pipeline described in §4.4.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::enums::{InstrumentType, TileNamingMethod};
use crate::error::{Error, Result};
use crate::ids::decode_tile_number;
use crate::metrics::corrected_intensity::{self, CorrectedIntensityMetricSet};
use crate::metrics::error_rate::{self, ErrorMetricSet};
use crate::metrics::extraction::{self, ExtractionMetricSet};
use crate::metrics::image::{self, ImageMetricSet};
use crate::metrics::index::{self, IndexMetricSet};
use crate::metrics::q::{self, QMetricSet};
use crate::metrics::q_by_lane::{self, QByLaneMetricSet};
use crate::metrics::q_collapsed::{self, QCollapsedMetricSet};
use crate::metrics::tile::{self, TileMetricSet};
use crate::quality;
use crate::run_info::{RunInfo, RunParameters};

/// Owns every metric set for one run plus its parsed descriptor, after `load` and finalization.
#[derive(Debug, Default)]
pub struct RunMetrics {
    pub run_info: RunInfo,
    pub corrected_intensity: CorrectedIntensityMetricSet,
    pub error: ErrorMetricSet,
    pub extraction: ExtractionMetricSet,
    pub image: ImageMetricSet,
    pub index: IndexMetricSet,
    pub q: QMetricSet,
    pub q_collapsed: QCollapsedMetricSet,
    pub q_by_lane: QByLaneMetricSet,
    pub tile: TileMetricSet,
}

/// Primary (current) and secondary (historical) on-disk name for a metric family's InterOp file.
struct FamilyFile {
    primary: &'static str,
    secondary: &'static str,
}

const CORRECTED_INTENSITY_FILE: FamilyFile =
    FamilyFile { primary: "CorrectedIntMetricsOut.bin", secondary: "CorrectedIntMetrics.bin" };
const ERROR_FILE: FamilyFile = FamilyFile { primary: "ErrorMetricsOut.bin", secondary: "ErrorMetrics.bin" };
const EXTRACTION_FILE: FamilyFile =
    FamilyFile { primary: "ExtractionMetricsOut.bin", secondary: "ExtractionMetrics.bin" };
const IMAGE_FILE: FamilyFile = FamilyFile { primary: "ImageMetricsOut.bin", secondary: "ImageMetrics.bin" };
const INDEX_FILE: FamilyFile = FamilyFile { primary: "IndexMetricsOut.bin", secondary: "IndexMetrics.bin" };
const Q_FILE: FamilyFile = FamilyFile { primary: "QMetricsOut.bin", secondary: "QMetrics.bin" };
const TILE_FILE: FamilyFile = FamilyFile { primary: "TileMetricsOut.bin", secondary: "TileMetrics.bin" };

const RUN_INFO_FILE: &str = "RunInfo.xml";
const RUN_PARAMETERS_FILE: &str = "RunParameters.xml";

/// Read the named family's file from `run_folder`, trying `family.primary` then `family.secondary`.
/// A family whose file is absent under both names is tolerated (returns `Ok(None)`); any read
/// error other than not-found is not distinguishable from "absent" at this layer, so it is also
/// tolerated, matching the codec's own `MissingFile` tolerance policy.
fn read_family_bytes(run_folder: &Path, family: &FamilyFile) -> Option<Vec<u8>> {
    for name in [family.primary, family.secondary] {
        if let Ok(bytes) = fs::read(run_folder.join(name)) {
            debug!(file = name, "resolved metric family file");
            return Some(bytes);
        }
    }
    warn!(primary = family.primary, secondary = family.secondary, "metric family file not found, skipping");
    None
}

fn read_family<M, H: Default>(
    run_folder: &Path,
    family: &FamilyFile,
    set: &mut crate::metric_set::MetricSet<M, H>,
    read: impl FnOnce(&[u8], &mut crate::metric_set::MetricSet<M, H>) -> Result<()>,
) -> Result<()> {
    let Some(bytes) = read_family_bytes(run_folder, family) else { return Ok(()) };
    match read(&bytes, set) {
        Ok(()) => Ok(()),
        Err(Error::IncompleteRecord { file, offset }) => {
            warn!(file, offset, "file ends mid-record, keeping complete records read so far");
            Ok(())
        }
        Err(other) => Err(other),
    }
}

/// Majority-vote the tile-naming method by decoding every tile number under each candidate
/// method and keeping whichever decodes the largest share successfully (§4.4 step 3).
fn infer_tile_naming_method(tile_numbers: &[u32]) -> Option<TileNamingMethod> {
    if tile_numbers.is_empty() {
        return None;
    }

    // Rank breaks ties toward the more specific naming method: `Absolute` never fails to decode
    // any tile number, so it would otherwise tie every other method that also succeeds on 100%.
    [TileNamingMethod::Absolute, TileNamingMethod::FiveDigit, TileNamingMethod::FourDigit]
        .into_iter()
        .enumerate()
        .map(|(rank, method)| {
            let successes = tile_numbers.iter().filter(|&&t| decode_tile_number(method, t).is_ok()).count();
            (method, successes, rank)
        })
        .filter(|&(_, successes, _)| successes * 2 > tile_numbers.len())
        .max_by_key(|&(_, successes, rank)| (successes, rank))
        .map(|(method, _, _)| method)
}

impl RunMetrics {
    /// Load and finalize every metric family under `run_folder` (§4.4).
    pub fn load(run_folder: impl AsRef<Path>) -> Result<Self> {
        let run_folder = run_folder.as_ref();
        let span = tracing::info_span!("load", run_folder = %run_folder.display());
        let _enter = span.enter();
        info!("loading run metrics");

        let mut metrics = RunMetrics::default();

        read_family(run_folder, &CORRECTED_INTENSITY_FILE, &mut metrics.corrected_intensity, corrected_intensity::read)?;
        read_family(run_folder, &ERROR_FILE, &mut metrics.error, error_rate::read)?;
        read_family(run_folder, &EXTRACTION_FILE, &mut metrics.extraction, extraction::read)?;
        read_family(run_folder, &IMAGE_FILE, &mut metrics.image, image::read)?;
        read_family(run_folder, &INDEX_FILE, &mut metrics.index, index::read)?;
        read_family(run_folder, &Q_FILE, &mut metrics.q, q::read)?;
        read_family(run_folder, &TILE_FILE, &mut metrics.tile, tile::read)?;

        if metrics.corrected_intensity.is_empty()
            && metrics.error.is_empty()
            && metrics.extraction.is_empty()
            && metrics.image.is_empty()
            && metrics.index.is_empty()
            && metrics.q.is_empty()
            && metrics.tile.is_empty()
        {
            return Err(Error::EmptyInterop(run_folder.display().to_string()));
        }

        let run_info_xml = fs::read_to_string(run_folder.join(RUN_INFO_FILE))
            .map_err(|_| Error::MissingFile(RUN_INFO_FILE.to_string()))?;
        metrics.run_info = RunInfo::parse(&run_info_xml)?;
        metrics.run_info.validate()?;

        if metrics.q.is_empty() {
            let tile_numbers: Vec<u32> = metrics
                .extraction
                .iter()
                .map(|r| r.id.tile)
                .chain(metrics.tile.iter().map(|r| r.id.tile))
                .collect();
            metrics.run_info.layout.naming_method = infer_tile_naming_method(&tile_numbers)
                .ok_or_else(|| Error::InvalidTilingMethod("no tile numbers decoded under any naming method".to_string()))?;
        }

        let legacy_bin_count = quality::count_legacy_bins(&metrics.q);
        let needs_run_parameters = legacy_bin_count > 0 || metrics.run_info.channels.is_empty();

        let instrument = if needs_run_parameters {
            let run_parameters_xml = fs::read_to_string(run_folder.join(RUN_PARAMETERS_FILE));
            match run_parameters_xml {
                Ok(xml) => RunParameters::parse(&xml)?.instrument,
                Err(_) if metrics.run_info.channels.is_empty() => {
                    return Err(Error::invalid("RunParameters.xml is required to backfill channel names"))
                }
                Err(_) => InstrumentType::Unknown,
            }
        } else {
            InstrumentType::Unknown
        };

        metrics.finalize(instrument);

        info!(
            tile = metrics.tile.len(),
            q = metrics.q.len(),
            error = metrics.error.len(),
            "load finished"
        );

        Ok(metrics)
    }

    /// Run the idempotent finalization pipeline (§4.4 steps a-f).
    fn finalize(&mut self, instrument: InstrumentType) {
        quality::synthesize_bins(&mut self.q, instrument);

        if self.q_collapsed.is_empty() {
            self.q_collapsed = q_collapsed::build(&self.q);
        }
        self.q_by_lane = q_by_lane::build(&self.q);

        quality::populate_cumulative_distributions(&mut self.q);

        if self.run_info.channels.is_empty() {
            self.run_info.channels = default_channel_names(instrument);
        }

        extraction::trim_channels(&mut self.extraction, self.run_info.channels.len());

        debug!("finalization complete");
    }

    /// Assemble the imaging table (C8) from every metric family this run actually loaded.
    pub fn imaging_table(&self) -> crate::table::ImagingTable {
        crate::table::build(&crate::table::TableSources {
            error: Some(&self.error),
            q_collapsed: Some(&self.q_collapsed),
            tile: Some(&self.tile),
            corrected_intensity: Some(&self.corrected_intensity),
            extraction: Some(&self.extraction),
            image: Some(&self.image),
            run_info: Some(&self.run_info),
        })
    }
}

/// The fixed four-channel name order used when a run's `RunInfo.xml` carries no `ImageChannels`
/// list, keyed by instrument platform.
fn default_channel_names(instrument: InstrumentType) -> Vec<String> {
    match instrument {
        InstrumentType::NextSeq | InstrumentType::MiniSeq => {
            vec!["RED".to_string(), "GREEN".to_string()]
        }
        _ => vec!["A".to_string(), "C".to_string(), "G".to_string(), "T".to_string()],
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn infer_tile_naming_method_picks_majority_decoder() {
        let tiles = vec![1101, 1102, 2316, 1316];
        assert_eq!(infer_tile_naming_method(&tiles), Some(TileNamingMethod::FourDigit));
    }

    #[test]
    fn infer_tile_naming_method_is_none_for_empty_input() {
        assert_eq!(infer_tile_naming_method(&[]), None);
    }

    #[test]
    fn default_channel_names_uses_two_channels_for_nextseq() {
        assert_eq!(default_channel_names(InstrumentType::NextSeq).len(), 2);
        assert_eq!(default_channel_names(InstrumentType::HiSeq).len(), 4);
    }

    #[test]
    fn load_reports_a_folder_with_no_metric_families_as_empty_interop() {
        let dir = std::env::temp_dir().join(format!("interop-facade-test-empty-{}", std::process::id()));
        let _ = fs::create_dir_all(&dir);
        let result = RunMetrics::load(&dir);
        assert!(matches!(result, Err(Error::EmptyInterop(_))));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_reports_missing_run_info_as_missing_file() {
        use crate::metrics::tile::{self, TileMetricSet, TileRecord, ReadStats};
        use crate::ids::TileId;

        let dir = std::env::temp_dir().join(format!("interop-facade-test-{}", std::process::id()));
        let _ = fs::create_dir_all(&dir);

        let mut tile_set = TileMetricSet::default();
        tile_set.header.version = 2;
        tile_set.header.record_size = 4 + 16 + 12;
        tile_set
            .push(TileRecord {
                id: TileId::new(1, 1101).unwrap(),
                cluster_count: 100.0,
                cluster_count_pf: 90.0,
                density: 1000.0,
                density_pf: 900.0,
                reads: vec![ReadStats { percent_aligned: 90.0, percent_phasing: 0.1, percent_prephasing: 0.1 }],
            })
            .unwrap();
        fs::write(dir.join("TileMetricsOut.bin"), tile::write(&tile_set)).unwrap();

        let result = RunMetrics::load(&dir);
        assert!(matches!(result, Err(Error::MissingFile(_))));
        let _ = fs::remove_dir_all(&dir);
    }
}
