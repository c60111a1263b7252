//! End-to-end exercise of `RunMetrics::load` against a synthetic run folder: writes a handful of
//! InterOp binary files plus a `RunInfo.xml`, then checks the finalization pipeline actually ran.

extern crate interop;

use std::fs;
use std::path::PathBuf;

use interop::facade::RunMetrics;
use interop::ids::{CycleId, TileId};
use interop::metrics::error_rate::{self, ErrorMetricSet, ErrorRecord};
use interop::metrics::q::{self, QMetricSet, QRecord};
use interop::metrics::tile::{self, ReadStats, TileMetricSet, TileRecord};

const RUN_INFO_XML: &str = r#"
    <RunInfo>
      <Run Id="1" Number="1">
        <Reads>
          <Read Number="1" NumCycles="2" IsIndexedRead="N"/>
        </Reads>
        <FlowcellLayout LaneCount="1" SurfaceCount="1" SwathCount="1" TileCount="2"
            TileNamingConvention="FourDigit">
          <FlowcellBarcode>TESTRUN</FlowcellBarcode>
        </FlowcellLayout>
      </Run>
    </RunInfo>
"#;

const RUN_PARAMETERS_XML: &str = r#"
    <RunParameters>
      <Setup>
        <ApplicationName>HiSeq Control Software</ApplicationName>
        <ApplicationVersion>2.0</ApplicationVersion>
      </Setup>
    </RunParameters>
"#;

fn run_folder(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("interop-load-test-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn load_joins_error_tile_and_q_families_and_finalizes() {
    let dir = run_folder("full");

    let mut error_set = ErrorMetricSet::default();
    error_set.header.version = 3;
    error_set.header.record_size = 48;
    error_set.push(ErrorRecord { id: CycleId::new(1, 1101, 1).unwrap(), error_rate: 0.5 }).unwrap();
    error_set.push(ErrorRecord { id: CycleId::new(1, 1101, 2).unwrap(), error_rate: 0.75 }).unwrap();
    fs::write(dir.join("ErrorMetricsOut.bin"), error_rate::write(&error_set)).unwrap();

    let mut tile_set = TileMetricSet::default();
    tile_set.header.version = 2;
    tile_set.header.record_size = 4 + 16 + 12;
    tile_set
        .push(TileRecord {
            id: TileId::new(1, 1101).unwrap(),
            cluster_count: 1000.0,
            cluster_count_pf: 900.0,
            density: 200_000.0,
            density_pf: 180_000.0,
            reads: vec![ReadStats { percent_aligned: 98.0, percent_phasing: 0.1, percent_prephasing: 0.1 }],
        })
        .unwrap();
    fs::write(dir.join("TileMetricsOut.bin"), tile::write(&tile_set)).unwrap();

    let mut q_set = QMetricSet::default();
    q_set.header.version = 4;
    q_set.header.record_size = 6 + 50 * 4;
    let mut histogram = vec![0u32; 50];
    histogram[30] = 80;
    histogram[20] = 20;
    q_set.push(QRecord { id: CycleId::new(1, 1101, 1).unwrap(), histogram: histogram.clone() }).unwrap();
    q_set.push(QRecord { id: CycleId::new(1, 1101, 2).unwrap(), histogram }).unwrap();
    fs::write(dir.join("QMetricsOut.bin"), q::write(&q_set)).unwrap();

    fs::write(dir.join("RunInfo.xml"), RUN_INFO_XML).unwrap();
    fs::write(dir.join("RunParameters.xml"), RUN_PARAMETERS_XML).unwrap();

    let metrics = RunMetrics::load(&dir).unwrap();

    assert_eq!(metrics.error.len(), 2);
    assert_eq!(metrics.tile.len(), 1);
    assert_eq!(metrics.q.len(), 2);

    // Q histograms accumulate across ascending cycles of the same tile (§4.4 step d).
    let cycle1 = metrics.q.get(CycleId::new(1, 1101, 1).unwrap().key()).unwrap();
    let cycle2 = metrics.q.get(CycleId::new(1, 1101, 2).unwrap().key()).unwrap();
    assert_eq!(cycle1.histogram[30], 80);
    assert_eq!(cycle2.histogram[30], 160);

    // No ImageChannels in RunInfo.xml, instrument is HiSeq ⇒ the four-base fallback.
    assert_eq!(metrics.run_info.channels, vec!["A", "C", "G", "T"]);

    // Q-collapsed and Q-by-lane are derived during finalization, not read from disk.
    assert!(!metrics.q_collapsed.is_empty());
    assert!(!metrics.q_by_lane.is_empty());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn load_tolerates_missing_metric_families() {
    let dir = run_folder("sparse");
    fs::write(dir.join("RunInfo.xml"), RUN_INFO_XML).unwrap();
    fs::write(dir.join("RunParameters.xml"), RUN_PARAMETERS_XML).unwrap();

    // Q is absent, so the naming method must be inferred from some other family's tile numbers;
    // Tile is the only family present here.
    let mut tile_set = TileMetricSet::default();
    tile_set.header.version = 2;
    tile_set.header.record_size = 4 + 16 + 12;
    tile_set
        .push(TileRecord {
            id: TileId::new(1, 1101).unwrap(),
            cluster_count: 500.0,
            cluster_count_pf: 450.0,
            density: 100_000.0,
            density_pf: 95_000.0,
            reads: vec![ReadStats { percent_aligned: 97.0, percent_phasing: 0.2, percent_prephasing: 0.2 }],
        })
        .unwrap();
    fs::write(dir.join("TileMetricsOut.bin"), tile::write(&tile_set)).unwrap();

    let metrics = RunMetrics::load(&dir).unwrap();

    assert!(metrics.error.is_empty());
    assert!(metrics.q.is_empty());
    assert_eq!(metrics.tile.len(), 1);
    assert_eq!(metrics.run_info.layout.lane_count, 1);

    let _ = fs::remove_dir_all(&dir);
}
