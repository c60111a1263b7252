#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused_extern_crates,
    unused,

    missing_copy_implementations,
    missing_debug_implementations,
)]

#![deny(
    unused_variables,
    unused_assignments,
    dead_code,
    unused_must_use,
    trivial_numeric_casts,
    redundant_semicolons
)]

#![forbid(unsafe_code)]

// TODO #![warn(missing_docs)]

pub mod io;
pub mod math;
pub mod error;

pub mod ids;
pub mod enums;
pub mod metrics;
pub mod metric_set;
pub mod run_info;
pub mod facade;
pub mod quality;
pub mod table;
pub mod plot;
pub mod filter;

/// Re-exports of the types commonly required to load a run and project it into tables and plots.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::facade::RunMetrics;
    pub use crate::filter::FilterOptions;
    pub use crate::ids::{CycleId, ReadId, TileId};
    pub use crate::plot::PlotData;
    pub use crate::run_info::{RunInfo, RunParameters};
    pub use crate::table::ImagingTable;
}
