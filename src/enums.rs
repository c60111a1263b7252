//! Closed enumerations shared across metric families, with bidirectional string<->value maps.
//!
//! Each enum's string table is a plain array of `(variant, name)` pairs; parsing is a linear
//! scan, matching the reference enum registry (the tables are small, at most ~30 entries).

/// The metric family a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricGroup {
    CorrectedIntensity,
    Error,
    Extraction,
    Image,
    Index,
    Q,
    QByLane,
    QCollapsed,
    Tile,
}

impl MetricGroup {
    const TABLE: &'static [(MetricGroup, &'static str)] = &[
        (MetricGroup::CorrectedIntensity, "CorrectedInt"),
        (MetricGroup::Error, "Error"),
        (MetricGroup::Extraction, "Extraction"),
        (MetricGroup::Image, "Image"),
        (MetricGroup::Index, "Index"),
        (MetricGroup::Q, "Q"),
        (MetricGroup::QByLane, "QByLane"),
        (MetricGroup::QCollapsed, "QCollapsed"),
        (MetricGroup::Tile, "Tile"),
    ];

    pub fn name(self) -> &'static str {
        Self::TABLE.iter().find(|(v, _)| *v == self).map(|(_, n)| *n).unwrap()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::TABLE.iter().find(|(_, n)| *n == name).map(|(v, _)| *v)
    }

    /// Whether this family is indexed per-cycle (as opposed to per-tile only).
    pub fn is_cycle_metric(self) -> bool {
        !matches!(self, MetricGroup::Index | MetricGroup::Tile)
    }
}

/// The kind of value a column/series carries, used to pick an axis label and a source accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Intensity,
    Fwhm,
    PercentBase,
    PercentQ20,
    PercentQ30,
    AccumPercentQ20,
    AccumPercentQ30,
    QScore,
    Density,
    DensityPf,
    ClusterCount,
    ClusterCountPf,
    AlignedReadCount,
    ErrorRate,
    PercentPhasing,
    PercentPrephasing,
    PercentAligned,
    CorrectedIntensity,
    CalledIntensity,
    SignalToNoise,
}

impl MetricKind {
    const TABLE: &'static [(MetricKind, &'static str, MetricGroup)] = &[
        (MetricKind::Intensity, "Intensity", MetricGroup::Extraction),
        (MetricKind::Fwhm, "FWHM", MetricGroup::Extraction),
        (MetricKind::PercentBase, "% Base", MetricGroup::CorrectedIntensity),
        (MetricKind::PercentQ20, "% >=Q20", MetricGroup::Q),
        (MetricKind::PercentQ30, "% >=Q30", MetricGroup::Q),
        (MetricKind::AccumPercentQ20, "% >=Q20 (Accum)", MetricGroup::Q),
        (MetricKind::AccumPercentQ30, "% >=Q30 (Accum)", MetricGroup::Q),
        (MetricKind::QScore, "Median QScore", MetricGroup::Q),
        (MetricKind::Density, "Cluster Density (K/mm2)", MetricGroup::Tile),
        (MetricKind::DensityPf, "Density PF", MetricGroup::Tile),
        (MetricKind::ClusterCount, "Clusters", MetricGroup::Tile),
        (MetricKind::ClusterCountPf, "Clusters PF", MetricGroup::Tile),
        (MetricKind::AlignedReadCount, "Aligned Read Count", MetricGroup::Tile),
        (MetricKind::ErrorRate, "Error Rate", MetricGroup::Error),
        (MetricKind::PercentPhasing, "% Phasing", MetricGroup::Tile),
        (MetricKind::PercentPrephasing, "% Prephasing", MetricGroup::Tile),
        (MetricKind::PercentAligned, "% Aligned", MetricGroup::Tile),
        (MetricKind::CorrectedIntensity, "Corrected Int", MetricGroup::CorrectedIntensity),
        (MetricKind::CalledIntensity, "Called Int", MetricGroup::CorrectedIntensity),
        (MetricKind::SignalToNoise, "Signal to Noise", MetricGroup::CorrectedIntensity),
    ];

    pub fn name(self) -> &'static str {
        Self::TABLE.iter().find(|(v, _, _)| *v == self).map(|(_, n, _)| *n).unwrap()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::TABLE.iter().find(|(_, n, _)| *n == name).map(|(v, _, _)| *v)
    }

    pub fn group(self) -> MetricGroup {
        Self::TABLE.iter().find(|(v, _, _)| *v == self).map(|(_, _, g)| *g).unwrap()
    }

    /// "Cycle metrics" are rejected by the by-lane plot projection (§4.6).
    pub fn is_cycle_metric(self) -> bool {
        self.group().is_cycle_metric()
    }
}

/// Instrument platform, inferred from `RunParameters.xml`'s application name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrumentType {
    HiSeq,
    HiScan,
    MiSeq,
    NextSeq,
    MiniSeq,
    Unknown,
}

impl InstrumentType {
    const TABLE: &'static [(InstrumentType, &'static str)] = &[
        (InstrumentType::HiSeq, "HiSeq"),
        (InstrumentType::HiScan, "HiScan"),
        (InstrumentType::MiSeq, "MiSeq"),
        (InstrumentType::NextSeq, "NextSeq"),
        (InstrumentType::MiniSeq, "MiniSeq"),
    ];

    pub fn name(self) -> &'static str {
        Self::TABLE.iter().find(|(v, _)| *v == self).map(|(_, n)| *n).unwrap_or("Unknown")
    }

    /// Case-insensitive prefix match against the application name, per §4.3. `multiple_surfaces`
    /// disambiguates HiSeq (single surface) from HiScan (supports multiple surfaces).
    pub fn classify(application_name: &str, multiple_surfaces: bool) -> Self {
        let lower = application_name.to_ascii_lowercase();

        for &(kind, name) in Self::TABLE {
            if kind == InstrumentType::HiSeq || kind == InstrumentType::HiScan {
                continue;
            }
            if lower.starts_with(&name.to_ascii_lowercase()) {
                return kind;
            }
        }

        if lower.starts_with("hiseq") || lower.starts_with("hiscan") {
            return if multiple_surfaces { InstrumentType::HiScan } else { InstrumentType::HiSeq };
        }

        InstrumentType::Unknown
    }
}

/// Tile-number naming convention (§3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TileNamingMethod {
    #[default]
    FourDigit,
    FiveDigit,
    Absolute,
}

impl TileNamingMethod {
    pub fn from_convention_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TileNamingMethod::FourDigit),
            1 => Some(TileNamingMethod::FiveDigit),
            2 => Some(TileNamingMethod::Absolute),
            _ => None,
        }
    }
}

/// A DNA base, or the no-call sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnaBase {
    NoCall,
    A,
    C,
    G,
    T,
}

impl DnaBase {
    /// The four real bases, in the fixed order every per-base array uses.
    pub const BASES: [DnaBase; 4] = [DnaBase::A, DnaBase::C, DnaBase::G, DnaBase::T];

    pub fn letter(self) -> char {
        match self {
            DnaBase::NoCall => 'N',
            DnaBase::A => 'A',
            DnaBase::C => 'C',
            DnaBase::G => 'G',
            DnaBase::T => 'T',
        }
    }
}

/// Flowcell surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Top,
    Bottom,
}

impl Surface {
    /// Surfaces are numbered 1 (top) and 2 (bottom) in decoded tile numbers.
    pub fn from_decoded(surface: u32) -> Option<Self> {
        match surface {
            1 => Some(Surface::Top),
            2 => Some(Surface::Bottom),
            _ => None,
        }
    }
}

/// Plotting color, assigned per channel/base in series plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlotColor {
    Red,
    Green,
    Blue,
    Black,
}

impl PlotColor {
    pub fn name(self) -> &'static str {
        match self {
            PlotColor::Red => "Red",
            PlotColor::Green => "Green",
            PlotColor::Blue => "Blue",
            PlotColor::Black => "Black",
        }
    }

    /// Default color assignment for the four channels (Red, Green, Blue-as-G2, Black-as-T2)
    /// or the four DNA bases (A, C, G, T), in declaration order.
    pub fn for_index(index: usize) -> Self {
        match index % 4 {
            0 => PlotColor::Red,
            1 => PlotColor::Green,
            2 => PlotColor::Blue,
            _ => PlotColor::Black,
        }
    }
}
