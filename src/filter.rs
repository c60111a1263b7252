//! Filter-option selection (C10): the dimensions a caller can pin before handing a metric set to
//! a plot projection. Every field defaults to the "all" sentinel (`None`); `validate` checks a
//! projection's required dimensions are pinned and in range, and reports which dimensions are
//! still free for exhaustive enumeration in tests.

use crate::enums::DnaBase;
use crate::error::{Error, Result};
use crate::ids::decode_tile_number;
use crate::run_info::RunInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Lane,
    Channel,
    Base,
    Surface,
    Read,
    Cycle,
    Tile,
    Swath,
    Section,
}

impl Dimension {
    fn name(self) -> &'static str {
        match self {
            Dimension::Lane => "lane",
            Dimension::Channel => "channel",
            Dimension::Base => "base",
            Dimension::Surface => "surface",
            Dimension::Read => "read",
            Dimension::Cycle => "cycle",
            Dimension::Tile => "tile",
            Dimension::Swath => "swath",
            Dimension::Section => "section",
        }
    }
}

/// Selection by dimension, builder-style: start from [`FilterOptions::default`] (every dimension
/// "all") and narrow with the `with_*` setters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub lane: Option<u16>,
    pub channel: Option<u16>,
    pub base: Option<DnaBase>,
    pub surface: Option<u16>,
    pub read: Option<u16>,
    pub cycle: Option<u16>,
    pub tile: Option<u32>,
    pub swath: Option<u16>,
    pub section: Option<u16>,
}

impl FilterOptions {
    pub fn with_lane(mut self, lane: u16) -> Self {
        self.lane = Some(lane);
        self
    }
    pub fn with_channel(mut self, channel: u16) -> Self {
        self.channel = Some(channel);
        self
    }
    pub fn with_base(mut self, base: DnaBase) -> Self {
        self.base = Some(base);
        self
    }
    pub fn with_surface(mut self, surface: u16) -> Self {
        self.surface = Some(surface);
        self
    }
    pub fn with_read(mut self, read: u16) -> Self {
        self.read = Some(read);
        self
    }
    pub fn with_cycle(mut self, cycle: u16) -> Self {
        self.cycle = Some(cycle);
        self
    }
    pub fn with_tile(mut self, tile: u32) -> Self {
        self.tile = Some(tile);
        self
    }
    pub fn with_swath(mut self, swath: u16) -> Self {
        self.swath = Some(swath);
        self
    }
    pub fn with_section(mut self, section: u16) -> Self {
        self.section = Some(section);
        self
    }

    /// Check that every dimension in `required` is pinned (not "all") and within range for
    /// `run_info`, then return the dimensions left free.
    pub fn validate(&self, required: &[Dimension], run_info: &RunInfo) -> Result<Vec<Dimension>> {
        for &dimension in required {
            if !self.is_set(dimension) {
                return Err(Error::InvalidFilterOption {
                    dimension: dimension.name(),
                    reason: "must be pinned for this projection, \"all\" is not supported".to_string(),
                });
            }
        }

        self.check_range(Dimension::Lane, self.lane, 1, run_info.layout.lane_count)?;
        self.check_range(Dimension::Swath, self.swath, 1, run_info.layout.swath_count)?;
        self.check_range(Dimension::Surface, self.surface, 1, run_info.layout.surface_count)?;
        self.check_range(Dimension::Section, self.section, 1, run_info.layout.sections_per_lane)?;
        self.check_range(Dimension::Channel, self.channel, 1, run_info.channels.len() as u16)?;
        if let Some(tile) = self.tile {
            let location = decode_tile_number(run_info.layout.naming_method, tile).map_err(|_| {
                Error::InvalidFilterOption {
                    dimension: "tile",
                    reason: format!(
                        "{tile} does not decode under the run's {:?} naming convention",
                        run_info.layout.naming_method
                    ),
                }
            })?;
            if location.surface == 0
                || location.surface > run_info.layout.surface_count as u32
                || location.swath == 0
                || location.swath > run_info.layout.swath_count as u32
            {
                return Err(Error::InvalidFilterOption {
                    dimension: "tile",
                    reason: format!("{tile} decodes to a surface/swath outside the flowcell layout"),
                });
            }
        }
        if let Some(cycle) = self.cycle {
            let total_cycles = run_info.total_cycles() as u16;
            if cycle == 0 || cycle > total_cycles {
                return Err(Error::InvalidFilterOption {
                    dimension: "cycle",
                    reason: format!("cycle {cycle} is out of range [1, {total_cycles}]"),
                });
            }
        }
        if let Some(read) = self.read {
            if !run_info.reads.iter().any(|r| r.number == read) {
                return Err(Error::InvalidFilterOption {
                    dimension: "read",
                    reason: format!("read {read} is not declared in RunInfo"),
                });
            }
        }

        Ok(ALL_DIMENSIONS.iter().copied().filter(|d| !self.is_set(*d)).collect())
    }

    fn is_set(&self, dimension: Dimension) -> bool {
        match dimension {
            Dimension::Lane => self.lane.is_some(),
            Dimension::Channel => self.channel.is_some(),
            Dimension::Base => self.base.is_some(),
            Dimension::Surface => self.surface.is_some(),
            Dimension::Read => self.read.is_some(),
            Dimension::Cycle => self.cycle.is_some(),
            Dimension::Tile => self.tile.is_some(),
            Dimension::Swath => self.swath.is_some(),
            Dimension::Section => self.section.is_some(),
        }
    }

    fn check_range(&self, dimension: Dimension, value: Option<u16>, min: u16, max: u16) -> Result<()> {
        if let Some(value) = value {
            if value < min || value > max {
                return Err(Error::InvalidFilterOption {
                    dimension: dimension.name(),
                    reason: format!("{value} is out of range [{min}, {max}]"),
                });
            }
        }
        Ok(())
    }
}

const ALL_DIMENSIONS: [Dimension; 9] = [
    Dimension::Lane,
    Dimension::Channel,
    Dimension::Base,
    Dimension::Surface,
    Dimension::Read,
    Dimension::Cycle,
    Dimension::Tile,
    Dimension::Swath,
    Dimension::Section,
];
