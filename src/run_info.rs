//! The run descriptor loader (C5): `RunInfo.xml` and `RunParameters.xml`.
//!
//! `RunInfo.xml` has a fixed, well-documented schema and is parsed with `serde` through
//! `quick-xml`'s deserializer. `RunParameters.xml` varies wildly across instrument generations
//! (Illumina has shipped a different root element for nearly every platform) and this loader
//! only ever needs two facts out of it, so it is scanned event-by-event instead of being bound
//! to a fixed struct.
//!
//! Both loaders accept already-read XML text, not a path — path resolution and the
//! primary/secondary filename fallback belong to the facade (C6).

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

use crate::enums::{InstrumentType, TileNamingMethod};
use crate::error::{Error, Result};

const RUN_INFO_FILE: &str = "RunInfo.xml";
const RUN_PARAMETERS_FILE: &str = "RunParameters.xml";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadDescriptor {
    pub number: u16,
    pub num_cycles: u16,
    pub is_indexed: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowcellLayout {
    pub lane_count: u16,
    pub surface_count: u16,
    pub swath_count: u16,
    pub tile_count: u16,
    pub sections_per_lane: u16,
    pub naming_method: TileNamingMethod,
    pub barcode: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunInfo {
    pub version: u32,
    pub layout: FlowcellLayout,
    pub reads: Vec<ReadDescriptor>,
    pub channels: Vec<String>,
}

impl RunInfo {
    /// Parse already-read `RunInfo.xml` text.
    pub fn parse(xml: &str) -> Result<Self> {
        let raw: RawRunInfo = quick_xml::de::from_str(xml).map_err(|error| xml_error(RUN_INFO_FILE, error))?;
        raw.into_run_info()
    }

    /// Verify read cycles partition `[1, total_cycles]` without gaps, per §3.4. Each read's
    /// cycle range is implicit and contiguous (a read's span starts where the previous one
    /// ended), so the only way this can fail is a zero-length read.
    pub fn validate(&self) -> Result<()> {
        for read in &self.reads {
            if read.num_cycles == 0 {
                return Err(Error::invalid(format!("read {} has zero cycles", read.number)));
            }
        }
        Ok(())
    }

    /// Total cycles across every read, i.e. the exclusive upper bound of the cycle partition.
    pub fn total_cycles(&self) -> u32 {
        self.reads.iter().map(|r| r.num_cycles as u32).sum()
    }

    /// Which declared read a 1-indexed cycle falls under, per the contiguous partition `validate`
    /// checks (§3.4). Reads are consumed in declaration order, so the first read whose running
    /// cycle count reaches `cycle` is the answer.
    pub fn read_for_cycle(&self, cycle: u16) -> Option<ReadDescriptor> {
        let mut start = 1u16;
        for &read in &self.reads {
            let end = start.checked_add(read.num_cycles)?.checked_sub(1)?;
            if cycle >= start && cycle <= end {
                return Some(read);
            }
            start = end.checked_add(1)?;
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunParameters {
    pub version: u32,
    pub instrument: InstrumentType,
}

impl RunParameters {
    /// Scan already-read `RunParameters.xml` text for an application name and the
    /// multiple-surfaces flag, per §4.3. Tolerant of the root-element and tag-name variance
    /// across instrument generations: the first `ApplicationName`-shaped element wins.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut application_name = None;
        let mut multiple_surfaces = false;
        let mut version = 0u32;
        let mut current_tag = String::new();

        loop {
            match reader.read_event().map_err(|error| xml_error(RUN_PARAMETERS_FILE, error.into()))? {
                Event::Eof => break,
                Event::Start(tag) | Event::Empty(tag) => {
                    current_tag = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
                }
                Event::Text(text) => {
                    let value = text.unescape().map_err(|error| xml_error(RUN_PARAMETERS_FILE, error.into()))?;
                    match current_tag.as_str() {
                        "ApplicationName" | "Application" if application_name.is_none() => {
                            application_name = Some(value.into_owned());
                        }
                        "ApplicationVersion" => {
                            version = value.trim().parse().unwrap_or(0);
                        }
                        "SupportMultipleSurfacesInUI" | "SupportsMultipleSurfaces" => {
                            multiple_surfaces = value.trim().eq_ignore_ascii_case("true");
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        let application_name = application_name.ok_or_else(|| Error::MissingRequiredElement {
            xml_path: RUN_PARAMETERS_FILE.to_string(),
            element: "ApplicationName".to_string(),
        })?;

        Ok(RunParameters { version, instrument: InstrumentType::classify(&application_name, multiple_surfaces) })
    }
}

fn xml_error(file: &str, error: quick_xml::DeError) -> Error {
    Error::MalformedXml { file: file.to_string(), line: 0, column: 0, message: error.to_string() }
}

#[derive(Debug, Deserialize)]
#[serde(rename = "RunInfo")]
struct RawRunInfo {
    #[serde(rename = "Run")]
    run: RawRun,
}

#[derive(Debug, Deserialize)]
struct RawRun {
    #[serde(rename = "Reads")]
    reads: RawReads,
    #[serde(rename = "FlowcellLayout")]
    flowcell_layout: RawFlowcellLayout,
    #[serde(rename = "ImageChannels", default)]
    image_channels: Option<RawImageChannels>,
}

#[derive(Debug, Deserialize)]
struct RawReads {
    #[serde(rename = "Read", default)]
    read: Vec<RawRead>,
}

#[derive(Debug, Deserialize)]
struct RawRead {
    #[serde(rename = "@Number")]
    number: u16,
    #[serde(rename = "@NumCycles")]
    num_cycles: u16,
    #[serde(rename = "@IsIndexedRead")]
    is_indexed_read: String,
}

#[derive(Debug, Deserialize)]
struct RawFlowcellLayout {
    #[serde(rename = "@LaneCount")]
    lane_count: u16,
    #[serde(rename = "@SurfaceCount")]
    surface_count: u16,
    #[serde(rename = "@SwathCount")]
    swath_count: u16,
    #[serde(rename = "@TileCount")]
    tile_count: u16,
    #[serde(rename = "@SectionPerLane", default)]
    section_per_lane: Option<u16>,
    #[serde(rename = "@TileNamingConvention", default)]
    tile_naming_convention: Option<String>,
    #[serde(rename = "FlowcellBarcode", default)]
    flowcell_barcode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawImageChannels {
    #[serde(rename = "Name", default)]
    name: Vec<String>,
}

impl RawRunInfo {
    fn into_run_info(self) -> Result<RunInfo> {
        let run = self.run;

        let naming_method = match run.flowcell_layout.tile_naming_convention.as_deref() {
            Some("FourDigit") => TileNamingMethod::FourDigit,
            Some("FiveDigit") => TileNamingMethod::FiveDigit,
            Some("Absolute") => TileNamingMethod::Absolute,
            Some(other) => {
                return Err(Error::InvalidTilingMethod(format!("unknown naming convention `{other}`")))
            }
            None => TileNamingMethod::FourDigit,
        };

        let layout = FlowcellLayout {
            lane_count: run.flowcell_layout.lane_count,
            surface_count: run.flowcell_layout.surface_count,
            swath_count: run.flowcell_layout.swath_count,
            tile_count: run.flowcell_layout.tile_count,
            sections_per_lane: run.flowcell_layout.section_per_lane.unwrap_or(1),
            naming_method,
            barcode: run.flowcell_layout.flowcell_barcode.unwrap_or_default(),
        };

        let reads = run
            .reads
            .read
            .into_iter()
            .map(|r| ReadDescriptor {
                number: r.number,
                num_cycles: r.num_cycles,
                is_indexed: r.is_indexed_read.eq_ignore_ascii_case("y") || r.is_indexed_read.eq_ignore_ascii_case("true"),
            })
            .collect();

        let channels = run.image_channels.map(|c| c.name).unwrap_or_default();

        Ok(RunInfo { version: 0, layout, reads, channels })
    }
}
