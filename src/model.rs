//! Core data types for the phytoplankton baseline service.
//!
//! This module defines the shared domain model imported by all other modules.
//! It contains no logic beyond small accessors and label conversions, and no
//! I/O: only types and the error enums every stage returns.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Sampling constants
// ---------------------------------------------------------------------------

/// Minimum sampling depth (metres) that marks a surface sample.
pub const SURFACE_DEPTH_M: f64 = 0.0;

/// Width of the centered moving average, in distinct years.
pub const ROLLING_WINDOW_YEARS: usize = 5;

/// Distance from the center year to either edge of a stability window.
pub const ROLLING_RADIUS: usize = ROLLING_WINDOW_YEARS / 2;

// ---------------------------------------------------------------------------
// Sample records
// ---------------------------------------------------------------------------

/// Energy-acquisition mode reported for a taxon.
///
/// Monitoring exports use short codes (`AU`, `MX`, `HT`, `NS`); the full
/// English words are accepted too. Anything else is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum TrophicType {
    Autotrophic,
    Mixotrophic,
    Heterotrophic,
    NotSpecified,
    Other(String),
}

impl TrophicType {
    /// Dinoflagellates only count toward the grouped population when they
    /// photosynthesise.
    pub fn is_photosynthetic(&self) -> bool {
        matches!(self, TrophicType::Autotrophic | TrophicType::Mixotrophic)
    }
}

impl From<String> for TrophicType {
    fn from(code: String) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "au" | "autotrophic" => TrophicType::Autotrophic,
            "mx" | "mixotrophic" => TrophicType::Mixotrophic,
            "ht" | "heterotrophic" => TrophicType::Heterotrophic,
            "ns" | "" | "not specified" => TrophicType::NotSpecified,
            _ => TrophicType::Other(code),
        }
    }
}

impl From<&str> for TrophicType {
    fn from(code: &str) -> Self {
        TrophicType::from(code.to_string())
    }
}

/// A single measured value for one taxon on one sampling visit.
///
/// Corresponds to one row of a monitoring export after ingestion. Records are
/// immutable once produced; every stage borrows them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SampleRecord {
    pub year: i32,
    pub station: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub phylum: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub order: String,
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub genus: String,
    /// Scientific name at species level, e.g. "Mesodinium rubrum".
    #[serde(default)]
    pub species: String,
    pub trophic_type: TrophicType,
    pub depth_min: f64,
    /// Measurement parameter label, e.g. "Carbon concentration".
    pub parameter: String,
    pub value: f64,
    pub unit: String,
}

impl SampleRecord {
    /// Calendar month (1–12) of the sampling date.
    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn is_surface(&self) -> bool {
        self.depth_min == SURFACE_DEPTH_M
    }
}

// ---------------------------------------------------------------------------
// Taxon groups
// ---------------------------------------------------------------------------

/// The phytoplankton groups this pipeline can track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaxonGroup {
    Diatoms,
    Dinoflagellates,
    Cyanobacteria,
    MesodiniumRubrum,
}

impl TaxonGroup {
    pub const ALL: [TaxonGroup; 4] = [
        TaxonGroup::Diatoms,
        TaxonGroup::Dinoflagellates,
        TaxonGroup::Cyanobacteria,
        TaxonGroup::MesodiniumRubrum,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TaxonGroup::Diatoms => "Diatoms",
            TaxonGroup::Dinoflagellates => "Dinoflagellates",
            TaxonGroup::Cyanobacteria => "Cyanobacteria",
            TaxonGroup::MesodiniumRubrum => "Mesodinium rubrum",
        }
    }
}

impl fmt::Display for TaxonGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label of an aggregated cell: either one tracked group or the synthesized
/// "Selected" total across every enabled group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CellTaxa {
    Group(TaxonGroup),
    Selected,
}

impl CellTaxa {
    pub fn is_selected(&self) -> bool {
        matches!(self, CellTaxa::Selected)
    }
}

impl fmt::Display for CellTaxa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellTaxa::Group(group) => f.write_str(group.label()),
            CellTaxa::Selected => f.write_str("Selected"),
        }
    }
}

impl Serialize for CellTaxa {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Aggregated output
// ---------------------------------------------------------------------------

/// Per-visit biomass: all values of one population summed for a single
/// `(year, station, date)` sampling visit.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTotal {
    pub year: i32,
    pub station: String,
    pub date: NaiveDate,
    pub biomass: f64,
}

/// One station/year/month/taxa summary value.
///
/// `date` is the earliest visit date that fell in the station-month, so the
/// table can be ordered chronologically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedCell {
    pub station: String,
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub taxa: CellTaxa,
    pub biomass: f64,
}

/// Which of the two populations a statistic or error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Population {
    /// Every surface record of the configured parameter, regardless of taxon.
    FullSurface,
    /// Surface records that fall in one of the enabled taxon groups.
    SelectedTaxa,
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Population::FullSurface => write!(f, "full surface"),
            Population::SelectedTaxa => write!(f, "selected taxa"),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Problems with the pipeline configuration. Always fatal, raised before any
/// record is touched.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Every taxon group toggle is off, so the grouped population is empty
    /// by construction.
    #[error("no taxon group is enabled; enable at least one of diatoms, dinoflagellates, cyanobacteria, mesodinium_rubrum")]
    NoGroupsEnabled,

    #[error("unsupported measurement parameter \"{0}\"; expected Abundance, Carbon concentration or Biovolume concentration")]
    UnsupportedParameter(String),

    #[error("cannot read config file {path}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Errors that can arise while selecting, aggregating or analysing records.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The filter left nothing to aggregate; the unit label and every
    /// downstream statistic would be undefined.
    #[error("{population} population is empty for parameter \"{parameter}\" at surface depth")]
    EmptyPopulation {
        population: Population,
        parameter: String,
    },

    #[error("{population} population spans {found} distinct year(s); a stability window needs at least {required}")]
    InsufficientYears {
        population: Population,
        found: usize,
        required: usize,
    },

    /// Enough years exist, but every smoothed standard deviation is missing
    /// because too many years had fewer than two values.
    #[error("{population} population has no defined rolling standard deviation across {years} year(s)")]
    UndefinedRollingDeviation { population: Population, years: usize },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
