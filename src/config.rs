//! Pipeline configuration.
//!
//! A `PipelineConfig` is an immutable value handed to every stage. It is
//! built either in code with [`PipelineConfig::new`] or from a TOML file, and
//! is always validated on construction: an invalid parameter label or a
//! configuration with every taxon group switched off never reaches the
//! record stream.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;
use crate::model::{ConfigError, TaxonGroup};

// ---------------------------------------------------------------------------
// Measurement parameter
// ---------------------------------------------------------------------------

/// The measured quantity a run aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MeasurementParameter {
    #[serde(rename = "Abundance")]
    Abundance,
    #[serde(rename = "Carbon concentration")]
    CarbonConcentration,
    #[serde(rename = "Biovolume concentration")]
    BiovolumeConcentration,
}

impl MeasurementParameter {
    /// Label used for the parameter column of a monitoring export.
    pub fn label(&self) -> &'static str {
        match self {
            MeasurementParameter::Abundance => "Abundance",
            MeasurementParameter::CarbonConcentration => "Carbon concentration",
            MeasurementParameter::BiovolumeConcentration => "Biovolume concentration",
        }
    }

    /// Whether a record's parameter column names this parameter.
    pub fn matches(&self, label: &str) -> bool {
        label.trim().eq_ignore_ascii_case(self.label())
    }
}

impl fmt::Display for MeasurementParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MeasurementParameter {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "abundance" => Ok(MeasurementParameter::Abundance),
            "carbon concentration" => Ok(MeasurementParameter::CarbonConcentration),
            "biovolume concentration" => Ok(MeasurementParameter::BiovolumeConcentration),
            _ => Err(ConfigError::UnsupportedParameter(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Group toggles
// ---------------------------------------------------------------------------

/// Which taxon groups contribute to the grouped population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupToggles {
    pub include_diatoms: bool,
    pub include_dinoflagellates: bool,
    pub include_cyanobacteria: bool,
    pub include_mesodinium_rubrum: bool,
}

impl Default for GroupToggles {
    fn default() -> Self {
        Self::all()
    }
}

impl GroupToggles {
    pub fn all() -> Self {
        Self {
            include_diatoms: true,
            include_dinoflagellates: true,
            include_cyanobacteria: true,
            include_mesodinium_rubrum: true,
        }
    }

    pub fn none() -> Self {
        Self {
            include_diatoms: false,
            include_dinoflagellates: false,
            include_cyanobacteria: false,
            include_mesodinium_rubrum: false,
        }
    }

    /// Returns a copy with one group switched on or off.
    pub fn with(mut self, group: TaxonGroup, enabled: bool) -> Self {
        match group {
            TaxonGroup::Diatoms => self.include_diatoms = enabled,
            TaxonGroup::Dinoflagellates => self.include_dinoflagellates = enabled,
            TaxonGroup::Cyanobacteria => self.include_cyanobacteria = enabled,
            TaxonGroup::MesodiniumRubrum => self.include_mesodinium_rubrum = enabled,
        }
        self
    }

    pub fn is_enabled(&self, group: TaxonGroup) -> bool {
        match group {
            TaxonGroup::Diatoms => self.include_diatoms,
            TaxonGroup::Dinoflagellates => self.include_dinoflagellates,
            TaxonGroup::Cyanobacteria => self.include_cyanobacteria,
            TaxonGroup::MesodiniumRubrum => self.include_mesodinium_rubrum,
        }
    }

    pub fn enabled_groups(&self) -> Vec<TaxonGroup> {
        TaxonGroup::ALL
            .into_iter()
            .filter(|g| self.is_enabled(*g))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Logging options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    pub level: LogLevel,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
            timestamps: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline configuration
// ---------------------------------------------------------------------------

/// File shape of the TOML configuration, before validation.
#[derive(Debug, Deserialize)]
struct RawConfig {
    measurement_parameter: String,
    #[serde(default)]
    groups: GroupToggles,
    #[serde(default)]
    test_years: Vec<i32>,
    #[serde(default)]
    reference_years: Vec<i32>,
    #[serde(default)]
    logging: LoggingOptions,
}

/// Validated, immutable run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    parameter: MeasurementParameter,
    groups: GroupToggles,
    test_years: Vec<i32>,
    reference_years: Vec<i32>,
    logging: LoggingOptions,
}

impl PipelineConfig {
    /// Builds a configuration in code.
    ///
    /// Returns `ConfigError::NoGroupsEnabled` if every toggle is off.
    pub fn new(parameter: MeasurementParameter, groups: GroupToggles) -> Result<Self, ConfigError> {
        if groups.enabled_groups().is_empty() {
            return Err(ConfigError::NoGroupsEnabled);
        }
        Ok(Self {
            parameter,
            groups,
            test_years: Vec::new(),
            reference_years: Vec::new(),
            logging: LoggingOptions::default(),
        })
    }

    /// Attaches the year sets consumed by the downstream indicator.
    pub fn with_indicator_years(mut self, test_years: Vec<i32>, reference_years: Vec<i32>) -> Self {
        self.test_years = test_years;
        self.reference_years = reference_years;
        self
    }

    /// Parses and validates a TOML document.
    ///
    /// `origin` names the source in error messages (usually the file path).
    pub fn from_toml_str(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            source: e,
        })?;
        let parameter = raw.measurement_parameter.parse()?;
        let mut config = Self::new(parameter, raw.groups)?
            .with_indicator_years(raw.test_years, raw.reference_years);
        config.logging = raw.logging;
        Ok(config)
    }

    /// Reads and validates a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let origin = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: origin.clone(),
            source: e,
        })?;
        Self::from_toml_str(&contents, &origin)
    }

    pub fn parameter(&self) -> MeasurementParameter {
        self.parameter
    }

    pub fn groups(&self) -> &GroupToggles {
        &self.groups
    }

    pub fn test_years(&self) -> &[i32] {
        &self.test_years
    }

    pub fn reference_years(&self) -> &[i32] {
        &self.reference_years
    }

    pub fn logging(&self) -> &LoggingOptions {
        &self.logging
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
