//! Structured logging for the phytoplankton baseline service
//!
//! Provides stage-tagged logging with station identifiers, timestamps, and
//! severity levels on top of `tracing`. Supports console output and an
//! append-mode log file for batch runs.

use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;

use serde::Deserialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt as tracing_fmt};

use crate::analysis::stability::StabilityWindow;
use crate::model::{PipelineError, Population};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warning")]
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Classifier,
    Filter,
    Aggregation,
    Statistics,
    Window,
    Table,
    System,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Classifier => write!(f, "CLASSIFY"),
            Stage::Filter => write!(f, "FILTER"),
            Stage::Aggregation => write!(f, "AGG"),
            Stage::Statistics => write!(f, "STATS"),
            Stage::Window => write!(f, "WINDOW"),
            Stage::Table => write!(f, "TABLE"),
            Stage::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `min_level` when set. Fails if the log
/// file cannot be opened or a global subscriber is already installed.
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&str>,
    console_timestamps: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(min_level.as_directive()));

    let console: Box<dyn Layer<Registry> + Send + Sync> = if console_timestamps {
        tracing_fmt::layer().with_target(false).boxed()
    } else {
        tracing_fmt::layer().with_target(false).without_time().boxed()
    };

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .with(filter)
        .try_init()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Log a general informational message
pub fn info(stage: Stage, station: Option<&str>, message: &str) {
    tracing::info!(stage = %stage, station = station.unwrap_or("-"), "{}", message);
}

/// Log a warning message
pub fn warn(stage: Stage, station: Option<&str>, message: &str) {
    tracing::warn!(stage = %stage, station = station.unwrap_or("-"), "{}", message);
}

/// Log an error message
pub fn error(stage: Stage, station: Option<&str>, message: &str) {
    tracing::error!(stage = %stage, station = station.unwrap_or("-"), "{}", message);
}

/// Log a debug message
pub fn debug(stage: Stage, station: Option<&str>, message: &str) {
    tracing::debug!(stage = %stage, station = station.unwrap_or("-"), "{}", message);
}

// ---------------------------------------------------------------------------
// Summary Logging
// ---------------------------------------------------------------------------

/// Log how many records survived the surface/parameter filter and the
/// taxon classifier.
pub fn log_selection_summary(total: usize, surface: usize, grouped: usize) {
    let message = format!(
        "Selection complete: {} surface / {} total records, {} in enabled groups",
        surface, total, grouped
    );

    if grouped == 0 || surface == 0 {
        error(Stage::Filter, None, &message);
    } else {
        info(Stage::Filter, None, &message);
    }
}

/// Log a year whose standard deviation is undefined.
pub fn log_missing_statistic(population: Population, year: i32, samples: usize) {
    let message = format!(
        "{}: year {} has {} value(s); standard deviation left missing",
        population, year, samples
    );
    warn(Stage::Statistics, None, &message);
}

/// Log the outcome of a window search.
pub fn log_window_outcome(population: Population, outcome: &Result<StabilityWindow, PipelineError>) {
    match outcome {
        Ok(window) => info(
            Stage::Window,
            None,
            &format!(
                "{}: most stable period {}-{} (rolling sd {:.3})",
                population, window.start_year, window.end_year, window.rolling_sd
            ),
        ),
        Err(e) => error(
            Stage::Window,
            None,
            &format!("{}: no stability window [{}]", population, e),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_log_level_deserializes_from_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            level: LogLevel,
        }
        let w: Wrapper = toml::from_str("level = \"warning\"").unwrap();
        assert_eq!(w.level, LogLevel::Warn);
        let w: Wrapper = toml::from_str("level = \"debug\"").unwrap();
        assert_eq!(w.level, LogLevel::Debug);
        assert_eq!(w.level.as_directive(), "debug");
    }

    #[test]
    fn test_stage_tags() {
        assert_eq!(Stage::Aggregation.to_string(), "AGG");
        assert_eq!(Stage::Window.to_string(), "WINDOW");
    }

    #[test]
    fn test_helpers_do_not_require_a_subscriber() {
        // Without an installed subscriber the events are simply dropped.
        info(Stage::System, Some("BY31"), "no subscriber");
        log_missing_statistic(Population::FullSurface, 2004, 1);
        log_selection_summary(10, 8, 0);
    }
}
