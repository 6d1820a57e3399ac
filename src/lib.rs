//! Phytoplankton baseline service.
//!
//! Aggregates irregular phytoplankton biomass samples into per-station,
//! per-month, per-taxon-group cells, and locates the five-year period in which
//! yearly biomass variability was lowest. Two independent windows are
//! produced: one from every surface sample, one from the selected taxon
//! groups only.
//!
//! Modules:
//! - `model`: shared types and errors.
//! - `taxa`: registry of tracked taxon groups.
//! - `config`: immutable run configuration (TOML or in code).
//! - `selection`: taxon classification and surface/parameter filtering.
//! - `analysis`: aggregation, yearly statistics, window detection.
//! - `pipeline`: the two named pipelines and the top-level `run`.
//! - `table`: CSV/JSON interface to the ingestion and output collaborators.
//! - `logging`: stage-tagged structured logging.

pub mod analysis;
pub mod config;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod selection;
pub mod table;
pub mod taxa;
