/// Aggregation and statistics for the phytoplankton baseline service.
///
/// Submodules:
/// - `aggregation`: collapses irregular visits into per-visit totals and
///   station/year/month cells, including the synthesized "Selected" group.
/// - `yearly`: per-year mean and sample standard deviation, smoothed with a
///   centered moving average.
/// - `stability`: locates the five-year window of minimal smoothed
///   variability.

pub mod aggregation;
pub mod stability;
pub mod yearly;
