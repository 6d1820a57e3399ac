/// Record selection for the phytoplankton baseline service.
///
/// Submodules:
/// - `classifier`: maps a record to at most one tracked taxon group.
/// - `filter`: restricts the record stream to surface samples of the
///   configured parameter and splits it into the two populations.

pub mod classifier;
pub mod filter;
