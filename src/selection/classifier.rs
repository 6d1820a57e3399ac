//! Taxon classification.
//!
//! Classification is a pure function of a record's taxonomic fields, its
//! trophic type and the enabled-group toggles. A disabled group's rule never
//! fires, so its records drop out of the grouped population while staying in
//! the full surface population.

use crate::config::GroupToggles;
use crate::model::{SampleRecord, TaxonGroup};
use crate::taxa::{MatchRank, TAXON_REGISTRY, TaxonDefinition};

/// Returns the group a record belongs to, or `None` if it falls outside every
/// enabled group.
///
/// Rules are evaluated in registry precedence: diatoms, cyanobacteria,
/// Mesodinium rubrum (species match), then dinoflagellates restricted to
/// autotrophic and mixotrophic records. The first matching enabled rule wins.
pub fn classify(record: &SampleRecord, toggles: &GroupToggles) -> Option<TaxonGroup> {
    TAXON_REGISTRY
        .iter()
        .filter(|def| toggles.is_enabled(def.group))
        .find(|def| rule_matches(def, record))
        .map(|def| def.group)
}

fn rule_matches(def: &TaxonDefinition, record: &SampleRecord) -> bool {
    let matched = match def.rank {
        MatchRank::Phylum => record.phylum.trim().eq_ignore_ascii_case(def.match_name),
        MatchRank::Species => record.species.trim() == def.match_name,
    };
    if !matched {
        return false;
    }
    !def.photosynthetic_only || record.trophic_type.is_photosynthetic()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
