//! Taxon registry for the phytoplankton baseline service.
//!
//! Defines the canonical list of taxon groups tracked by this service, the
//! taxonomic rank each one is matched on, and the exact name that identifies
//! it in a monitoring export. This is the single source of truth for taxon
//! names: the classifier looks groups up here rather than hardcoding them.

use crate::model::TaxonGroup;

// ---------------------------------------------------------------------------
// Match ranks
// ---------------------------------------------------------------------------

/// The taxonomic field a group definition is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRank {
    Phylum,
    Species,
}

// ---------------------------------------------------------------------------
// Group metadata
// ---------------------------------------------------------------------------

/// Metadata for a single tracked taxon group.
pub struct TaxonDefinition {
    pub group: TaxonGroup,
    /// Which rank of a record is compared with `match_name`.
    pub rank: MatchRank,
    /// Name as it appears in the export. Phylum names compare
    /// case-insensitively; species names must match exactly.
    pub match_name: &'static str,
    /// Whether only autotrophic and mixotrophic records count.
    pub photosynthetic_only: bool,
    /// Human-readable note on why the group is tracked.
    pub description: &'static str,
}

/// All tracked groups, in classifier precedence order.
///
/// The phyla are disjoint, so at most one phylum rule can fire for a record;
/// the species rule sits ahead of dinoflagellates so a ciliate species name
/// never falls through to a phylum comparison.
pub static TAXON_REGISTRY: &[TaxonDefinition] = &[
    TaxonDefinition {
        group: TaxonGroup::Diatoms,
        rank: MatchRank::Phylum,
        match_name: "Bacillariophyta",
        photosynthetic_only: false,
        description: "Spring bloom formers; dominate biomass in most coastal stations.",
    },
    TaxonDefinition {
        group: TaxonGroup::Cyanobacteria,
        rank: MatchRank::Phylum,
        match_name: "Cyanobacteria",
        photosynthetic_only: false,
        description: "Summer bloom formers in brackish waters.",
    },
    TaxonDefinition {
        group: TaxonGroup::MesodiniumRubrum,
        rank: MatchRank::Species,
        match_name: "Mesodinium rubrum",
        photosynthetic_only: false,
        description: "Phototrophic ciliate with kleptoplasts; counted as \
                      phytoplankton biomass despite belonging to Ciliophora.",
    },
    TaxonDefinition {
        group: TaxonGroup::Dinoflagellates,
        rank: MatchRank::Phylum,
        match_name: "Dinoflagellata",
        photosynthetic_only: true,
        description: "Only autotrophic and mixotrophic taxa; heterotrophic \
                      dinoflagellates are grazers, not primary producers.",
    },
];

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
