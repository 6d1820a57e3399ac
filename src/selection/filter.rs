//! Surface/parameter filtering and population split.

use std::collections::BTreeMap;

use crate::config::PipelineConfig;
use crate::logging::{self, Stage};
use crate::model::{PipelineError, Population, SampleRecord, TaxonGroup};
use crate::selection::classifier::classify;

/// A record of the grouped population together with its classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupedRecord<'a> {
    pub record: &'a SampleRecord,
    pub group: TaxonGroup,
}

/// The two populations a run works on.
///
/// `grouped` is always a subset of `full`; both borrow from the caller's
/// record slice.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub full: Vec<&'a SampleRecord>,
    pub grouped: Vec<GroupedRecord<'a>>,
}

impl<'a> Selection<'a> {
    /// Unit label of the grouped population, taken from its first record.
    ///
    /// Units are assumed uniform; use [`Selection::distinct_units`] to check.
    pub fn unit(&self) -> &'a str {
        self.grouped
            .first()
            .map(|g| g.record.unit.as_str())
            .unwrap_or("")
    }

    /// Every unit label seen in the grouped population, sorted.
    pub fn distinct_units(&self) -> Vec<&'a str> {
        let mut units: Vec<&str> = self.grouped.iter().map(|g| g.record.unit.as_str()).collect();
        units.sort_unstable();
        units.dedup();
        units
    }

    /// Number of grouped records per taxon group.
    pub fn group_counts(&self) -> BTreeMap<TaxonGroup, usize> {
        let mut counts = BTreeMap::new();
        for g in &self.grouped {
            *counts.entry(g.group).or_insert(0) += 1;
        }
        counts
    }
}

/// Splits a record stream into the full surface population and the grouped
/// population.
///
/// Fails with `EmptyPopulation` if either population is empty, since the
/// unit label and every downstream statistic would be undefined.
pub fn select<'a>(
    records: &'a [SampleRecord],
    config: &PipelineConfig,
) -> Result<Selection<'a>, PipelineError> {
    let parameter = config.parameter();

    let full: Vec<&SampleRecord> = records
        .iter()
        .filter(|r| r.is_surface() && parameter.matches(&r.parameter))
        .collect();

    let grouped: Vec<GroupedRecord> = full
        .iter()
        .filter_map(|r| {
            classify(r, config.groups()).map(|group| GroupedRecord { record: *r, group })
        })
        .collect();

    logging::log_selection_summary(records.len(), full.len(), grouped.len());

    if full.is_empty() {
        return Err(PipelineError::EmptyPopulation {
            population: Population::FullSurface,
            parameter: parameter.label().to_string(),
        });
    }
    if grouped.is_empty() {
        return Err(PipelineError::EmptyPopulation {
            population: Population::SelectedTaxa,
            parameter: parameter.label().to_string(),
        });
    }

    let selection = Selection { full, grouped };

    let units = selection.distinct_units();
    if units.len() > 1 {
        logging::warn(
            Stage::Filter,
            None,
            &format!("mixed units in grouped population: {}", units.join(", ")),
        );
    }
    for (group, count) in selection.group_counts() {
        logging::debug(Stage::Classifier, None, &format!("{}: {} record(s)", group, count));
    }

    Ok(selection)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
