//! The two named pipelines and the top-level run.
//!
//! Both pipelines end in the same population-agnostic steps (yearly
//! statistics, then window detection); they differ only in how records are
//! reduced before the yearly grouping:
//!
//! - full surface: per-visit totals over every taxon
//! - selected taxa: monthly group cells, excluding the synthesized "Selected"
//!   total

use std::collections::BTreeMap;

use crate::analysis::aggregation::{aggregate_grouped, visit_totals};
use crate::analysis::stability::{StabilityWindow, detect_window};
use crate::analysis::yearly::{YearlyStatistic, yearly_statistics};
use crate::config::{MeasurementParameter, PipelineConfig};
use crate::logging::{self, Stage};
use crate::model::{AggregatedCell, PipelineError, Population, SampleRecord, TaxonGroup};
use crate::selection::filter::{GroupedRecord, select};

/// Yearly statistics of one population and the window found in them.
///
/// A window failure does not invalidate the statistics, so it is kept as a
/// `Result` next to them.
#[derive(Debug)]
pub struct PopulationAnalysis {
    pub population: Population,
    pub yearly: Vec<YearlyStatistic>,
    pub window: Result<StabilityWindow, PipelineError>,
}

fn analyse<I>(population: Population, values: I) -> PopulationAnalysis
where
    I: IntoIterator<Item = (i32, f64)>,
{
    let yearly = yearly_statistics(population, values);
    let window = detect_window(population, &yearly);
    logging::log_window_outcome(population, &window);
    PopulationAnalysis {
        population,
        yearly,
        window,
    }
}

/// Full surface pipeline: per-visit sums over all taxa, straight into the
/// yearly statistics without a monthly mean.
pub fn full_surface_pipeline(records: &[&SampleRecord]) -> PopulationAnalysis {
    let totals = visit_totals(records);
    analyse(
        Population::FullSurface,
        totals.iter().map(|t| (t.year, t.biomass)),
    )
}

/// Selected taxa pipeline: the Aggregated Cell table, and yearly statistics
/// over its per-group cells.
pub fn selected_taxa_pipeline(
    grouped: &[GroupedRecord<'_>],
) -> (Vec<AggregatedCell>, PopulationAnalysis) {
    let cells = aggregate_grouped(grouped);
    let analysis = analyse(
        Population::SelectedTaxa,
        cells
            .iter()
            .filter(|c| !c.taxa.is_selected())
            .map(|c| (c.year, c.biomass)),
    );
    (cells, analysis)
}

/// Everything a run hands to the downstream collaborators.
#[derive(Debug)]
pub struct BaselineReport {
    pub parameter: MeasurementParameter,
    /// Unit of the grouped population.
    pub unit: String,
    /// Passed through untouched for the indicator calculation.
    pub test_years: Vec<i32>,
    pub reference_years: Vec<i32>,
    pub group_counts: BTreeMap<TaxonGroup, usize>,
    /// Aggregated Cell table, sorted by date.
    pub cells: Vec<AggregatedCell>,
    pub full: PopulationAnalysis,
    pub selected: PopulationAnalysis,
}

/// Runs selection, both pipelines and window detection.
///
/// Fails only when selection fails. Window failures (for instance fewer than
/// five distinct years) are reported inside the returned analyses so the
/// aggregated table is still available.
pub fn run(records: &[SampleRecord], config: &PipelineConfig) -> Result<BaselineReport, PipelineError> {
    logging::info(
        Stage::System,
        None,
        &format!(
            "Running baseline for {} on {} record(s), groups: {}",
            config.parameter(),
            records.len(),
            config
                .groups()
                .enabled_groups()
                .iter()
                .map(|g| g.label())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    );

    let selection = select(records, config)?;
    let full = full_surface_pipeline(&selection.full);
    let (cells, selected) = selected_taxa_pipeline(&selection.grouped);

    Ok(BaselineReport {
        parameter: config.parameter(),
        unit: selection.unit().to_string(),
        test_years: config.test_years().to_vec(),
        reference_years: config.reference_years().to_vec(),
        group_counts: selection.group_counts(),
        cells,
        full,
        selected,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroupToggles;
    use crate::model::{CellTaxa, TrophicType};
    use chrono::NaiveDate;

    fn record(year: i32, month: u32, day: u32, phylum: &str, value: f64) -> SampleRecord {
        SampleRecord {
            year,
            station: "ANHOLT E".to_string(),
            date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            phylum: phylum.to_string(),
            class: String::new(),
            order: String::new(),
            family: String::new(),
            genus: String::new(),
            species: String::new(),
            trophic_type: TrophicType::Autotrophic,
            depth_min: 0.0,
            parameter: "Abundance".to_string(),
            value,
            unit: "ind/l".to_string(),
        }
    }

    fn config() -> PipelineConfig {
        PipelineConfig::new(MeasurementParameter::Abundance, GroupToggles::all())
            .unwrap()
            .with_indicator_years(vec![2020], vec![2015, 2016])
    }

    #[test]
    fn test_full_path_uses_visits_and_selected_path_uses_months() {
        // Two May visits: the full path sees two values, the selected path
        // sees a single monthly mean, so only the full path has an sd.
        let records = vec![
            record(2010, 5, 3, "Bacillariophyta", 2.0),
            record(2010, 5, 24, "Bacillariophyta", 4.0),
        ];
        let report = run(&records, &config()).unwrap();

        assert_eq!(report.full.yearly.len(), 1);
        assert_eq!(report.full.yearly[0].count, 2);
        assert!(report.full.yearly[0].sd.is_some());

        assert_eq!(report.selected.yearly[0].count, 1);
        assert_eq!(report.selected.yearly[0].sd, None);
        assert!((report.selected.yearly[0].mean - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_selected_cells_are_excluded_from_grouped_statistics() {
        let records = vec![
            record(2010, 5, 3, "Bacillariophyta", 2.0),
            record(2010, 5, 3, "Cyanobacteria", 6.0),
        ];
        let report = run(&records, &config()).unwrap();
        assert_eq!(report.cells.len(), 3);
        assert!(report.cells.iter().any(|c| c.taxa == CellTaxa::Selected));
        assert_eq!(report.selected.yearly[0].count, 2, "two group cells, no Selected");
        assert!((report.selected.yearly[0].mean - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_record_still_returns_cells() {
        let records = vec![
            record(2010, 5, 3, "Bacillariophyta", 2.0),
            record(2011, 5, 3, "Bacillariophyta", 2.0),
        ];
        let report = run(&records, &config()).unwrap();
        assert_eq!(report.cells.len(), 4);
        assert!(matches!(
            report.full.window,
            Err(PipelineError::InsufficientYears { found: 2, .. })
        ));
        assert!(report.selected.window.is_err());
    }

    #[test]
    fn test_report_carries_configuration_pass_through() {
        let records = vec![record(2010, 5, 3, "Bacillariophyta", 2.0)];
        let report = run(&records, &config()).unwrap();
        assert_eq!(report.unit, "ind/l");
        assert_eq!(report.test_years, vec![2020]);
        assert_eq!(report.reference_years, vec![2015, 2016]);
        assert_eq!(report.group_counts.get(&TaxonGroup::Diatoms), Some(&1));
        assert_eq!(report.parameter, MeasurementParameter::Abundance);
    }

    #[test]
    fn test_selection_failure_aborts_run() {
        let records = vec![record(2010, 5, 3, "Chlorophyta", 2.0)];
        let err = run(&records, &config()).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyPopulation { .. }));
    }
}
