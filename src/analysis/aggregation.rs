//! Grouped reduction of sample records.
//!
//! The grouped path rolls up in a fixed order:
//!   1. sum per `(year, station, date, group)`: one biomass per group per visit
//!   2. synthesize "Selected" per `(year, station, date)` as the sum over groups
//!   3. mean per `(station, year, month, taxa)` across the visits of a month
//!
//! The full surface path stops after a per-visit sum over all taxa; it is
//! never averaged by month before the yearly statistics.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};

use crate::logging::{self, Stage};
use crate::model::{AggregatedCell, CellTaxa, SampleRecord, SampleTotal, TaxonGroup};
use crate::selection::filter::GroupedRecord;

/// Biomass of one taxa label on one sampling visit.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitTotal {
    pub year: i32,
    pub station: String,
    pub date: NaiveDate,
    pub taxa: CellTaxa,
    pub biomass: f64,
}

impl From<&AggregatedCell> for VisitTotal {
    fn from(cell: &AggregatedCell) -> Self {
        VisitTotal {
            year: cell.year,
            station: cell.station.clone(),
            date: cell.date,
            taxa: cell.taxa,
            biomass: cell.biomass,
        }
    }
}

// ---------------------------------------------------------------------------
// Grouped path
// ---------------------------------------------------------------------------

/// Step 1: sums every record of a group recorded on the same visit.
///
/// A group seen anywhere in a station-month gets a zero row on each visit of
/// that month where it was not recorded, so group and "Selected" monthly
/// means share one denominator.
pub fn visit_group_totals(grouped: &[GroupedRecord<'_>]) -> Vec<VisitTotal> {
    let mut sums: BTreeMap<(i32, &str, NaiveDate, TaxonGroup), f64> = BTreeMap::new();
    let mut months: BTreeMap<(&str, i32, u32), (BTreeSet<NaiveDate>, BTreeSet<TaxonGroup>)> =
        BTreeMap::new();
    for g in grouped {
        let r = g.record;
        *sums
            .entry((r.year, r.station.as_str(), r.date, g.group))
            .or_insert(0.0) += r.value;

        let (visits, groups) = months
            .entry((r.station.as_str(), r.year, r.date.month()))
            .or_default();
        visits.insert(r.date);
        groups.insert(g.group);
    }

    let mut filled = 0usize;
    for ((station, year, _), (visits, groups)) in &months {
        for &date in visits {
            for &group in groups {
                sums.entry((*year, *station, date, group)).or_insert_with(|| {
                    filled += 1;
                    0.0
                });
            }
        }
    }
    if filled > 0 {
        logging::debug(
            Stage::Aggregation,
            None,
            &format!("{} zero row(s) added for groups absent from a visit", filled),
        );
    }

    sums.into_iter()
        .map(|((year, station, date, group), biomass)| VisitTotal {
            year,
            station: station.to_string(),
            date,
            taxa: CellTaxa::Group(group),
            biomass,
        })
        .collect()
}

/// Step 2: appends one "Selected" row per visit holding the sum across the
/// group rows of that visit. Any "Selected" rows already in `rows` are
/// replaced.
pub fn with_selected_totals(mut rows: Vec<VisitTotal>) -> Vec<VisitTotal> {
    rows.retain(|r| !r.taxa.is_selected());

    let mut selected: BTreeMap<(i32, &str, NaiveDate), f64> = BTreeMap::new();
    for row in &rows {
        *selected
            .entry((row.year, row.station.as_str(), row.date))
            .or_insert(0.0) += row.biomass;
    }
    let selected: Vec<VisitTotal> = selected
        .into_iter()
        .map(|((year, station, date), biomass)| VisitTotal {
            year,
            station: station.to_string(),
            date,
            taxa: CellTaxa::Selected,
            biomass,
        })
        .collect();

    rows.extend(selected);
    rows
}

struct MonthAccumulator {
    first_date: NaiveDate,
    sum: f64,
    count: usize,
}

/// Step 3: averages visit totals within each station-month.
///
/// The returned cells are sorted by date, then station, then taxa. Applying
/// this to rows that already hold one value per station-month returns the
/// same cells.
pub fn monthly_means(rows: &[VisitTotal]) -> Vec<AggregatedCell> {
    let mut months: BTreeMap<(&str, i32, u32, CellTaxa), MonthAccumulator> = BTreeMap::new();
    for row in rows {
        let key = (row.station.as_str(), row.year, row.date.month(), row.taxa);
        months
            .entry(key)
            .and_modify(|acc| {
                acc.first_date = acc.first_date.min(row.date);
                acc.sum += row.biomass;
                acc.count += 1;
            })
            .or_insert(MonthAccumulator {
                first_date: row.date,
                sum: row.biomass,
                count: 1,
            });
    }

    let mut cells: Vec<AggregatedCell> = months
        .into_iter()
        .map(|((station, year, month, taxa), acc)| AggregatedCell {
            station: station.to_string(),
            date: acc.first_date,
            year,
            month,
            taxa,
            biomass: acc.sum / acc.count as f64,
        })
        .collect();

    cells.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.station.cmp(&b.station))
            .then_with(|| a.taxa.cmp(&b.taxa))
    });
    cells
}

/// Runs the three grouped roll-up steps and returns the Aggregated Cell
/// table, sorted by date.
pub fn aggregate_grouped(grouped: &[GroupedRecord<'_>]) -> Vec<AggregatedCell> {
    let visits = with_selected_totals(visit_group_totals(grouped));
    let cells = monthly_means(&visits);
    logging::debug(
        Stage::Aggregation,
        None,
        &format!(
            "{} grouped record(s) -> {} visit row(s) -> {} monthly cell(s)",
            grouped.len(),
            visits.len(),
            cells.len()
        ),
    );
    cells
}

// ---------------------------------------------------------------------------
// Full surface path
// ---------------------------------------------------------------------------

/// Sums every record of a visit regardless of taxon.
pub fn visit_totals(records: &[&SampleRecord]) -> Vec<SampleTotal> {
    let mut sums: BTreeMap<(i32, &str, NaiveDate), f64> = BTreeMap::new();
    for r in records {
        *sums
            .entry((r.year, r.station.as_str(), r.date))
            .or_insert(0.0) += r.value;
    }

    let totals: Vec<SampleTotal> = sums
        .into_iter()
        .map(|((year, station, date), biomass)| SampleTotal {
            year,
            station: station.to_string(),
            date,
            biomass,
        })
        .collect();
    logging::debug(
        Stage::Aggregation,
        None,
        &format!("{} surface record(s) -> {} visit total(s)", records.len(), totals.len()),
    );
    totals
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
