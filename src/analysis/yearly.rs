//! Yearly statistics over one population of year-tagged values.
//!
//! The builder is population-agnostic: the full surface path feeds it
//! per-visit totals, the selected-taxa path feeds it monthly group cells.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::logging;
use crate::model::{Population, ROLLING_RADIUS};

/// Summary of one year of a population.
///
/// `sd` is the Bessel-corrected sample standard deviation and is `None` when
/// the year has fewer than two values. The rolling fields are the centered
/// five-point moving averages over the ordered distinct years and are `None`
/// near either end of the sequence or when the window holds a missing value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyStatistic {
    pub year: i32,
    pub count: usize,
    pub mean: f64,
    pub sd: Option<f64>,
    pub rolling_mean: Option<f64>,
    pub rolling_sd: Option<f64>,
}

/// Groups values by year and computes per-year mean and sample standard
/// deviation, then the centered moving averages of both.
///
/// The output is ordered by ascending year with one entry per distinct year.
pub fn yearly_statistics<I>(population: Population, values: I) -> Vec<YearlyStatistic>
where
    I: IntoIterator<Item = (i32, f64)>,
{
    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for (year, value) in values {
        by_year.entry(year).or_default().push(value);
    }

    let mut stats: Vec<YearlyStatistic> = by_year
        .into_iter()
        .map(|(year, values)| {
            let sd = sample_sd(&values);
            if sd.is_none() {
                logging::log_missing_statistic(population, year, values.len());
            }
            YearlyStatistic {
                year,
                count: values.len(),
                mean: mean(&values),
                sd,
                rolling_mean: None,
                rolling_sd: None,
            }
        })
        .collect();
    // BTreeMap already yields ascending years; the moving average depends on
    // that order, so keep it explicit.
    stats.sort_by_key(|s| s.year);

    let means: Vec<Option<f64>> = stats.iter().map(|s| Some(s.mean)).collect();
    let sds: Vec<Option<f64>> = stats.iter().map(|s| s.sd).collect();
    let rolling_means = centered_moving_average(&means, ROLLING_RADIUS);
    let rolling_sds = centered_moving_average(&sds, ROLLING_RADIUS);

    for ((stat, rm), rs) in stats.iter_mut().zip(rolling_means).zip(rolling_sds) {
        stat.rolling_mean = rm;
        stat.rolling_sd = rs;
    }
    stats
}

/// Arithmetic mean. Callers never pass an empty slice.
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (divides by n − 1); `None` for n < 2.
pub fn sample_sd(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (n - 1) as f64).sqrt())
}

/// Centered moving average with the given radius, computed positionally.
///
/// Position `i` is defined only when `radius` positions exist on both sides
/// and every value in `[i - radius, i + radius]` is present. A missing value
/// is never treated as zero.
pub fn centered_moving_average(values: &[Option<f64>], radius: usize) -> Vec<Option<f64>> {
    let width = 2 * radius + 1;
    (0..values.len())
        .map(|i| {
            if i < radius || i + radius >= values.len() {
                return None;
            }
            let window = &values[i - radius..=i + radius];
            let sum = window.iter().copied().sum::<Option<f64>>()?;
            Some(sum / width as f64)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
