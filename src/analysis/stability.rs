//! Stability window detection.

use serde::Serialize;

use crate::analysis::yearly::YearlyStatistic;
use crate::model::{PipelineError, Population, ROLLING_RADIUS, ROLLING_WINDOW_YEARS};

/// Five-year span centred on the year of minimal smoothed standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StabilityWindow {
    pub center_year: i32,
    pub start_year: i32,
    pub end_year: i32,
    /// Smoothed standard deviation at the center year.
    pub rolling_sd: f64,
}

impl StabilityWindow {
    fn centred_on(center_year: i32, rolling_sd: f64) -> Self {
        let radius = ROLLING_RADIUS as i32;
        Self {
            center_year,
            start_year: center_year - radius,
            end_year: center_year + radius,
            rolling_sd,
        }
    }
}

/// Finds the year with the globally minimal `rolling_sd`, ignoring missing
/// values.
///
/// Ties resolve to the earliest year. Fails with `InsufficientYears` when the
/// series has fewer distinct years than the moving-average width, and with
/// `UndefinedRollingDeviation` when no smoothed value is defined.
pub fn detect_window(
    population: Population,
    stats: &[YearlyStatistic],
) -> Result<StabilityWindow, PipelineError> {
    if stats.len() < ROLLING_WINDOW_YEARS {
        return Err(PipelineError::InsufficientYears {
            population,
            found: stats.len(),
            required: ROLLING_WINDOW_YEARS,
        });
    }

    let mut best: Option<(i32, f64)> = None;
    for stat in stats {
        let Some(sd) = stat.rolling_sd.filter(|v| !v.is_nan()) else {
            continue;
        };
        best = match best {
            Some((year, min)) if min < sd || (min == sd && year < stat.year) => Some((year, min)),
            _ => Some((stat.year, sd)),
        };
    }

    best.map(|(year, sd)| StabilityWindow::centred_on(year, sd))
        .ok_or(PipelineError::UndefinedRollingDeviation {
            population,
            years: stats.len(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::yearly::centered_moving_average;

    /// Builds a yearly series from per-year sd values, smoothing them the same
    /// way the statistics builder does.
    fn series(first_year: i32, sds: &[Option<f64>]) -> Vec<YearlyStatistic> {
        let rolling = centered_moving_average(sds, ROLLING_RADIUS);
        sds.iter()
            .zip(rolling)
            .enumerate()
            .map(|(i, (sd, rolling_sd))| YearlyStatistic {
                year: first_year + i as i32,
                count: 10,
                mean: 1.0,
                sd: *sd,
                rolling_mean: None,
                rolling_sd,
            })
            .collect()
    }

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_window_centres_on_minimum_rolling_sd() {
        // Smoothed: 2002 5.6, 2003 4.2, 2004 3.0, 2005 2.2, 2006 3.4, ...
        let stats = series(2000, &some(&[9.0, 8.0, 7.0, 2.0, 2.0, 2.0, 2.0, 3.0, 8.0, 9.0, 9.0]));
        assert!((stats[4].rolling_sd.unwrap() - 3.0).abs() < 1e-9);

        let window = detect_window(Population::FullSurface, &stats).unwrap();
        assert_eq!(window.center_year, 2005);
        assert_eq!((window.start_year, window.end_year), (2003, 2007));
        assert!((window.rolling_sd - 2.2).abs() < 1e-9);
    }

    #[test]
    fn test_tie_resolves_to_earliest_year() {
        let stats = series(1995, &some(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]));
        let window = detect_window(Population::SelectedTaxa, &stats).unwrap();
        assert_eq!(window.center_year, 1997);
        assert_eq!((window.start_year, window.end_year), (1995, 1999));
    }

    #[test]
    fn test_tie_resolution_does_not_depend_on_input_order() {
        let mut stats = series(1995, &some(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]));
        stats.reverse();
        let window = detect_window(Population::SelectedTaxa, &stats).unwrap();
        assert_eq!(window.center_year, 1997);
    }

    #[test]
    fn test_fewer_than_five_years_is_insufficient() {
        let stats = series(2010, &some(&[1.0, 2.0, 3.0]));
        let err = detect_window(Population::SelectedTaxa, &stats).unwrap_err();
        assert!(
            matches!(
                err,
                PipelineError::InsufficientYears {
                    population: Population::SelectedTaxa,
                    found: 3,
                    required: 5
                }
            ),
            "got {:?}",
            err
        );
    }

    #[test]
    fn test_missing_values_are_skipped_in_minimum_search() {
        // Year 2003 has an undefined sd, so every window covering it is
        // missing; only 2006 and 2007 remain as candidates.
        let mut sds = some(&[5.0, 5.0, 5.0, 1.0, 4.0, 4.0, 4.0, 4.0, 4.0, 6.0]);
        sds[3] = None;
        let stats = series(2000, &sds);
        let window = detect_window(Population::FullSurface, &stats).unwrap();
        assert_eq!(window.center_year, 2006);
    }

    #[test]
    fn test_all_missing_rolling_sd_is_an_error() {
        let stats = series(2000, &[None, None, None, None, None, None]);
        let err = detect_window(Population::FullSurface, &stats).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UndefinedRollingDeviation { years: 6, .. }
        ));
    }
}
