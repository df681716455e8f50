//! Per-month climatological baselines.
//!
//! For each calendar month the baseline holds the per-pixel mean and sample
//! standard deviation of every non-missing observation whose year lies in the
//! requested inclusive period. Months are accumulated independently on the
//! rayon pool; within a month, observations are folded in time order with
//! Welford's update so the result does not depend on thread scheduling.

use chrono::Datelike;
use ndarray::{Array2, Axis, Zip};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{AnomalyError, Result};
use crate::series::GriddedTimeSeries;
use crate::types::BaselinePeriod;

/// Mean and spread of one calendar month over the baseline period.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyClimatology {
    /// Calendar month, 1-12.
    pub month: u32,
    /// Per-pixel mean; `NaN` where no observation exists.
    pub mean: Array2<f32>,
    /// Per-pixel sample standard deviation; `NaN` where fewer than two observations exist.
    pub std_dev: Array2<f32>,
    /// Number of non-missing observations per pixel.
    pub count: Array2<u32>,
}

/// Twelve monthly climatologies computed over one baseline period.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimatologyBaseline {
    pub period: BaselinePeriod,
    months: Vec<MonthlyClimatology>,
}

impl ClimatologyBaseline {
    /// Climatology for calendar month `month` (1-12).
    pub fn month(&self, month: u32) -> Option<&MonthlyClimatology> {
        if !(1..=12).contains(&month) {
            return None;
        }
        self.months.get(month as usize - 1)
    }

    /// All twelve months, January first.
    pub fn months(&self) -> &[MonthlyClimatology] {
        &self.months
    }

    /// Spatial dimensions as (lat, lon).
    pub fn spatial_shape(&self) -> (usize, usize) {
        self.months
            .first()
            .map(|m| m.mean.dim())
            .unwrap_or((0, 0))
    }
}

/// Compute the monthly climatology of `series` over `[start_year, end_year]`.
pub fn compute_climatology(
    series: &GriddedTimeSeries,
    start_year: i32,
    end_year: i32,
) -> Result<ClimatologyBaseline> {
    if start_year > end_year {
        return Err(AnomalyError::InvalidBaselineRange {
            start: start_year,
            end: end_year,
        });
    }

    let valid = series.year_range();
    if start_year < valid.0 || end_year > valid.1 {
        return Err(AnomalyError::out_of_range(start_year, end_year, valid));
    }

    let period = BaselinePeriod::new(start_year, end_year);

    // Time indices of the baseline, bucketed by calendar month.
    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); 12];
    for (i, t) in series.times().iter().enumerate() {
        if period.contains(t.year()) {
            groups[t.month0() as usize].push(i);
        }
    }

    debug!(
        period = %period,
        shape = ?series.spatial_shape(),
        steps = groups.iter().map(Vec::len).sum::<usize>(),
        "Computing climatology"
    );

    let months: Vec<MonthlyClimatology> = groups
        .par_iter()
        .enumerate()
        .map(|(m0, indices)| accumulate_month(series, m0 as u32 + 1, indices))
        .collect();

    for month in months.iter().filter(|m| m.count.iter().all(|&n| n == 0)) {
        warn!(
            month = month.month,
            period = %period,
            "No baseline observations for month"
        );
    }

    info!(
        period = %period,
        variable = %series.metadata().name,
        "Climatology computed"
    );

    Ok(ClimatologyBaseline { period, months })
}

fn accumulate_month(
    series: &GriddedTimeSeries,
    month: u32,
    indices: &[usize],
) -> MonthlyClimatology {
    let shape = series.spatial_shape();
    let mut count = Array2::<u32>::zeros(shape);
    let mut mean = Array2::<f64>::zeros(shape);
    let mut m2 = Array2::<f64>::zeros(shape);

    for &t in indices {
        let grid = series.values().index_axis(Axis(0), t);
        Zip::from(&mut count)
            .and(&mut mean)
            .and(&mut m2)
            .and(grid)
            .for_each(|n, mu, acc, &v| {
                if v.is_nan() {
                    return;
                }
                let x = v as f64;
                *n += 1;
                let delta = x - *mu;
                *mu += delta / *n as f64;
                *acc += delta * (x - *mu);
            });
    }

    let mut mean_out = Array2::<f32>::from_elem(shape, f32::NAN);
    let mut std_out = Array2::<f32>::from_elem(shape, f32::NAN);
    Zip::from(&mut mean_out)
        .and(&mut std_out)
        .and(&count)
        .and(&mean)
        .and(&m2)
        .for_each(|mean_cell, std_cell, &n, &mu, &acc| {
            if n > 0 {
                *mean_cell = mu as f32;
            }
            if n > 1 {
                *std_cell = (acc / (n - 1) as f64).sqrt() as f32;
            }
        });

    MonthlyClimatology {
        month,
        mean: mean_out,
        std_dev: std_out,
        count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SeriesMetadata;
    use chrono::{DateTime, TimeZone, Utc};
    use ndarray::Array3;

    fn monthly(start_year: i32, count: usize) -> Vec<DateTime<Utc>> {
        (0..count)
            .map(|i| {
                let year = start_year + (i / 12) as i32;
                let month = (i % 12) as u32 + 1;
                Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap()
            })
            .collect()
    }

    fn single_pixel(values: Vec<f32>, start_year: i32) -> GriddedTimeSeries {
        let n = values.len();
        GriddedTimeSeries::new(
            monthly(start_year, n),
            vec![0.0],
            vec![0.0],
            Array3::from_shape_vec((n, 1, 1), values).unwrap(),
            SeriesMetadata::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_mean_and_sample_std() {
        // January values over three years: 1, 2, 3 -> mean 2, sample std 1
        let mut values = vec![0.0f32; 36];
        values[0] = 1.0;
        values[12] = 2.0;
        values[24] = 3.0;
        let baseline = compute_climatology(&single_pixel(values, 2000), 2000, 2002).unwrap();

        let jan = baseline.month(1).unwrap();
        assert_eq!(jan.count[[0, 0]], 3);
        assert!((jan.mean[[0, 0]] - 2.0).abs() < 1e-6);
        assert!((jan.std_dev[[0, 0]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_always_twelve_months() {
        // Series starts in July, so Jan-Jun have no baseline data
        let n = 6;
        let times: Vec<_> = (7..=12)
            .map(|m| Utc.with_ymd_and_hms(2020, m, 15, 0, 0, 0).unwrap())
            .collect();
        let series = GriddedTimeSeries::new(
            times,
            vec![0.0, 1.0],
            vec![0.0],
            Array3::from_elem((n, 2, 1), 0.3f32),
            SeriesMetadata::default(),
        )
        .unwrap();

        let baseline = compute_climatology(&series, 2020, 2020).unwrap();
        assert_eq!(baseline.months().len(), 12);
        assert!(baseline.month(1).unwrap().mean.iter().all(|v| v.is_nan()));
        assert!((baseline.month(7).unwrap().mean[[1, 0]] - 0.3).abs() < 1e-6);
        assert_eq!(baseline.spatial_shape(), (2, 1));
        assert!(baseline.month(0).is_none());
        assert!(baseline.month(13).is_none());
    }

    #[test]
    fn test_out_of_range_baseline() {
        let series = single_pixel(vec![0.1; 24], 2010);
        let err = compute_climatology(&series, 2009, 2011).unwrap_err();
        assert_eq!(
            err,
            AnomalyError::OutOfRange {
                start: 2009,
                end: 2011,
                valid_start: 2010,
                valid_end: 2011,
            }
        );
        assert!(compute_climatology(&series, 2010, 2012).is_err());
    }

    #[test]
    fn test_inverted_baseline() {
        let series = single_pixel(vec![0.1; 24], 2010);
        assert!(matches!(
            compute_climatology(&series, 2011, 2010),
            Err(AnomalyError::InvalidBaselineRange { .. })
        ));
    }

    #[test]
    fn test_missing_values_ignored() {
        let mut values = vec![0.0f32; 36];
        values[0] = 1.0;
        values[12] = f32::NAN;
        values[24] = 3.0;
        let baseline = compute_climatology(&single_pixel(values, 2000), 2000, 2002).unwrap();

        let jan = baseline.month(1).unwrap();
        assert_eq!(jan.count[[0, 0]], 2);
        assert!((jan.mean[[0, 0]] - 2.0).abs() < 1e-6);
        assert!((jan.std_dev[[0, 0]] - 2.0f32.sqrt()).abs() < 1e-6);
    }
}
