//! Area-averaged anomaly time series.

use chrono::{DateTime, Utc};
use ndarray::Axis;
use serde::Serialize;
use tracing::debug;

use crate::anomaly::AnomalySeries;
use crate::error::{AnomalyError, Result};
use crate::types::{AnomalyMetric, BoundingBox};

/// Mean and spread of one metric over a study area, one value per time step.
/// Serializes missing steps as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpatialSummary {
    pub times: Vec<DateTime<Utc>>,
    pub metric: AnomalyMetric,
    pub bbox: BoundingBox,
    /// Number of grid cells inside the box.
    pub pixel_count: usize,
    /// Area mean per time step; `NaN` when every selected cell is missing.
    pub mean: Vec<f32>,
    /// Population standard deviation per time step; `NaN` when every selected cell is missing.
    pub std_dev: Vec<f32>,
}

impl SpatialSummary {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Average one anomaly metric over every grid cell inside `bbox`.
pub fn spatial_average(
    anomalies: &AnomalySeries,
    bbox: &BoundingBox,
    metric: AnomalyMetric,
) -> Result<SpatialSummary> {
    anomalies.validate_shape()?;

    let cells: Vec<(usize, usize)> = anomalies
        .lats
        .iter()
        .enumerate()
        .flat_map(|(row, &lat)| {
            anomalies
                .lons
                .iter()
                .enumerate()
                .filter(move |&(_, &lon)| bbox.contains(lon, lat))
                .map(move |(col, _)| (row, col))
        })
        .collect();

    if cells.is_empty() {
        return Err(AnomalyError::empty_selection(format!(
            "no grid cells inside bbox {}",
            bbox
        )));
    }

    debug!(
        bbox = %bbox,
        metric = %metric,
        pixels = cells.len(),
        "Computing spatial average"
    );

    let grid = anomalies.metric(metric);
    let mut mean = Vec::with_capacity(anomalies.len());
    let mut std_dev = Vec::with_capacity(anomalies.len());

    for slice in grid.axis_iter(Axis(0)) {
        let (m, s) = mean_and_std(cells.iter().map(|&(row, col)| slice[[row, col]]));
        mean.push(m);
        std_dev.push(s);
    }

    Ok(SpatialSummary {
        times: anomalies.times.clone(),
        metric,
        bbox: *bbox,
        pixel_count: cells.len(),
        mean,
        std_dev,
    })
}

/// Mean and population standard deviation of the non-missing values.
fn mean_and_std(values: impl Iterator<Item = f32>) -> (f32, f32) {
    let mut n = 0u64;
    let mut mean = 0.0f64;
    let mut m2 = 0.0f64;

    for v in values.filter(|v| !v.is_nan()) {
        let x = v as f64;
        n += 1;
        let delta = x - mean;
        mean += delta / n as f64;
        m2 += delta * (x - mean);
    }

    if n == 0 {
        (f32::NAN, f32::NAN)
    } else {
        (mean as f32, (m2 / n as f64).sqrt() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std_population() {
        let (m, s) = mean_and_std([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter());
        assert!((m - 5.0).abs() < 1e-6);
        assert!((s - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_mean_and_std_skips_missing() {
        let (m, s) = mean_and_std([1.0, f32::NAN, 3.0].into_iter());
        assert!((m - 2.0).abs() < 1e-6);
        assert!((s - 1.0).abs() < 1e-6);

        let (m, s) = mean_and_std([f32::NAN, f32::NAN].into_iter());
        assert!(m.is_nan());
        assert!(s.is_nan());
    }
}
