//! Absolute, relative and standardized anomalies against a monthly baseline.

use chrono::{DateTime, Datelike, Utc};
use ndarray::{s, Array3, Axis, Zip};
use tracing::debug;

use crate::climatology::ClimatologyBaseline;
use crate::config::EngineConfig;
use crate::error::{AnomalyError, Result};
use crate::series::{nearest_index, GriddedTimeSeries};
use crate::types::{AnomalyMetric, BaselinePeriod};

/// The three anomaly metrics for every cell of a series.
///
/// All grids share the source shape `(time, lat, lon)`. A cell is `NaN` when
/// the observation is missing or the metric's denominator is zero or missing.
#[derive(Debug, Clone)]
pub struct AnomalySeries {
    pub times: Vec<DateTime<Utc>>,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    /// Baseline period the anomalies are measured against.
    pub period: BaselinePeriod,
    pub absolute: Array3<f32>,
    pub relative: Array3<f32>,
    pub zscore: Array3<f32>,
}

impl AnomalySeries {
    /// Grid of the requested metric.
    pub fn metric(&self, metric: AnomalyMetric) -> &Array3<f32> {
        match metric {
            AnomalyMetric::Absolute => &self.absolute,
            AnomalyMetric::Relative => &self.relative,
            AnomalyMetric::ZScore => &self.zscore,
        }
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Spatial dimensions as (lat, lon).
    pub fn spatial_shape(&self) -> (usize, usize) {
        (self.lats.len(), self.lons.len())
    }

    /// Check that every metric grid matches the (time, lat, lon) axes.
    ///
    /// Always true for series built by [`compute_anomalies`]; hand-assembled
    /// series are checked before any cell is indexed.
    pub fn validate_shape(&self) -> Result<()> {
        let expected = (self.times.len(), self.lats.len(), self.lons.len());
        for metric in AnomalyMetric::ALL {
            let actual = self.metric(metric).dim();
            if actual != expected {
                return Err(AnomalyError::invalid_shape(format!(
                    "{} anomalies have shape {:?} but axes are (time={}, lat={}, lon={})",
                    metric, actual, expected.0, expected.1, expected.2
                )));
            }
        }
        Ok(())
    }

    /// Time series of one metric at the grid cell nearest to a coordinate.
    ///
    /// `None` when the point lies outside the grid or the series is malformed.
    pub fn point_series(&self, lon: f64, lat: f64, metric: AnomalyMetric) -> Option<Vec<f32>> {
        self.validate_shape().ok()?;
        let row = nearest_index(&self.lats, lat)?;
        let col = nearest_index(&self.lons, lon)?;
        Some(self.metric(metric).slice(s![.., row, col]).to_vec())
    }
}

/// Compute anomalies of every observation against its calendar month's baseline.
pub fn compute_anomalies(
    series: &GriddedTimeSeries,
    baseline: &ClimatologyBaseline,
) -> Result<AnomalySeries> {
    compute_anomalies_with_config(series, baseline, &EngineConfig::default())
}

/// [`compute_anomalies`] with explicit parallelism settings.
pub fn compute_anomalies_with_config(
    series: &GriddedTimeSeries,
    baseline: &ClimatologyBaseline,
    config: &EngineConfig,
) -> Result<AnomalySeries> {
    let shape = series.spatial_shape();
    if baseline.spatial_shape() != shape {
        return Err(AnomalyError::ShapeMismatch {
            expected: shape,
            actual: baseline.spatial_shape(),
        });
    }

    let dims = series.values().dim();
    let mut absolute = Array3::<f32>::from_elem(dims, f32::NAN);
    let mut relative = Array3::<f32>::from_elem(dims, f32::NAN);
    let mut zscore = Array3::<f32>::from_elem(dims, f32::NAN);

    let parallel = config.use_parallel(shape.0 * shape.1);
    debug!(
        steps = series.len(),
        shape = ?shape,
        period = %baseline.period,
        parallel,
        "Computing anomalies"
    );

    for (t, time) in series.times().iter().enumerate() {
        // A baseline always holds twelve months, January first
        let clim = &baseline.months()[time.month0() as usize];

        let zip = Zip::from(absolute.index_axis_mut(Axis(0), t))
            .and(relative.index_axis_mut(Axis(0), t))
            .and(zscore.index_axis_mut(Axis(0), t))
            .and(series.values().index_axis(Axis(0), t))
            .and(&clim.mean)
            .and(&clim.std_dev);

        let kernel = |abs: &mut f32,
                      rel: &mut f32,
                      z: &mut f32,
                      &value: &f32,
                      &mean: &f32,
                      &std_dev: &f32| {
            (*abs, *rel, *z) = cell_anomaly(value, mean, std_dev);
        };

        if parallel {
            zip.par_for_each(kernel);
        } else {
            zip.for_each(kernel);
        }
    }

    Ok(AnomalySeries {
        times: series.times().to_vec(),
        lats: series.lats().to_vec(),
        lons: series.lons().to_vec(),
        period: baseline.period,
        absolute,
        relative,
        zscore,
    })
}

/// (absolute, relative %, z-score) for one observation.
///
/// Zero, subnormal or missing denominators yield `NaN`, never infinity.
#[inline]
pub fn cell_anomaly(value: f32, mean: f32, std_dev: f32) -> (f32, f32, f32) {
    if value.is_nan() || mean.is_nan() {
        return (f32::NAN, f32::NAN, f32::NAN);
    }

    let absolute = value - mean;
    let relative = finite_or_missing(absolute / mean * 100.0);
    let zscore = finite_or_missing(absolute / std_dev);

    (absolute, relative, zscore)
}

/// Overflow from tiny or zero denominators becomes the missing sentinel.
#[inline]
fn finite_or_missing(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        f32::NAN
    }
}
