//! The gridded time series consumed by every engine operation.

use chrono::{DateTime, Datelike, Utc};
use ndarray::{Array3, ArrayView2, Axis};

use crate::error::{AnomalyError, Result};
use crate::types::SeriesMetadata;

/// A stack of 2-D grids sharing one spatial layout, one grid per timestamp.
///
/// Values are indexed `(time, lat, lon)`. Missing cells hold `NaN`.
/// The series is validated on construction and read-only afterwards;
/// every derived product is stored in new arrays.
#[derive(Debug, Clone)]
pub struct GriddedTimeSeries {
    times: Vec<DateTime<Utc>>,
    lats: Vec<f64>,
    lons: Vec<f64>,
    values: Array3<f32>,
    metadata: SeriesMetadata,
}

impl GriddedTimeSeries {
    /// Build a series, checking the shape, ordering and value-range invariants.
    pub fn new(
        times: Vec<DateTime<Utc>>,
        lats: Vec<f64>,
        lons: Vec<f64>,
        values: Array3<f32>,
        metadata: SeriesMetadata,
    ) -> Result<Self> {
        let expected = (times.len(), lats.len(), lons.len());
        if values.dim() != expected {
            return Err(AnomalyError::invalid_shape(format!(
                "values have shape {:?} but axes are (time={}, lat={}, lon={})",
                values.dim(),
                expected.0,
                expected.1,
                expected.2
            )));
        }

        if times.is_empty() {
            return Err(AnomalyError::empty_selection("series has no time steps"));
        }

        for (i, pair) in times.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(AnomalyError::UnorderedTimes {
                    index: i + 1,
                    previous: pair[0].to_rfc3339(),
                    current: pair[1].to_rfc3339(),
                });
            }
        }

        if let Some((min, max)) = metadata.valid_range {
            for (index, &value) in values.indexed_iter() {
                if !value.is_nan() && (value < min || value > max) {
                    return Err(AnomalyError::ValueOutOfRange {
                        value,
                        index,
                        min,
                        max,
                    });
                }
            }
        }

        Ok(Self {
            times,
            lats,
            lons,
            values,
            metadata,
        })
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    pub fn values(&self) -> &Array3<f32> {
        &self.values
    }

    pub fn metadata(&self) -> &SeriesMetadata {
        &self.metadata
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always false for a constructed series; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Spatial dimensions as (lat, lon).
    pub fn spatial_shape(&self) -> (usize, usize) {
        (self.lats.len(), self.lons.len())
    }

    /// First and last calendar year covered by the time axis.
    pub fn year_range(&self) -> (i32, i32) {
        // Non-empty by construction
        let first = self.times.first().map(|t| t.year()).unwrap_or_default();
        let last = self.times.last().map(|t| t.year()).unwrap_or_default();
        (first, last)
    }

    /// View of the grid at one time step.
    pub fn grid(&self, time_index: usize) -> Option<ArrayView2<'_, f32>> {
        if time_index >= self.len() {
            return None;
        }
        Some(self.values.index_axis(Axis(0), time_index))
    }

    /// Index of the first time step falling in the given year and month.
    pub fn time_index(&self, year: i32, month: u32) -> Option<usize> {
        self.times
            .iter()
            .position(|t| t.year() == year && t.month() == month)
    }

    /// Nearest grid cell to a coordinate, as (row, col).
    ///
    /// Returns `None` if the point lies outside the coordinate extent.
    pub fn nearest_pixel(&self, lon: f64, lat: f64) -> Option<(usize, usize)> {
        let row = nearest_index(&self.lats, lat)?;
        let col = nearest_index(&self.lons, lon)?;
        Some((row, col))
    }

    /// New series restricted to the inclusive year span.
    pub fn slice_years(&self, start_year: i32, end_year: i32) -> Result<Self> {
        let indices: Vec<usize> = self
            .times
            .iter()
            .enumerate()
            .filter(|(_, t)| t.year() >= start_year && t.year() <= end_year)
            .map(|(i, _)| i)
            .collect();

        if indices.is_empty() {
            return Err(AnomalyError::empty_selection(format!(
                "no time steps between {} and {}",
                start_year, end_year
            )));
        }

        Ok(Self {
            times: indices.iter().map(|&i| self.times[i]).collect(),
            lats: self.lats.clone(),
            lons: self.lons.clone(),
            values: self.values.select(Axis(0), &indices),
            metadata: self.metadata.clone(),
        })
    }
}

/// Replace a loader's fill sentinel with `NaN` in place.
pub fn mask_fill_value(values: &mut Array3<f32>, fill_value: f32) {
    values.mapv_inplace(|v| if v == fill_value { f32::NAN } else { v });
}

/// Index of the axis value closest to `target`, if `target` lies within the axis extent.
pub(crate) fn nearest_index(axis: &[f64], target: f64) -> Option<usize> {
    let min = axis.iter().copied().fold(f64::INFINITY, f64::min);
    let max = axis.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if axis.is_empty() || target < min || target > max {
        return None;
    }

    axis.iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (*a - target)
                .abs()
                .partial_cmp(&(*b - target).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
}
