//! Test data generators for gridded monthly time series.
//!
//! Cubes are returned as flat `Vec<f32>` in `(time, lat, lon)` row-major
//! order so callers can wrap them in whatever array type they need, e.g.
//! `Array3::from_shape_vec((steps, height, width), data)`.

use chrono::{DateTime, TimeZone, Utc};

/// Monthly timestamps on the first of each month, starting in January.
///
/// # Example
///
/// ```
/// use test_utils::monthly_times;
/// use chrono::Datelike;
///
/// let times = monthly_times(2020, 14);
/// assert_eq!(times.len(), 14);
/// assert_eq!(times[12].year(), 2021);
/// assert_eq!(times[12].month(), 1);
/// ```
pub fn monthly_times(start_year: i32, count: usize) -> Vec<DateTime<Utc>> {
    (0..count)
        .map(|i| {
            let year = start_year + (i / 12) as i32;
            let month = (i % 12) as u32 + 1;
            Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap()
        })
        .collect()
}

/// Evenly spaced axis values `start, start + step, ...`.
pub fn axis(start: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + i as f64 * step).collect()
}

/// Creates a cube with predictable values.
///
/// Each cell value is `t * 100 + row * 10 + col` scaled by `1e-3`, so
/// `cube[t][row][col]` can be checked directly after reshaping.
///
/// # Example
///
/// ```
/// use test_utils::create_test_cube;
///
/// let cube = create_test_cube(2, 2, 3);
/// assert_eq!(cube.len(), 12);
/// assert!((cube[0] - 0.0).abs() < 1e-6);
/// assert!((cube[7] - 0.101).abs() < 1e-6); // t=1, row=0, col=1
/// ```
pub fn create_test_cube(steps: usize, height: usize, width: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(steps * height * width);
    for t in 0..steps {
        for row in 0..height {
            for col in 0..width {
                data.push((t * 100 + row * 10 + col) as f32 * 1e-3);
            }
        }
    }
    data
}

/// Creates a cube filled with a constant value.
pub fn create_constant_cube(steps: usize, height: usize, width: usize, value: f32) -> Vec<f32> {
    vec![value; steps * height * width]
}

/// Creates a cube whose value depends only on the time step.
///
/// Useful for spatially uniform scenarios where every pixel follows the
/// same series.
pub fn create_uniform_cube(series: &[f32], height: usize, width: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(series.len() * height * width);
    for &value in series {
        data.extend(std::iter::repeat(value).take(height * width));
    }
    data
}

/// Creates a soil-moisture-like seasonal cube.
///
/// Values follow `base + amplitude * cos(2π month / 12) + trend * year`
/// for every pixel, with `base` increasing slightly with column so pixels
/// remain distinguishable.
pub fn create_seasonal_cube(
    years: usize,
    height: usize,
    width: usize,
    amplitude: f32,
    trend_per_year: f32,
) -> Vec<f32> {
    let steps = years * 12;
    let mut data = Vec::with_capacity(steps * height * width);
    for t in 0..steps {
        let month = (t % 12) as f32;
        let year = (t / 12) as f32;
        let seasonal = amplitude * (2.0 * std::f32::consts::PI * month / 12.0).cos();
        for _row in 0..height {
            for col in 0..width {
                let base = 0.25 + 0.01 * col as f32;
                data.push(base + seasonal + trend_per_year * year);
            }
        }
    }
    data
}

/// Sets the given `(t, row, col)` cells of a flat cube to `NaN`.
pub fn punch_holes(
    data: &mut [f32],
    height: usize,
    width: usize,
    positions: &[(usize, usize, usize)],
) {
    for &(t, row, col) in positions {
        let idx = (t * height + row) * width + col;
        if row < height && col < width && idx < data.len() {
            data[idx] = f32::NAN;
        }
    }
}
