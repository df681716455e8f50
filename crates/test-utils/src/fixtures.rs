//! Common test fixtures for anomaly tests.
//!
//! This module provides pre-defined study areas and grid layouts that
//! represent common scenarios in soil-moisture analysis.

/// Common bounding box definitions as (min_lon, min_lat, max_lon, max_lat).
pub mod bbox {
    /// Global bounding box (-180 to 180, -90 to 90)
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// Iberian peninsula
    pub const IBERIA: (f64, f64, f64, f64) = (-10.0, 36.0, 4.0, 44.0);

    /// Horn of Africa
    pub const HORN_OF_AFRICA: (f64, f64, f64, f64) = (38.0, -5.0, 52.0, 15.0);

    /// Single point (degenerate bbox)
    pub const POINT: (f64, f64, f64, f64) = (0.0, 0.0, 0.0, 0.0);

    /// Somewhere over the open Pacific, outside any test grid
    pub const NOWHERE: (f64, f64, f64, f64) = (-170.0, -60.0, -160.0, -50.0);
}

/// Common grid layouts for testing.
pub mod grid {
    /// Single pixel at the origin
    pub const SINGLE_PIXEL: GridSpec = GridSpec {
        width: 1,
        height: 1,
        min_lon: 0.0,
        max_lon: 0.0,
        min_lat: 0.0,
        max_lat: 0.0,
    };

    /// 3x3 grid with one-degree spacing centred on the origin
    pub const GRID_3X3: GridSpec = GridSpec {
        width: 3,
        height: 3,
        min_lon: -1.0,
        max_lon: 1.0,
        min_lat: -1.0,
        max_lat: 1.0,
    };

    /// ESA CCI-style 0.25 degree tile over Iberia
    pub const IBERIA_QUARTER_DEGREE: GridSpec = GridSpec {
        width: 56,
        height: 32,
        min_lon: -10.0,
        max_lon: 3.75,
        min_lat: 36.25,
        max_lat: 44.0,
    };

    /// Grid specification for testing.
    ///
    /// Bounds are cell centres, so a one-cell axis has `min == max`.
    #[derive(Debug, Clone, Copy)]
    pub struct GridSpec {
        pub width: usize,
        pub height: usize,
        pub min_lon: f64,
        pub max_lon: f64,
        pub min_lat: f64,
        pub max_lat: f64,
    }

    impl GridSpec {
        /// Returns the total number of grid cells.
        pub fn size(&self) -> usize {
            self.width * self.height
        }

        /// Latitude axis, north to south.
        pub fn lats(&self) -> Vec<f64> {
            centres(self.max_lat, self.min_lat, self.height)
        }

        /// Longitude axis, west to east.
        pub fn lons(&self) -> Vec<f64> {
            centres(self.min_lon, self.max_lon, self.width)
        }
    }

    fn centres(from: f64, to: f64, n: usize) -> Vec<f64> {
        if n <= 1 {
            return vec![from; n];
        }
        let step = (to - from) / (n - 1) as f64;
        (0..n).map(|i| from + i as f64 * step).collect()
    }
}

/// Common baseline periods as (start_year, end_year).
pub mod baseline {
    /// WMO standard normal
    pub const WMO_1991_2020: (i32, i32) = (1991, 2020);

    /// Single year, the shortest valid baseline
    pub const SINGLE_YEAR_2020: (i32, i32) = (2020, 2020);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_spec_size() {
        assert_eq!(grid::GRID_3X3.size(), 9);
        assert_eq!(grid::IBERIA_QUARTER_DEGREE.size(), 56 * 32);
    }

    #[test]
    fn test_grid_spec_axes() {
        assert_eq!(grid::GRID_3X3.lats(), vec![1.0, 0.0, -1.0]);
        assert_eq!(grid::GRID_3X3.lons(), vec![-1.0, 0.0, 1.0]);
        assert_eq!(grid::SINGLE_PIXEL.lons(), vec![0.0]);

        let lons = grid::IBERIA_QUARTER_DEGREE.lons();
        assert!((lons[1] - lons[0] - 0.25).abs() < 1e-9);
    }
}
