//! Core parameter types for anomaly analysis.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnomalyError;

/// A geographic bounding box in WGS84 degrees.
///
/// Containment is inclusive on all four edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Check if a point is contained within this bounding box.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Get the width in degrees.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Get the height in degrees.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        // Global coverage
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }
}

impl FromStr for BoundingBox {
    type Err = AnomalyError;

    /// Parse "min_lon,min_lat,max_lon,max_lat".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(AnomalyError::invalid_parameter(
                "bbox",
                format!("expected 4 comma-separated numbers, got '{}'", s),
            ));
        }

        let mut bounds = [0.0f64; 4];
        for (slot, part) in bounds.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| {
                AnomalyError::invalid_parameter("bbox", format!("'{}' is not a number", part))
            })?;
        }

        Ok(Self::new(bounds[0], bounds[1], bounds[2], bounds[3]))
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

/// Which anomaly metric to read or aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyMetric {
    /// Observation minus the climatological mean.
    #[default]
    Absolute,
    /// Absolute anomaly as a percentage of the climatological mean.
    Relative,
    /// Absolute anomaly divided by the climatological standard deviation.
    ZScore,
}

impl AnomalyMetric {
    /// All metrics in a stable order.
    pub const ALL: [AnomalyMetric; 3] = [Self::Absolute, Self::Relative, Self::ZScore];

    /// Get the canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Absolute => "absolute",
            Self::Relative => "relative",
            Self::ZScore => "z_score",
        }
    }

    /// Physical unit of the metric given the unit of the observations.
    pub fn units(&self, observation_units: &str) -> String {
        match self {
            Self::Absolute => observation_units.to_string(),
            Self::Relative => "%".to_string(),
            Self::ZScore => "1".to_string(),
        }
    }
}

impl FromStr for AnomalyMetric {
    type Err = AnomalyError;

    /// Parse from string (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "absolute" | "abs" => Ok(Self::Absolute),
            "relative" | "rel" | "percent" => Ok(Self::Relative),
            "zscore" | "z_score" | "z-score" | "z" => Ok(Self::ZScore),
            other => Err(AnomalyError::invalid_parameter(
                "metric",
                format!("unknown metric '{}' (expected absolute, relative or zscore)", other),
            )),
        }
    }
}

impl std::fmt::Display for AnomalyMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inclusive year span used as the climatological reference period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselinePeriod {
    pub start_year: i32,
    pub end_year: i32,
}

impl BaselinePeriod {
    pub fn new(start_year: i32, end_year: i32) -> Self {
        Self {
            start_year,
            end_year,
        }
    }

    /// Check if a year lies inside the period.
    pub fn contains(&self, year: i32) -> bool {
        year >= self.start_year && year <= self.end_year
    }

    /// Number of years covered (0 for an inverted period).
    pub fn num_years(&self) -> usize {
        if self.end_year < self.start_year {
            0
        } else {
            (self.end_year - self.start_year + 1) as usize
        }
    }
}

impl std::fmt::Display for BaselinePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start_year, self.end_year)
    }
}

/// Descriptive attributes of a gridded variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesMetadata {
    /// Variable name (e.g., "sm").
    pub name: String,
    /// Physical units (e.g., "m3 m-3").
    pub units: String,
    /// Inclusive range valid observations must fall in.
    #[serde(default)]
    pub valid_range: Option<(f32, f32)>,
}

impl SeriesMetadata {
    pub fn new(name: impl Into<String>, units: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units: units.into(),
            valid_range: None,
        }
    }

    /// Declare the valid value range.
    pub fn with_valid_range(mut self, min: f32, max: f32) -> Self {
        self.valid_range = Some((min, max));
        self
    }
}

impl Default for SeriesMetadata {
    fn default() -> Self {
        Self::new("sm", "m3 m-3")
    }
}
