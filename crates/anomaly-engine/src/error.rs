//! Error types for climatology and anomaly computation.

use thiserror::Error;

/// Errors that can occur while building a series or computing anomalies.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnomalyError {
    /// The requested baseline period is not covered by the series.
    #[error(
        "baseline {start}-{end} is outside the observed range {valid_start}-{valid_end}"
    )]
    OutOfRange {
        start: i32,
        end: i32,
        valid_start: i32,
        valid_end: i32,
    },

    /// The baseline start year is after the end year.
    #[error("baseline start year {start} is after end year {end}")]
    InvalidBaselineRange { start: i32, end: i32 },

    /// Baseline and series spatial grids disagree.
    #[error("spatial shape mismatch: expected {expected:?} (lat, lon), got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// A spatial or temporal selection contains no data.
    #[error("empty selection: {0}")]
    EmptySelection(String),

    /// Array dimensions disagree with the coordinate axes.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// Timestamps are not strictly increasing.
    #[error("timestamps not strictly increasing at index {index}: {previous} >= {current}")]
    UnorderedTimes {
        index: usize,
        previous: String,
        current: String,
    },

    /// An observation lies outside the declared valid range.
    #[error("value {value} at {index:?} is outside valid range [{min}, {max}]")]
    ValueOutOfRange {
        value: f32,
        index: (usize, usize, usize),
        min: f32,
        max: f32,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    InvalidConfig(String),

    /// A parameter could not be parsed.
    #[error("invalid parameter '{param}': {message}")]
    InvalidParameter { param: String, message: String },
}

impl AnomalyError {
    /// Create an OutOfRange error.
    pub fn out_of_range(start: i32, end: i32, valid: (i32, i32)) -> Self {
        Self::OutOfRange {
            start,
            end,
            valid_start: valid.0,
            valid_end: valid.1,
        }
    }

    /// Create an EmptySelection error.
    pub fn empty_selection(msg: impl Into<String>) -> Self {
        Self::EmptySelection(msg.into())
    }

    /// Create an InvalidShape error.
    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        Self::InvalidShape(msg.into())
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}

/// Result type for anomaly engine operations.
pub type Result<T> = std::result::Result<T, AnomalyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_names_valid_range() {
        let err = AnomalyError::out_of_range(1990, 1995, (2000, 2021));
        let msg = err.to_string();
        assert!(msg.contains("1990-1995"));
        assert!(msg.contains("2000-2021"));
    }

    #[test]
    fn test_shape_mismatch_message() {
        let err = AnomalyError::ShapeMismatch {
            expected: (3, 3),
            actual: (2, 4),
        };
        assert_eq!(
            err.to_string(),
            "spatial shape mismatch: expected (3, 3) (lat, lon), got (2, 4)"
        );
    }
}
