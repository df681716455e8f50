//! Shared test utilities for the soil-moisture anomaly workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Monthly time axes and data-cube generators
//! - Common bounding boxes and grid layouts
//! - Approximate-equality and missing-value assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, monthly_times, fixtures};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert that a value is the missing sentinel (`NaN`), not a number or infinity.
///
/// ```ignore
/// use test_utils::assert_missing;
///
/// assert_missing!(f32::NAN);
/// ```
#[macro_export]
macro_rules! assert_missing {
    ($value:expr) => {{
        let value: f64 = $value as f64;
        if !value.is_nan() {
            panic!("assertion failed: expected missing (NaN), got `{:?}`", value);
        }
    }};
    ($value:expr, $($arg:tt)+) => {{
        let value: f64 = $value as f64;
        if !value.is_nan() {
            panic!(
                "assertion failed: expected missing (NaN), got `{:?}`: {}",
                value,
                format!($($arg)+)
            );
        }
    }};
}

/// Assert that two float sequences are equal, treating `NaN == NaN`.
///
/// ```ignore
/// use test_utils::assert_same_values;
///
/// assert_same_values!([1.0, f32::NAN], [1.0, f32::NAN]);
/// ```
#[macro_export]
macro_rules! assert_same_values {
    ($left:expr, $right:expr) => {{
        let left: Vec<f64> = $left.into_iter().map(|v| v as f64).collect();
        let right: Vec<f64> = $right.into_iter().map(|v| v as f64).collect();
        assert_eq!(left.len(), right.len(), "length mismatch");
        for (i, (l, r)) in left.iter().zip(right.iter()).enumerate() {
            let same = (l.is_nan() && r.is_nan()) || l == r;
            if !same {
                panic!(
                    "assertion failed: values differ at index {}: `{:?}` != `{:?}`",
                    i, l, r
                );
            }
        }
    }};
}
