//! Monthly climatology and anomaly computation for gridded satellite data.
//!
//! The crate turns a [`GriddedTimeSeries`] (e.g. monthly ESA CCI soil moisture)
//! into a per-month [`ClimatologyBaseline`], then into an [`AnomalySeries`]
//! holding absolute, relative and standardized anomalies for every cell, and
//! finally into area-averaged [`SpatialSummary`] time series.
//!
//! # Architecture
//!
//! ```text
//! GriddedTimeSeries (time, lat, lon)
//!      │
//!      ▼
//! compute_climatology(series, start_year, end_year)
//!      │   group baseline steps by calendar month,
//!      │   per-pixel mean / sample std (NaN-aware)
//!      ▼
//! ClimatologyBaseline (12 × lat × lon)
//!      │
//!      ▼
//! compute_anomalies(series, baseline)
//!      │   absolute, relative %, z-score per cell
//!      ▼
//! AnomalySeries (time, lat, lon) × 3
//!      │
//!      ▼
//! spatial_average(anomalies, bbox, metric)
//!      ▼
//! SpatialSummary (mean, std per time step)
//! ```
//!
//! Missing observations are `NaN` and propagate through every stage. A zero
//! or missing denominator yields `NaN`, never infinity.
//!
//! # Example
//!
//! ```ignore
//! use anomaly_engine::{compute_anomalies, compute_climatology, spatial_average};
//! use anomaly_engine::{AnomalyMetric, BoundingBox};
//!
//! let baseline = compute_climatology(&series, 1991, 2020)?;
//! let anomalies = compute_anomalies(&series, &baseline)?;
//! let bbox = BoundingBox::new(-10.0, 36.0, 4.0, 44.0);
//! let summary = spatial_average(&anomalies, &bbox, AnomalyMetric::ZScore)?;
//! ```

pub mod anomaly;
pub mod climatology;
pub mod config;
pub mod engine;
pub mod error;
pub mod sample;
pub mod series;
pub mod spatial;
pub mod types;

// Re-export commonly used types at crate root
pub use anomaly::{cell_anomaly, compute_anomalies, compute_anomalies_with_config, AnomalySeries};
pub use climatology::{compute_climatology, ClimatologyBaseline, MonthlyClimatology};
pub use config::{AnalysisRequest, EngineConfig};
pub use engine::{AnalysisReport, AnomalyEngine};
pub use error::{AnomalyError, Result};
pub use sample::{generate_sample, SampleSpec};
pub use series::{mask_fill_value, GriddedTimeSeries};
pub use spatial::{spatial_average, SpatialSummary};
pub use types::{AnomalyMetric, BaselinePeriod, BoundingBox, SeriesMetadata};
