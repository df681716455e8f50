//! Configuration for the anomaly engine.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AnomalyError, Result};
use crate::types::{AnomalyMetric, BaselinePeriod, BoundingBox};

/// Runtime tuning for the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Compute per-pixel grids on the rayon thread pool.
    pub parallel: bool,

    /// Grids smaller than this many cells are always processed serially.
    pub min_parallel_cells: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            min_parallel_cells: 4096,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Unparseable values are logged and the default is kept.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup("ANOMALY_PARALLEL") {
            match val.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => config.parallel = true,
                "false" | "0" | "no" => config.parallel = false,
                _ => warn!(
                    value = %val,
                    default = config.parallel,
                    "Ignoring unparseable ANOMALY_PARALLEL"
                ),
            }
        }

        if let Some(val) = lookup("ANOMALY_MIN_PARALLEL_CELLS") {
            match val.trim().parse() {
                Ok(cells) => config.min_parallel_cells = cells,
                Err(e) => warn!(
                    value = %val,
                    error = %e,
                    default = config.min_parallel_cells,
                    "Ignoring unparseable ANOMALY_MIN_PARALLEL_CELLS"
                ),
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.min_parallel_cells == 0 {
            return Err(AnomalyError::InvalidConfig(
                "min_parallel_cells must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a grid of `cells` cells should be processed in parallel.
    pub fn use_parallel(&self, cells: usize) -> bool {
        self.parallel && cells >= self.min_parallel_cells
    }
}

/// Parameters of one full analysis run: baseline, metric and study area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub baseline: BaselinePeriod,
    #[serde(default)]
    pub metric: AnomalyMetric,
    #[serde(default)]
    pub bbox: BoundingBox,
}

impl AnalysisRequest {
    pub fn new(baseline: BaselinePeriod, metric: AnomalyMetric, bbox: BoundingBox) -> Self {
        Self {
            baseline,
            metric,
            bbox,
        }
    }

    /// Validate the request independently of any series.
    pub fn validate(&self) -> Result<()> {
        if self.baseline.start_year > self.baseline.end_year {
            return Err(AnomalyError::InvalidBaselineRange {
                start: self.baseline.start_year,
                end: self.baseline.end_year,
            });
        }
        if self.bbox.min_lon > self.bbox.max_lon || self.bbox.min_lat > self.bbox.max_lat {
            return Err(AnomalyError::invalid_parameter(
                "bbox",
                format!("minimum exceeds maximum in {}", self.bbox),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.parallel);
        assert_eq!(config.min_parallel_cells, 4096);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = EngineConfig {
            min_parallel_cells: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    fn lookup_from<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_config_from_lookup() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("ANOMALY_PARALLEL", "false"),
            ("ANOMALY_MIN_PARALLEL_CELLS", " 512 "),
        ]));
        assert!(!config.parallel);
        assert_eq!(config.min_parallel_cells, 512);

        let unset = EngineConfig::from_lookup(lookup_from(&[]));
        assert!(unset.parallel);
        assert_eq!(unset.min_parallel_cells, 4096);
    }

    #[test]
    fn test_config_from_lookup_keeps_defaults_on_bad_values() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("ANOMALY_PARALLEL", "sometimes"),
            ("ANOMALY_MIN_PARALLEL_CELLS", "lots"),
        ]));
        assert!(config.parallel);
        assert_eq!(config.min_parallel_cells, 4096);

        let negative = EngineConfig::from_lookup(lookup_from(&[(
            "ANOMALY_MIN_PARALLEL_CELLS",
            "-5",
        )]));
        assert_eq!(negative.min_parallel_cells, 4096);
    }

    #[test]
    fn test_config_from_env() {
        std::env::set_var("ANOMALY_PARALLEL", "0");
        std::env::set_var("ANOMALY_MIN_PARALLEL_CELLS", "128");
        let config = EngineConfig::from_env();
        std::env::remove_var("ANOMALY_PARALLEL");
        std::env::remove_var("ANOMALY_MIN_PARALLEL_CELLS");

        assert!(!config.parallel);
        assert_eq!(config.min_parallel_cells, 128);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_use_parallel_threshold() {
        let config = EngineConfig {
            parallel: true,
            min_parallel_cells: 100,
        };
        assert!(!config.use_parallel(99));
        assert!(config.use_parallel(100));

        let serial = EngineConfig {
            parallel: false,
            ..config
        };
        assert!(!serial.use_parallel(1_000_000));
    }

    #[test]
    fn test_request_validation() {
        let ok = AnalysisRequest::new(
            BaselinePeriod::new(2000, 2010),
            AnomalyMetric::ZScore,
            BoundingBox::new(0.0, 0.0, 1.0, 1.0),
        );
        assert!(ok.validate().is_ok());

        let inverted_years = AnalysisRequest {
            baseline: BaselinePeriod::new(2011, 2010),
            ..ok.clone()
        };
        assert!(matches!(
            inverted_years.validate(),
            Err(AnomalyError::InvalidBaselineRange { .. })
        ));

        let inverted_box = AnalysisRequest {
            bbox: BoundingBox::new(5.0, 0.0, 1.0, 1.0),
            ..ok
        };
        assert!(inverted_box.validate().is_err());
    }
}
