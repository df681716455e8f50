//! Analysis configuration loading.
//!
//! Loads an [`AnalysisRequest`] from a YAML file such as:
//!
//! ```yaml
//! baseline:
//!   start_year: 1991
//!   end_year: 2020
//! metric: z_score
//! bbox:
//!   min_lon: -10.0
//!   min_lat: 36.0
//!   max_lon: 4.0
//!   max_lat: 44.0
//! ```

use std::path::Path;

use anomaly_engine::{AnalysisRequest, AnomalyMetric, BoundingBox};
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct RequestOverrides {
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub metric: Option<AnomalyMetric>,
    pub bbox: Option<BoundingBox>,
}

impl RequestOverrides {
    /// Apply every override that is set.
    pub fn apply(&self, request: &mut AnalysisRequest) {
        if let Some(start) = self.start_year {
            request.baseline.start_year = start;
        }
        if let Some(end) = self.end_year {
            request.baseline.end_year = end;
        }
        if let Some(metric) = self.metric {
            request.metric = metric;
        }
        if let Some(bbox) = self.bbox {
            request.bbox = bbox;
        }
    }
}

/// Parse an analysis request from YAML text.
pub fn parse_request(yaml: &str) -> Result<AnalysisRequest> {
    let request: AnalysisRequest =
        serde_yaml::from_str(yaml).context("Failed to parse analysis config")?;
    Ok(request)
}

/// Load an analysis request from a YAML file and apply overrides.
pub fn load_request(path: &Path, overrides: &RequestOverrides) -> Result<AnalysisRequest> {
    debug!(path = %path.display(), "Loading analysis config");

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let mut request =
        parse_request(&contents).with_context(|| format!("Invalid config in {:?}", path))?;

    overrides.apply(&mut request);
    request
        .validate()
        .with_context(|| format!("Invalid analysis request from {:?}", path))?;

    info!(
        baseline = %request.baseline,
        metric = %request.metric,
        bbox = %request.bbox,
        "Loaded analysis config"
    );
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anomaly_engine::BaselinePeriod;
    use std::io::Write;

    const IBERIA_YAML: &str = r#"
baseline:
  start_year: 1991
  end_year: 2020
metric: z_score
bbox:
  min_lon: -10.0
  min_lat: 36.0
  max_lon: 4.0
  max_lat: 44.0
"#;

    #[test]
    fn test_parse_full_request() {
        let request = parse_request(IBERIA_YAML).unwrap();
        assert_eq!(request.baseline, BaselinePeriod::new(1991, 2020));
        assert_eq!(request.metric, AnomalyMetric::ZScore);
        assert_eq!(request.bbox, BoundingBox::new(-10.0, 36.0, 4.0, 44.0));
    }

    #[test]
    fn test_parse_defaults() {
        let request = parse_request("baseline: { start_year: 2000, end_year: 2010 }").unwrap();
        assert_eq!(request.metric, AnomalyMetric::Absolute);
        assert_eq!(request.bbox, BoundingBox::default());
    }

    #[test]
    fn test_parse_missing_baseline_fails() {
        assert!(parse_request("metric: relative").is_err());
    }

    #[test]
    fn test_load_with_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(IBERIA_YAML.as_bytes()).unwrap();

        let overrides = RequestOverrides {
            end_year: Some(2000),
            metric: Some(AnomalyMetric::Relative),
            ..Default::default()
        };
        let request = load_request(file.path(), &overrides).unwrap();
        assert_eq!(request.baseline, BaselinePeriod::new(1991, 2000));
        assert_eq!(request.metric, AnomalyMetric::Relative);
        assert_eq!(request.bbox.min_lon, -10.0);
    }

    #[test]
    fn test_load_rejects_inverted_baseline() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(IBERIA_YAML.as_bytes()).unwrap();

        let overrides = RequestOverrides {
            start_year: Some(2021),
            ..Default::default()
        };
        assert!(load_request(file.path(), &overrides).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_request(Path::new("/nonexistent/analysis.yaml"), &Default::default())
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
