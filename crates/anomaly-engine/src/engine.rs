//! Configured entry point chaining climatology, anomalies and area averages.

use tracing::info;

use crate::anomaly::{compute_anomalies_with_config, AnomalySeries};
use crate::climatology::{compute_climatology, ClimatologyBaseline};
use crate::config::{AnalysisRequest, EngineConfig};
use crate::error::Result;
use crate::series::GriddedTimeSeries;
use crate::spatial::{spatial_average, SpatialSummary};
use crate::types::{AnomalyMetric, BoundingBox};

/// Everything one analysis run produces.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub baseline: ClimatologyBaseline,
    pub anomalies: AnomalySeries,
    pub summary: SpatialSummary,
}

/// Stateless anomaly calculator carrying only its tuning.
#[derive(Debug, Clone, Default)]
pub struct AnomalyEngine {
    config: EngineConfig,
}

impl AnomalyEngine {
    /// Create an engine after validating its configuration.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn climatology(
        &self,
        series: &GriddedTimeSeries,
        start_year: i32,
        end_year: i32,
    ) -> Result<ClimatologyBaseline> {
        compute_climatology(series, start_year, end_year)
    }

    pub fn anomalies(
        &self,
        series: &GriddedTimeSeries,
        baseline: &ClimatologyBaseline,
    ) -> Result<AnomalySeries> {
        compute_anomalies_with_config(series, baseline, &self.config)
    }

    pub fn spatial_average(
        &self,
        anomalies: &AnomalySeries,
        bbox: &BoundingBox,
        metric: AnomalyMetric,
    ) -> Result<SpatialSummary> {
        spatial_average(anomalies, bbox, metric)
    }

    /// Run baseline, anomalies and area average for one request.
    pub fn run(
        &self,
        series: &GriddedTimeSeries,
        request: &AnalysisRequest,
    ) -> Result<AnalysisReport> {
        request.validate()?;

        let baseline = self.climatology(
            series,
            request.baseline.start_year,
            request.baseline.end_year,
        )?;
        let anomalies = self.anomalies(series, &baseline)?;
        let summary = self.spatial_average(&anomalies, &request.bbox, request.metric)?;

        info!(
            period = %request.baseline,
            metric = %request.metric,
            bbox = %request.bbox,
            steps = anomalies.len(),
            pixels = summary.pixel_count,
            "Analysis complete"
        );

        Ok(AnalysisReport {
            baseline,
            anomalies,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnomalyError;
    use crate::sample::{generate_sample, SampleSpec};
    use crate::types::BaselinePeriod;

    #[test]
    fn test_engine_rejects_bad_config() {
        let config = EngineConfig {
            min_parallel_cells: 0,
            ..Default::default()
        };
        assert!(AnomalyEngine::new(config).is_err());
    }

    #[test]
    fn test_run_full_pipeline() {
        let spec = SampleSpec {
            years: 4,
            ..Default::default()
        };
        let series = generate_sample(&spec).unwrap();
        let engine = AnomalyEngine::default();
        let request = AnalysisRequest::new(
            BaselinePeriod::new(2000, 2002),
            AnomalyMetric::ZScore,
            spec.bbox,
        );

        let report = engine.run(&series, &request).unwrap();
        assert_eq!(report.baseline.months().len(), 12);
        assert_eq!(report.anomalies.len(), 48);
        assert_eq!(report.summary.len(), 48);
        assert_eq!(report.summary.pixel_count, spec.width * spec.height);
        assert_eq!(report.summary.metric, AnomalyMetric::ZScore);
    }

    #[test]
    fn test_run_validates_request() {
        let series = generate_sample(&SampleSpec {
            years: 2,
            ..Default::default()
        })
        .unwrap();
        let request = AnalysisRequest::new(
            BaselinePeriod::new(2001, 2000),
            AnomalyMetric::Absolute,
            BoundingBox::default(),
        );
        assert!(matches!(
            AnomalyEngine::default().run(&series, &request),
            Err(AnomalyError::InvalidBaselineRange { .. })
        ));
    }

    #[test]
    fn test_run_empty_area() {
        let series = generate_sample(&SampleSpec {
            years: 2,
            ..Default::default()
        })
        .unwrap();
        let request = AnalysisRequest::new(
            BaselinePeriod::new(2000, 2001),
            AnomalyMetric::Absolute,
            BoundingBox::new(100.0, 0.0, 110.0, 10.0),
        );
        assert!(matches!(
            AnomalyEngine::default().run(&series, &request),
            Err(AnomalyError::EmptySelection(_))
        ));
    }
}
