//! JSON documents read and written by the CLI.
//!
//! Missing values travel as `null`. Input series may additionally flag
//! missing cells with a numeric `fill_value`.

use std::fs;
use std::io::Write;
use std::path::Path;

use anomaly_engine::{
    mask_fill_value, AnalysisReport, AnalysisRequest, AnomalyMetric, AnomalySeries,
    BaselinePeriod, ClimatologyBaseline, GriddedTimeSeries, SeriesMetadata, SpatialSummary,
};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use ndarray::{Array3, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Grid rows of nullable values.
pub type Grid = Vec<Vec<Option<f32>>>;

/// A gridded monthly series on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesDocument {
    pub name: String,
    pub units: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_range: Option<(f32, f32)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_value: Option<f32>,
    pub times: Vec<DateTime<Utc>>,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    /// Indexed `[time][lat][lon]`.
    pub values: Vec<Grid>,
}

impl SeriesDocument {
    pub fn from_series(series: &GriddedTimeSeries) -> Self {
        let metadata = series.metadata();
        Self {
            name: metadata.name.clone(),
            units: metadata.units.clone(),
            valid_range: metadata.valid_range,
            fill_value: None,
            times: series.times().to_vec(),
            lats: series.lats().to_vec(),
            lons: series.lons().to_vec(),
            values: cube_to_grids(series.values()),
        }
    }

    /// Convert into a validated series, masking `null` and `fill_value` cells.
    pub fn into_series(self) -> Result<GriddedTimeSeries> {
        let steps = self.values.len();
        let height = self.lats.len();
        let width = self.lons.len();

        let mut flat = Vec::with_capacity(steps * height * width);
        for (t, grid) in self.values.iter().enumerate() {
            if grid.len() != height {
                bail!(
                    "time step {} has {} rows, expected {} (one per latitude)",
                    t,
                    grid.len(),
                    height
                );
            }
            for (row, cells) in grid.iter().enumerate() {
                if cells.len() != width {
                    bail!(
                        "time step {} row {} has {} cells, expected {} (one per longitude)",
                        t,
                        row,
                        cells.len(),
                        width
                    );
                }
                flat.extend(cells.iter().map(|v| v.unwrap_or(f32::NAN)));
            }
        }

        let mut values = Array3::from_shape_vec((steps, height, width), flat)
            .context("series values do not form a (time, lat, lon) cube")?;
        if let Some(fill) = self.fill_value {
            mask_fill_value(&mut values, fill);
        }

        let mut metadata = SeriesMetadata::new(self.name, self.units);
        if let Some((min, max)) = self.valid_range {
            metadata = metadata.with_valid_range(min, max);
        }

        Ok(GriddedTimeSeries::new(
            self.times, self.lats, self.lons, values, metadata,
        )?)
    }
}

/// Monthly baseline statistics.
#[derive(Debug, Clone, Serialize)]
pub struct ClimatologyDocument {
    pub period: BaselinePeriod,
    pub units: String,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    pub months: Vec<MonthDocument>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthDocument {
    pub month: u32,
    pub mean: Grid,
    pub std_dev: Grid,
    pub count: Vec<Vec<u32>>,
}

impl ClimatologyDocument {
    pub fn new(series: &GriddedTimeSeries, baseline: &ClimatologyBaseline) -> Self {
        let months = baseline
            .months()
            .iter()
            .map(|m| MonthDocument {
                month: m.month,
                mean: grid_to_rows(m.mean.view()),
                std_dev: grid_to_rows(m.std_dev.view()),
                count: m.count.outer_iter().map(|row| row.to_vec()).collect(),
            })
            .collect();

        Self {
            period: baseline.period,
            units: series.metadata().units.clone(),
            lats: series.lats().to_vec(),
            lons: series.lons().to_vec(),
            months,
        }
    }
}

/// One anomaly metric over the full series.
#[derive(Debug, Clone, Serialize)]
pub struct AnomalyDocument {
    pub period: BaselinePeriod,
    pub metric: AnomalyMetric,
    pub units: String,
    pub times: Vec<DateTime<Utc>>,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    pub values: Vec<Grid>,
}

impl AnomalyDocument {
    pub fn new(anomalies: &AnomalySeries, metric: AnomalyMetric, observation_units: &str) -> Self {
        Self {
            period: anomalies.period,
            metric,
            units: metric.units(observation_units),
            times: anomalies.times.clone(),
            lats: anomalies.lats.clone(),
            lons: anomalies.lons.clone(),
            values: cube_to_grids(anomalies.metric(metric)),
        }
    }
}

/// Result of a full `analyze` run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisDocument {
    pub request: AnalysisRequest,
    pub summary: SpatialSummary,
    pub anomalies: AnomalyDocument,
}

impl AnalysisDocument {
    pub fn new(request: &AnalysisRequest, report: &AnalysisReport, observation_units: &str) -> Self {
        Self {
            request: request.clone(),
            summary: report.summary.clone(),
            anomalies: AnomalyDocument::new(&report.anomalies, request.metric, observation_units),
        }
    }
}

fn nullable(v: f32) -> Option<f32> {
    if v.is_nan() {
        None
    } else {
        Some(v)
    }
}

fn grid_to_rows(grid: ArrayView2<'_, f32>) -> Grid {
    grid.outer_iter()
        .map(|row| row.iter().copied().map(nullable).collect())
        .collect()
}

fn cube_to_grids(cube: &Array3<f32>) -> Vec<Grid> {
    cube.outer_iter().map(grid_to_rows).collect()
}

/// Read a series document from a JSON file.
pub fn read_series(path: &Path) -> Result<GriddedTimeSeries> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read series file: {:?}", path))?;
    let document: SeriesDocument = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse series file: {:?}", path))?;

    let series = document
        .into_series()
        .with_context(|| format!("Invalid series in {:?}", path))?;
    debug!(
        path = %path.display(),
        steps = series.len(),
        shape = ?series.spatial_shape(),
        "Loaded series"
    );
    Ok(series)
}

/// Serialize `value` as pretty JSON to `output`, or stdout when `None`.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
            debug!(path = %path.display(), "Wrote result");
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", json).context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
