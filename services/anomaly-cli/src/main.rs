//! Soil-moisture anomaly command-line tool.
//!
//! Reads a gridded monthly series from a JSON document and produces:
//! - Monthly climatology baselines (mean, standard deviation, counts)
//! - Absolute, relative or z-score anomaly cubes
//! - Area-averaged anomaly time series over a bounding box
//!
//! Results are written as JSON to stdout or `--output`; logs go to stderr.

mod config;
mod document;

use std::path::PathBuf;

use anomaly_engine::{
    generate_sample, AnalysisRequest, AnomalyEngine, AnomalyMetric, BaselinePeriod, BoundingBox,
    EngineConfig, SampleSpec,
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::{load_request, RequestOverrides};
use document::{
    read_series, write_json, AnalysisDocument, AnomalyDocument, ClimatologyDocument,
    SeriesDocument,
};

#[derive(Parser, Debug)]
#[command(name = "soilmoisture-anomaly")]
#[command(about = "Monthly climatologies and anomalies for gridded soil moisture", long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, global = true, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Write the result here instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Series input and baseline years shared by the analysis commands.
#[derive(Args, Debug)]
struct BaselineArgs {
    /// Path to the series JSON document
    #[arg(short, long)]
    input: PathBuf,

    /// First year of the baseline period (inclusive)
    #[arg(long)]
    start_year: i32,

    /// Last year of the baseline period (inclusive)
    #[arg(long)]
    end_year: i32,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute the monthly climatology over a baseline period
    Climatology {
        #[command(flatten)]
        baseline: BaselineArgs,
    },

    /// Compute anomalies of every time step against a baseline
    Anomalies {
        #[command(flatten)]
        baseline: BaselineArgs,

        /// Metric to write: absolute, relative or zscore
        #[arg(short, long, default_value = "absolute")]
        metric: AnomalyMetric,
    },

    /// Average anomalies over a bounding box for every time step
    SpatialAverage {
        #[command(flatten)]
        baseline: BaselineArgs,

        /// Study area as minLon,minLat,maxLon,maxLat
        #[arg(short, long, allow_hyphen_values = true)]
        bbox: BoundingBox,

        /// Metric to average: absolute, relative or zscore
        #[arg(short, long, default_value = "absolute")]
        metric: AnomalyMetric,
    },

    /// Run the full pipeline from a YAML analysis config
    Analyze {
        /// Path to the series JSON document
        #[arg(short, long)]
        input: PathBuf,

        /// Path to the analysis YAML config
        #[arg(short, long, env = "ANOMALY_CONFIG")]
        config: PathBuf,

        /// Override the baseline start year
        #[arg(long)]
        start_year: Option<i32>,

        /// Override the baseline end year
        #[arg(long)]
        end_year: Option<i32>,

        /// Override the metric
        #[arg(short, long)]
        metric: Option<AnomalyMetric>,

        /// Override the study area (minLon,minLat,maxLon,maxLat)
        #[arg(short, long, allow_hyphen_values = true)]
        bbox: Option<BoundingBox>,
    },

    /// Write a synthetic monthly soil-moisture series
    Sample {
        /// First year of the series
        #[arg(long, default_value = "2000")]
        start_year: i32,

        /// Number of years
        #[arg(long, default_value = "20")]
        years: usize,

        /// Grid columns
        #[arg(long, default_value = "16")]
        width: usize,

        /// Grid rows
        #[arg(long, default_value = "12")]
        height: usize,

        /// Grid extent as minLon,minLat,maxLon,maxLat
        #[arg(long, allow_hyphen_values = true, default_value = "-10,36,4,44")]
        bbox: BoundingBox,

        /// Every n-th cell is missing (0 disables gaps)
        #[arg(long, default_value = "37")]
        gap_every: usize,

        /// Noise seed
        #[arg(long, default_value = "42")]
        seed: u32,
    },
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json)?;

    let engine_config = EngineConfig::from_env();
    let engine = AnomalyEngine::new(engine_config.clone()).context("Invalid engine config")?;
    info!(
        parallel = engine_config.parallel,
        min_parallel_cells = engine_config.min_parallel_cells,
        "Starting soil-moisture anomaly tool"
    );

    let output = cli.output.as_deref();

    match cli.command {
        Commands::Climatology { baseline } => {
            let series = read_series(&baseline.input)?;
            let climatology =
                engine.climatology(&series, baseline.start_year, baseline.end_year)?;
            write_json(&ClimatologyDocument::new(&series, &climatology), output)?;
        }
        Commands::Anomalies { baseline, metric } => {
            let series = read_series(&baseline.input)?;
            let climatology =
                engine.climatology(&series, baseline.start_year, baseline.end_year)?;
            let anomalies = engine.anomalies(&series, &climatology)?;
            write_json(
                &AnomalyDocument::new(&anomalies, metric, &series.metadata().units),
                output,
            )?;
        }
        Commands::SpatialAverage {
            baseline,
            bbox,
            metric,
        } => {
            let series = read_series(&baseline.input)?;
            let request = AnalysisRequest::new(
                BaselinePeriod::new(baseline.start_year, baseline.end_year),
                metric,
                bbox,
            );
            let report = engine.run(&series, &request)?;
            write_json(&report.summary, output)?;
        }
        Commands::Analyze {
            input,
            config,
            start_year,
            end_year,
            metric,
            bbox,
        } => {
            let overrides = RequestOverrides {
                start_year,
                end_year,
                metric,
                bbox,
            };
            let request = load_request(&config, &overrides)?;
            let series = read_series(&input)?;
            let report = engine.run(&series, &request)?;
            write_json(
                &AnalysisDocument::new(&request, &report, &series.metadata().units),
                output,
            )?;
        }
        Commands::Sample {
            start_year,
            years,
            width,
            height,
            bbox,
            gap_every,
            seed,
        } => {
            let spec = SampleSpec {
                start_year,
                years,
                width,
                height,
                bbox,
                gap_every,
                seed,
            };
            let series = generate_sample(&spec)?;
            info!(
                steps = series.len(),
                shape = ?series.spatial_shape(),
                "Generated sample series"
            );
            write_json(&SeriesDocument::from_series(&series), output)?;
        }
    }

    Ok(())
}
