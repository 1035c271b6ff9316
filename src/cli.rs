use std::path::PathBuf;

use clap::{Parser, Subcommand};

use exceedance_service::export::ExportFormat;
use exceedance_service::variables::{VariableCategory, VariableId};

/// Historical exceedance probabilities for daily weather variables.
#[derive(Parser)]
#[command(
    name = "exceedance",
    version,
    about = "Empirical probability that a daily weather variable exceeds a threshold around a calendar date"
)]
pub struct Cli {
    /// Log debug output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Run an exceedance analysis.
    Analyze(AnalyzeArgs),
    /// List supported weather variables.
    Variables(VariablesArgs),
    /// Check which variables the archive serves at a location.
    Verify(VerifyArgs),
}

/// Arguments for the `analyze` subcommand.
#[derive(clap::Args)]
pub struct AnalyzeArgs {
    /// Latitude in decimal degrees (-90 to 90).
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in decimal degrees (-180 to 180).
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Target month (1-12).
    #[arg(long)]
    pub month: u32,

    /// Target day of month.
    #[arg(long)]
    pub day: u32,

    /// Days either side of the target date (0-30).
    #[arg(short, long, default_value_t = 3)]
    pub window: u32,

    /// Threshold the yearly maximum must strictly exceed.
    #[arg(short, long, allow_hyphen_values = true)]
    pub threshold: f64,

    /// Variable code, e.g. T2M_MAX or PRECTOTCORR.
    #[arg(long = "variable", default_value = "T2M_MAX")]
    pub variable: VariableId,

    /// Replay a saved POWER JSON response instead of calling the API.
    #[arg(long)]
    pub payload: Option<PathBuf>,

    /// Output format: summary, json, or csv.
    #[arg(short, long, default_value = "summary")]
    pub format: ExportFormat,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `variables` subcommand.
#[derive(clap::Args)]
pub struct VariablesArgs {
    /// Only list variables in this category.
    #[arg(long)]
    pub category: Option<VariableCategory>,
}

/// Arguments for the `verify` subcommand.
#[derive(clap::Args)]
pub struct VerifyArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Year to probe; defaults to the last year of the analysis range.
    #[arg(long)]
    pub year: Option<i32>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}
