//! Command implementations for the WQT CLI.
//!
//! Provides subcommands for the long-term TN trend analysis and the
//! seasonal-coverage report.

use clap::{Args, Subcommand};
use wqt_data::{SelectionPolicy, TransformPolicy};

pub mod coverage;
pub mod trends;

/// The policy thresholds of the analysis, exposed as flags so a run on
/// another dataset is not stuck with the defaults of this one.
#[derive(Args, Debug, Clone, Copy)]
pub struct PolicyArgs {
    /// TN values at or above this concentration (mg/L) are treated as
    /// outliers and dropped
    #[arg(long, default_value_t = 1.5)]
    pub tn_cutoff: f64,

    /// Minimum distinct sampled years for a station to qualify
    #[arg(long, default_value_t = 10)]
    pub min_total_years: usize,

    /// Minimum sampled years after the recency boundary
    #[arg(long, default_value_t = 2)]
    pub min_recent_years: usize,

    /// Recency boundary: sampled years must be strictly after this year
    #[arg(long, default_value_t = 2014)]
    pub recent_after: i32,
}

impl PolicyArgs {
    pub fn selection(&self) -> SelectionPolicy {
        SelectionPolicy {
            min_total_years: self.min_total_years,
            min_recent_years: self.min_recent_years,
            recent_after: self.recent_after,
        }
    }

    pub fn transform(&self) -> TransformPolicy {
        TransformPolicy {
            tn_cutoff: self.tn_cutoff,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Fit the long-term TN trend models and write tables and charts
    Trends {
        /// Path to the nutrient sample CSV
        #[arg(short = 's', long)]
        samples_csv: String,

        /// Path to the station-name workbook (.xlsx)
        #[arg(short = 'n', long)]
        stations_xlsx: String,

        /// Output directory for charts and the slope table
        #[arg(short = 'o', long, default_value = "out")]
        out_dir: String,

        /// Print tables only; skip chart rendering
        #[arg(long)]
        skip_charts: bool,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Print the station-by-month sample coverage table
    Coverage {
        /// Path to the nutrient sample CSV
        #[arg(short = 's', long)]
        samples_csv: String,

        /// Path to the station-name workbook (.xlsx)
        #[arg(short = 'n', long)]
        stations_xlsx: String,

        #[command(flatten)]
        policy: PolicyArgs,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Trends {
            samples_csv,
            stations_xlsx,
            out_dir,
            skip_charts,
            policy,
        } => trends::run_trends(&samples_csv, &stations_xlsx, &out_dir, skip_charts, &policy),
        Command::Coverage {
            samples_csv,
            stations_xlsx,
            policy,
        } => coverage::run_coverage(&samples_csv, &stations_xlsx, &policy),
    }
}
