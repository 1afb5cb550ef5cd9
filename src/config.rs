use std::path::PathBuf;

use clap::Parser;

use crate::stats::correlation::CorrelationMethod;

/// Command line / environment configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "sacks-dashboard")]
#[command(about = "NFL sacks analysis dashboard (games decided by 8+ points)", long_about = None)]
pub struct DashboardConfig {
    /// Processed game table (.csv or .parquet)
    #[arg(value_name = "DATA", env = "NFL_SACKS_DATA", default_value = "processed_data.csv")]
    pub data: PathBuf,

    /// Initial correlation method for the heatmap
    #[arg(short, long, value_enum, default_value_t = CorrelationMethod::Pearson)]
    pub method: CorrelationMethod,

    /// Write the default dashboard view as JSON to FILE and exit
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl DashboardConfig {
    /// Default log filter; `RUST_LOG` still takes precedence.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
