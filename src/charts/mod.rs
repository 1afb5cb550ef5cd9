//! Chart builders: pure functions from tables to serializable figure
//! descriptions. Drawing lives in `ui::charts`.

pub mod bar;
pub mod boxplot;
pub mod figure;
pub mod heatmap;
pub mod scatter;
pub mod table;

use thiserror::Error;

use crate::stats::cluster::ClusterError;
use crate::stats::correlation::CorrelationMethod;

pub use bar::bar_avg_sacks_losses;
pub use boxplot::{BoxGrouping, box_sacks_distribution};
pub use heatmap::{HeatmapConfig, corr_heatmap};
pub use scatter::{ScatterConfig, TrendScope, scatter_sacks_vs_margin, scatter_sacks_vs_points};
pub use table::top_sacks_table;

/// Numeric failures while building a chart.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("{method} correlation involving '{column}' is undefined, cannot order the heatmap")]
    NonFiniteCorrelation {
        column: String,
        method: CorrelationMethod,
    },
    #[error("clustering failed: {0}")]
    Cluster(#[from] ClusterError),
}
