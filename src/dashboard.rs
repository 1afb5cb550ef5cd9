use serde::{Deserialize, Serialize};

use crate::charts::figure::{BarChart, BoxChart, Heatmap, ScatterChart, TopTable};
use crate::charts::{
    BoxGrouping, HeatmapConfig, ScatterConfig, TrendScope, bar_avg_sacks_losses,
    box_sacks_distribution, corr_heatmap, scatter_sacks_vs_margin, scatter_sacks_vs_points,
    top_sacks_table,
};
use crate::color::{ColorMapping, Theme};
use crate::data::filter::{FilterCriteria, OutcomeFilter, TeamSelection, filter_games, filter_outcome};
use crate::data::model::{CategoryColumn, GameTable, Phase};
use crate::stats::correlation::CorrelationMethod;

/// Notice shown instead of a chart when the filters leave no rows.
pub const NO_DATA_NOTICE: &str = "No hay datos con los filtros actuales.";

/// Rows in the top-games table.
pub const TOP_GAMES: usize = 10;

// ---------------------------------------------------------------------------
// Selections – everything the filter panel controls
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selections {
    pub criteria: FilterCriteria,
    pub outcome: OutcomeFilter,
    pub method: CorrelationMethod,
}

impl Selections {
    pub fn defaults_for(table: &GameTable, method: CorrelationMethod) -> Self {
        Selections {
            criteria: FilterCriteria::defaults_for(table),
            outcome: OutcomeFilter::All,
            method,
        }
    }

    /// One-line summary of the active filters.
    pub fn caption(&self) -> String {
        let phases: Vec<&str> = self.criteria.phases.iter().map(Phase::as_str).collect();
        let teams = match &self.criteria.teams {
            TeamSelection::All => "Todos".to_string(),
            TeamSelection::Only(teams) => teams.iter().cloned().collect::<Vec<_>>().join(", "),
        };
        format!(
            "Temporada: {}  |  Fases: {}  |  Equipos: {}",
            self.criteria.season,
            phases.join(", "),
            teams
        )
    }
}

// ---------------------------------------------------------------------------
// Chart slots
// ---------------------------------------------------------------------------

/// What a chart position displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "chart", rename_all = "snake_case")]
pub enum ChartSlot<T> {
    Ready(T),
    NoData,
    Failed(String),
}

impl<T> ChartSlot<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            ChartSlot::Ready(chart) => Some(chart),
            _ => None,
        }
    }

    fn build_if(has_rows: bool, build: impl FnOnce() -> T) -> Self {
        if has_rows { ChartSlot::Ready(build()) } else { ChartSlot::NoData }
    }
}

// ---------------------------------------------------------------------------
// DashboardView – one full recomputation
// ---------------------------------------------------------------------------

/// Both filter stages and all six charts for one set of selections.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub caption: String,
    pub selections: Selections,
    pub filtered_rows: usize,
    pub outcome_rows: usize,
    pub avg_sacks_losses: ChartSlot<BarChart>,
    pub sacks_vs_points: ChartSlot<ScatterChart>,
    pub sacks_distribution: ChartSlot<BoxChart>,
    pub correlations: ChartSlot<Heatmap>,
    pub top_games: ChartSlot<TopTable>,
    pub sacks_vs_margin: ChartSlot<ScatterChart>,
}

impl DashboardView {
    pub fn build(raw: &GameTable, selections: &Selections, theme: &Theme) -> Self {
        let filtered = filter_games(raw, &selections.criteria);
        let outcome_filtered = filter_outcome(&filtered, selections.outcome);
        let has_filtered = !filtered.is_empty();
        let has_outcome = !outcome_filtered.is_empty();
        if !has_outcome {
            log::warn!("Filters leave no rows: {}", selections.caption());
        }

        let many_teams = selections.criteria.teams.is_multi_team();
        let scatter_config = points_scatter_config(many_teams, theme);
        let grouping = if many_teams { BoxGrouping::ByTeam } else { BoxGrouping::ByOutcome };

        let correlations = if has_filtered {
            match corr_heatmap(&filtered, &HeatmapConfig::dashboard(selections.method), theme) {
                Ok(map) => ChartSlot::Ready(map),
                Err(e) => {
                    log::error!("Correlation heatmap failed: {e}");
                    ChartSlot::Failed(e.to_string())
                }
            }
        } else {
            ChartSlot::NoData
        };

        DashboardView {
            caption: selections.caption(),
            selections: selections.clone(),
            filtered_rows: filtered.len(),
            outcome_rows: outcome_filtered.len(),
            avg_sacks_losses: ChartSlot::build_if(has_filtered, || {
                bar_avg_sacks_losses(&filtered, theme)
            }),
            sacks_vs_points: ChartSlot::build_if(has_outcome, || {
                scatter_sacks_vs_points(&outcome_filtered, &scatter_config, theme)
            }),
            sacks_distribution: ChartSlot::build_if(has_outcome, || {
                box_sacks_distribution(&outcome_filtered, grouping, theme)
            }),
            correlations,
            top_games: ChartSlot::build_if(has_filtered, || top_sacks_table(&filtered, TOP_GAMES)),
            sacks_vs_margin: ChartSlot::build_if(has_outcome, || {
                scatter_sacks_vs_margin(&outcome_filtered, theme)
            }),
        }
    }
}

/// Many teams: colour by team, symbol by phase, one overall trend.
/// A single team: colour by phase, symbol by outcome, a trend per trace.
fn points_scatter_config(many_teams: bool, theme: &Theme) -> ScatterConfig {
    if many_teams {
        ScatterConfig {
            color_by: CategoryColumn::Team,
            symbol_by: CategoryColumn::Phase,
            colors: ColorMapping::Sequence(theme.qualitative.clone()),
            trend_scope: TrendScope::Overall,
        }
    } else {
        ScatterConfig {
            color_by: CategoryColumn::Phase,
            symbol_by: CategoryColumn::Outcome,
            colors: ColorMapping::Fixed(
                [
                    (Phase::Regular.to_string(), theme.primary),
                    (Phase::Playoff.to_string(), theme.secondary),
                ]
                .into_iter()
                .collect(),
            ),
            trend_scope: TrendScope::Trace,
        }
    }
}
