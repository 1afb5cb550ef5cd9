use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::color::Theme;
use crate::dashboard::{DashboardView, Selections};
use crate::data::cache::TableCache;
use crate::data::filter::{OutcomeFilter, TeamSelection};
use crate::data::loader::LoadError;
use crate::data::model::{GameTable, Phase};
use crate::stats::correlation::CorrelationMethod;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Tables loaded this session, memoized by path.
    pub cache: TableCache,

    /// Path of the active table.
    pub data_path: Option<PathBuf>,

    /// Active table (None until a file loads).
    pub table: Option<Arc<GameTable>>,

    /// Current filter panel selections.
    pub selections: Option<Selections>,

    /// Charts for the current selections (cached until the next change).
    pub view: Option<DashboardView>,

    pub theme: Theme,

    /// Correlation method applied when a new table is loaded.
    pub default_method: CorrelationMethod,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            cache: TableCache::new(),
            data_path: None,
            table: None,
            selections: None,
            view: None,
            theme: Theme::default(),
            default_method: CorrelationMethod::default(),
            status_message: None,
        }
    }
}

impl AppState {
    pub fn new(default_method: CorrelationMethod) -> Self {
        Self {
            default_method,
            ..Self::default()
        }
    }

    /// Load (or fetch from the cache) the table at `path` and make it active.
    pub fn open_path(&mut self, path: &Path) -> Result<(), LoadError> {
        match self.cache.load(path) {
            Ok(table) => {
                log::debug!("{} table(s) cached", self.cache.len());
                self.set_table(path.to_path_buf(), table);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
                Err(e)
            }
        }
    }

    /// Ingest a loaded table, reset the selections and recompute.
    pub fn set_table(&mut self, path: PathBuf, table: Arc<GameTable>) {
        let method = self
            .selections
            .as_ref()
            .map(|s| s.method)
            .unwrap_or(self.default_method);
        self.selections = Some(Selections::defaults_for(&table, method));
        self.table = Some(table);
        self.data_path = Some(path);
        self.status_message = None;
        self.refresh();
    }

    /// Rebuild every chart from the current selections.
    pub fn refresh(&mut self) {
        self.view = match (&self.table, &self.selections) {
            (Some(table), Some(selections)) => {
                Some(DashboardView::build(table, selections, &self.theme))
            }
            _ => None,
        };
    }

    /// Apply `change` to the selections and recompute when anything changed.
    pub fn update_selections(&mut self, change: impl FnOnce(&mut Selections)) {
        let Some(selections) = self.selections.as_mut() else {
            return;
        };
        let before = selections.clone();
        change(selections);
        if *selections != before {
            log::debug!("Selections changed: {}", selections.caption());
            self.refresh();
        }
    }

    pub fn set_season(&mut self, season: i32) {
        self.update_selections(|s| s.criteria.season = season);
    }

    /// Toggle a phase in the phase filter.
    pub fn toggle_phase(&mut self, phase: Phase) {
        self.update_selections(|s| {
            if !s.criteria.phases.remove(&phase) {
                s.criteria.phases.insert(phase);
            }
        });
    }

    /// "All teams" checkbox: on bypasses the team filter, off starts an empty
    /// team selection.
    pub fn set_all_teams(&mut self, all: bool) {
        self.update_selections(|s| {
            s.criteria.teams = if all {
                TeamSelection::All
            } else {
                TeamSelection::Only(BTreeSet::new())
            };
        });
    }

    /// Toggle a single team in an explicit team selection.
    pub fn toggle_team(&mut self, team: &str) {
        self.update_selections(|s| {
            if let TeamSelection::Only(teams) = &mut s.criteria.teams {
                if !teams.remove(team) {
                    teams.insert(team.to_string());
                }
            }
        });
    }

    pub fn set_outcome(&mut self, outcome: OutcomeFilter) {
        self.update_selections(|s| s.outcome = outcome);
    }

    pub fn set_min_sacks(&mut self, min_sacks: u32) {
        self.update_selections(|s| s.criteria.min_sacks = min_sacks);
    }

    pub fn set_method(&mut self, method: CorrelationMethod) {
        self.update_selections(|s| s.method = method);
    }
}
