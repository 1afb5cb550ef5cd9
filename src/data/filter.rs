use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::{GameRecord, GameTable, Outcome, Phase};

// ---------------------------------------------------------------------------
// Filter criteria
// ---------------------------------------------------------------------------

/// Which teams pass the team predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamSelection {
    /// Bypass the team predicate.
    All,
    /// Keep only these team codes. An empty set falls back to every team.
    Only(BTreeSet<String>),
}

impl TeamSelection {
    fn admits(&self, team: &str) -> bool {
        match self {
            TeamSelection::All => true,
            TeamSelection::Only(teams) => teams.is_empty() || teams.contains(team),
        }
    }

    /// True for `All` or more than one selected team. An empty explicit
    /// selection admits every row but still counts as a single-team view.
    pub fn is_multi_team(&self) -> bool {
        match self {
            TeamSelection::All => true,
            TeamSelection::Only(teams) => teams.len() > 1,
        }
    }
}

/// Conjunction of the four primary predicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub season: i32,
    /// Allowed phases; an empty set admits nothing.
    pub phases: BTreeSet<Phase>,
    pub teams: TeamSelection,
    /// Inclusive lower bound on `sacks_permitidos`.
    pub min_sacks: u32,
}

impl FilterCriteria {
    /// Initial selection: most recent season, every phase, all teams, no
    /// sacks threshold.
    pub fn defaults_for(table: &GameTable) -> Self {
        FilterCriteria {
            season: table.seasons().iter().next_back().copied().unwrap_or_default(),
            phases: table.phases().clone(),
            teams: TeamSelection::All,
            min_sacks: 0,
        }
    }

    pub fn matches(&self, rec: &GameRecord) -> bool {
        rec.season == self.season
            && self.phases.contains(&rec.phase)
            && self.teams.admits(&rec.team_abbr)
            && rec.sacks_permitidos >= self.min_sacks
    }
}

/// Secondary filter on match outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeFilter {
    #[default]
    All,
    Win,
    Loss,
}

impl OutcomeFilter {
    pub const ALL: [OutcomeFilter; 3] = [OutcomeFilter::All, OutcomeFilter::Win, OutcomeFilter::Loss];

    pub fn label(&self) -> &'static str {
        match self {
            OutcomeFilter::All => "all",
            OutcomeFilter::Win => "win",
            OutcomeFilter::Loss => "loss",
        }
    }

    fn outcome(&self) -> Option<Outcome> {
        match self {
            OutcomeFilter::All => None,
            OutcomeFilter::Win => Some(Outcome::Win),
            OutcomeFilter::Loss => Some(Outcome::Loss),
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Return indices of rows that pass all four predicates, in table order.
pub fn filtered_indices(table: &GameTable, criteria: &FilterCriteria) -> Vec<usize> {
    table
        .iter()
        .enumerate()
        .filter(|(_, rec)| criteria.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// New table with the rows passing `criteria`. An empty result is a valid,
/// empty table.
pub fn filter_games(table: &GameTable, criteria: &FilterCriteria) -> GameTable {
    let rows = filtered_indices(table, criteria)
        .into_iter()
        .map(|i| table.rows()[i].clone())
        .collect();
    GameTable::from_records(rows)
}

/// Narrow by exact outcome; `OutcomeFilter::All` returns an identical copy.
pub fn filter_outcome(table: &GameTable, selector: OutcomeFilter) -> GameTable {
    match selector.outcome() {
        None => table.clone(),
        Some(outcome) => GameTable::from_records(
            table
                .iter()
                .filter(|rec| rec.resultado == outcome)
                .cloned()
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::game;

    fn sample() -> GameTable {
        let mut rows = Vec::new();
        for (i, team) in ["KC", "BUF", "PHI", "SF"].iter().enumerate() {
            for sacks in 0..4u32 {
                let mut rec = game(team, if sacks % 2 == 0 { Outcome::Win } else { Outcome::Loss }, sacks);
                rec.season = if i % 2 == 0 { 2023 } else { 2022 };
                rec.phase = if sacks == 3 { Phase::Playoff } else { Phase::Regular };
                rec.partido_id = format!("{team}-{sacks}");
                rows.push(rec);
            }
        }
        GameTable::from_records(rows)
    }

    fn criteria(season: i32) -> FilterCriteria {
        FilterCriteria {
            season,
            phases: Phase::ALL.into_iter().collect(),
            teams: TeamSelection::All,
            min_sacks: 0,
        }
    }

    #[test]
    fn test_filter_is_exact_subset() {
        let table = sample();
        let c = FilterCriteria {
            season: 2023,
            phases: [Phase::Regular].into_iter().collect(),
            teams: TeamSelection::Only(["KC".to_string(), "SF".to_string()].into_iter().collect()),
            min_sacks: 1,
        };

        let out = filter_games(&table, &c);
        assert!(out.iter().all(|r| c.matches(r)));
        // No qualifying row is dropped.
        let expected = table.iter().filter(|r| c.matches(r)).count();
        assert_eq!(out.len(), expected);
        assert_eq!(out.len(), 2);
        // Original order preserved.
        let ids: Vec<_> = out.iter().map(|r| r.partido_id.as_str()).collect();
        assert_eq!(ids, vec!["KC-1", "KC-2"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let table = sample();
        let c = FilterCriteria {
            min_sacks: 2,
            ..criteria(2022)
        };
        let once = filter_games(&table, &c);
        let twice = filter_games(&once, &c);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_phase_set_yields_nothing() {
        let c = FilterCriteria {
            phases: BTreeSet::new(),
            ..criteria(2023)
        };
        assert!(filter_games(&sample(), &c).is_empty());
    }

    #[test]
    fn test_empty_team_selection_admits_all() {
        let table = sample();
        let all = filter_games(&table, &criteria(2023));
        let none_ticked = filter_games(
            &table,
            &FilterCriteria {
                teams: TeamSelection::Only(BTreeSet::new()),
                ..criteria(2023)
            },
        );
        assert_eq!(all, none_ticked);
    }

    #[test]
    fn test_impossible_season_is_empty_not_error() {
        let out = filter_games(&sample(), &criteria(1899));
        assert!(out.is_empty());
        assert_eq!(out.sacks_range(), None);
    }

    #[test]
    fn test_outcome_filter() {
        let table = filter_games(&sample(), &criteria(2023));
        assert_eq!(filter_outcome(&table, OutcomeFilter::All), table);

        let losses = filter_outcome(&table, OutcomeFilter::Loss);
        assert_eq!(losses.len(), 4);
        assert!(losses.iter().all(|r| r.resultado == Outcome::Loss));
    }

    #[test]
    fn test_defaults_pick_latest_season() {
        let table = sample();
        let c = FilterCriteria::defaults_for(&table);
        assert_eq!(c.season, 2023);
        assert_eq!(c.phases.len(), 2);
        assert_eq!(c.teams, TeamSelection::All);
        assert_eq!(filter_games(&table, &c).len(), 8);
    }

    #[test]
    fn test_multi_team() {
        assert!(TeamSelection::All.is_multi_team());
        assert!(!TeamSelection::Only(["KC".to_string()].into_iter().collect()).is_multi_team());
        let two: BTreeSet<String> = ["KC".to_string(), "SF".to_string()].into_iter().collect();
        assert!(TeamSelection::Only(two).is_multi_team());
        // Nothing ticked admits every team but is not a many-team view.
        assert!(!TeamSelection::Only(BTreeSet::new()).is_multi_team());
    }
}
