use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enumerated cells
// ---------------------------------------------------------------------------

/// Game category: regular season or playoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Regular,
    Playoff,
}

impl Phase {
    pub const ALL: [Phase; 2] = [Phase::Regular, Phase::Playoff];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Regular => "regular",
            Phase::Playoff => "playoff",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" | "reg" => Some(Phase::Regular),
            "playoff" | "playoffs" | "post" => Some(Phase::Playoff),
            _ => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the described team won or lost the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "win" | "w" => Some(Outcome::Win),
            "loss" | "l" => Some(Outcome::Loss),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Home/away label shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Location {
    Casa,
    Visitante,
}

impl Location {
    pub fn from_is_home(is_home: bool) -> Self {
        if is_home {
            Location::Casa
        } else {
            Location::Visitante
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Casa => "Casa",
            Location::Visitante => "Visitante",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Casa" | "casa" => Some(Location::Casa),
            "Visitante" | "visitante" => Some(Location::Visitante),
            _ => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GameRecord – one row of the processed table
// ---------------------------------------------------------------------------

/// One team-game observation. Unique per (`partido_id`, `team_abbr`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRecord {
    pub season: i32,
    pub week: u32,
    pub phase: Phase,
    pub team_abbr: String,
    pub local_team_name: String,
    pub visitante_team_name: String,
    pub partido_id: String,
    pub fecha: NaiveDate,
    pub is_home: bool,
    pub loc_vi: Location,
    pub resultado: Outcome,
    /// Sacks allowed by the team's offense.
    pub sacks_permitidos: u32,
    /// NaN when the source cell was blank.
    pub pct_sacks: f64,
    pub puntos_anotados: u32,
    /// Signed point differential from this team's point of view.
    pub margin: i32,
}

// ---------------------------------------------------------------------------
// Column selectors used by the chart builders
// ---------------------------------------------------------------------------

/// Categorical columns a chart can group, colour or symbol by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryColumn {
    Team,
    Phase,
    Outcome,
}

impl CategoryColumn {
    pub fn name(&self) -> &'static str {
        match self {
            CategoryColumn::Team => "team_abbr",
            CategoryColumn::Phase => "phase",
            CategoryColumn::Outcome => "resultado",
        }
    }

    /// Column name with underscores replaced and each word capitalised.
    pub fn title(&self) -> String {
        self.name()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn value(&self, rec: &GameRecord) -> String {
        match self {
            CategoryColumn::Team => rec.team_abbr.clone(),
            CategoryColumn::Phase => rec.phase.to_string(),
            CategoryColumn::Outcome => rec.resultado.to_string(),
        }
    }
}

/// Numeric columns available to the scatter plots and the correlation heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericColumn {
    SacksAllowed,
    SackPct,
    Margin,
    PointsScored,
}

impl NumericColumn {
    /// The four columns correlated on the dashboard.
    pub const DASHBOARD: [NumericColumn; 4] = [
        NumericColumn::SacksAllowed,
        NumericColumn::SackPct,
        NumericColumn::Margin,
        NumericColumn::PointsScored,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NumericColumn::SacksAllowed => "sacks_permitidos",
            NumericColumn::SackPct => "pct_sacks",
            NumericColumn::Margin => "margin",
            NumericColumn::PointsScored => "puntos_anotados",
        }
    }

    pub fn value(&self, rec: &GameRecord) -> f64 {
        match self {
            NumericColumn::SacksAllowed => rec.sacks_permitidos as f64,
            NumericColumn::SackPct => rec.pct_sacks,
            NumericColumn::Margin => rec.margin as f64,
            NumericColumn::PointsScored => rec.puntos_anotados as f64,
        }
    }
}

// ---------------------------------------------------------------------------
// GameTable – an immutable set of rows
// ---------------------------------------------------------------------------

/// A loaded or filtered table with pre-computed distinct values for the
/// selectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameTable {
    rows: Vec<GameRecord>,
    seasons: BTreeSet<i32>,
    phases: BTreeSet<Phase>,
    teams: BTreeSet<String>,
}

impl GameTable {
    /// Build the distinct-value indices from the rows.
    pub fn from_records(rows: Vec<GameRecord>) -> Self {
        let mut seasons = BTreeSet::new();
        let mut phases = BTreeSet::new();
        let mut teams = BTreeSet::new();
        for rec in &rows {
            seasons.insert(rec.season);
            phases.insert(rec.phase);
            teams.insert(rec.team_abbr.clone());
        }
        GameTable {
            rows,
            seasons,
            phases,
            teams,
        }
    }

    pub fn rows(&self) -> &[GameRecord] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GameRecord> {
        self.rows.iter()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn seasons(&self) -> &BTreeSet<i32> {
        &self.seasons
    }

    pub fn phases(&self) -> &BTreeSet<Phase> {
        &self.phases
    }

    pub fn teams(&self) -> &BTreeSet<String> {
        &self.teams
    }

    /// Inclusive `(min, max)` of `sacks_permitidos`, `None` when empty.
    pub fn sacks_range(&self) -> Option<(u32, u32)> {
        let min = self.rows.iter().map(|r| r.sacks_permitidos).min()?;
        let max = self.rows.iter().map(|r| r.sacks_permitidos).max()?;
        Some((min, max))
    }

    /// Values of a numeric column in row order.
    pub fn numeric(&self, column: NumericColumn) -> Vec<f64> {
        self.rows.iter().map(|r| column.value(r)).collect()
    }
}

impl<'a> IntoIterator for &'a GameTable {
    type Item = &'a GameRecord;
    type IntoIter = std::slice::Iter<'a, GameRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
