use std::collections::BTreeMap;

use super::figure::{Bar, BarChart, Labels};
use crate::color::Theme;
use crate::data::model::{GameTable, Outcome};
use crate::stats::mean;

/// Mean sacks allowed per team over its losses, highest first.
///
/// Teams without a loss in `table` get no bar. Equal averages keep
/// alphabetical team order.
pub fn bar_avg_sacks_losses(table: &GameTable, theme: &Theme) -> BarChart {
    let mut by_team: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for rec in table.iter().filter(|r| r.resultado == Outcome::Loss) {
        by_team
            .entry(rec.team_abbr.as_str())
            .or_default()
            .push(rec.sacks_permitidos as f64);
    }

    let mut bars: Vec<Bar> = by_team
        .into_iter()
        .filter_map(|(team, sacks)| {
            Some(Bar {
                category: team.to_string(),
                value: mean(&sacks)?,
            })
        })
        .collect();
    bars.sort_by(|a, b| b.value.total_cmp(&a.value));

    BarChart {
        labels: Labels::new("Sacks promedio en derrotas", "Equipo", "Sacks promedio"),
        color: theme.danger,
        bars,
    }
}
