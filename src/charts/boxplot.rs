use serde::{Deserialize, Serialize};

use super::figure::{BoxChart, BoxGroup, Labels};
use crate::color::{ColorMap, Theme};
use crate::data::model::{CategoryColumn, GameTable};
use crate::stats::BoxSummary;

/// X-axis grouping of the sacks distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoxGrouping {
    /// One box per team and outcome.
    ByTeam,
    /// One box per outcome.
    ByOutcome,
}

/// Distribution of sacks allowed, coloured by outcome.
pub fn box_sacks_distribution(table: &GameTable, grouping: BoxGrouping, theme: &Theme) -> BoxChart {
    let (x_column, labels) = match grouping {
        BoxGrouping::ByTeam => (
            CategoryColumn::Team,
            Labels::new("Sacks por equipo y resultado", "Equipo", "Sacks recibidos"),
        ),
        BoxGrouping::ByOutcome => (
            CategoryColumn::Outcome,
            Labels::new("Sacks en victorias vs derrotas", "Resultado", "Sacks recibidos"),
        ),
    };
    let series_column = CategoryColumn::Outcome;

    // (category, series) → values, in first-appearance order.
    let mut categories: Vec<String> = Vec::new();
    let mut series: Vec<String> = Vec::new();
    let mut groups: Vec<(String, String, Vec<f64>)> = Vec::new();
    for rec in table {
        let category = x_column.value(rec);
        let serie = series_column.value(rec);
        if !categories.contains(&category) {
            categories.push(category.clone());
        }
        if !series.contains(&serie) {
            series.push(serie.clone());
        }
        let value = rec.sacks_permitidos as f64;
        match groups.iter_mut().find(|(c, s, _)| *c == category && *s == serie) {
            Some((_, _, values)) => values.push(value),
            None => groups.push((category, serie, vec![value])),
        }
    }

    let colors = ColorMap::new(
        &theme.outcome_mapping(),
        series.iter().map(String::as_str),
        theme,
    );

    // Display order: categories first, then series within a category.
    let mut boxes = Vec::with_capacity(groups.len());
    for category in &categories {
        for serie in &series {
            let Some((_, _, values)) = groups.iter().find(|(c, s, _)| c == category && s == serie)
            else {
                continue;
            };
            if let Some(summary) = BoxSummary::from_values(values) {
                boxes.push(BoxGroup {
                    category: category.clone(),
                    series: serie.clone(),
                    color: colors.color_for(serie),
                    summary,
                });
            }
        }
    }

    BoxChart {
        labels,
        categories,
        series,
        boxes,
    }
}
