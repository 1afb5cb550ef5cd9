use serde::{Deserialize, Serialize};

use super::figure::{
    Labels, MarkerSymbol, ReferenceLine, ScatterChart, ScatterPoint, ScatterTrace, TrendLine,
};
use crate::color::{ColorMap, ColorMapping, Rgb, Theme};
use crate::data::model::{CategoryColumn, GameRecord, GameTable, NumericColumn};
use crate::stats::LinearFit;

/// Whether the OLS trend is fitted once or per trace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendScope {
    #[default]
    Overall,
    Trace,
}

/// Fields attached to each point for hover display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoverField {
    MatchId,
    Week,
    Phase,
    Outcome,
    Team,
}

impl HoverField {
    fn entry(&self, rec: &GameRecord) -> (String, String) {
        let (name, value) = match self {
            HoverField::MatchId => ("partido_id", rec.partido_id.clone()),
            HoverField::Week => ("week", rec.week.to_string()),
            HoverField::Phase => ("phase", rec.phase.to_string()),
            HoverField::Outcome => ("resultado", rec.resultado.to_string()),
            HoverField::Team => ("team_abbr", rec.team_abbr.clone()),
        };
        (name.to_string(), value)
    }
}

/// Styling of the sacks-vs-points scatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterConfig {
    pub color_by: CategoryColumn,
    pub symbol_by: CategoryColumn,
    pub colors: ColorMapping,
    pub trend_scope: TrendScope,
}

/// Sacks allowed (x) against points scored (y).
pub fn scatter_sacks_vs_points(
    table: &GameTable,
    config: &ScatterConfig,
    theme: &Theme,
) -> ScatterChart {
    build_scatter(
        table,
        &ScatterSpec {
            labels: Labels::new("Sacks vs Puntos anotados", "Sacks recibidos", "Puntos anotados"),
            x: NumericColumn::SacksAllowed,
            y: NumericColumn::PointsScored,
            color_by: config.color_by,
            symbol_by: config.symbol_by,
            colors: &config.colors,
            trend_scope: config.trend_scope,
            hover: &[
                HoverField::MatchId,
                HoverField::Week,
                HoverField::Phase,
                HoverField::Outcome,
            ],
        },
        theme,
    )
}

/// Sacks allowed (x) against point margin (y), by outcome, with a zero line.
pub fn scatter_sacks_vs_margin(table: &GameTable, theme: &Theme) -> ScatterChart {
    let mut chart = build_scatter(
        table,
        &ScatterSpec {
            labels: Labels::new(
                "Sacks permitidos vs margen (≥ 8 pts)",
                "Sacks permitidos",
                "Margen (+ gana / – pierde)",
            ),
            x: NumericColumn::SacksAllowed,
            y: NumericColumn::Margin,
            color_by: CategoryColumn::Outcome,
            symbol_by: CategoryColumn::Outcome,
            colors: &theme.outcome_mapping(),
            trend_scope: TrendScope::Overall,
            hover: &[HoverField::MatchId, HoverField::Week, HoverField::Team],
        },
        theme,
    );
    chart.reference_lines.push(ReferenceLine {
        y: 0.0,
        color: theme.neutral,
        dotted: true,
    });
    chart
}

// ---------------------------------------------------------------------------
// Shared scatter construction
// ---------------------------------------------------------------------------

struct ScatterSpec<'a> {
    labels: Labels,
    x: NumericColumn,
    y: NumericColumn,
    color_by: CategoryColumn,
    symbol_by: CategoryColumn,
    colors: &'a ColorMapping,
    trend_scope: TrendScope,
    hover: &'a [HoverField],
}

fn build_scatter(table: &GameTable, spec: &ScatterSpec<'_>, theme: &Theme) -> ScatterChart {
    let color_values: Vec<String> = table.iter().map(|r| spec.color_by.value(r)).collect();
    let color_map = ColorMap::new(spec.colors, color_values.iter().map(String::as_str), theme);

    let mut symbol_order: Vec<String> = Vec::new();
    let mut traces: Vec<ScatterTrace> = Vec::new();

    for (rec, color_value) in table.iter().zip(color_values.iter()) {
        let symbol_value = spec.symbol_by.value(rec);
        let symbol_idx = match symbol_order.iter().position(|s| *s == symbol_value) {
            Some(i) => i,
            None => {
                symbol_order.push(symbol_value.clone());
                symbol_order.len() - 1
            }
        };

        let point = ScatterPoint {
            x: spec.x.value(rec),
            y: spec.y.value(rec),
            hover: spec.hover.iter().map(|h| h.entry(rec)).collect(),
        };

        match traces
            .iter_mut()
            .find(|t| t.color_value == *color_value && t.symbol_value == symbol_value)
        {
            Some(trace) => trace.points.push(point),
            None => {
                let name = if spec.color_by == spec.symbol_by {
                    color_value.clone()
                } else {
                    format!("{color_value}, {symbol_value}")
                };
                traces.push(ScatterTrace {
                    name,
                    color_value: color_value.clone(),
                    symbol_value,
                    color: color_map.color_for(color_value),
                    symbol: MarkerSymbol::nth(symbol_idx),
                    points: vec![point],
                });
            }
        }
    }

    let trend_lines = match spec.trend_scope {
        TrendScope::Overall => {
            let all: Vec<&ScatterPoint> = traces.iter().flat_map(|t| t.points.iter()).collect();
            trend_line(&all, None, theme.neutral).into_iter().collect()
        }
        TrendScope::Trace => traces
            .iter()
            .filter_map(|t| {
                let points: Vec<&ScatterPoint> = t.points.iter().collect();
                trend_line(&points, Some(t.name.clone()), t.color)
            })
            .collect(),
    };

    ScatterChart {
        labels: spec.labels.clone(),
        color_title: spec.color_by.title(),
        traces,
        trend_lines,
        reference_lines: Vec::new(),
    }
}

fn trend_line(
    points: &[&ScatterPoint],
    trace: Option<String>,
    color: Rgb,
) -> Option<TrendLine> {
    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    let fit = LinearFit::fit(&xs, &ys)?;

    let mut distinct = xs;
    distinct.sort_by(f64::total_cmp);
    distinct.dedup();

    Some(TrendLine {
        trace,
        color,
        points: distinct.iter().map(|&x| [x, fit.predict(x)]).collect(),
        fit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::game;
    use crate::data::model::{Outcome, Phase};

    fn sample() -> GameTable {
        let mut rows = Vec::new();
        for (team, sacks, points, phase) in [
            ("KC", 1, 30, Phase::Regular),
            ("KC", 3, 20, Phase::Playoff),
            ("BUF", 2, 24, Phase::Regular),
            ("BUF", 4, 14, Phase::Regular),
            ("KC", 5, 10, Phase::Regular),
        ] {
            let mut rec = game(team, if points > 20 { Outcome::Win } else { Outcome::Loss }, sacks);
            rec.puntos_anotados = points;
            rec.phase = phase;
            rec.margin = if points > 20 { 9 } else { -9 };
            rows.push(rec);
        }
        GameTable::from_records(rows)
    }

    fn team_config(scope: TrendScope) -> ScatterConfig {
        ScatterConfig {
            color_by: CategoryColumn::Team,
            symbol_by: CategoryColumn::Phase,
            colors: ColorMapping::Sequence(Theme::default().qualitative),
            trend_scope: scope,
        }
    }

    #[test]
    fn test_traces_by_color_and_symbol() {
        let theme = Theme::default();
        let chart = scatter_sacks_vs_points(&sample(), &team_config(TrendScope::Overall), &theme);

        let names: Vec<_> = chart.traces.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["KC, regular", "KC, playoff", "BUF, regular"]);
        assert_eq!(chart.point_count(), 5);
        assert_eq!(chart.traces[0].color, theme.qualitative[0]);
        assert_eq!(chart.traces[2].color, theme.qualitative[1]);
        assert_eq!(chart.traces[0].symbol, MarkerSymbol::Circle);
        assert_eq!(chart.traces[1].symbol, MarkerSymbol::Diamond);
        assert_eq!(chart.color_title, "Team Abbr");
    }

    #[test]
    fn test_overall_trend() {
        let chart = scatter_sacks_vs_points(&sample(), &team_config(TrendScope::Overall), &Theme::default());
        assert_eq!(chart.trend_lines.len(), 1);
        let trend = &chart.trend_lines[0];
        assert!(trend.trace.is_none());
        assert_eq!(trend.fit.n, 5);
        // Points fall as sacks rise.
        assert!(trend.fit.slope < 0.0);
        assert_eq!(trend.points.len(), 5);
        assert_eq!(trend.points[0][0], 1.0);
    }

    #[test]
    fn test_per_trace_trend() {
        let chart = scatter_sacks_vs_points(&sample(), &team_config(TrendScope::Trace), &Theme::default());
        assert_eq!(chart.trend_lines.len(), chart.traces.len());
        let buf = chart
            .trend_lines
            .iter()
            .find(|t| t.trace.as_deref() == Some("BUF, regular"))
            .unwrap();
        // Two points: (2, 24) and (4, 14).
        assert!((buf.fit.slope + 5.0).abs() < 1e-12);

        // A one-game trace still gets a flat trend at its own value.
        let playoff = chart
            .trend_lines
            .iter()
            .find(|t| t.trace.as_deref() == Some("KC, playoff"))
            .unwrap();
        assert_eq!(playoff.fit.n, 1);
        assert_eq!(playoff.points, vec![[3.0, 20.0]]);
    }

    #[test]
    fn test_hover_metadata() {
        let chart = scatter_sacks_vs_points(&sample(), &team_config(TrendScope::Overall), &Theme::default());
        let keys: Vec<_> = chart.traces[0].points[0]
            .hover
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, vec!["partido_id", "week", "phase", "resultado"]);
    }

    #[test]
    fn test_margin_scatter() {
        let theme = Theme::default();
        let chart = scatter_sacks_vs_margin(&sample(), &theme);

        assert_eq!(chart.traces.len(), 2);
        for trace in &chart.traces {
            let expected = if trace.name == "win" { theme.accent } else { theme.danger };
            assert_eq!(trace.color, expected);
        }
        assert_eq!(chart.trend_lines.len(), 1);
        assert_eq!(chart.reference_lines.len(), 1);
        assert_eq!(chart.reference_lines[0].y, 0.0);
        assert_eq!(chart.reference_lines[0].color, theme.neutral);
    }

    #[test]
    fn test_empty_input_does_not_panic() {
        let theme = Theme::default();
        let empty = GameTable::default();
        let chart = scatter_sacks_vs_points(&empty, &team_config(TrendScope::Trace), &theme);
        assert!(chart.traces.is_empty());
        assert!(chart.trend_lines.is_empty());

        let margin = scatter_sacks_vs_margin(&empty, &theme);
        assert_eq!(margin.point_count(), 0);
        assert!(margin.trend_lines.is_empty());
    }
}
