use std::ops::RangeInclusive;

use eframe::egui::{Align2, Color32, FontId, Rect, RichText, Sense, Stroke, Ui, Vec2, pos2, vec2};
use egui_extras::{Column, TableBuilder};
use egui_plot::{
    Bar, BarChart as PlotBarChart, BoxElem, BoxPlot, BoxSpread, GridMark, HLine, Legend, Line,
    LineStyle, MarkerShape, Plot, PlotPoint, PlotPoints, Points,
};

use crate::charts::figure::{
    BarChart, BoxChart, Heatmap, MarkerSymbol, ScatterChart, ScatterTrace, TopTable,
};
use crate::color::to_color32;
use crate::dashboard::{ChartSlot, NO_DATA_NOTICE};

const PLOT_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// Draw a chart, or the notice that replaces it.
pub fn slot<T>(ui: &mut Ui, slot: &ChartSlot<T>, draw: impl FnOnce(&mut Ui, &T)) {
    match slot {
        ChartSlot::Ready(chart) => draw(ui, chart),
        ChartSlot::NoData => {
            ui.label(RichText::new(NO_DATA_NOTICE).italics().color(Color32::GRAY));
        }
        ChartSlot::Failed(msg) => {
            ui.label(RichText::new(format!("No se pudo generar el gráfico: {msg}")).color(Color32::RED));
        }
    }
}

// ---------------------------------------------------------------------------
// Bar chart
// ---------------------------------------------------------------------------

pub fn bar_chart(ui: &mut Ui, chart: &BarChart) {
    let color = to_color32(chart.color);
    let bars: Vec<Bar> = chart
        .bars
        .iter()
        .enumerate()
        .map(|(i, b)| Bar::new(i as f64, b.value).name(&b.category).fill(color).width(0.7))
        .collect();
    let categories: Vec<String> = chart.bars.iter().map(|b| b.category.clone()).collect();

    Plot::new("avg_sacks_losses")
        .height(PLOT_HEIGHT)
        .x_axis_label(&chart.labels.x)
        .y_axis_label(&chart.labels.y)
        .x_axis_formatter(category_axis(categories))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(PlotBarChart::new(bars).color(color).name(&chart.labels.y));
        });
}

/// Axis labels for integer positions that index `categories`.
fn category_axis(categories: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| category_at(&categories, mark.value).unwrap_or_default()
}

fn category_at(categories: &[String], value: f64) -> Option<String> {
    if value < 0.0 || (value - value.round()).abs() > 1e-6 {
        return None;
    }
    categories.get(value.round() as usize).cloned()
}

// ---------------------------------------------------------------------------
// Scatter chart
// ---------------------------------------------------------------------------

pub fn scatter_chart(ui: &mut Ui, id: &str, chart: &ScatterChart) {
    ui.small(format!("Color: {}  ·  {} partidos", chart.color_title, chart.point_count()));
    let traces = chart.traces.clone();

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(&chart.labels.x)
        .y_axis_label(&chart.labels.y)
        .allow_scroll(false)
        .label_formatter(move |name, value| hover_text(&traces, name, value))
        .show(ui, |plot_ui| {
            for line in &chart.reference_lines {
                let mut hline = HLine::new(line.y).color(to_color32(line.color)).width(1.0);
                if line.dotted {
                    hline = hline.style(LineStyle::dotted_dense());
                }
                plot_ui.hline(hline);
            }

            for trace in &chart.traces {
                let points: Vec<[f64; 2]> = trace.points.iter().map(|p| [p.x, p.y]).collect();
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(&trace.name)
                        .color(to_color32(trace.color))
                        .shape(marker_shape(trace.symbol))
                        .filled(true)
                        .radius(4.0),
                );
            }

            for trend in &chart.trend_lines {
                let name = match &trend.trace {
                    Some(trace) => format!("OLS {trace}  (R² {:.2})", trend.fit.r_squared),
                    None => format!("OLS  (R² {:.2})", trend.fit.r_squared),
                };
                plot_ui.line(
                    Line::new(PlotPoints::from(trend.points.clone()))
                        .name(name)
                        .color(to_color32(trend.color))
                        .style(LineStyle::dashed_loose())
                        .width(2.0),
                );
            }
        });
}

fn marker_shape(symbol: MarkerSymbol) -> MarkerShape {
    match symbol {
        MarkerSymbol::Circle => MarkerShape::Circle,
        MarkerSymbol::Diamond => MarkerShape::Diamond,
        MarkerSymbol::Square => MarkerShape::Square,
        MarkerSymbol::Cross => MarkerShape::Cross,
        MarkerSymbol::Plus => MarkerShape::Plus,
        MarkerSymbol::Up => MarkerShape::Up,
        MarkerSymbol::Down => MarkerShape::Down,
        MarkerSymbol::Asterisk => MarkerShape::Asterisk,
    }
}

/// Hover label: the nearest point of the hovered trace with its metadata.
fn hover_text(traces: &[ScatterTrace], name: &str, value: &PlotPoint) -> String {
    let nearest = traces
        .iter()
        .filter(|t| t.name == name)
        .flat_map(|t| t.points.iter())
        .min_by(|a, b| {
            let da = (a.x - value.x).powi(2) + (a.y - value.y).powi(2);
            let db = (b.x - value.x).powi(2) + (b.y - value.y).powi(2);
            da.total_cmp(&db)
        });

    match nearest {
        Some(point) => {
            let mut text = format!("{name}\nx = {}\ny = {}", point.x, point.y);
            for (field, v) in &point.hover {
                text.push_str(&format!("\n{field}: {v}"));
            }
            text
        }
        None if name.is_empty() => format!("x = {:.1}\ny = {:.1}", value.x, value.y),
        None => format!("{name}\nx = {:.1}\ny = {:.1}", value.x, value.y),
    }
}

// ---------------------------------------------------------------------------
// Box chart
// ---------------------------------------------------------------------------

pub fn box_chart(ui: &mut Ui, chart: &BoxChart) {
    // Side-by-side boxes only when several series share a category.
    let dodge = chart.boxes.iter().any(|b| b.category != b.series);
    let n_series = if dodge { chart.series.len().max(1) as f64 } else { 1.0 };
    let width = 0.8 / n_series;

    Plot::new("sacks_distribution")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(&chart.labels.x)
        .y_axis_label(&chart.labels.y)
        .x_axis_formatter(category_axis(chart.categories.clone()))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (s_idx, series) in chart.series.iter().enumerate() {
                let offset = if dodge { (s_idx as f64 - (n_series - 1.0) / 2.0) * width } else { 0.0 };
                let mut color = Color32::GRAY;
                let mut elems = Vec::new();
                let mut outliers: Vec<[f64; 2]> = Vec::new();

                for group in chart.boxes.iter().filter(|b| b.series == *series) {
                    let Some(cat_idx) = chart.categories.iter().position(|c| *c == group.category) else {
                        continue;
                    };
                    color = to_color32(group.color);
                    let x = cat_idx as f64 + offset;
                    let s = &group.summary;
                    elems.push(
                        BoxElem::new(
                            x,
                            BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
                        )
                        .name(format!("{} · {series}  (n={})", group.category, s.n))
                        .fill(color.gamma_multiply(0.35))
                        .stroke(Stroke::new(1.5, color))
                        .box_width(width * 0.9),
                    );
                    outliers.extend(s.outliers.iter().map(|&y| [x, y]));
                }

                plot_ui.box_plot(BoxPlot::new(elems).name(series).color(color));
                if !outliers.is_empty() {
                    plot_ui.points(
                        Points::new(PlotPoints::from(outliers))
                            .name(series)
                            .color(color)
                            .radius(3.0),
                    );
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

pub fn heatmap(ui: &mut Ui, map: &Heatmap) {
    ui.small(&map.title);
    let n = map.labels.len();
    if n == 0 {
        return;
    }

    const LABEL_W: f32 = 130.0;
    const AXIS_H: f32 = 36.0;
    const BAR_W: f32 = 70.0;
    let cell = ((ui.available_width() - LABEL_W - BAR_W) / n as f32).clamp(36.0, 90.0);
    let side = cell * n as f32;

    let (response, painter) =
        ui.allocate_painter(vec2(LABEL_W + side + BAR_W, side + AXIS_H), Sense::hover());
    let grid = Rect::from_min_size(response.rect.min + vec2(LABEL_W, 0.0), Vec2::splat(side));
    let font = FontId::proportional(12.0);
    let text_color = ui.visuals().text_color();

    // Screen row for data row `r`.
    let screen_row = |r: usize| if map.origin_lower { n - 1 - r } else { r };

    for (r, (label, row)) in map.labels.iter().zip(&map.cells).enumerate() {
        let y = grid.top() + screen_row(r) as f32 * cell;
        painter.text(
            pos2(grid.left() - 6.0, y + cell / 2.0),
            Align2::RIGHT_CENTER,
            label,
            font.clone(),
            text_color,
        );
        for (c, value) in row.iter().enumerate() {
            let Some(value) = value else { continue };
            let rect = Rect::from_min_size(pos2(grid.left() + c as f32 * cell, y), Vec2::splat(cell))
                .shrink(1.0);
            let fill = to_color32(map.scale.color_at(value.value, map.zmin, map.zmax));
            painter.rect_filled(rect, 2.0, fill);
            painter.text(rect.center(), Align2::CENTER_CENTER, &value.text, font.clone(), contrast(fill));
        }
    }

    // Column labels, staggered on two lines so long names do not collide.
    for (c, label) in map.labels.iter().enumerate() {
        let x = grid.left() + (c as f32 + 0.5) * cell;
        let y = grid.bottom() + 4.0 + (c % 2) as f32 * 15.0;
        painter.text(pos2(x, y), Align2::CENTER_TOP, label, FontId::proportional(11.0), text_color);
    }

    // Colour bar.
    let bar = Rect::from_min_size(pos2(grid.right() + 16.0, grid.top()), vec2(14.0, side));
    const STEPS: usize = 32;
    for i in 0..STEPS {
        let t = 1.0 - (i as f64 + 0.5) / STEPS as f64;
        let value = map.zmin + t * (map.zmax - map.zmin);
        let h = side / STEPS as f32;
        let rect = Rect::from_min_size(pos2(bar.left(), bar.top() + i as f32 * h), vec2(bar.width(), h + 0.5));
        painter.rect_filled(rect, 0.0, to_color32(map.scale.color_at(value, map.zmin, map.zmax)));
    }
    painter.text(bar.right_top() + vec2(4.0, 0.0), Align2::LEFT_TOP, format!("{:.0}", map.zmax), font.clone(), text_color);
    painter.text(bar.right_bottom() + vec2(4.0, 0.0), Align2::LEFT_BOTTOM, format!("{:.0}", map.zmin), font, text_color);

    if let Some(pos) = response.hover_pos().filter(|p| grid.contains(*p)) {
        let c = (((pos.x - grid.left()) / cell) as usize).min(n - 1);
        let r = screen_row((((pos.y - grid.top()) / cell) as usize).min(n - 1));
        if let Some(Some(value)) = map.cells.get(r).and_then(|row| row.get(c)) {
            response.on_hover_text(format!("{} × {}: {}", map.labels[r], map.labels[c], value.text));
        }
    }
}

/// Black or white, whichever reads better on `fill`.
fn contrast(fill: Color32) -> Color32 {
    let luma = 0.299 * fill.r() as f32 + 0.587 * fill.g() as f32 + 0.114 * fill.b() as f32;
    if luma > 140.0 { Color32::BLACK } else { Color32::WHITE }
}

// ---------------------------------------------------------------------------
// Top games table
// ---------------------------------------------------------------------------

pub fn top_table(ui: &mut Ui, table: &TopTable) {
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .columns(Column::auto().at_least(70.0).resizable(true), table.columns.len())
        .header(22.0, |mut header| {
            for &name in &table.columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|mut body| {
            for row in &table.rows {
                let cells = [
                    row.season.to_string(),
                    row.week.to_string(),
                    row.partido_id.clone(),
                    row.local_team_name.clone(),
                    row.visitante_team_name.clone(),
                    row.sacks_permitidos.to_string(),
                ];
                body.row(20.0, |mut table_row| {
                    for cell in cells {
                        table_row.col(|ui: &mut Ui| {
                            ui.label(cell);
                        });
                    }
                });
            }
        });
}
