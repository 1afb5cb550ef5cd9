use serde::Serialize;

use crate::color::{ColorScale, Rgb};
use crate::stats::{BoxSummary, LinearFit};

/// Axis titles and chart title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Labels {
    pub title: String,
    pub x: String,
    pub y: String,
}

impl Labels {
    pub fn new(title: &str, x: &str, y: &str) -> Self {
        Labels {
            title: title.to_string(),
            x: x.to_string(),
            y: y.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Bar chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub labels: Labels,
    pub color: Rgb,
    pub bars: Vec<Bar>,
}

// ---------------------------------------------------------------------------
// Scatter chart
// ---------------------------------------------------------------------------

/// Marker symbols, cycled in this order by first appearance of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkerSymbol {
    Circle,
    Diamond,
    Square,
    Cross,
    Plus,
    Up,
    Down,
    Asterisk,
}

impl MarkerSymbol {
    pub const SEQUENCE: [MarkerSymbol; 8] = [
        MarkerSymbol::Circle,
        MarkerSymbol::Diamond,
        MarkerSymbol::Square,
        MarkerSymbol::Cross,
        MarkerSymbol::Plus,
        MarkerSymbol::Up,
        MarkerSymbol::Down,
        MarkerSymbol::Asterisk,
    ];

    pub fn nth(i: usize) -> Self {
        Self::SEQUENCE[i % Self::SEQUENCE.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    /// `(column, value)` pairs shown on hover.
    pub hover: Vec<(String, String)>,
}

/// Points sharing one (colour value, symbol value) combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterTrace {
    pub name: String,
    pub color_value: String,
    pub symbol_value: String,
    pub color: Rgb,
    pub symbol: MarkerSymbol,
    pub points: Vec<ScatterPoint>,
}

/// OLS fit drawn over the x-range of the points it was fitted on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendLine {
    /// Trace name for per-trace fits, `None` for the overall fit.
    pub trace: Option<String>,
    pub color: Rgb,
    pub fit: LinearFit,
    /// Fitted values at each distinct x, ascending.
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub y: f64,
    pub color: Rgb,
    pub dotted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub labels: Labels,
    /// Legend title for the colour grouping.
    pub color_title: String,
    pub traces: Vec<ScatterTrace>,
    pub trend_lines: Vec<TrendLine>,
    pub reference_lines: Vec<ReferenceLine>,
}

impl ScatterChart {
    pub fn point_count(&self) -> usize {
        self.traces.iter().map(|t| t.points.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Box chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxGroup {
    /// Category on the x axis.
    pub category: String,
    /// Colour series (the outcome) this box belongs to.
    pub series: String,
    pub color: Rgb,
    pub summary: BoxSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxChart {
    pub labels: Labels,
    /// Distinct x categories in display order.
    pub categories: Vec<String>,
    /// Distinct colour series in display order.
    pub series: Vec<String>,
    pub boxes: Vec<BoxGroup>,
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatCell {
    pub value: f64,
    /// Value formatted to two decimals.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub title: String,
    /// Row and column labels (same order on both axes).
    pub labels: Vec<String>,
    /// `cells[row][col]`; `None` where masked.
    pub cells: Vec<Vec<Option<HeatCell>>>,
    pub zmin: f64,
    pub zmax: f64,
    pub scale: ColorScale,
    /// Row 0 is drawn at the bottom.
    pub origin_lower: bool,
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopGameRow {
    pub season: i32,
    pub week: u32,
    pub partido_id: String,
    pub local_team_name: String,
    pub visitante_team_name: String,
    pub sacks_permitidos: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopTable {
    pub columns: Vec<&'static str>,
    pub rows: Vec<TopGameRow>,
}
