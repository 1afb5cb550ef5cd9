use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};
use serde::Serialize;

use crate::data::model::Outcome;

/// 8-bit sRGB colour used throughout the chart descriptions.
pub type Rgb = Srgb<u8>;

// ---------------------------------------------------------------------------
// Theme – explicit, immutable chart styling
// ---------------------------------------------------------------------------

/// Named colours and sequences shared by every chart builder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Theme {
    pub primary: Rgb,
    pub secondary: Rgb,
    pub accent: Rgb,
    pub danger: Rgb,
    pub neutral: Rgb,
    /// Midpoint of the diverging heatmap scale.
    pub heat_mid: Rgb,
    /// Colour-blind safe qualitative sequence for open-ended categories.
    pub qualitative: Vec<Rgb>,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            primary: Srgb::new(0x1B, 0x6E, 0xF3),
            secondary: Srgb::new(0xFF, 0x98, 0x03),
            accent: Srgb::new(0x1C, 0xC2, 0x9F),
            danger: Srgb::new(0xE0, 0x29, 0x45),
            neutral: Srgb::new(0x9E, 0x9E, 0x9E),
            heat_mid: Srgb::new(0x20, 0x20, 0x20),
            qualitative: vec![
                Srgb::new(136, 204, 238),
                Srgb::new(204, 102, 119),
                Srgb::new(221, 204, 119),
                Srgb::new(17, 119, 51),
                Srgb::new(51, 34, 136),
                Srgb::new(170, 68, 153),
                Srgb::new(68, 170, 153),
                Srgb::new(153, 153, 51),
                Srgb::new(136, 34, 85),
                Srgb::new(102, 17, 0),
                Srgb::new(136, 136, 136),
            ],
        }
    }
}

impl Theme {
    /// Win = accent, loss = danger, on every chart.
    pub fn outcome_color(&self, outcome: Outcome) -> Rgb {
        match outcome {
            Outcome::Win => self.accent,
            Outcome::Loss => self.danger,
        }
    }

    pub fn outcome_mapping(&self) -> ColorMapping {
        ColorMapping::Fixed(BTreeMap::from([
            (Outcome::Win.to_string(), self.outcome_color(Outcome::Win)),
            (Outcome::Loss.to_string(), self.outcome_color(Outcome::Loss)),
        ]))
    }

    /// Diverging scale for correlations: danger → dark neutral → accent.
    pub fn diverging_scale(&self) -> ColorScale {
        ColorScale {
            stops: vec![(0.0, self.danger), (0.5, self.heat_mid), (1.0, self.accent)],
        }
    }
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            rgb.into_format()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category value → colour
// ---------------------------------------------------------------------------

/// How a categorical column is turned into colours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ColorMapping {
    /// Cycle through the sequence by first appearance of each value. An
    /// empty sequence falls back to evenly spaced hues.
    Sequence(Vec<Rgb>),
    /// Named values get fixed colours; others cycle the theme's qualitative
    /// sequence.
    Fixed(BTreeMap<String, Rgb>),
}

/// Resolved value → colour assignment for one chart.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Rgb>,
    default_color: Rgb,
}

impl ColorMap {
    /// Assign colours to `values` (in first-appearance order).
    pub fn new<'a, I>(mapping: &ColorMapping, values: I, theme: &Theme) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut ordered: Vec<&str> = Vec::new();
        for v in values {
            if !ordered.contains(&v) {
                ordered.push(v);
            }
        }

        let (fixed, sequence) = match mapping {
            ColorMapping::Sequence(seq) if seq.is_empty() => {
                (BTreeMap::new(), generate_palette(ordered.len()))
            }
            ColorMapping::Sequence(seq) => (BTreeMap::new(), seq.clone()),
            ColorMapping::Fixed(map) => (map.clone(), theme.qualitative.clone()),
        };

        let mut assigned = BTreeMap::new();
        let mut next = 0;
        for v in ordered {
            let color = match fixed.get(v) {
                Some(c) => *c,
                None if sequence.is_empty() => theme.neutral,
                None => {
                    let c = sequence[next % sequence.len()];
                    next += 1;
                    c
                }
            };
            assigned.insert(v.to_string(), color);
        }

        ColorMap {
            mapping: assigned,
            default_color: theme.neutral,
        }
    }

    /// Look up the colour for a given category value.
    pub fn color_for(&self, value: &str) -> Rgb {
        self.mapping.get(value).copied().unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Continuous scale
// ---------------------------------------------------------------------------

/// Piecewise-linear colour scale over `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorScale {
    pub stops: Vec<(f64, Rgb)>,
}

impl ColorScale {
    /// Colour for `value` normalised into `[zmin, zmax]` (clamped).
    pub fn color_at(&self, value: f64, zmin: f64, zmax: f64) -> Rgb {
        let Some(&(_, first)) = self.stops.first() else {
            return Srgb::new(0, 0, 0);
        };
        let span = zmax - zmin;
        let t = if span > 0.0 { ((value - zmin) / span).clamp(0.0, 1.0) } else { 0.5 };

        for pair in self.stops.windows(2) {
            let (t0, c0) = pair[0];
            let (t1, c1) = pair[1];
            if t <= t1 {
                let local = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
                return mix(c0, c1, local as f32);
            }
        }
        self.stops.last().map(|&(_, c)| c).unwrap_or(first)
    }
}

/// Interpolate in linear light.
fn mix(a: Rgb, b: Rgb, factor: f32) -> Rgb {
    let a: LinSrgb = a.into_format::<f32>().into_linear();
    let b: LinSrgb = b.into_format::<f32>().into_linear();
    Srgb::<f32>::from_linear(a.mix(b, factor)).into_format()
}

/// Convert a chart colour for egui.
pub fn to_color32(c: Rgb) -> Color32 {
    Color32::from_rgb(c.red, c.green, c.blue)
}
