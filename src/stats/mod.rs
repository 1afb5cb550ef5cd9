/// Descriptive statistics used by the chart builders.
///
/// * [`mean`], [`LinearFit`] – bar averages and OLS trend lines
/// * [`BoxSummary`] – quartiles / whiskers / outliers for box plots
/// * [`correlation`] – Pearson, Spearman and Kendall coefficients
/// * [`cluster`] – average-linkage clustering and dendrogram leaf order

pub mod cluster;
pub mod correlation;

use serde::Serialize;

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

// ---------------------------------------------------------------------------
// Ordinary least squares
// ---------------------------------------------------------------------------

/// `y = intercept + slope * x` fitted by ordinary least squares.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination; NaN when y has no variance.
    pub r_squared: f64,
    pub n: usize,
}

impl LinearFit {
    /// Fit `ys` against `xs` (same length).
    ///
    /// With fewer than two points or no spread in `x` the fit is the flat
    /// line through the mean of `y`. Returns `None` only for empty input.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Option<Self> {
        debug_assert_eq!(xs.len(), ys.len());
        let n = xs.len().min(ys.len());
        let mean_x = mean(&xs[..n])?;
        let mean_y = mean(&ys[..n])?;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        let mut syy = 0.0;
        for (x, y) in xs.iter().zip(ys.iter()) {
            let dx = x - mean_x;
            let dy = y - mean_y;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }

        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        let intercept = mean_y - slope * mean_x;
        let r_squared = if syy > 0.0 { slope * sxy / syy } else { f64::NAN };

        Some(LinearFit {
            slope,
            intercept,
            r_squared,
            n,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

// ---------------------------------------------------------------------------
// Box plot summary
// ---------------------------------------------------------------------------

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest observation ≥ q1 − 1.5·IQR.
    pub lower_whisker: f64,
    /// Largest observation ≤ q3 + 1.5·IQR.
    pub upper_whisker: f64,
    pub mean: f64,
    pub outliers: Vec<f64>,
    pub n: usize,
}

impl BoxSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = percentile(&sorted, 0.25);
        let median = percentile(&sorted, 0.5);
        let q3 = percentile(&sorted, 0.75);
        let iqr = q3 - q1;
        let lo_fence = q1 - 1.5 * iqr;
        let hi_fence = q3 + 1.5 * iqr;

        let inside = sorted.iter().copied().filter(|v| *v >= lo_fence && *v <= hi_fence);
        let lower_whisker = inside.clone().fold(f64::INFINITY, f64::min);
        let upper_whisker = inside.fold(f64::NEG_INFINITY, f64::max);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < lo_fence || *v > hi_fence)
            .collect();

        Some(BoxSummary {
            q1,
            median,
            q3,
            lower_whisker,
            upper_whisker,
            mean: mean(&sorted)?,
            outliers,
            n: sorted.len(),
        })
    }
}

/// Linear interpolation between closest ranks. `values` must be sorted.
fn percentile(values: &[f64], quantile: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let position = quantile * (values.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        values[lower]
    } else {
        let weight = position - lower as f64;
        values[lower] * (1.0 - weight) + values[upper] * weight
    }
}
