use std::fmt;

use serde::{Deserialize, Serialize};

/// Correlation coefficient selectable on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    Spearman,
    Kendall,
}

impl CorrelationMethod {
    pub const ALL: [CorrelationMethod; 3] = [
        CorrelationMethod::Pearson,
        CorrelationMethod::Spearman,
        CorrelationMethod::Kendall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationMethod::Pearson => "pearson",
            CorrelationMethod::Spearman => "spearman",
            CorrelationMethod::Kendall => "kendall",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CorrelationMethod::Pearson => "Pearson",
            CorrelationMethod::Spearman => "Spearman",
            CorrelationMethod::Kendall => "Kendall",
        }
    }

    /// Coefficient for two equally long samples over the positions where
    /// both values are finite. NaN when undefined (fewer than two such
    /// pairs or a constant sample).
    pub fn coefficient(&self, xs: &[f64], ys: &[f64]) -> f64 {
        let (xs, ys) = complete_pairs(xs, ys);
        match self {
            CorrelationMethod::Pearson => pearson(&xs, &ys),
            CorrelationMethod::Spearman => spearman(&xs, &ys),
            CorrelationMethod::Kendall => kendall_tau_b(&xs, &ys),
        }
    }
}

impl fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Symmetric correlation matrix over `columns` (each a full sample).
///
/// The diagonal is 1.0 for every column whose self-correlation is defined
/// and NaN otherwise.
pub fn correlation_matrix(columns: &[Vec<f64>], method: CorrelationMethod) -> Vec<Vec<f64>> {
    let k = columns.len();
    let mut matrix = vec![vec![f64::NAN; k]; k];
    for i in 0..k {
        for j in i..k {
            let c = method.coefficient(&columns[i], &columns[j]);
            let c = if i == j && c.is_finite() { 1.0 } else { c };
            matrix[i][j] = c;
            matrix[j][i] = c;
        }
    }
    matrix
}

fn complete_pairs(xs: &[f64], ys: &[f64]) -> (Vec<f64>, Vec<f64>) {
    xs.iter()
        .zip(ys.iter())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| (x, y))
        .unzip()
}

pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let len = xs.len().min(ys.len());
    if len < 2 {
        return f64::NAN;
    }
    let mean_x = xs[..len].iter().sum::<f64>() / len as f64;
    let mean_y = ys[..len].iter().sum::<f64>() / len as f64;
    let mut num = 0.0;
    let mut denom_x = 0.0;
    let mut denom_y = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        num += dx * dy;
        denom_x += dx * dx;
        denom_y += dy * dy;
    }
    if denom_x == 0.0 || denom_y == 0.0 {
        return f64::NAN;
    }
    (num / (denom_x.sqrt() * denom_y.sqrt())).clamp(-1.0, 1.0)
}

pub fn spearman(xs: &[f64], ys: &[f64]) -> f64 {
    pearson(&rank(xs), &rank(ys))
}

/// Kendall's tau-b, which corrects for ties in either sample.
pub fn kendall_tau_b(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return f64::NAN;
    }

    let mut concordant = 0i64;
    let mut discordant = 0i64;
    let mut ties_x = 0i64;
    let mut ties_y = 0i64;
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = xs[i] - xs[j];
            let dy = ys[i] - ys[j];
            if dx == 0.0 {
                ties_x += 1;
            }
            if dy == 0.0 {
                ties_y += 1;
            }
            if dx == 0.0 || dy == 0.0 {
                continue;
            }
            if (dx > 0.0) == (dy > 0.0) {
                concordant += 1;
            } else {
                discordant += 1;
            }
        }
    }

    let pairs = (n * (n - 1) / 2) as i64;
    let denom = (((pairs - ties_x) * (pairs - ties_y)) as f64).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    ((concordant - discordant) as f64 / denom).clamp(-1.0, 1.0)
}

/// Ranks starting at 1; ties share the average of their positions.
fn rank(values: &[f64]) -> Vec<f64> {
    let mut pairs: Vec<(usize, f64)> = values.iter().cloned().enumerate().collect();
    pairs.sort_by(|a, b| a.1.total_cmp(&b.1));
    let mut ranks = vec![0.0; values.len()];
    let mut idx = 0;
    while idx < pairs.len() {
        let start = idx;
        let value = pairs[idx].1;
        while idx < pairs.len() && pairs[idx].1 == value {
            idx += 1;
        }
        let rank_value = (start + idx - 1) as f64 / 2.0 + 1.0;
        for &(original_idx, _) in &pairs[start..idx] {
            ranks[original_idx] = rank_value;
        }
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_pearson_perfect() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!(close(pearson(&xs, &[2.0, 4.0, 6.0, 8.0]), 1.0));
        assert!(close(pearson(&xs, &[8.0, 6.0, 4.0, 2.0]), -1.0));
    }

    #[test]
    fn test_pearson_undefined() {
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
        assert!(pearson(&[1.0], &[1.0]).is_nan());
    }

    #[test]
    fn test_missing_values_skipped_pairwise() {
        let xs = [1.0, 2.0, f64::NAN, 3.0, 4.0];
        let ys = [2.0, 4.0, 100.0, 6.0, f64::NAN];
        for method in CorrelationMethod::ALL {
            assert!(close(method.coefficient(&xs, &ys), 1.0), "{method}");
        }
        assert!(CorrelationMethod::Pearson
            .coefficient(&[1.0, f64::NAN], &[f64::NAN, 2.0])
            .is_nan());

        let matrix = correlation_matrix(&[xs.to_vec(), ys.to_vec()], CorrelationMethod::Spearman);
        assert_eq!(matrix[0][0], 1.0);
        assert!(close(matrix[0][1], 1.0));
    }

    #[test]
    fn test_rank_ties_averaged() {
        assert_eq!(rank(&[10.0, 20.0, 10.0, 30.0]), vec![1.5, 3.0, 1.5, 4.0]);
    }

    #[test]
    fn test_spearman_monotone() {
        // Non-linear but monotone relation.
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys: Vec<f64> = xs.iter().map(|x: &f64| x.powi(3)).collect();
        assert!(close(spearman(&xs, &ys), 1.0));
        assert!(pearson(&xs, &ys) < 1.0);
    }

    #[test]
    fn test_kendall_hand_computed() {
        // Pairs: (1,2)C (1,3)C (1,4)C (2,3)D (2,4)C (3,4)C → (5-1)/6.
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [1.0, 3.0, 2.0, 4.0];
        assert!(close(kendall_tau_b(&xs, &ys), 4.0 / 6.0));
    }

    #[test]
    fn test_kendall_with_ties() {
        // x ties on one pair, y has none: n0 = 6, n1 = 1, n2 = 0.
        // Remaining pairs: (1,3)C (1,4)C (2,3)C (2,4)C (3,4)C → 5 / sqrt(5*6).
        let xs = [1.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 2.0, 3.0, 4.0];
        assert!(close(kendall_tau_b(&xs, &ys), 5.0 / 30.0f64.sqrt()));
    }

    #[test]
    fn test_matrix_symmetric_with_unit_diagonal() {
        let columns = vec![
            vec![1.0, 2.0, 3.0, 4.0],
            vec![2.0, 1.0, 4.0, 3.0],
            vec![5.0, 5.0, 5.0, 5.0],
        ];
        let m = correlation_matrix(&columns, CorrelationMethod::Spearman);
        assert_eq!(m[0][0], 1.0);
        assert_eq!(m[0][1], m[1][0]);
        assert!(m[2][2].is_nan());
        assert!(m[0][2].is_nan());
    }
}
