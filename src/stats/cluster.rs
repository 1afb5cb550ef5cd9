use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusterError {
    #[error("observation {0} contains non-finite values")]
    NonFinite(usize),
    #[error("observation {index} has {found} dimensions, expected {expected}")]
    Ragged {
        index: usize,
        found: usize,
        expected: usize,
    },
}

/// One agglomeration step. Cluster ids below `n` are observations; the
/// cluster created by step `s` has id `n + s`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Merge {
    /// Smaller of the two merged ids.
    pub left: usize,
    /// Larger of the two merged ids.
    pub right: usize,
    pub distance: f64,
    pub size: usize,
}

/// Result of hierarchical clustering over `n` observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dendrogram {
    pub n: usize,
    pub merges: Vec<Merge>,
}

impl Dendrogram {
    /// Observation indices in left-to-right dendrogram order.
    pub fn leaf_order(&self) -> Vec<usize> {
        if self.n == 0 {
            return Vec::new();
        }
        let root = self.n + self.merges.len() - 1;
        let mut leaves = Vec::with_capacity(self.n);
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if id < self.n {
                leaves.push(id);
            } else {
                let merge = &self.merges[id - self.n];
                // Right pushed first so the left subtree is visited first.
                stack.push(merge.right);
                stack.push(merge.left);
            }
        }
        leaves
    }
}

/// Average-linkage (UPGMA) clustering of the rows of `observations` under
/// Euclidean distance.
///
/// Ties on the minimal inter-cluster distance are broken by taking the first
/// pair in `(i, j)`, `i < j` order over active clusters sorted by id.
pub fn average_linkage(observations: &[Vec<f64>]) -> Result<Dendrogram, ClusterError> {
    let n = observations.len();
    if let Some(first) = observations.first() {
        for (index, obs) in observations.iter().enumerate() {
            if obs.len() != first.len() {
                return Err(ClusterError::Ragged {
                    index,
                    found: obs.len(),
                    expected: first.len(),
                });
            }
            if obs.iter().any(|v| !v.is_finite()) {
                return Err(ClusterError::NonFinite(index));
            }
        }
    }

    // Active clusters: (id, size); distances indexed by position in `active`.
    let mut active: Vec<(usize, usize)> = (0..n).map(|i| (i, 1)).collect();
    let mut dist: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| euclidean(&observations[i], &observations[j])).collect())
        .collect();
    let mut merges = Vec::with_capacity(n.saturating_sub(1));

    while active.len() > 1 {
        let mut best = (0, 1, f64::INFINITY);
        for a in 0..active.len() {
            for b in (a + 1)..active.len() {
                if dist[a][b] < best.2 {
                    best = (a, b, dist[a][b]);
                }
            }
        }
        let (a, b, distance) = best;
        let (id_a, size_a) = active[a];
        let (id_b, size_b) = active[b];
        let size = size_a + size_b;

        // Lance-Williams update for average linkage.
        let merged_row: Vec<f64> = (0..active.len())
            .map(|k| (size_a as f64 * dist[a][k] + size_b as f64 * dist[b][k]) / size as f64)
            .collect();

        merges.push(Merge {
            left: id_a.min(id_b),
            right: id_a.max(id_b),
            distance,
            size,
        });

        // Survivors keep their relative order; the new cluster goes last so
        // active ids stay ascending.
        let new_id = n + merges.len() - 1;
        let keep: Vec<usize> = (0..active.len()).filter(|&k| k != a && k != b).collect();
        let new_dists: Vec<f64> = keep.iter().map(|&k| merged_row[k]).collect();

        let mut next_dist: Vec<Vec<f64>> = keep
            .iter()
            .zip(new_dists.iter())
            .map(|(&r, &d)| {
                let mut row: Vec<f64> = keep.iter().map(|&c| dist[r][c]).collect();
                row.push(d);
                row
            })
            .collect();
        let mut last_row = new_dists;
        last_row.push(0.0);
        next_dist.push(last_row);

        let mut next_active: Vec<(usize, usize)> = keep.iter().map(|&k| active[k]).collect();
        next_active.push((new_id, size));

        active = next_active;
        dist = next_dist;
    }

    Ok(Dendrogram { n, merges })
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_dimensional_groups() {
        let obs = vec![vec![0.0], vec![10.0], vec![1.0], vec![11.0]];
        let tree = average_linkage(&obs).unwrap();

        assert_eq!(tree.merges.len(), 3);
        assert_eq!(tree.merges[0], Merge { left: 0, right: 2, distance: 1.0, size: 2 });
        assert_eq!(tree.merges[1], Merge { left: 1, right: 3, distance: 1.0, size: 2 });
        // Average of |0-10|, |0-11|, |1-10|, |1-11|.
        assert_eq!(tree.merges[2].distance, 10.0);
        assert_eq!(tree.merges[2].size, 4);
        assert_eq!(tree.leaf_order(), vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_correlated_rows_adjacent() {
        // Correlation-like rows: 0 and 2 move together, 1 and 3 move together.
        let obs = vec![
            vec![1.0, -0.2, 0.9, -0.1],
            vec![-0.2, 1.0, -0.3, 0.8],
            vec![0.9, -0.3, 1.0, -0.2],
            vec![-0.1, 0.8, -0.2, 1.0],
        ];
        let order = average_linkage(&obs).unwrap().leaf_order();
        let pos = |i: usize| order.iter().position(|&x| x == i).unwrap();
        assert_eq!(pos(0).abs_diff(pos(2)), 1);
        assert_eq!(pos(1).abs_diff(pos(3)), 1);
    }

    #[test]
    fn test_trivial_sizes() {
        assert!(average_linkage(&[]).unwrap().leaf_order().is_empty());
        assert_eq!(average_linkage(&[vec![3.0]]).unwrap().leaf_order(), vec![0]);
    }

    #[test]
    fn test_non_finite_rejected() {
        let obs = vec![vec![1.0, f64::NAN], vec![0.5, 1.0]];
        assert_eq!(average_linkage(&obs), Err(ClusterError::NonFinite(0)));
    }
}
