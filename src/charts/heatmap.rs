use serde::Serialize;

use super::figure::{HeatCell, Heatmap};
use super::ChartError;
use crate::color::Theme;
use crate::data::model::{GameTable, NumericColumn};
use crate::stats::cluster::{ClusterError, average_linkage};
use crate::stats::correlation::{CorrelationMethod, correlation_matrix};

/// Columns and coefficient for the correlation heatmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapConfig {
    pub columns: Vec<NumericColumn>,
    pub method: CorrelationMethod,
}

impl HeatmapConfig {
    pub fn dashboard(method: CorrelationMethod) -> Self {
        HeatmapConfig {
            columns: NumericColumn::DASHBOARD.to_vec(),
            method,
        }
    }
}

/// Lower-triangle correlation heatmap, clustered so that correlated columns
/// sit next to each other.
///
/// With more than two columns the order follows the average-linkage
/// dendrogram of the correlation rows, which requires every coefficient to be
/// defined.
pub fn corr_heatmap(
    table: &GameTable,
    config: &HeatmapConfig,
    theme: &Theme,
) -> Result<Heatmap, ChartError> {
    let samples: Vec<Vec<f64>> = config.columns.iter().map(|c| table.numeric(*c)).collect();
    let matrix = correlation_matrix(&samples, config.method);

    let order: Vec<usize> = if config.columns.len() > 2 {
        average_linkage(&matrix)
            .map_err(|err| match err {
                ClusterError::NonFinite(row) => ChartError::NonFiniteCorrelation {
                    column: config.columns[row].name().to_string(),
                    method: config.method,
                },
                other => ChartError::Cluster(other),
            })?
            .leaf_order()
    } else {
        (0..config.columns.len()).collect()
    };
    log::debug!(
        "Heatmap order ({}): {:?}",
        config.method,
        order.iter().map(|&i| config.columns[i].name()).collect::<Vec<_>>()
    );

    let cells = order
        .iter()
        .enumerate()
        .map(|(row, &i)| {
            order
                .iter()
                .enumerate()
                .map(|(col, &j)| {
                    let value = matrix[i][j];
                    (col < row && value.is_finite()).then(|| HeatCell {
                        value,
                        text: format!("{value:.2}"),
                    })
                })
                .collect()
        })
        .collect();

    Ok(Heatmap {
        title: format!("Correlaciones ({})", config.method.title()),
        labels: order
            .iter()
            .map(|&i| config.columns[i].name().to_string())
            .collect(),
        cells,
        zmin: -1.0,
        zmax: 1.0,
        scale: theme.diverging_scale(),
        origin_lower: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::game;
    use crate::data::model::{GameRecord, Outcome};

    fn visible_values(map: &Heatmap) -> Vec<f64> {
        map.cells.iter().flatten().filter_map(|c| c.as_ref().map(|c| c.value)).collect()
    }

    fn sample() -> GameTable {
        let rows: Vec<GameRecord> = (0..12u32)
            .map(|i| {
                let loss = i % 3 == 0;
                let mut rec = game("KC", if loss { Outcome::Loss } else { Outcome::Win }, i % 6);
                rec.pct_sacks = (i % 6) as f64 * 1.7 + (i % 2) as f64;
                rec.puntos_anotados = 35 - 2 * (i % 6) + (i % 4);
                rec.margin = if loss { -8 - (i as i32 % 5) } else { 8 + (i as i32 % 7) };
                rec
            })
            .collect();
        GameTable::from_records(rows)
    }

    #[test]
    fn test_lower_triangle_only() {
        for method in CorrelationMethod::ALL {
            let map = corr_heatmap(&sample(), &HeatmapConfig::dashboard(method), &Theme::default()).unwrap();
            assert_eq!(map.labels.len(), 4);
            for (row, cells) in map.cells.iter().enumerate() {
                for (col, cell) in cells.iter().enumerate() {
                    if col >= row {
                        assert!(cell.is_none(), "cell ({row}, {col}) should be masked");
                    } else {
                        assert!(cell.is_some());
                    }
                }
            }
            assert_eq!(visible_values(&map).len(), 6);
            assert!(visible_values(&map).into_iter().all(|v| (-1.0..=1.0).contains(&v)));
        }
    }

    #[test]
    fn test_pearson_title_and_scale() {
        let theme = Theme::default();
        let map = corr_heatmap(&sample(), &HeatmapConfig::dashboard(CorrelationMethod::Pearson), &theme).unwrap();
        assert_eq!(map.title, "Correlaciones (Pearson)");
        assert_eq!((map.zmin, map.zmax), (-1.0, 1.0));
        assert_eq!(map.scale, theme.diverging_scale());
        let cell = map.cells[1][0].as_ref().unwrap();
        assert_eq!(cell.text, format!("{:.2}", cell.value));
    }

    #[test]
    fn test_sacks_and_pct_adjacent() {
        // pct_sacks is almost a copy of sacks_permitidos.
        let map = corr_heatmap(&sample(), &HeatmapConfig::dashboard(CorrelationMethod::Pearson), &Theme::default()).unwrap();
        let pos = |name: &str| map.labels.iter().position(|l| l == name).unwrap();
        assert_eq!(pos("sacks_permitidos").abs_diff(pos("pct_sacks")), 1);
    }

    #[test]
    fn test_two_columns_skip_reordering() {
        let config = HeatmapConfig {
            columns: vec![NumericColumn::Margin, NumericColumn::SacksAllowed],
            method: CorrelationMethod::Kendall,
        };
        let map = corr_heatmap(&sample(), &config, &Theme::default()).unwrap();
        assert_eq!(map.labels, vec!["margin", "sacks_permitidos"]);
        assert!(map.cells[0][0].is_none());
        assert!(map.cells[1][0].is_some());
    }

    #[test]
    fn test_constant_column_fails_clustering() {
        let rows = (0..5).map(|_| game("KC", Outcome::Win, 2)).collect();
        let err = corr_heatmap(
            &GameTable::from_records(rows),
            &HeatmapConfig::dashboard(CorrelationMethod::Spearman),
            &Theme::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ChartError::NonFiniteCorrelation { .. }));
    }
}
