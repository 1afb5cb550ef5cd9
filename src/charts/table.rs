use super::figure::{TopGameRow, TopTable};
use crate::data::model::GameTable;

/// Columns shown in the top-games table.
pub const TOP_TABLE_COLUMNS: [&str; 6] = [
    "season",
    "week",
    "partido_id",
    "local_team_name",
    "visitante_team_name",
    "sacks_permitidos",
];

/// The `n` rows with the most sacks allowed, highest first. Rows with equal
/// sacks keep their table order.
pub fn top_sacks_table(table: &GameTable, n: usize) -> TopTable {
    let mut rows: Vec<_> = table.iter().collect();
    rows.sort_by(|a, b| b.sacks_permitidos.cmp(&a.sacks_permitidos));

    TopTable {
        columns: TOP_TABLE_COLUMNS.to_vec(),
        rows: rows
            .into_iter()
            .take(n)
            .map(|rec| TopGameRow {
                season: rec.season,
                week: rec.week,
                partido_id: rec.partido_id.clone(),
                local_team_name: rec.local_team_name.clone(),
                visitante_team_name: rec.visitante_team_name.clone(),
                sacks_permitidos: rec.sacks_permitidos,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::game;
    use crate::data::model::Outcome;

    #[test]
    fn test_top_ten_of_fifteen() {
        // Distinct sacks in a shuffled order.
        let sacks = [7, 14, 0, 3, 11, 9, 1, 13, 5, 12, 2, 8, 10, 4, 6];
        let rows = sacks
            .iter()
            .map(|&s| {
                let mut rec = game("KC", Outcome::Loss, s);
                rec.partido_id = format!("g{s}");
                rec
            })
            .collect();
        let top = top_sacks_table(&GameTable::from_records(rows), 10);

        assert_eq!(top.rows.len(), 10);
        let got: Vec<u32> = top.rows.iter().map(|r| r.sacks_permitidos).collect();
        assert_eq!(got, (5..=14).rev().collect::<Vec<u32>>());
        assert_eq!(top.rows[0].partido_id, "g14");
        assert_eq!(top.columns.len(), 6);
    }

    #[test]
    fn test_short_table() {
        let table = GameTable::from_records(vec![game("KC", Outcome::Win, 1), game("SF", Outcome::Win, 1)]);
        let top = top_sacks_table(&table, 10);
        assert_eq!(top.rows.len(), 2);
        // Ties keep table order.
        assert_eq!(top.rows[0].local_team_name, "KC Home");
        assert!(top_sacks_table(&GameTable::default(), 10).rows.is_empty());
    }
}
