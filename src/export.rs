use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::color::Theme;
use crate::dashboard::{DashboardView, Selections};
use crate::data::cache::TableCache;
use crate::stats::correlation::CorrelationMethod;

/// Write a dashboard view as pretty-printed JSON.
pub fn write_view(path: &Path, view: &DashboardView) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, view).context("serializing dashboard view")?;
    writer.flush().context("flushing export")?;
    log::info!("Exported dashboard view to {}", path.display());
    Ok(())
}

/// Headless mode: load `data`, build the initial view and write it to `out`.
pub fn export_default_view(
    cache: &mut TableCache,
    data: &Path,
    method: CorrelationMethod,
    out: &Path,
) -> Result<DashboardView> {
    let table = cache
        .load(data)
        .with_context(|| format!("loading {}", data.display()))?;
    let selections = Selections::defaults_for(&table, method);
    let view = DashboardView::build(&table, &selections, &Theme::default());
    write_view(out, &view)?;
    Ok(view)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_headless_export() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("games.csv");
        fs::write(
            &data,
            "season,phase,team_abbr,local_team_name,visitante_team_name,partido_id,fecha,is_home,resultado,sacks_permitidos,pct_sacks,puntos_anotados,margin\n\
             2022,regular,KC,Chiefs,Raiders,g1,2022-10-10,True,win,1,2.0,30,9\n\
             2022,regular,LV,Chiefs,Raiders,g1,2022-10-10,False,loss,4,9.0,29,-9\n\
             2023,regular,KC,Chiefs,Lions,g2,2023-09-07,True,loss,3,7.5,20,-8\n\
             2023,regular,DET,Chiefs,Lions,g2,2023-09-07,False,win,1,2.5,28,8\n",
        )
        .unwrap();
        let out = dir.path().join("view.json");

        let mut cache = TableCache::new();
        let view = export_default_view(&mut cache, &data, CorrelationMethod::Pearson, &out).unwrap();
        assert_eq!(view.selections.criteria.season, 2023);
        assert_eq!(view.filtered_rows, 2);

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json["filtered_rows"], 2);
        assert_eq!(json["top_games"]["chart"]["rows"][0]["sacks_permitidos"], 3);
    }

    #[test]
    fn test_missing_data_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = TableCache::new();
        let err = export_default_view(
            &mut cache,
            &dir.path().join("missing.csv"),
            CorrelationMethod::Pearson,
            &dir.path().join("view.json"),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("missing.csv"));
    }
}
