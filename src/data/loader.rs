use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::array::Array;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use thiserror::Error;

use super::model::{GameRecord, GameTable, Location, Outcome, Phase};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Fatal problems while reading the game table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("reading Arrow data: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}, column '{column}': invalid value '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a game table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` / no extension – header row with the game columns
/// * `.parquet` / `.pq` – one column per game field
///
/// `week` and `loc_vi` are optional: when the column (or an individual cell)
/// is missing they are derived from `fecha` and `is_home`.
pub fn load_file(path: &Path) -> Result<GameTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" | "txt" | "" => load_csv(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    log::info!(
        "Loaded {} game rows ({} seasons, {} teams) from {}",
        table.len(),
        table.seasons().len(),
        table.teams().len(),
        path.display()
    );
    Ok(table)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Column lookup shared by both formats
// ---------------------------------------------------------------------------

/// Position of each game column in the header / schema.
#[derive(Debug, Clone)]
struct ColumnIndex {
    season: usize,
    week: Option<usize>,
    phase: usize,
    team_abbr: usize,
    local_team_name: usize,
    visitante_team_name: usize,
    partido_id: usize,
    fecha: usize,
    is_home: usize,
    loc_vi: Option<usize>,
    resultado: usize,
    sacks_permitidos: usize,
    pct_sacks: usize,
    puntos_anotados: usize,
    margin: usize,
}

impl ColumnIndex {
    fn from_names(names: &[String]) -> Result<Self, LoadError> {
        let find = |name: &str| names.iter().position(|h| h.trim() == name);
        let required = |name: &'static str| find(name).ok_or(LoadError::MissingColumn(name));

        Ok(ColumnIndex {
            fecha: required("fecha")?,
            season: required("season")?,
            week: find("week"),
            phase: required("phase")?,
            team_abbr: required("team_abbr")?,
            local_team_name: required("local_team_name")?,
            visitante_team_name: required("visitante_team_name")?,
            partido_id: required("partido_id")?,
            is_home: required("is_home")?,
            loc_vi: find("loc_vi"),
            resultado: required("resultado")?,
            sacks_permitidos: required("sacks_permitidos")?,
            pct_sacks: required("pct_sacks")?,
            puntos_anotados: required("puntos_anotados")?,
            margin: required("margin")?,
        })
    }

    fn derives_week(&self) -> bool {
        self.week.is_none()
    }

    fn derives_location(&self) -> bool {
        self.loc_vi.is_none()
    }
}

/// Turn one row of textual cells into a [`GameRecord`].
///
/// `cell(i)` returns the text of column `i`; an empty string is a missing
/// value.
fn parse_row<F>(row: usize, idx: &ColumnIndex, cell: F) -> Result<GameRecord, LoadError>
where
    F: Fn(usize) -> Result<String, LoadError>,
{
    let invalid = |column: &'static str, value: &str| LoadError::InvalidValue {
        row,
        column,
        value: value.to_string(),
    };

    let text = |i: usize, column: &'static str| -> Result<String, LoadError> {
        let value = cell(i)?;
        if value.trim().is_empty() {
            return Err(invalid(column, &value));
        }
        Ok(value.trim().to_string())
    };
    let int = |i: usize, column: &'static str| -> Result<i64, LoadError> {
        let value = text(i, column)?;
        parse_int(&value).ok_or_else(|| invalid(column, &value))
    };
    let unsigned = |i: usize, column: &'static str| -> Result<u32, LoadError> {
        let value = int(i, column)?;
        u32::try_from(value).map_err(|_| invalid(column, &value.to_string()))
    };

    let fecha_text = text(idx.fecha, "fecha")?;
    let fecha = parse_date(&fecha_text).ok_or_else(|| invalid("fecha", &fecha_text))?;

    let home_text = text(idx.is_home, "is_home")?;
    let is_home = parse_bool(&home_text).ok_or_else(|| invalid("is_home", &home_text))?;

    let week = match idx.week.map(&cell).transpose()? {
        Some(value) if !value.trim().is_empty() => {
            let week = parse_int(value.trim()).ok_or_else(|| invalid("week", &value))?;
            u32::try_from(week).map_err(|_| invalid("week", &value))?
        }
        _ => fecha.iso_week().week(),
    };

    let loc_vi = match idx.loc_vi.map(&cell).transpose()? {
        Some(value) if !value.trim().is_empty() => {
            Location::parse(&value).ok_or_else(|| invalid("loc_vi", &value))?
        }
        _ => Location::from_is_home(is_home),
    };

    let phase_text = text(idx.phase, "phase")?;
    let result_text = text(idx.resultado, "resultado")?;
    // A blank percentage is kept as NaN and skipped pairwise by the correlations.
    let pct_sacks = match cell(idx.pct_sacks)?.trim() {
        "" => f64::NAN,
        value => value.parse::<f64>().map_err(|_| invalid("pct_sacks", value))?,
    };
    let margin = int(idx.margin, "margin")?;
    let season = int(idx.season, "season")?;

    Ok(GameRecord {
        season: i32::try_from(season).map_err(|_| invalid("season", &season.to_string()))?,
        week,
        phase: Phase::parse(&phase_text).ok_or_else(|| invalid("phase", &phase_text))?,
        team_abbr: text(idx.team_abbr, "team_abbr")?,
        local_team_name: text(idx.local_team_name, "local_team_name")?,
        visitante_team_name: text(idx.visitante_team_name, "visitante_team_name")?,
        partido_id: text(idx.partido_id, "partido_id")?,
        fecha,
        is_home,
        loc_vi,
        resultado: Outcome::parse(&result_text).ok_or_else(|| invalid("resultado", &result_text))?,
        sacks_permitidos: unsigned(idx.sacks_permitidos, "sacks_permitidos")?,
        pct_sacks,
        puntos_anotados: unsigned(idx.puntos_anotados, "puntos_anotados")?,
        margin: i32::try_from(margin).map_err(|_| invalid("margin", &margin.to_string()))?,
    })
}

/// Integers may be written as `3.0` by writers that widen to float.
fn parse_int(s: &str) -> Option<i64> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(i);
    }
    let f = s.parse::<f64>().ok()?;
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "True" | "true" | "TRUE" | "1" | "1.0" => Some(true),
        "False" | "false" | "FALSE" | "0" | "0.0" => Some(false),
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one team-game per line.
/// Unknown columns (e.g. a written-out index) are ignored.
fn load_csv(path: &Path) -> Result<GameTable, LoadError> {
    let mut reader = csv::Reader::from_reader(open(path)?);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let idx = ColumnIndex::from_names(&headers)?;
    log_derivations(&idx);

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let rec = parse_row(row_no, &idx, |i| {
            Ok(record.get(i).unwrap_or("").to_string())
        })?;
        rows.push(rec);
    }

    Ok(GameTable::from_records(rows))
}

fn log_derivations(idx: &ColumnIndex) {
    if idx.derives_week() {
        log::debug!("'week' column absent, deriving ISO week from 'fecha'");
    }
    if idx.derives_location() {
        log::debug!("'loc_vi' column absent, deriving from 'is_home'");
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the same columns as the CSV layout.
///
/// Cells are rendered to text with Arrow's display formatter and go through
/// the same parsing as CSV, so any integer width, float, boolean, `Date32`,
/// `Date64`, timestamp or string encoding of a column is accepted.
fn load_parquet(path: &Path) -> Result<GameTable, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let idx = ColumnIndex::from_names(&names)?;
    log_derivations(&idx);

    let reader = builder.build()?;
    let options = FormatOptions::default();
    let mut rows = Vec::new();
    let mut offset = 0;

    for batch_result in reader {
        let batch = batch_result?;
        let formatters = batch
            .columns()
            .iter()
            .map(|col| ArrayFormatter::try_new(col.as_ref(), &options))
            .collect::<Result<Vec<_>, _>>()?;

        for row in 0..batch.num_rows() {
            let rec = parse_row(offset + row, &idx, |i| {
                if batch.column(i).is_null(row) {
                    return Ok(String::new());
                }
                Ok(formatters[i].value(row).try_to_string()?)
            })?;
            rows.push(rec);
        }
        offset += batch.num_rows();
    }

    Ok(GameTable::from_records(rows))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const HEADER: &str = "season,phase,team_abbr,local_team_name,visitante_team_name,partido_id,fecha,is_home,resultado,sacks_permitidos,pct_sacks,puntos_anotados,margin";

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_derives_week_and_location() {
        let dir = tempfile::tempdir().unwrap();
        let csv = format!(
            "{HEADER}\n\
             2023,regular,KC,Chiefs,Lions,2023_01_DET_KC,2023-09-07,True,loss,3,7.5,20,-8\n\
             2023,regular,DET,Chiefs,Lions,2023_01_DET_KC,2023-09-07,False,win,1,2.5,28,8\n"
        );
        let path = write_file(&dir, "games.csv", &csv);

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);

        let kc = &table.rows()[0];
        // 2023-09-07 is a Thursday in ISO week 36.
        assert_eq!(kc.week, 36);
        assert_eq!(kc.loc_vi, Location::Casa);
        assert_eq!(kc.resultado, Outcome::Loss);
        assert_eq!(kc.margin, -8);
        assert_eq!(table.rows()[1].loc_vi, Location::Visitante);
    }

    #[test]
    fn test_keeps_existing_derived_columns() {
        let dir = tempfile::tempdir().unwrap();
        let csv = "season,week,phase,team_abbr,local_team_name,visitante_team_name,partido_id,fecha,is_home,loc_vi,resultado,sacks_permitidos,pct_sacks,puntos_anotados,margin\n\
                   2022,19,playoff,BUF,Bills,Bengals,2022_19_CIN_BUF,2023-01-22,true,Visitante,loss,2,5.0,10.0,-17\n";
        let path = write_file(&dir, "games.csv", csv);

        let table = load_file(&path).unwrap();
        let rec = &table.rows()[0];
        assert_eq!(rec.week, 19);
        assert_eq!(rec.loc_vi, Location::Visitante);
        assert_eq!(rec.phase, Phase::Playoff);
        assert_eq!(rec.puntos_anotados, 10);
    }

    #[test]
    fn test_blank_week_cell_is_derived() {
        let dir = tempfile::tempdir().unwrap();
        let csv = "season,week,phase,team_abbr,local_team_name,visitante_team_name,partido_id,fecha,is_home,resultado,sacks_permitidos,pct_sacks,puntos_anotados,margin\n\
                   2023,,regular,NYJ,Jets,Bills,g1,2023-09-11 20:15:00,True,win,5,12.0,22,11\n";
        let path = write_file(&dir, "games.csv", csv);

        let table = load_file(&path).unwrap();
        assert_eq!(table.rows()[0].week, 37);
    }

    #[test]
    fn test_blank_pct_sacks_is_nan() {
        let dir = tempfile::tempdir().unwrap();
        let csv = format!(
            "{HEADER}\n\
             2023,regular,KC,Chiefs,Lions,g1,2023-09-07,True,loss,3,,20,-8\n\
             2023,regular,DET,Chiefs,Lions,g1,2023-09-07,False,win,1,abc,28,8\n"
        );
        let path = write_file(&dir, "games.csv", &csv);

        match load_file(&path).unwrap_err() {
            LoadError::InvalidValue { row, column, value } => {
                assert_eq!(row, 1);
                assert_eq!(column, "pct_sacks");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }

        let csv = format!("{HEADER}\n2023,regular,KC,Chiefs,Lions,g1,2023-09-07,True,loss,3,,20,-8\n");
        let path = write_file(&dir, "blank.csv", &csv);
        let table = load_file(&path).unwrap();
        assert!(table.rows()[0].pct_sacks.is_nan());
        assert_eq!(table.rows()[0].sacks_permitidos, 3);
    }

    #[test]
    fn test_missing_date_column() {
        let dir = tempfile::tempdir().unwrap();
        let csv = "season,phase,team_abbr,local_team_name,visitante_team_name,partido_id,is_home,resultado,sacks_permitidos,pct_sacks,puntos_anotados,margin\n\
                   2023,regular,KC,Chiefs,Lions,g1,True,loss,3,7.5,20,-8\n";
        let path = write_file(&dir, "games.csv", csv);

        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("fecha")));
    }

    #[test]
    fn test_invalid_cell_reports_row_and_column() {
        let dir = tempfile::tempdir().unwrap();
        let csv = format!(
            "{HEADER}\n\
             2023,regular,KC,Chiefs,Lions,g1,2023-09-07,True,loss,3,7.5,20,-8\n\
             2023,regular,DET,Chiefs,Lions,g1,2023-09-07,False,tie,1,2.5,28,8\n"
        );
        let path = write_file(&dir, "games.csv", &csv);

        match load_file(&path).unwrap_err() {
            LoadError::InvalidValue { row, column, value } => {
                assert_eq!(row, 1);
                assert_eq!(column, "resultado");
                assert_eq!(value, "tie");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_sacks_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let csv = format!("{HEADER}\n2023,regular,KC,Chiefs,Lions,g1,2023-09-07,True,loss,-1,0.0,20,-8\n");
        let path = write_file(&dir, "games.csv", &csv);

        assert!(matches!(
            load_file(&path),
            Err(LoadError::InvalidValue { column: "sacks_permitidos", .. })
        ));
    }

    #[test]
    fn test_missing_file_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_file(&dir.path().join("nope.csv")),
            Err(LoadError::Io { .. })
        ));
        assert!(matches!(
            load_file(&dir.path().join("games.xlsx")),
            Err(LoadError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn test_parquet_with_date32() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.parquet");

        let text = |v: &str| Arc::new(StringArray::from(vec![v])) as ArrayRef;
        let int = |v: i64| Arc::new(Int64Array::from(vec![v])) as ArrayRef;
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let days = (NaiveDate::from_ymd_opt(2024, 1, 14).unwrap() - epoch).num_days() as i32;

        let fields = vec![
            Field::new("season", DataType::Int64, false),
            Field::new("phase", DataType::Utf8, false),
            Field::new("team_abbr", DataType::Utf8, false),
            Field::new("local_team_name", DataType::Utf8, false),
            Field::new("visitante_team_name", DataType::Utf8, false),
            Field::new("partido_id", DataType::Utf8, false),
            Field::new("fecha", DataType::Date32, false),
            Field::new("is_home", DataType::Boolean, false),
            Field::new("resultado", DataType::Utf8, false),
            Field::new("sacks_permitidos", DataType::Int64, false),
            Field::new("pct_sacks", DataType::Float64, false),
            Field::new("puntos_anotados", DataType::Int64, false),
            Field::new("margin", DataType::Int64, false),
        ];
        let columns: Vec<ArrayRef> = vec![
            int(2023),
            text("playoff"),
            text("PIT"),
            text("Bills"),
            text("Steelers"),
            text("2023_19_PIT_BUF"),
            Arc::new(Date32Array::from(vec![days])),
            Arc::new(BooleanArray::from(vec![false])),
            text("loss"),
            int(4),
            Arc::new(Float64Array::from(vec![9.5])),
            int(17),
            int(-14),
        ];
        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).unwrap();
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        let rec = &table.rows()[0];
        assert_eq!(rec.fecha, NaiveDate::from_ymd_opt(2024, 1, 14).unwrap());
        assert_eq!(rec.week, 2);
        assert_eq!(rec.loc_vi, Location::Visitante);
        assert_eq!(rec.sacks_permitidos, 4);
        assert_eq!(rec.pct_sacks, 9.5);
    }
}
