//! Writes a synthetic processed game table (CSV or Parquet) for trying out
//! the dashboard without real play-by-play data.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use chrono::{Days, NaiveDate};
use clap::Parser;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const TEAMS: [(&str, &str); 16] = [
    ("BUF", "Buffalo Bills"),
    ("MIA", "Miami Dolphins"),
    ("NE", "New England Patriots"),
    ("NYJ", "New York Jets"),
    ("KC", "Kansas City Chiefs"),
    ("LV", "Las Vegas Raiders"),
    ("DEN", "Denver Broncos"),
    ("LAC", "Los Angeles Chargers"),
    ("PHI", "Philadelphia Eagles"),
    ("DAL", "Dallas Cowboys"),
    ("NYG", "New York Giants"),
    ("WAS", "Washington Commanders"),
    ("SF", "San Francisco 49ers"),
    ("SEA", "Seattle Seahawks"),
    ("LAR", "Los Angeles Rams"),
    ("ARI", "Arizona Cardinals"),
];

const REGULAR_WEEKS: u32 = 18;
/// Games per playoff round.
const PLAYOFF_ROUNDS: [usize; 3] = [4, 2, 1];

#[derive(Debug, Parser)]
#[command(about = "Generate a synthetic NFL sacks table")]
struct Args {
    /// Output file (.csv or .parquet)
    #[arg(default_value = "processed_data.csv")]
    output: PathBuf,

    /// First season to generate
    #[arg(long, default_value_t = 2021)]
    first_season: i32,

    /// Number of seasons
    #[arg(long, default_value_t = 3)]
    seasons: i32,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Leave out `week` and `loc_vi` so the loader derives them
    #[arg(long)]
    omit_derived: bool,
}

#[derive(Debug, Clone, Serialize)]
struct Row {
    season: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    week: Option<u32>,
    phase: &'static str,
    team_abbr: &'static str,
    local_team_name: &'static str,
    visitante_team_name: &'static str,
    partido_id: String,
    fecha: NaiveDate,
    is_home: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    loc_vi: Option<&'static str>,
    resultado: &'static str,
    sacks_permitidos: u32,
    pct_sacks: f64,
    puntos_anotados: u32,
    margin: i32,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: u32, hi: u32) -> u32 {
        lo + (self.next_u64() % u64::from(hi - lo + 1)) as u32
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = (self.next_u64() % (i as u64 + 1)) as usize;
            items.swap(i, j);
        }
    }
}

/// Both rows of one game decided by at least 8 points.
fn game_rows(
    rng: &mut SimpleRng,
    season: i32,
    week: u32,
    phase: &'static str,
    fecha: NaiveDate,
    (home, away): (usize, usize),
) -> [Row; 2] {
    let margin = rng.range(8, 31) as i32;
    let loser_points = rng.range(3, 24);
    let winner_points = loser_points + margin as u32;
    let home_wins = rng.next_f64() < 0.57;

    let (home_abbr, home_name) = TEAMS[home];
    let (away_abbr, away_name) = TEAMS[away];
    let partido_id = format!("{season}_{week:02}_{away_abbr}_{home_abbr}");

    let mut side = |abbr: &'static str, is_home: bool, won: bool| {
        // Losing offenses throw more and get sacked more.
        let sacks = rng.gauss(if won { 1.8 } else { 3.2 }, 1.3).round().clamp(0.0, 10.0) as u32;
        let dropbacks = rng.gauss(if won { 33.0 } else { 41.0 }, 6.0).round().clamp(18.0, 65.0);
        Row {
            season,
            week: Some(week),
            phase,
            team_abbr: abbr,
            local_team_name: home_name,
            visitante_team_name: away_name,
            partido_id: partido_id.clone(),
            fecha,
            is_home,
            loc_vi: Some(if is_home { "Casa" } else { "Visitante" }),
            resultado: if won { "win" } else { "loss" },
            sacks_permitidos: sacks,
            pct_sacks: (f64::from(sacks) / dropbacks * 10_000.0).round() / 100.0,
            puntos_anotados: if won { winner_points } else { loser_points },
            margin: if won { margin } else { -margin },
        }
    };

    [side(home_abbr, true, home_wins), side(away_abbr, false, !home_wins)]
}

fn generate(args: &Args) -> Result<Vec<Row>> {
    let mut rng = SimpleRng::new(args.seed);
    let mut rows = Vec::new();

    for season in args.first_season..args.first_season + args.seasons {
        let kickoff = NaiveDate::from_ymd_opt(season, 9, 8)
            .with_context(|| format!("invalid season {season}"))?;
        let mut order: Vec<usize> = (0..TEAMS.len()).collect();

        let rounds = (1..=REGULAR_WEEKS)
            .map(|week| (week, "regular", TEAMS.len() / 2))
            .chain(
                PLAYOFF_ROUNDS
                    .iter()
                    .enumerate()
                    .map(|(i, &games)| (REGULAR_WEEKS + 1 + i as u32, "playoff", games)),
            );

        for (week, phase, games) in rounds {
            let fecha = kickoff
                .checked_add_days(Days::new(u64::from(week - 1) * 7))
                .context("date overflow")?;
            rng.shuffle(&mut order);
            for pair in order.chunks_exact(2).take(games) {
                // Close games never reach the processed table.
                if phase == "regular" && rng.next_f64() < 0.45 {
                    continue;
                }
                rows.extend(game_rows(&mut rng, season, week, phase, fecha, (pair[0], pair[1])));
            }
        }
    }

    if args.omit_derived {
        for row in &mut rows {
            row.week = None;
            row.loc_vi = None;
        }
    }
    Ok(rows)
}

fn to_batch(rows: &[Row], with_derived: bool) -> Result<RecordBatch> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("epoch")?;
    let mut fields = vec![Field::new("season", DataType::Int64, false)];
    let mut columns: Vec<ArrayRef> = vec![Arc::new(Int64Array::from(
        rows.iter().map(|r| i64::from(r.season)).collect::<Vec<_>>(),
    ))];
    if with_derived {
        fields.push(Field::new("week", DataType::Int64, true));
        columns.push(Arc::new(Int64Array::from(
            rows.iter().map(|r| r.week.map(i64::from)).collect::<Vec<_>>(),
        )));
    }
    let text_columns: [(&str, Vec<&str>); 5] = [
        ("phase", rows.iter().map(|r| r.phase).collect()),
        ("team_abbr", rows.iter().map(|r| r.team_abbr).collect()),
        ("local_team_name", rows.iter().map(|r| r.local_team_name).collect()),
        ("visitante_team_name", rows.iter().map(|r| r.visitante_team_name).collect()),
        ("partido_id", rows.iter().map(|r| r.partido_id.as_str()).collect()),
    ];
    for (name, values) in text_columns {
        fields.push(Field::new(name, DataType::Utf8, false));
        columns.push(Arc::new(StringArray::from(values)));
    }
    fields.push(Field::new("fecha", DataType::Date32, false));
    columns.push(Arc::new(Date32Array::from(
        rows.iter()
            .map(|r| (r.fecha - epoch).num_days() as i32)
            .collect::<Vec<_>>(),
    )));
    fields.push(Field::new("is_home", DataType::Boolean, false));
    columns.push(Arc::new(BooleanArray::from(
        rows.iter().map(|r| r.is_home).collect::<Vec<_>>(),
    )));
    if with_derived {
        fields.push(Field::new("loc_vi", DataType::Utf8, true));
        columns.push(Arc::new(StringArray::from(
            rows.iter().map(|r| r.loc_vi).collect::<Vec<_>>(),
        )));
    }
    fields.push(Field::new("resultado", DataType::Utf8, false));
    columns.push(Arc::new(StringArray::from(
        rows.iter().map(|r| r.resultado).collect::<Vec<_>>(),
    )));
    fields.push(Field::new("sacks_permitidos", DataType::Int64, false));
    columns.push(Arc::new(Int64Array::from(
        rows.iter().map(|r| i64::from(r.sacks_permitidos)).collect::<Vec<_>>(),
    )));
    fields.push(Field::new("pct_sacks", DataType::Float64, false));
    columns.push(Arc::new(Float64Array::from(
        rows.iter().map(|r| r.pct_sacks).collect::<Vec<_>>(),
    )));
    fields.push(Field::new("puntos_anotados", DataType::Int64, false));
    columns.push(Arc::new(Int64Array::from(
        rows.iter().map(|r| i64::from(r.puntos_anotados)).collect::<Vec<_>>(),
    )));
    fields.push(Field::new("margin", DataType::Int64, false));
    columns.push(Arc::new(Int64Array::from(
        rows.iter().map(|r| i64::from(r.margin)).collect::<Vec<_>>(),
    )));

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let rows = generate(&args)?;
    let batch = to_batch(&rows, !args.omit_derived)?;

    let ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => write_csv(&args.output, &rows)?,
        "parquet" | "pq" => write_parquet(&args.output, &batch)?,
        other => bail!("unsupported output extension: .{other}"),
    }

    println!("{}", pretty_format_batches(&[batch.slice(0, batch.num_rows().min(6))])?);
    println!("Wrote {} team-game rows to {}", rows.len(), args.output.display());
    Ok(())
}
