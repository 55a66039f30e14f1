use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::{Duration, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use goals_engine::config::ScoringConfig;
use goals_engine::export::{self, Sheet};
use goals_engine::history::derive_h2h_records;
use goals_engine::ingest;
use goals_engine::pipeline::{ScoringRun, run_scoring};
use goals_engine::ranking::render_rankings;
use goals_engine::scoring::Category;
use goals_engine::store::{self, STATUS_NOT_STARTED};
use goals_engine::synthetic::generate_league;

#[derive(Debug, Parser)]
#[command(name = "goals_engine", about = "Score upcoming fixtures from team match history")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load history and fixture CSVs into the SQLite store.
    Ingest {
        #[arg(long, env = "GOALS_DB_PATH")]
        db: Option<PathBuf>,
        #[arg(long)]
        history: Option<PathBuf>,
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },
    /// Score upcoming fixtures from the store.
    Score {
        #[arg(long, env = "GOALS_DB_PATH")]
        db: Option<PathBuf>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Today and tomorrow only.
        #[arg(long, conflicts_with_all = ["from", "to"])]
        today: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Per-tournament averages from the stored history.
    Leagues {
        #[arg(long, env = "GOALS_DB_PATH")]
        db: Option<PathBuf>,
    },
    /// Generate a seeded synthetic league and score it without touching the store.
    Demo {
        #[arg(long, default_value_t = 7)]
        seed: u64,
        #[arg(long, default_value_t = 12)]
        teams: u32,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Restrict the console ranking to these categories (e.g. over_25, gg).
    #[arg(long = "category", value_parser = parse_category)]
    categories: Vec<Category>,
    #[arg(long)]
    top: Option<usize>,
    #[arg(long)]
    window: Option<usize>,
    #[arg(long, default_value = "data/enhanced_analysis.csv")]
    out: PathBuf,
    /// Also write the wide per-fixture diagnostics table.
    #[arg(long)]
    master: Option<PathBuf>,
    /// Also write a workbook with summary, master and top-N sheets.
    #[arg(long)]
    xlsx: Option<PathBuf>,
}

fn parse_category(raw: &str) -> Result<Category, String> {
    Category::parse(raw).ok_or_else(|| format!("unknown category {raw:?}"))
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Cli::parse().command {
        Command::Ingest {
            db,
            history,
            fixtures,
        } => cmd_ingest(db, history, fixtures),
        Command::Score {
            db,
            from,
            to,
            today,
            output,
        } => {
            let (from, to) = if today {
                let day = Local::now().date_naive();
                (Some(day), Some(day + Duration::days(1)))
            } else {
                (from, to)
            };
            cmd_score(db, from, to, &output)
        }
        Command::Leagues { db } => cmd_leagues(db),
        Command::Demo {
            seed,
            teams,
            output,
        } => cmd_demo(seed, teams, &output),
    }
}

fn cmd_ingest(db: Option<PathBuf>, history: Option<PathBuf>, fixtures: Option<PathBuf>) -> Result<()> {
    if history.is_none() && fixtures.is_none() {
        return Err(anyhow!("nothing to ingest: pass --history and/or --fixtures"));
    }
    let db_path = db.unwrap_or_else(store::default_db_path);
    let mut conn = store::open_db(&db_path)?;

    println!("DB: {}", db_path.display());
    if let Some(path) = history {
        let rows = ingest::read_history_csv(&path)?;
        let inserted = store::insert_team_matches(&mut conn, &rows)?;
        println!(
            "History: {} rows read, {} new, {} already stored",
            rows.len(),
            inserted,
            rows.len() - inserted
        );
    }
    if let Some(path) = fixtures {
        let rows = ingest::read_fixtures_csv(&path)?;
        let stored = store::upsert_fixtures(&mut conn, &rows, STATUS_NOT_STARTED)?;
        println!("Fixtures: {stored} upserted");
    }
    Ok(())
}

fn cmd_score(
    db: Option<PathBuf>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    output: &OutputArgs,
) -> Result<()> {
    let cfg = config_with_overrides(output)?;
    let db_path = db.unwrap_or_else(store::default_db_path);
    let conn = store::open_db(&db_path)?;

    let records = store::load_team_matches(&conn)?;
    let fixtures = store::load_upcoming_fixtures(&conn, from, to)?;
    let h2h = store::load_h2h_records(&conn)?;
    if fixtures.is_empty() {
        warn!(?from, ?to, "no upcoming fixtures in range");
        return Ok(());
    }

    let run = run_scoring(&records, &fixtures, &h2h, &cfg);
    report_run(&run, &cfg, output)
}

fn cmd_leagues(db: Option<PathBuf>) -> Result<()> {
    let db_path = db.unwrap_or_else(store::default_db_path);
    let conn = store::open_db(&db_path)?;
    let records = store::load_team_matches(&conn)?;
    let table = goals_engine::league_context::compute_league_contexts(&records);

    println!("{:<40} {:>6} {:>7} {:>7} {:>7}", "tournament", "rows", "gf", "ga", "tg");
    for ctx in table.by_total_goals() {
        println!(
            "{:<40} {:>6} {:>7.2} {:>7.2} {:>7.2}",
            ctx.tournament_name,
            ctx.sample_rows,
            ctx.avg_goals_for,
            ctx.avg_goals_against,
            ctx.avg_total_goals
        );
    }
    Ok(())
}

fn cmd_demo(seed: u64, teams: u32, output: &OutputArgs) -> Result<()> {
    let cfg = config_with_overrides(output)?;
    let start = NaiveDate::from_ymd_opt(2025, 8, 15).context("demo start date")?;
    let league = generate_league(seed, "Synthetic League", teams, start);
    let h2h = derive_h2h_records(&league.records);
    info!(
        seed,
        teams,
        rows = league.records.len(),
        fixtures = league.fixtures.len(),
        "synthetic league generated"
    );

    let run = run_scoring(&league.records, &league.fixtures, &h2h, &cfg);
    report_run(&run, &cfg, output)
}

fn config_with_overrides(output: &OutputArgs) -> Result<ScoringConfig> {
    let mut cfg = ScoringConfig::from_env()?;
    if let Some(top) = output.top {
        cfg.top_n = top;
    }
    if let Some(window) = output.window {
        cfg.window_size = window;
    }
    Ok(cfg.clamped())
}

fn report_run(run: &ScoringRun, cfg: &ScoringConfig, output: &OutputArgs) -> Result<()> {
    if !run.skipped.is_empty() {
        warn!(skipped = run.skipped.len(), "fixtures skipped for missing profile");
    }
    if run.scored.is_empty() {
        warn!("no fixtures could be scored");
        return Ok(());
    }

    let categories: &[Category] = if output.categories.is_empty() {
        &Category::ALL
    } else {
        &output.categories
    };
    print!("{}", render_rankings(categories, &run.scored, cfg.top_n));

    let summary = export::summary_rows(&run.scored);
    let written = export::write_csv(&output.out, &summary)?;
    println!(
        "Summary: {} fixtures x {} columns -> {}",
        written.rows,
        written.columns,
        output.out.display()
    );

    let master = export::master_rows(&run.scored, &run.profiles);
    if let Some(path) = &output.master {
        let written = export::write_csv(path, &master)?;
        println!("Master: {} fixtures x {} columns -> {}", written.rows, written.columns, path.display());
    }
    if let Some(path) = &output.xlsx {
        write_workbook(path, summary, master, run, cfg.top_n)?;
        println!("Workbook -> {}", path.display());
    }
    Ok(())
}

fn write_workbook(
    path: &Path,
    summary: Vec<Vec<String>>,
    master: Vec<Vec<String>>,
    run: &ScoringRun,
    top_n: usize,
) -> Result<()> {
    let mut sheets = vec![
        Sheet {
            name: "Summary".to_string(),
            rows: summary,
        },
        Sheet {
            name: "Master".to_string(),
            rows: master,
        },
    ];
    sheets.extend(export::top_sheets(&run.scored, top_n));
    export::write_xlsx(path, &sheets)
}
