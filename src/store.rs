use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use rusqlite::{Connection, Row, params};
use tracing::{debug, info};

use crate::history::{Fixture, H2HRecord, MatchResult, TeamMatchRecord, Venue};

pub const STATUS_NOT_STARTED: &str = "notstarted";
const DATE_FMT: &str = "%Y-%m-%d";

pub fn default_db_path() -> PathBuf {
    std::env::var("GOALS_DB_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data").join("goals.sqlite"))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create db dir {}", parent.display()))?;
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS team_matches (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            team_id INTEGER NOT NULL,
            team_name TEXT NOT NULL,
            match_id INTEGER NOT NULL,
            match_date TEXT NOT NULL,
            venue TEXT NOT NULL,
            team_score INTEGER NOT NULL,
            opponent_score INTEGER NOT NULL,
            opponent_id INTEGER NOT NULL,
            opponent_name TEXT NOT NULL,
            result TEXT NOT NULL,
            tournament_name TEXT NOT NULL,
            UNIQUE(team_id, match_id)
        );
        CREATE INDEX IF NOT EXISTS idx_team_matches_team ON team_matches(team_id, match_date);
        CREATE INDEX IF NOT EXISTS idx_team_matches_match ON team_matches(match_id);
        CREATE INDEX IF NOT EXISTS idx_team_matches_tournament ON team_matches(tournament_name);

        CREATE TABLE IF NOT EXISTS fixtures (
            match_id INTEGER PRIMARY KEY,
            date TEXT NOT NULL,
            home_team_id INTEGER NOT NULL,
            home_team_name TEXT NOT NULL,
            away_team_id INTEGER NOT NULL,
            away_team_name TEXT NOT NULL,
            tournament_name TEXT NOT NULL,
            status TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_fixtures_status_date ON fixtures(status, date);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Append history rows. A `(team_id, match_id)` pair that already exists is left
/// untouched. Returns how many rows were new.
pub fn insert_team_matches(conn: &mut Connection, records: &[TeamMatchRecord]) -> Result<usize> {
    let tx = conn.transaction().context("begin history transaction")?;
    let mut inserted = 0usize;
    {
        let mut stmt = tx
            .prepare(
                r#"
                INSERT INTO team_matches (
                    team_id, team_name, match_id, match_date, venue,
                    team_score, opponent_score, opponent_id, opponent_name,
                    result, tournament_name
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                ON CONFLICT(team_id, match_id) DO NOTHING
                "#,
            )
            .context("prepare history insert")?;
        for r in records {
            inserted += stmt
                .execute(params![
                    r.team_id as i64,
                    r.team_name,
                    r.match_id as i64,
                    r.date.format(DATE_FMT).to_string(),
                    r.venue.as_str(),
                    r.goals_for as i64,
                    r.goals_against as i64,
                    r.opponent_id as i64,
                    r.opponent_name,
                    r.result.as_str(),
                    r.tournament_name,
                ])
                .context("insert history row")?;
        }
    }
    tx.commit().context("commit history transaction")?;
    debug!(offered = records.len(), inserted, "history rows stored");
    Ok(inserted)
}

/// Insert or refresh fixtures by `match_id`, each with the given status.
pub fn upsert_fixtures(conn: &mut Connection, fixtures: &[Fixture], status: &str) -> Result<usize> {
    let tx = conn.transaction().context("begin fixtures transaction")?;
    {
        let mut stmt = tx
            .prepare(
                r#"
                INSERT INTO fixtures (
                    match_id, date, home_team_id, home_team_name,
                    away_team_id, away_team_name, tournament_name, status
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(match_id) DO UPDATE SET
                    date = excluded.date,
                    home_team_id = excluded.home_team_id,
                    home_team_name = excluded.home_team_name,
                    away_team_id = excluded.away_team_id,
                    away_team_name = excluded.away_team_name,
                    tournament_name = excluded.tournament_name,
                    status = excluded.status
                "#,
            )
            .context("prepare fixture upsert")?;
        for f in fixtures {
            stmt.execute(params![
                f.match_id as i64,
                f.date.format(DATE_FMT).to_string(),
                f.home_team_id as i64,
                f.home_team_name,
                f.away_team_id as i64,
                f.away_team_name,
                f.tournament_name,
                status,
            ])
            .context("upsert fixture")?;
        }
    }
    tx.commit().context("commit fixtures transaction")?;
    Ok(fixtures.len())
}

pub fn load_team_matches(conn: &Connection) -> Result<Vec<TeamMatchRecord>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT team_id, team_name, match_id, match_date, venue,
                   team_score, opponent_score, opponent_id, opponent_name,
                   result, tournament_name
            FROM team_matches
            ORDER BY team_id, match_date DESC, match_id DESC
            "#,
        )
        .context("prepare load history query")?;
    let rows = stmt
        .query_map([], |row| Ok(team_match_from_row(row)))
        .context("query load history")?;

    let mut out = Vec::new();
    for row in rows {
        let raw = row.context("decode history row")??;
        out.push(raw);
    }
    info!(rows = out.len(), "history loaded");
    Ok(out)
}

/// Fixtures that have not started, optionally limited to `[from, to]` (inclusive).
pub fn load_upcoming_fixtures(
    conn: &Connection,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<Fixture>> {
    let from = from.map(|d| d.format(DATE_FMT).to_string());
    let to = to.map(|d| d.format(DATE_FMT).to_string());
    let mut stmt = conn
        .prepare(
            r#"
            SELECT match_id, date, home_team_id, home_team_name,
                   away_team_id, away_team_name, tournament_name
            FROM fixtures
            WHERE status = ?1
              AND (?2 IS NULL OR date >= ?2)
              AND (?3 IS NULL OR date <= ?3)
            ORDER BY date, match_id
            "#,
        )
        .context("prepare load fixtures query")?;
    let rows = stmt
        .query_map(params![STATUS_NOT_STARTED, from, to], |row| {
            Ok(fixture_from_row(row))
        })
        .context("query load fixtures")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode fixture row")??);
    }
    info!(fixtures = out.len(), "upcoming fixtures loaded");
    Ok(out)
}

/// Head-to-head rows from pairing both sides of each stored match.
pub fn load_h2h_records(conn: &Connection) -> Result<Vec<H2HRecord>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT t1.team_id, t2.team_id, t1.match_id,
                   t1.team_score + t2.team_score AS total_goals,
                   t1.match_date
            FROM team_matches t1
            JOIN team_matches t2 ON t1.match_id = t2.match_id
            WHERE t1.team_id < t2.team_id
            ORDER BY t1.team_id, t2.team_id, t1.match_date DESC, t1.match_id DESC
            "#,
        )
        .context("prepare h2h query")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, u32>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
            ))
        })
        .context("query h2h")?;

    let mut out = Vec::new();
    for row in rows {
        let (team1_id, team2_id, match_id, total_goals, date) = row.context("decode h2h row")?;
        out.push(H2HRecord {
            team1_id,
            team2_id,
            match_id: match_id as u64,
            total_goals: u32::try_from(total_goals)
                .map_err(|_| anyhow!("negative total goals for match {match_id}"))?,
            date: parse_date(&date)?,
        });
    }
    Ok(out)
}

// Column errors surface through the outer rusqlite result; text parsing through the inner one.
fn team_match_from_row(row: &Row<'_>) -> Result<TeamMatchRecord> {
    let date: String = row.get(3)?;
    let venue: String = row.get(4)?;
    let result: String = row.get(9)?;
    let match_id: i64 = row.get(2)?;
    Ok(TeamMatchRecord {
        team_id: row.get::<_, u32>(0)?,
        team_name: row.get(1)?,
        match_id: match_id as u64,
        date: parse_date(&date)?,
        venue: Venue::parse(&venue)
            .ok_or_else(|| anyhow!("bad venue {venue:?} for match {match_id}"))?,
        goals_for: row.get::<_, u32>(5)?,
        goals_against: row.get::<_, u32>(6)?,
        opponent_id: row.get::<_, u32>(7)?,
        opponent_name: row.get(8)?,
        result: MatchResult::parse(&result)
            .ok_or_else(|| anyhow!("bad result {result:?} for match {match_id}"))?,
        tournament_name: row.get(10)?,
    })
}

fn fixture_from_row(row: &Row<'_>) -> Result<Fixture> {
    let date: String = row.get(1)?;
    Ok(Fixture {
        match_id: row.get::<_, i64>(0)? as u64,
        date: parse_date(&date)?,
        home_team_id: row.get::<_, u32>(2)?,
        home_team_name: row.get(3)?,
        away_team_id: row.get::<_, u32>(4)?,
        away_team_name: row.get(5)?,
        tournament_name: row.get(6)?,
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, DATE_FMT).with_context(|| format!("invalid date {raw:?}"))
}
