mod common;

use rusqlite::Connection;

use common::{day, fixture, played};
use goals_engine::history::{TeamMatchRecord, derive_h2h_records};
use goals_engine::store;

fn memory_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    store::init_schema(&conn).unwrap();
    conn
}

fn sample_history() -> Vec<TeamMatchRecord> {
    let mut out = Vec::new();
    out.extend(played(1, 1, 1, 2, 2, 1));
    out.extend(played(2, 8, 2, 1, 0, 0));
    out.extend(played(3, 8, 3, 4, 4, 2));
    out.extend(played(4, 15, 1, 3, 1, 3));
    out
}

fn by_team_and_match(mut rows: Vec<TeamMatchRecord>) -> Vec<TeamMatchRecord> {
    rows.sort_by_key(|r| (r.team_id, r.match_id));
    rows
}

#[test]
fn history_is_append_only() {
    let mut conn = memory_db();
    let history = sample_history();

    assert_eq!(store::insert_team_matches(&mut conn, &history).unwrap(), 8);
    assert_eq!(store::insert_team_matches(&mut conn, &history).unwrap(), 0);

    // A changed score for an existing (team, match) pair is ignored.
    let mut edited = history[0].clone();
    edited.goals_for = 9;
    assert_eq!(store::insert_team_matches(&mut conn, &[edited]).unwrap(), 0);

    let loaded = store::load_team_matches(&conn).unwrap();
    assert_eq!(by_team_and_match(loaded), by_team_and_match(history));
}

#[test]
fn loaded_history_is_most_recent_first_per_team() {
    let mut conn = memory_db();
    store::insert_team_matches(&mut conn, &sample_history()).unwrap();
    let loaded = store::load_team_matches(&conn).unwrap();

    let team1: Vec<u64> = loaded
        .iter()
        .filter(|r| r.team_id == 1)
        .map(|r| r.match_id)
        .collect();
    assert_eq!(team1, vec![4, 2, 1]);
}

#[test]
fn sql_h2h_matches_in_memory_derivation() {
    let mut conn = memory_db();
    let history = sample_history();
    store::insert_team_matches(&mut conn, &history).unwrap();

    let from_sql = store::load_h2h_records(&conn).unwrap();
    assert_eq!(from_sql, derive_h2h_records(&history));
    let pair: Vec<u32> = from_sql
        .iter()
        .filter(|r| (r.team1_id, r.team2_id) == (1, 2))
        .map(|r| r.total_goals)
        .collect();
    assert_eq!(pair, vec![0, 3]);
}

#[test]
fn fixtures_upsert_and_window() {
    let mut conn = memory_db();
    let fixtures = vec![fixture(10, 20, 1, 2), fixture(11, 21, 3, 4), fixture(12, 25, 2, 3)];
    store::upsert_fixtures(&mut conn, &fixtures, store::STATUS_NOT_STARTED).unwrap();

    let mut moved = fixtures[2].clone();
    moved.date = day(22);
    store::upsert_fixtures(&mut conn, &[moved], store::STATUS_NOT_STARTED).unwrap();
    store::upsert_fixtures(&mut conn, &[fixture(13, 21, 4, 1)], "finished").unwrap();

    let all = store::load_upcoming_fixtures(&conn, None, None).unwrap();
    assert_eq!(all.iter().map(|f| f.match_id).collect::<Vec<_>>(), vec![10, 11, 12]);
    assert_eq!(all[2].date, day(22));

    let window = store::load_upcoming_fixtures(&conn, Some(day(21)), Some(day(22))).unwrap();
    assert_eq!(window.iter().map(|f| f.match_id).collect::<Vec<_>>(), vec![11, 12]);
}

#[test]
fn open_db_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("goals.sqlite");
    let mut conn = store::open_db(&path).unwrap();
    store::insert_team_matches(&mut conn, &sample_history()).unwrap();
    drop(conn);

    let reopened = store::open_db(&path).unwrap();
    assert_eq!(store::load_team_matches(&reopened).unwrap().len(), 8);
}

#[test]
fn open_db_reports_unusable_parent() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    let err = store::open_db(&blocker.join("goals.sqlite")).unwrap_err();
    assert!(format!("{err:#}").contains("create db dir"), "{err:#}");
}
