#![allow(dead_code)]

use chrono::NaiveDate;

use goals_engine::history::{Fixture, MatchResult, TeamMatchRecord, Venue};

pub const LEAGUE: &str = "Test League";

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap() + chrono::Duration::days(d as i64)
}

/// Both sides of one played match.
pub fn played(match_id: u64, d: u32, home: u32, away: u32, hg: u32, ag: u32) -> [TeamMatchRecord; 2] {
    let side = |team: u32, opp: u32, venue: Venue, gf: u32, ga: u32| TeamMatchRecord {
        team_id: team,
        team_name: format!("Team {team}"),
        match_id,
        date: day(d),
        venue,
        goals_for: gf,
        goals_against: ga,
        opponent_id: opp,
        opponent_name: format!("Team {opp}"),
        result: MatchResult::from_score(gf, ga),
        tournament_name: LEAGUE.to_string(),
    };
    [
        side(home, away, Venue::Home, hg, ag),
        side(away, home, Venue::Away, ag, hg),
    ]
}

pub fn fixture(match_id: u64, d: u32, home: u32, away: u32) -> Fixture {
    Fixture {
        match_id,
        date: day(d),
        home_team_id: home,
        home_team_name: format!("Team {home}"),
        away_team_id: away,
        away_team_name: format!("Team {away}"),
        tournament_name: LEAGUE.to_string(),
    }
}
