use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::history::{Fixture, MatchResult, TeamMatchRecord, Venue};

/// A generated league: both sides of every played match plus upcoming fixtures.
#[derive(Debug, Clone)]
pub struct SyntheticLeague {
    pub records: Vec<TeamMatchRecord>,
    pub fixtures: Vec<Fixture>,
}

/// Double round-robin history for `teams` sides, then one more round of fixtures
/// dated after the last played matchday. The same seed always yields the same league.
pub fn generate_league(seed: u64, tournament: &str, teams: u32, start: NaiveDate) -> SyntheticLeague {
    let mut rng = StdRng::seed_from_u64(seed);
    let teams = teams.max(2);
    let strength: Vec<(f64, f64)> = (0..teams)
        .map(|_| (rng.gen_range(0.6..2.2), rng.gen_range(0.6..2.0)))
        .collect();

    let mut records = Vec::new();
    let mut match_id = seed.wrapping_mul(1_000_000) + 1;
    let mut day = start;
    let rounds = round_robin(teams);

    for leg in 0..2 {
        for round in &rounds {
            for &(a, b) in round {
                let (home, away) = if leg == 0 { (a, b) } else { (b, a) };
                let (h_att, h_def) = strength[home as usize];
                let (a_att, a_def) = strength[away as usize];
                let home_goals = sample_goals(&mut rng, (h_att * a_def / 1.3) * 1.1);
                let away_goals = sample_goals(&mut rng, a_att * h_def / 1.3);
                push_sides(
                    &mut records,
                    tournament,
                    match_id,
                    day,
                    (home + 1, home_goals),
                    (away + 1, away_goals),
                );
                match_id += 1;
            }
            day += Duration::days(7);
        }
    }

    let fixtures = rounds
        .first()
        .map(|round| {
            round
                .iter()
                .map(|&(a, b)| {
                    let id = match_id;
                    match_id += 1;
                    Fixture {
                        match_id: id,
                        date: day,
                        home_team_id: a + 1,
                        home_team_name: team_name(a + 1),
                        away_team_id: b + 1,
                        away_team_name: team_name(b + 1),
                        tournament_name: tournament.to_string(),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    SyntheticLeague { records, fixtures }
}

fn push_sides(
    out: &mut Vec<TeamMatchRecord>,
    tournament: &str,
    match_id: u64,
    date: NaiveDate,
    (home_id, home_goals): (u32, u32),
    (away_id, away_goals): (u32, u32),
) {
    out.push(TeamMatchRecord {
        team_id: home_id,
        team_name: team_name(home_id),
        match_id,
        date,
        venue: Venue::Home,
        goals_for: home_goals,
        goals_against: away_goals,
        opponent_id: away_id,
        opponent_name: team_name(away_id),
        result: MatchResult::from_score(home_goals, away_goals),
        tournament_name: tournament.to_string(),
    });
    out.push(TeamMatchRecord {
        team_id: away_id,
        team_name: team_name(away_id),
        match_id,
        date,
        venue: Venue::Away,
        goals_for: away_goals,
        goals_against: home_goals,
        opponent_id: home_id,
        opponent_name: team_name(home_id),
        result: MatchResult::from_score(away_goals, home_goals),
        tournament_name: tournament.to_string(),
    });
}

fn team_name(id: u32) -> String {
    format!("Team {id:02}")
}

// Knuth's product-of-uniforms Poisson draw; fine for small means.
fn sample_goals(rng: &mut StdRng, lambda: f64) -> u32 {
    let limit = (-lambda.clamp(0.05, 6.0)).exp();
    let mut k = 0u32;
    let mut p = 1.0;
    loop {
        p *= rng.r#gen::<f64>();
        if p <= limit || k >= 12 {
            return k;
        }
        k += 1;
    }
}

/// Circle-method pairings; an odd team count gets a bye each round.
fn round_robin(teams: u32) -> Vec<Vec<(u32, u32)>> {
    let mut slots: Vec<Option<u32>> = (0..teams).map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let n = slots.len();
    let mut rounds = Vec::with_capacity(n - 1);
    for _ in 0..n - 1 {
        let mut round = Vec::with_capacity(n / 2);
        for i in 0..n / 2 {
            if let (Some(a), Some(b)) = (slots[i], slots[n - 1 - i]) {
                round.push((a, b));
            }
        }
        rounds.push(round);
        slots[1..].rotate_right(1);
    }
    rounds
}
