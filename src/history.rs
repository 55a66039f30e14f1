use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    Home,
    Away,
}

impl Venue {
    pub fn as_str(self) -> &'static str {
        match self {
            Venue::Home => "Home",
            Venue::Away => "Away",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "home" | "h" => Some(Venue::Home),
            "away" | "a" => Some(Venue::Away),
            _ => None,
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchResult {
    #[serde(rename = "W", alias = "Win")]
    Win,
    #[serde(rename = "D", alias = "Draw")]
    Draw,
    #[serde(rename = "L", alias = "Loss")]
    Loss,
}

impl MatchResult {
    pub fn from_score(goals_for: u32, goals_against: u32) -> Self {
        if goals_for > goals_against {
            MatchResult::Win
        } else if goals_for < goals_against {
            MatchResult::Loss
        } else {
            MatchResult::Draw
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchResult::Win => "W",
            MatchResult::Draw => "D",
            MatchResult::Loss => "L",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "w" | "win" => Some(MatchResult::Win),
            "d" | "draw" => Some(MatchResult::Draw),
            "l" | "loss" => Some(MatchResult::Loss),
            _ => None,
        }
    }
}

/// One played match seen from one team's side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMatchRecord {
    pub team_id: u32,
    pub team_name: String,
    pub match_id: u64,
    pub date: NaiveDate,
    pub venue: Venue,
    pub goals_for: u32,
    pub goals_against: u32,
    pub opponent_id: u32,
    pub opponent_name: String,
    pub result: MatchResult,
    pub tournament_name: String,
}

impl TeamMatchRecord {
    pub fn total_goals(&self) -> u32 {
        self.goals_for + self.goals_against
    }
}

/// An upcoming match that has not kicked off yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub match_id: u64,
    pub date: NaiveDate,
    pub home_team_id: u32,
    pub home_team_name: String,
    pub away_team_id: u32,
    pub away_team_name: String,
    pub tournament_name: String,
}

/// A past meeting between two teams, keyed by the canonical `(team1_id < team2_id)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct H2HRecord {
    pub team1_id: u32,
    pub team2_id: u32,
    pub match_id: u64,
    pub total_goals: u32,
    pub date: NaiveDate,
}

pub fn canonical_pair(a: u32, b: u32) -> (u32, u32) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Per-team match lists, most recent first.
#[derive(Debug, Clone, Default)]
pub struct TeamHistory {
    by_team: HashMap<u32, Vec<TeamMatchRecord>>,
}

impl TeamHistory {
    pub fn from_records(records: &[TeamMatchRecord]) -> Self {
        let mut by_team: HashMap<u32, Vec<TeamMatchRecord>> = HashMap::new();
        for record in records {
            by_team
                .entry(record.team_id)
                .or_default()
                .push(record.clone());
        }
        for rows in by_team.values_mut() {
            sort_most_recent_first(rows);
        }
        Self { by_team }
    }

    pub fn matches(&self, team_id: u32) -> &[TeamMatchRecord] {
        self.by_team
            .get(&team_id)
            .map(|rows| rows.as_slice())
            .unwrap_or(&[])
    }

    pub fn recent(&self, team_id: u32, n: usize) -> &[TeamMatchRecord] {
        let rows = self.matches(team_id);
        &rows[..rows.len().min(n)]
    }

    pub fn team_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_team.keys().copied()
    }

    pub fn team_count(&self) -> usize {
        self.by_team.len()
    }
}

pub fn sort_most_recent_first(rows: &mut [TeamMatchRecord]) {
    rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.match_id.cmp(&a.match_id)));
}

/// Pair up both sides of every match into head-to-head rows.
/// Matches with only one recorded side are dropped.
pub fn derive_h2h_records(records: &[TeamMatchRecord]) -> Vec<H2HRecord> {
    let mut sides: HashMap<u64, Vec<&TeamMatchRecord>> = HashMap::new();
    for record in records {
        sides.entry(record.match_id).or_default().push(record);
    }

    let mut out = Vec::new();
    for (match_id, rows) in sides {
        let Some(first) = rows.iter().min_by_key(|r| r.team_id) else {
            continue;
        };
        let Some(second) = rows.iter().find(|r| r.team_id > first.team_id) else {
            continue;
        };
        out.push(H2HRecord {
            team1_id: first.team_id,
            team2_id: second.team_id,
            match_id,
            total_goals: first.goals_for + second.goals_for,
            date: first.date,
        });
    }

    out.sort_by(|a, b| {
        (a.team1_id, a.team2_id)
            .cmp(&(b.team1_id, b.team2_id))
            .then(b.date.cmp(&a.date))
            .then(b.match_id.cmp(&a.match_id))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side(team_id: u32, opp: u32, match_id: u64, day: u32, gf: u32, ga: u32) -> TeamMatchRecord {
        TeamMatchRecord {
            team_id,
            team_name: format!("T{team_id}"),
            match_id,
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            venue: Venue::Home,
            goals_for: gf,
            goals_against: ga,
            opponent_id: opp,
            opponent_name: format!("T{opp}"),
            result: MatchResult::from_score(gf, ga),
            tournament_name: "League".to_string(),
        }
    }

    #[test]
    fn history_is_most_recent_first() {
        let rows = vec![side(1, 2, 10, 1, 1, 0), side(1, 3, 11, 9, 0, 0), side(1, 4, 12, 5, 2, 2)];
        let history = TeamHistory::from_records(&rows);
        let ids: Vec<u64> = history.matches(1).iter().map(|r| r.match_id).collect();
        assert_eq!(ids, vec![11, 12, 10]);
        assert_eq!(history.recent(1, 2).len(), 2);
        assert!(history.matches(99).is_empty());
    }

    #[test]
    fn h2h_rows_need_both_sides() {
        let rows = vec![
            side(7, 3, 100, 1, 2, 1),
            side(3, 7, 100, 1, 1, 2),
            side(7, 3, 101, 2, 0, 0),
        ];
        let h2h = derive_h2h_records(&rows);
        assert_eq!(h2h.len(), 1);
        assert_eq!((h2h[0].team1_id, h2h[0].team2_id), (3, 7));
        assert_eq!(h2h[0].total_goals, 3);
    }

    #[test]
    fn result_parses_short_and_long_forms() {
        assert_eq!(MatchResult::parse("W"), Some(MatchResult::Win));
        assert_eq!(MatchResult::parse("draw"), Some(MatchResult::Draw));
        assert_eq!(Venue::parse("away"), Some(Venue::Away));
        assert_eq!(Venue::parse("neutral"), None);
    }
}
