use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::history::TeamMatchRecord;

pub const DEFAULT_AVG_GOALS_FOR: f64 = 1.25;
pub const DEFAULT_AVG_GOALS_AGAINST: f64 = 1.25;
pub const DEFAULT_AVG_TOTAL_GOALS: f64 = 2.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueContext {
    pub tournament_name: String,
    pub sample_rows: usize,
    pub avg_goals_for: f64,
    pub avg_goals_against: f64,
    pub avg_total_goals: f64,
}

impl LeagueContext {
    pub fn defaults(tournament_name: &str) -> Self {
        Self {
            tournament_name: tournament_name.to_string(),
            sample_rows: 0,
            avg_goals_for: DEFAULT_AVG_GOALS_FOR,
            avg_goals_against: DEFAULT_AVG_GOALS_AGAINST,
            avg_total_goals: DEFAULT_AVG_TOTAL_GOALS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LeagueTable {
    leagues: HashMap<String, LeagueContext>,
}

impl LeagueTable {
    /// Context for a tournament, or the default constants when it has no history.
    pub fn context_for(&self, tournament_name: &str) -> LeagueContext {
        self.leagues
            .get(tournament_name)
            .cloned()
            .unwrap_or_else(|| LeagueContext::defaults(tournament_name))
    }

    pub fn get(&self, tournament_name: &str) -> Option<&LeagueContext> {
        self.leagues.get(tournament_name)
    }

    pub fn len(&self) -> usize {
        self.leagues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leagues.is_empty()
    }

    /// Leagues ordered by average total goals, highest first.
    pub fn by_total_goals(&self) -> Vec<&LeagueContext> {
        let mut rows: Vec<&LeagueContext> = self.leagues.values().collect();
        rows.sort_by(|a, b| {
            b.avg_total_goals
                .total_cmp(&a.avg_total_goals)
                .then_with(|| a.tournament_name.cmp(&b.tournament_name))
        });
        rows
    }
}

// All history is averaged; seasons are not separated.
pub fn compute_league_contexts(records: &[TeamMatchRecord]) -> LeagueTable {
    let mut sums: HashMap<&str, (f64, f64, usize)> = HashMap::new();
    for r in records {
        let entry = sums.entry(r.tournament_name.as_str()).or_insert((0.0, 0.0, 0));
        entry.0 += r.goals_for as f64;
        entry.1 += r.goals_against as f64;
        entry.2 += 1;
    }

    let leagues = sums
        .into_iter()
        .map(|(name, (gf, ga, n))| {
            let n_f = n as f64;
            let ctx = LeagueContext {
                tournament_name: name.to_string(),
                sample_rows: n,
                avg_goals_for: gf / n_f,
                avg_goals_against: ga / n_f,
                avg_total_goals: (gf + ga) / n_f,
            };
            (name.to_string(), ctx)
        })
        .collect();

    LeagueTable { leagues }
}
