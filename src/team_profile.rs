use std::collections::HashMap;

use serde::Serialize;

use crate::config::ScoringConfig;
use crate::history::{TeamHistory, TeamMatchRecord, Venue};
use crate::league_context::LeagueTable;

const MOMENTUM_FLOOR: f64 = 0.5;
const OPPONENT_DEFENSE_FLOOR: f64 = 0.5;
const CHAOS_FLOOR: f64 = 1.0;
const GOAL_SHARE_FLOOR: f64 = 1.0;

/// Rolling summary of a team's most recent window of matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamProfile {
    pub team_id: u32,
    pub team_name: String,
    pub tournament_name: String,

    pub matches_n: usize,
    pub home_n: usize,
    pub away_n: usize,
    pub recent_scores: String,
    pub recent_total_goals: String,

    pub attack_overall: f64,
    pub attack_home: f64,
    pub attack_away: f64,
    pub defense_overall: f64,
    pub defense_home: f64,
    pub defense_away: f64,

    pub avg_opponent_defense: Option<f64>,
    pub attack_quality_adj: f64,

    pub attack_momentum: f64,
    pub defense_momentum: f64,
    pub openness_momentum: f64,
    pub form: f64,

    pub consistency: f64,
    pub chaos: f64,
    pub tg_std: f64,

    pub tg_avg: f64,
    pub over15_rate: f64,
    pub over25_rate: f64,
    pub over35_rate: f64,
    pub under15_rate: f64,
    pub extreme_rate: f64,
    pub zero_zero_rate: f64,
    pub score_1plus_rate: f64,
    pub score_2plus_rate: f64,
    pub concede_1plus_rate: f64,
    pub clean_sheet_rate: f64,
    pub failed_to_score_rate: f64,
    pub goal_share: f64,
    pub low_bin_rate: f64,
    pub mid_bin_rate: f64,

    pub attack_relative: f64,
    pub defense_relative: f64,
    pub openness_relative: f64,
    pub league_avg_goals_for: f64,
    pub league_avg_goals_against: f64,
    pub league_avg_total_goals: f64,
}

/// Profile one team from its matches (most recent first).
///
/// Returns `None` when fewer than `min_sample_size` matches are available.
/// Opponent defensive strength is read from `history`.
pub fn build_team_profile(
    matches: &[TeamMatchRecord],
    history: &TeamHistory,
    leagues: &LeagueTable,
    cfg: &ScoringConfig,
) -> Option<TeamProfile> {
    let window = &matches[..matches.len().min(cfg.window_size)];
    if window.is_empty() || window.len() < cfg.min_sample_size {
        return None;
    }
    let latest = &window[0];

    let home: Vec<&TeamMatchRecord> = window.iter().filter(|r| r.venue == Venue::Home).collect();
    let away: Vec<&TeamMatchRecord> = window.iter().filter(|r| r.venue == Venue::Away).collect();

    let gf: Vec<f64> = window.iter().map(|r| r.goals_for as f64).collect();
    let ga: Vec<f64> = window.iter().map(|r| r.goals_against as f64).collect();
    let tg: Vec<f64> = window.iter().map(|r| r.total_goals() as f64).collect();

    let attack_overall = mean(&gf);
    let defense_overall = mean(&ga);
    let tg_avg = mean(&tg);
    let attack_home = split_mean(&home, |r| r.goals_for).unwrap_or(attack_overall);
    let attack_away = split_mean(&away, |r| r.goals_for).unwrap_or(attack_overall);
    let defense_home = split_mean(&home, |r| r.goals_against).unwrap_or(defense_overall);
    let defense_away = split_mean(&away, |r| r.goals_against).unwrap_or(defense_overall);

    let opponent_defense: Vec<f64> = window
        .iter()
        .filter_map(|r| {
            let opp = history.recent(r.opponent_id, cfg.opponent_window);
            if opp.is_empty() {
                return None;
            }
            let opp_ga: Vec<f64> = opp.iter().map(|o| o.goals_against as f64).collect();
            Some(mean(&opp_ga))
        })
        .collect();
    let avg_opponent_defense = (!opponent_defense.is_empty()).then(|| mean(&opponent_defense));
    let attack_quality_adj = match avg_opponent_defense {
        Some(opp) => attack_overall / opp.max(OPPONENT_DEFENSE_FLOOR),
        None => attack_overall,
    };

    let (attack_momentum, defense_momentum, openness_momentum) =
        if window.len() >= cfg.momentum_min_matches {
            let n = cfg.momentum_recent.min(window.len());
            let recent_gf = mean(&gf[..n]);
            let recent_ga = mean(&ga[..n]);
            let recent_tg = mean(&tg[..n]);
            (
                (recent_gf - attack_overall) / attack_overall.max(MOMENTUM_FLOOR),
                (defense_overall - recent_ga) / defense_overall.max(MOMENTUM_FLOOR),
                recent_tg - tg_avg,
            )
        } else {
            (0.0, 0.0, 0.0)
        };

    let gf_std = sample_std(&gf);
    let tg_std = sample_std(&tg);

    let league = leagues.context_for(&latest.tournament_name);

    Some(TeamProfile {
        team_id: latest.team_id,
        team_name: latest.team_name.clone(),
        tournament_name: latest.tournament_name.clone(),

        matches_n: window.len(),
        home_n: home.len(),
        away_n: away.len(),
        recent_scores: window
            .iter()
            .map(|r| format!("{}-{}", r.goals_for, r.goals_against))
            .collect::<Vec<_>>()
            .join(", "),
        recent_total_goals: window
            .iter()
            .map(|r| r.total_goals().to_string())
            .collect::<Vec<_>>()
            .join(", "),

        attack_overall,
        attack_home,
        attack_away,
        defense_overall,
        defense_home,
        defense_away,

        avg_opponent_defense,
        attack_quality_adj,

        attack_momentum,
        defense_momentum,
        openness_momentum,
        form: attack_momentum + defense_momentum,

        consistency: 1.0 / (1.0 + gf_std),
        chaos: tg_std / tg_avg.max(CHAOS_FLOOR),
        tg_std,

        tg_avg,
        over15_rate: rate(window, |r| r.total_goals() >= 2),
        over25_rate: rate(window, |r| r.total_goals() >= 3),
        over35_rate: rate(window, |r| r.total_goals() >= 4),
        under15_rate: rate(window, |r| r.total_goals() <= 1),
        extreme_rate: rate(window, |r| r.total_goals() >= 4),
        zero_zero_rate: rate(window, |r| r.goals_for == 0 && r.goals_against == 0),
        score_1plus_rate: rate(window, |r| r.goals_for >= 1),
        score_2plus_rate: rate(window, |r| r.goals_for >= 2),
        concede_1plus_rate: rate(window, |r| r.goals_against >= 1),
        clean_sheet_rate: rate(window, |r| r.goals_against == 0),
        failed_to_score_rate: rate(window, |r| r.goals_for == 0),
        goal_share: attack_overall / (attack_overall + defense_overall).max(GOAL_SHARE_FLOOR),
        low_bin_rate: rate(window, |r| r.total_goals() <= 1),
        mid_bin_rate: rate(window, |r| (2..=3).contains(&r.total_goals())),

        attack_relative: relative(attack_overall, league.avg_goals_for),
        defense_relative: relative(defense_overall, league.avg_goals_against),
        openness_relative: relative(tg_avg, league.avg_total_goals),
        league_avg_goals_for: league.avg_goals_for,
        league_avg_goals_against: league.avg_goals_against,
        league_avg_total_goals: league.avg_total_goals,
    })
}

/// Profiles for the requested teams; teams with too little history are left out.
pub fn build_profiles(
    team_ids: impl IntoIterator<Item = u32>,
    history: &TeamHistory,
    leagues: &LeagueTable,
    cfg: &ScoringConfig,
) -> HashMap<u32, TeamProfile> {
    let mut out = HashMap::new();
    for team_id in team_ids {
        if out.contains_key(&team_id) {
            continue;
        }
        if let Some(profile) = build_team_profile(history.matches(team_id), history, leagues, cfg) {
            out.insert(team_id, profile);
        }
    }
    out
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1); zero for fewer than two values.
pub(crate) fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

fn split_mean(rows: &[&TeamMatchRecord], value: impl Fn(&TeamMatchRecord) -> u32) -> Option<f64> {
    if rows.is_empty() {
        return None;
    }
    Some(rows.iter().map(|r| value(r) as f64).sum::<f64>() / rows.len() as f64)
}

fn rate(window: &[TeamMatchRecord], pred: impl Fn(&TeamMatchRecord) -> bool) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    window.iter().filter(|r| pred(r)).count() as f64 / window.len() as f64
}

fn relative(value: f64, league_avg: f64) -> f64 {
    if league_avg > 0.0 { value / league_avg } else { 1.0 }
}
