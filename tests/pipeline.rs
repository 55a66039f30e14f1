mod common;

use chrono::NaiveDate;

use common::{fixture, played};
use goals_engine::config::ScoringConfig;
use goals_engine::history::{TeamMatchRecord, derive_h2h_records};
use goals_engine::interaction::{Archetype, DominanceType, GameShape};
use goals_engine::pipeline::run_scoring;
use goals_engine::scoring::{Category, score_batch};
use goals_engine::synthetic::generate_league;

/// Team 1's last seven results, most recent first.
const TEAM_A_WINDOW: [(u32, u32); 7] = [(3, 0), (2, 1), (1, 1), (0, 2), (2, 0), (1, 1), (3, 1)];

fn team_a_history() -> Vec<TeamMatchRecord> {
    let mut records = Vec::new();
    for (i, (gf, ga)) in TEAM_A_WINDOW.iter().copied().enumerate() {
        let i = i as u32;
        let opp = 10 + i;
        let [a, b] = if i % 2 == 0 {
            played(100 + i as u64, 20 - i, 1, opp, gf, ga)
        } else {
            played(100 + i as u64, 20 - i, opp, 1, ga, gf)
        };
        records.push(a);
        records.push(b);
    }
    // Team 2 only needs enough matches to be profiled.
    for (i, (hg, ag)) in [(1, 0), (2, 2), (0, 1)].into_iter().enumerate() {
        let i = i as u32;
        records.extend(played(200 + i as u64, 15 + i, 2, 20 + i, hg, ag));
    }
    // Team 3 sits one match below the minimum sample.
    records.extend(played(300, 12, 3, 30, 1, 1));
    records.extend(played(301, 13, 31, 3, 0, 2));
    records
}

#[test]
fn team_a_window_statistics() {
    let records = team_a_history();
    let cfg = ScoringConfig::default();
    let run = run_scoring(&records, &[fixture(500, 30, 1, 2)], &[], &cfg);

    let a = run.profile(1).expect("team 1 profiled");
    assert_eq!(a.matches_n, 7);
    assert_eq!(a.home_n, 4);
    assert_eq!(a.away_n, 3);
    assert!((a.attack_overall - 12.0 / 7.0).abs() < 1e-9);
    assert!((a.defense_overall - 6.0 / 7.0).abs() < 1e-9);
    assert!((a.over25_rate - 2.0 / 7.0).abs() < 1e-9);
    assert!((a.tg_avg - 18.0 / 7.0).abs() < 1e-9);

    let tg = [3.0, 3.0, 2.0, 2.0, 2.0, 2.0, 4.0];
    let mean = 18.0 / 7.0;
    let std = (tg.iter().map(|v: &f64| (v - mean).powi(2)).sum::<f64>() / 6.0).sqrt();
    assert!((a.tg_std - std).abs() < 1e-9);
    assert!((a.chaos - std / mean).abs() < 1e-9);

    // Each opponent's only match is against team 1, so their defense is team 1's attack.
    assert!((a.avg_opponent_defense.unwrap() - 12.0 / 7.0).abs() < 1e-9);
    assert!((a.attack_quality_adj - 1.0).abs() < 1e-9);

    // Last three: gf 2.0, ga 2/3, tg 8/3 against the seven-match averages.
    assert!((a.attack_momentum - 1.0 / 6.0).abs() < 1e-9);
    assert!((a.defense_momentum - 2.0 / 9.0).abs() < 1e-9);
    assert!((a.openness_momentum - (8.0 / 3.0 - 18.0 / 7.0)).abs() < 1e-9);
    assert!((a.form - 7.0 / 18.0).abs() < 1e-9);
}

#[test]
fn short_history_has_flat_momentum_and_split_fallback() {
    let records = team_a_history();
    let run = run_scoring(&records, &[fixture(500, 30, 1, 2)], &[], &ScoringConfig::default());

    let b = run.profile(2).expect("team 2 profiled");
    assert_eq!((b.matches_n, b.home_n, b.away_n), (3, 3, 0));
    assert_eq!(b.attack_momentum, 0.0);
    assert_eq!(b.defense_momentum, 0.0);
    assert_eq!(b.openness_momentum, 0.0);
    assert_eq!(b.form, 0.0);

    // No away matches: the away split falls back to the overall averages.
    assert!((b.attack_overall - 1.0).abs() < 1e-9);
    assert!((b.defense_overall - 1.0).abs() < 1e-9);
    assert_eq!(b.attack_away, b.attack_overall);
    assert_eq!(b.defense_away, b.defense_overall);
    assert_eq!(b.attack_home, b.attack_overall);
}

#[test]
fn two_matches_are_below_the_minimum_sample() {
    let records = team_a_history();
    let fixtures = [fixture(500, 30, 1, 2), fixture(503, 30, 3, 1)];
    let run = run_scoring(&records, &fixtures, &[], &ScoringConfig::default());

    assert!(run.profile(3).is_none());
    assert_eq!(run.scored.len(), 1);
    assert_eq!(run.skipped.len(), 1);
    assert_eq!(run.skipped[0].match_id, 503);
    assert!(run.skipped[0].missing_home && !run.skipped[0].missing_away);

    let relaxed = ScoringConfig {
        min_sample_size: 2,
        ..ScoringConfig::default()
    };
    let run = run_scoring(&records, &fixtures, &[], &relaxed);
    assert_eq!(run.profile(3).map(|p| p.matches_n), Some(2));
    assert!(run.skipped.is_empty());
}

#[test]
fn fixtures_without_both_profiles_are_skipped() {
    let records = team_a_history();
    let cfg = ScoringConfig::default();
    let fixtures = [fixture(500, 30, 1, 2), fixture(501, 30, 1, 99), fixture(502, 30, 98, 2)];
    let run = run_scoring(&records, &fixtures, &[], &cfg);

    assert_eq!(run.scored.len(), 1);
    assert_eq!(run.scored[0].interaction.fixture.match_id, 500);
    let skipped: Vec<(u64, bool, bool)> = run
        .skipped
        .iter()
        .map(|s| (s.match_id, s.missing_home, s.missing_away))
        .collect();
    assert_eq!(skipped, vec![(501, false, true), (502, true, false)]);
}

#[test]
fn single_fixture_batch_is_all_or_nothing() {
    let records = team_a_history();
    let cfg = ScoringConfig::default();
    let run = run_scoring(&records, &[fixture(500, 30, 1, 2)], &[], &cfg);

    let only = &run.scored[0];
    for category in Category::ALL {
        let pct = only.pct(category);
        assert!(pct == 0.0 || (pct - 100.0).abs() < 1e-9, "{category:?} -> {pct}");
    }
}

fn synthetic_run(seed: u64) -> (Vec<TeamMatchRecord>, Vec<goals_engine::history::Fixture>) {
    let start = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
    let league = generate_league(seed, "Synthetic League", 12, start);
    (league.records, league.fixtures)
}

#[test]
fn batch_percentages_stay_in_range_and_peak_at_100() {
    let (records, fixtures) = synthetic_run(3);
    let h2h = derive_h2h_records(&records);
    let run = run_scoring(&records, &fixtures, &h2h, &ScoringConfig::default());

    assert_eq!(run.scored.len(), fixtures.len());
    assert!(run.skipped.is_empty());
    for category in Category::ALL {
        let mut peak = 0.0f64;
        for fx in &run.scored {
            let pct = fx.pct(category);
            assert!((0.0..=100.0).contains(&pct), "{category:?} -> {pct}");
            peak = peak.max(pct);
        }
        assert!((peak - 100.0).abs() < 1e-9, "{category:?} peaks at {peak}");
    }

    for profile in run.profiles.values() {
        for rate in [
            profile.over15_rate,
            profile.over25_rate,
            profile.over35_rate,
            profile.under15_rate,
            profile.extreme_rate,
            profile.zero_zero_rate,
            profile.score_1plus_rate,
            profile.score_2plus_rate,
            profile.concede_1plus_rate,
            profile.clean_sheet_rate,
            profile.failed_to_score_rate,
        ] {
            assert!((0.0..=1.0).contains(&rate));
        }
        assert!(profile.consistency > 0.0 && profile.consistency <= 1.0);
    }
    // Every meeting pair played twice in the double round-robin.
    assert!(run.scored.iter().all(|fx| fx.interaction.h2h.has_data()));
}

#[test]
fn scoring_is_idempotent() {
    let (records, fixtures) = synthetic_run(5);
    let h2h = derive_h2h_records(&records);
    let cfg = ScoringConfig::default();
    let first = run_scoring(&records, &fixtures, &h2h, &cfg);
    let second = run_scoring(&records, &fixtures, &h2h, &cfg);

    assert_eq!(first.scored, second.scored);
    assert_eq!(first.archetype_counts(), second.archetype_counts());
}

#[test]
fn shared_fixture_depends_on_its_companions() {
    let (records, fixtures) = synthetic_run(9);
    let h2h = derive_h2h_records(&records);
    let cfg = ScoringConfig::default();
    let run = run_scoring(&records, &fixtures, &h2h, &cfg);
    let interactions: Vec<_> = run.scored.iter().map(|fx| fx.interaction.clone()).collect();
    assert!(interactions.len() >= 4);

    let pair = score_batch(vec![interactions[0].clone(), interactions[1].clone()], &cfg);
    let full = score_batch(interactions.clone(), &cfg);

    let shared_pair = &pair[0];
    let shared_full = &full[0];
    assert_eq!(
        shared_pair.interaction.fixture.match_id,
        shared_full.interaction.fixture.match_id
    );
    let differs = Category::ALL
        .into_iter()
        .any(|c| (shared_pair.pct(c) - shared_full.pct(c)).abs() > 1e-9);
    assert!(differs, "companions should move the shared fixture's percentages");
}

#[test]
fn archetype_labels_cover_twelve_combinations() {
    let mut labels: Vec<String> = DominanceType::ALL
        .into_iter()
        .flat_map(|dominance| {
            GameShape::ALL
                .into_iter()
                .map(move |shape| Archetype { dominance, shape }.label())
        })
        .collect();
    labels.sort();
    labels.dedup();
    assert_eq!(labels.len(), 12);
    assert!(labels.contains(&"HOME_DOMINATION_OPEN".to_string()));
    assert!(labels.contains(&"BALANCED_TIGHT".to_string()));
}
