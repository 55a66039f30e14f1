use chrono::NaiveDate;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use goals_engine::config::ScoringConfig;
use goals_engine::history::{TeamHistory, derive_h2h_records};
use goals_engine::league_context::compute_league_contexts;
use goals_engine::pipeline::run_scoring;
use goals_engine::scoring::score_batch;
use goals_engine::synthetic::{SyntheticLeague, generate_league};
use goals_engine::team_profile::build_profiles;

fn league(teams: u32) -> SyntheticLeague {
    let start = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
    generate_league(42, "Bench League", teams, start)
}

fn bench_profiles_build(c: &mut Criterion) {
    let data = league(20);
    let cfg = ScoringConfig::default();
    let history = TeamHistory::from_records(&data.records);
    let leagues = compute_league_contexts(&data.records);
    c.bench_function("profiles_build", |b| {
        b.iter(|| {
            let profiles = build_profiles(1..=20, black_box(&history), &leagues, &cfg);
            black_box(profiles.len());
        })
    });
}

fn bench_h2h_derive(c: &mut Criterion) {
    let data = league(20);
    c.bench_function("h2h_derive", |b| {
        b.iter(|| {
            let rows = derive_h2h_records(black_box(&data.records));
            black_box(rows.len());
        })
    });
}

fn bench_score_batch(c: &mut Criterion) {
    let data = league(20);
    let cfg = ScoringConfig::default();
    let h2h = derive_h2h_records(&data.records);
    let run = run_scoring(&data.records, &data.fixtures, &h2h, &cfg);
    let interactions: Vec<_> = run.scored.into_iter().map(|fx| fx.interaction).collect();
    c.bench_function("score_batch", |b| {
        b.iter(|| {
            let scored = score_batch(black_box(interactions.clone()), &cfg);
            black_box(scored.len());
        })
    });
}

fn bench_full_run(c: &mut Criterion) {
    let data = league(20);
    let cfg = ScoringConfig::default();
    let h2h = derive_h2h_records(&data.records);
    c.bench_function("full_run", |b| {
        b.iter(|| {
            let run = run_scoring(black_box(&data.records), &data.fixtures, &h2h, &cfg);
            black_box(run.scored.len());
        })
    });
}

criterion_group!(
    perf,
    bench_profiles_build,
    bench_h2h_derive,
    bench_score_batch,
    bench_full_run
);
criterion_main!(perf);
