use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use crate::config::ScoringConfig;
use crate::h2h::{H2HIndex, h2h_modifier};
use crate::history::{Fixture, H2HRecord, TeamHistory, TeamMatchRecord};
use crate::interaction::compute_interaction;
use crate::league_context::{LeagueTable, compute_league_contexts};
use crate::scoring::{ScoredFixture, score_batch};
use crate::team_profile::{TeamProfile, build_profiles};

#[derive(Debug, Clone)]
pub struct SkippedFixture {
    pub match_id: u64,
    pub missing_home: bool,
    pub missing_away: bool,
}

#[derive(Debug, Clone)]
pub struct ScoringRun {
    pub leagues: LeagueTable,
    pub profiles: HashMap<u32, TeamProfile>,
    pub scored: Vec<ScoredFixture>,
    pub skipped: Vec<SkippedFixture>,
}

impl ScoringRun {
    pub fn archetype_counts(&self) -> BTreeMap<String, usize> {
        let mut out = BTreeMap::new();
        for fx in &self.scored {
            *out.entry(fx.interaction.archetype.label()).or_insert(0) += 1;
        }
        out
    }

    pub fn profile(&self, team_id: u32) -> Option<&TeamProfile> {
        self.profiles.get(&team_id)
    }
}

/// Score a batch of fixtures against the full match history.
///
/// Fixtures where either side lacks a profile are dropped from the batch,
/// never scored with placeholder numbers.
pub fn run_scoring(
    records: &[TeamMatchRecord],
    fixtures: &[Fixture],
    h2h_records: &[H2HRecord],
    cfg: &ScoringConfig,
) -> ScoringRun {
    let leagues = compute_league_contexts(records);
    info!(leagues = leagues.len(), rows = records.len(), "league context computed");
    for ctx in leagues.by_total_goals().into_iter().take(5) {
        debug!(
            tournament = ctx.tournament_name.as_str(),
            avg_total_goals = ctx.avg_total_goals,
            "high scoring league"
        );
    }

    let history = TeamHistory::from_records(records);
    let team_ids = fixtures
        .iter()
        .flat_map(|f| [f.home_team_id, f.away_team_id]);
    let profiles = build_profiles(team_ids, &history, &leagues, cfg);
    info!(profiles = profiles.len(), teams = history.team_count(), "team profiles built");

    let h2h_index = H2HIndex::from_records(h2h_records);

    let mut interactions = Vec::with_capacity(fixtures.len());
    let mut skipped = Vec::new();
    for fixture in fixtures {
        let home = profiles.get(&fixture.home_team_id);
        let away = profiles.get(&fixture.away_team_id);
        let (Some(home), Some(away)) = (home, away) else {
            debug!(
                match_id = fixture.match_id,
                home = fixture.home_team_name.as_str(),
                away = fixture.away_team_name.as_str(),
                "skipping fixture without both profiles"
            );
            skipped.push(SkippedFixture {
                match_id: fixture.match_id,
                missing_home: home.is_none(),
                missing_away: away.is_none(),
            });
            continue;
        };

        let h2h = h2h_modifier(
            &h2h_index,
            fixture.home_team_id,
            fixture.away_team_id,
            home.tg_avg,
            away.tg_avg,
            cfg,
        );
        let league = leagues.context_for(&fixture.tournament_name);
        interactions.push(compute_interaction(fixture, home, away, h2h, &league, cfg));
    }
    info!(
        fixtures = interactions.len(),
        skipped = skipped.len(),
        "fixture interactions computed"
    );

    let scored = score_batch(interactions, cfg);
    let run = ScoringRun {
        leagues,
        profiles,
        scored,
        skipped,
    };
    for (label, count) in run.archetype_counts() {
        debug!(archetype = label.as_str(), count, "archetype distribution");
    }
    run
}
