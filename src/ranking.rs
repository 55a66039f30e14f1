use std::cmp::Ordering;

use crate::scoring::{Category, ScoredFixture};

/// Top `n` fixtures for a category, best first.
/// Ties fall back to kickoff date, then match id.
pub fn rank_by(category: Category, scored: &[ScoredFixture], n: usize) -> Vec<&ScoredFixture> {
    let mut rows: Vec<&ScoredFixture> = scored.iter().collect();
    rows.sort_by(|a, b| compare_for(category, a, b));
    rows.truncate(n);
    rows
}

fn compare_for(category: Category, a: &ScoredFixture, b: &ScoredFixture) -> Ordering {
    b.pct(category)
        .total_cmp(&a.pct(category))
        .then_with(|| a.interaction.fixture.date.cmp(&b.interaction.fixture.date))
        .then_with(|| {
            a.interaction
                .fixture
                .match_id
                .cmp(&b.interaction.fixture.match_id)
        })
}

/// Plain-text top lists, one block per category.
pub fn render_rankings(categories: &[Category], scored: &[ScoredFixture], n: usize) -> String {
    let rule = "-".repeat(80);
    let mut out = String::new();
    for category in categories {
        let top = rank_by(*category, scored, n);
        if top.is_empty() {
            continue;
        }
        let title = category.as_str().to_uppercase().replace('_', " ");
        out.push_str(&format!("{rule}\n{title}\n{rule}\n"));
        for (idx, fx) in top.iter().enumerate() {
            let fixture = &fx.interaction.fixture;
            let h2h = fx
                .interaction
                .h2h
                .tg_avg
                .map(|avg| format!(" [H2H: {avg:.1}]"))
                .unwrap_or_default();
            out.push_str(&format!(
                "{}. [{:.0}%] {} vs {}\n",
                idx + 1,
                fx.pct(*category),
                fixture.home_team_name,
                fixture.away_team_name
            ));
            out.push_str(&format!(
                "   {} | {} | {}{h2h}\n",
                fixture.tournament_name, fixture.date, fx.interaction.archetype
            ));
        }
        out.push('\n');
    }
    out
}
