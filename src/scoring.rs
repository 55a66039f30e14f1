use std::collections::HashMap;

use serde::Serialize;

use crate::config::ScoringConfig;
use crate::interaction::{Feature, FixtureInteraction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    Over15,
    Over25,
    Over35,
    Over45,
    Under15,
    Under25,
    Gg,
    HomeWin,
    AwayWin,
    Draw,
    Over25Gg,
    HomeOver25,
    AwayOver25,
    HomeGg,
    AwayGg,
}

impl Category {
    pub const ALL: [Category; 15] = [
        Category::Over15,
        Category::Over25,
        Category::Over35,
        Category::Over45,
        Category::Under15,
        Category::Under25,
        Category::Gg,
        Category::HomeWin,
        Category::AwayWin,
        Category::Draw,
        Category::Over25Gg,
        Category::HomeOver25,
        Category::AwayOver25,
        Category::HomeGg,
        Category::AwayGg,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Over15 => "over_15",
            Category::Over25 => "over_25",
            Category::Over35 => "over_35",
            Category::Over45 => "over_45",
            Category::Under15 => "under_15",
            Category::Under25 => "under_25",
            Category::Gg => "gg",
            Category::HomeWin => "home_win",
            Category::AwayWin => "away_win",
            Category::Draw => "draw",
            Category::Over25Gg => "over25_gg",
            Category::HomeOver25 => "home_over25",
            Category::AwayOver25 => "away_over25",
            Category::HomeGg => "home_gg",
            Category::AwayGg => "away_gg",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim().to_ascii_lowercase();
        let key = key.strip_suffix("_pct").unwrap_or(&key);
        Category::ALL.into_iter().find(|c| c.as_str() == key)
    }

    pub fn pct_column(self) -> String {
        format!("{}_pct", self.as_str())
    }

    /// Goal-line and both-teams-score markets get the H2H nudge.
    pub fn h2h_adjusted(self) -> bool {
        let name = self.as_str();
        name.contains("over") || name.contains("gg")
    }
}

/// One fixture with its final confidence per category (0..=100).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredFixture {
    pub interaction: FixtureInteraction,
    pub percentages: HashMap<Category, f64>,
}

impl ScoredFixture {
    pub fn pct(&self, category: Category) -> f64 {
        self.percentages.get(&category).copied().unwrap_or(0.0)
    }
}

/// Min-max scale a column across the batch; a constant column is returned unchanged.
pub fn normalize_column(values: &[f64]) -> Vec<f64> {
    let (min, max) = min_max(values);
    if max > min {
        let span = max - min;
        values.iter().map(|v| (v - min) / span).collect()
    } else {
        values.to_vec()
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        })
}

/// Score every fixture of a batch against every category.
///
/// Features are scaled across the whole batch, so a fixture's percentages
/// depend on the other fixtures scored with it.
pub fn score_batch(interactions: Vec<FixtureInteraction>, cfg: &ScoringConfig) -> Vec<ScoredFixture> {
    if interactions.is_empty() {
        return Vec::new();
    }

    let mut columns: HashMap<Feature, Vec<f64>> = HashMap::new();
    let mut per_category: Vec<(Category, Vec<f64>)> = Vec::with_capacity(Category::ALL.len());

    for category in Category::ALL {
        let mut score = vec![0.0; interactions.len()];
        for (feature, weight) in cfg.weights_for(category) {
            let column = columns.entry(*feature).or_insert_with(|| {
                let raw: Vec<f64> = interactions.iter().map(|fx| fx.feature(*feature)).collect();
                normalize_column(&raw)
            });
            for (slot, value) in score.iter_mut().zip(column.iter()) {
                *slot += weight * value;
            }
        }

        let mut score = normalize_column(&score);
        if category.h2h_adjusted() {
            for (slot, fx) in score.iter_mut().zip(interactions.iter()) {
                *slot *= 1.0 + cfg.h2h_score_factor * fx.h2h.modifier;
            }
        }
        for slot in score.iter_mut() {
            *slot = slot.clamp(0.0, 1.0);
        }

        let (_, max) = min_max(&score);
        let pct = if max > 0.0 {
            score.iter().map(|s| 100.0 * s / max).collect()
        } else {
            score
        };
        per_category.push((category, pct));
    }

    interactions
        .into_iter()
        .enumerate()
        .map(|(idx, interaction)| ScoredFixture {
            interaction,
            percentages: per_category
                .iter()
                .map(|(category, pct)| (*category, pct[idx]))
                .collect(),
        })
        .collect()
}
