use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::interaction::Feature;
use crate::scoring::Category;

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryWeights {
    pub category: Category,
    pub weights: Vec<(Feature, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub window_size: usize,
    /// Matches per opponent used for the opponent-quality adjustment.
    pub opponent_window: usize,
    pub min_sample_size: usize,
    pub momentum_min_matches: usize,
    pub momentum_recent: usize,
    pub h2h_lookback: usize,
    pub h2h_min_matches: usize,
    pub h2h_modifier_clip: f64,
    pub h2h_score_factor: f64,
    pub pressure_ratio_floor: f64,
    pub share_floor: f64,
    pub top_n: usize,
    pub category_weights: Vec<CategoryWeights>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            window_size: 7,
            opponent_window: 7,
            min_sample_size: 3,
            momentum_min_matches: 5,
            momentum_recent: 3,
            h2h_lookback: 5,
            h2h_min_matches: 2,
            h2h_modifier_clip: 0.2,
            h2h_score_factor: 0.1,
            pressure_ratio_floor: 0.1,
            share_floor: 0.01,
            top_n: 7,
            category_weights: DEFAULT_CATEGORY_WEIGHTS.clone(),
        }
    }
}

impl ScoringConfig {
    /// Defaults overridden by `GOALS_*` environment variables.
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(v) = env_usize("GOALS_WINDOW_SIZE") {
            cfg.window_size = v;
        }
        if let Some(v) = env_usize("GOALS_MIN_SAMPLE") {
            cfg.min_sample_size = v;
        }
        if let Some(v) = env_usize("GOALS_H2H_LOOKBACK") {
            cfg.h2h_lookback = v;
        }
        if let Some(v) = env_usize("GOALS_H2H_MIN_MATCHES") {
            cfg.h2h_min_matches = v;
        }
        if let Some(v) = env_usize("GOALS_TOP_N") {
            cfg.top_n = v;
        }
        if let Ok(path) = std::env::var("GOALS_WEIGHTS_FILE")
            && !path.trim().is_empty()
        {
            cfg.apply_weights_file(Path::new(path.trim()))?;
        }
        Ok(cfg.clamped())
    }

    /// Keep values inside the ranges the profile math assumes.
    pub fn clamped(mut self) -> Self {
        self.window_size = self.window_size.clamp(1, 100);
        self.opponent_window = self.opponent_window.clamp(1, 100);
        self.min_sample_size = self.min_sample_size.clamp(1, self.window_size);
        self.momentum_recent = self.momentum_recent.clamp(1, self.window_size);
        self.h2h_lookback = self.h2h_lookback.max(1);
        self.h2h_min_matches = self.h2h_min_matches.clamp(1, self.h2h_lookback);
        self.h2h_modifier_clip = self.h2h_modifier_clip.abs();
        self.top_n = self.top_n.max(1);
        self
    }

    pub fn weights_for(&self, category: Category) -> &[(Feature, f64)] {
        self.category_weights
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.weights.as_slice())
            .unwrap_or(&[])
    }

    /// Replace the weights of every category named in a JSON file shaped like
    /// `{"over_25": {"combined_attack": 0.3, ...}, ...}`.
    pub fn apply_weights_file(&mut self, path: &Path) -> Result<()> {
        let overrides = load_weights_file(path)?;
        for item in overrides {
            debug!(category = item.category.as_str(), "weights overridden from file");
            match self
                .category_weights
                .iter_mut()
                .find(|c| c.category == item.category)
            {
                Some(slot) => *slot = item,
                None => self.category_weights.push(item),
            }
        }
        Ok(())
    }
}

pub fn load_weights_file(path: &Path) -> Result<Vec<CategoryWeights>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read weights file {}", path.display()))?;
    parse_weights_json(&raw).with_context(|| format!("parse weights file {}", path.display()))
}

pub fn parse_weights_json(raw: &str) -> Result<Vec<CategoryWeights>> {
    let parsed: HashMap<String, HashMap<String, f64>> =
        serde_json::from_str(raw).context("invalid weights json")?;

    let mut out = Vec::with_capacity(parsed.len());
    for (category_name, features) in parsed {
        let category = Category::parse(&category_name)
            .ok_or_else(|| anyhow!("unknown category {category_name:?}"))?;
        let mut weights = Vec::with_capacity(features.len());
        for (feature_name, weight) in features {
            let feature = Feature::parse(&feature_name).ok_or_else(|| {
                anyhow!("unknown feature {feature_name:?} in category {category_name:?}")
            })?;
            if !weight.is_finite() {
                return Err(anyhow!("non-finite weight for {category_name}.{feature_name}"));
            }
            weights.push((feature, weight));
        }
        // JSON object order is not stable; fix summation order.
        weights.sort_by_key(|(feature, _)| *feature);
        out.push(CategoryWeights { category, weights });
    }
    out.sort_by_key(|c| c.category);
    Ok(out)
}

fn env_usize(key: &str) -> Option<usize> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = raw.as_str(), "ignoring unparsable setting");
            None
        }
    }
}

pub static DEFAULT_CATEGORY_WEIGHTS: Lazy<Vec<CategoryWeights>> = Lazy::new(|| {
    use Category as C;
    use Feature as F;

    let table: Vec<(Category, Vec<(Feature, f64)>)> = vec![
        (
            C::Over15,
            vec![
                (F::CombinedAttack, 0.20),
                (F::CombinedDefenseWeak, 0.20),
                (F::CombinedOpenness, 0.15),
                (F::BothScore1p, 0.15),
                (F::AttackMomentum, 0.10),
                (F::ArchetypeBoost, 0.10),
                (F::Dryness, -0.10),
            ],
        ),
        (
            C::Over25,
            vec![
                (F::CombinedAttack, 0.25),
                (F::CombinedDefenseWeak, 0.20),
                (F::CombinedOpenness, 0.20),
                (F::PressureTotal, 0.10),
                (F::AttackMomentum, 0.10),
                (F::ArchetypeBoost, 0.10),
                (F::Dryness, -0.15),
            ],
        ),
        (
            C::Over35,
            vec![
                (F::CombinedAttack, 0.25),
                (F::CombinedDefenseWeak, 0.25),
                (F::HighOpenness, 0.20),
                (F::ExtremeRate, 0.10),
                (F::ChaosBoost, 0.15),
                (F::AttackMomentum, 0.05),
            ],
        ),
        (
            C::Over45,
            vec![
                (F::ExtremePotential, 0.35),
                (F::CombinedAttack, 0.25),
                (F::CombinedDefenseWeak, 0.25),
                (F::ChaosBoost, 0.15),
            ],
        ),
        (
            C::Under15,
            vec![
                (F::DrynessIndex, 0.35),
                (F::BothStrongDefense, 0.25),
                (F::LowAttack, 0.20),
                (F::TightGameBoost, 0.15),
                (F::ZeroZeroRate, 0.05),
            ],
        ),
        (
            C::Under25,
            vec![
                (F::DrynessIndex, 0.25),
                (F::CombinedDefenseStrong, 0.25),
                (F::LowOpenness, 0.20),
                (F::TightGameBoost, 0.15),
                (F::LowAttack, 0.15),
            ],
        ),
        (
            C::Gg,
            vec![
                (F::BothAttackStrong, 0.30),
                (F::BothDefenseWeak, 0.25),
                (F::BalancedPressure, 0.15),
                (F::AttackMomentumBoth, 0.15),
                (F::OpenGameBoost, 0.10),
                (F::Dryness, -0.10),
            ],
        ),
        (
            C::HomeWin,
            vec![
                (F::HomeAttackAdvantage, 0.30),
                (F::AwayDefenseWeak, 0.20),
                (F::HomePressureDominance, 0.20),
                (F::HomeForm, 0.15),
                (F::DominationBoost, 0.15),
            ],
        ),
        (
            C::AwayWin,
            vec![
                (F::AwayAttackAdvantage, 0.30),
                (F::HomeDefenseWeak, 0.20),
                (F::AwayPressureDominance, 0.20),
                (F::AwayForm, 0.15),
                (F::DominationBoost, 0.15),
            ],
        ),
        (
            C::Draw,
            vec![
                (F::BalancedStrength, 0.35),
                (F::LowPressureDiff, 0.25),
                (F::MidRangeGoals, 0.20),
                (F::BalancedBoost, 0.20),
            ],
        ),
        (
            C::Over25Gg,
            vec![
                (F::CombinedAttack, 0.20),
                (F::BothAttackStrong, 0.20),
                (F::BothDefenseWeak, 0.20),
                (F::HighOpenness, 0.20),
                (F::OpenGameBoost, 0.15),
                (F::AttackMomentumBoth, 0.05),
            ],
        ),
        (
            C::HomeOver25,
            vec![
                (F::HomeAttackStrong, 0.25),
                (F::AwayDefenseWeak, 0.25),
                (F::CombinedAttack, 0.20),
                (F::HomeDominance, 0.15),
                (F::HomeForm, 0.10),
                (F::DominationBoost, 0.05),
            ],
        ),
        (
            C::AwayOver25,
            vec![
                (F::AwayAttackStrong, 0.25),
                (F::HomeDefenseWeak, 0.25),
                (F::CombinedAttack, 0.20),
                (F::AwayDominance, 0.15),
                (F::AwayForm, 0.10),
                (F::DominationBoost, 0.05),
            ],
        ),
        (
            C::HomeGg,
            vec![
                (F::HomeAttackStrong, 0.25),
                (F::AwayAttackDecent, 0.25),
                (F::BothDefenseWeak, 0.20),
                (F::HomePressure, 0.15),
                (F::HomeForm, 0.10),
                (F::OpenGameBoost, 0.05),
            ],
        ),
        (
            C::AwayGg,
            vec![
                (F::AwayAttackStrong, 0.25),
                (F::HomeAttackDecent, 0.25),
                (F::BothDefenseWeak, 0.20),
                (F::AwayPressure, 0.15),
                (F::AwayForm, 0.10),
                (F::OpenGameBoost, 0.05),
            ],
        ),
    ];

    table
        .into_iter()
        .map(|(category, weights)| CategoryWeights { category, weights })
        .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_covers_every_category() {
        let cfg = ScoringConfig::default();
        assert_eq!(cfg.category_weights.len(), Category::ALL.len());
        for category in Category::ALL {
            assert!(!cfg.weights_for(category).is_empty(), "{category:?}");
        }
        assert_eq!(cfg.weights_for(Category::Over25).len(), 7);
    }

    #[test]
    fn weights_json_rejects_unknown_names() {
        let err = parse_weights_json(r#"{"over_25": {"not_a_feature": 1.0}}"#).unwrap_err();
        assert!(format!("{err:#}").contains("not_a_feature"));
        assert!(parse_weights_json(r#"{"over_99": {}}"#).is_err());
    }

    #[test]
    fn weights_json_overrides_one_category() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.json");
        fs::write(&path, r#"{"draw": {"mid_range_goals": 1.0, "balanced_boost": 0.5}}"#).unwrap();

        let mut cfg = ScoringConfig::default();
        cfg.apply_weights_file(&path).unwrap();
        assert_eq!(cfg.category_weights.len(), Category::ALL.len());
        assert_eq!(
            cfg.weights_for(Category::Draw),
            &[(Feature::BalancedBoost, 0.5), (Feature::MidRangeGoals, 1.0)]
        );
        assert_eq!(cfg.weights_for(Category::Over15).len(), 7);
    }

    #[test]
    fn clamping_keeps_sample_inside_window() {
        let cfg = ScoringConfig {
            window_size: 4,
            min_sample_size: 9,
            ..ScoringConfig::default()
        }
        .clamped();
        assert_eq!(cfg.min_sample_size, 4);
    }
}
