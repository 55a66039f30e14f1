use std::fmt;

use serde::Serialize;

use crate::config::ScoringConfig;
use crate::h2h::H2HSummary;
use crate::history::Fixture;
use crate::league_context::LeagueContext;
use crate::team_profile::TeamProfile;

const GOALS_PIVOT: f64 = 2.5;
const PRESSURE_FLOOR: f64 = 0.5;
const MID_RANGE_ATTACK: f64 = 1.5;
const DEFENSE_SCALE_MAX_GA: f64 = 3.0;
const FULL_SPLIT_MATCHES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DominanceType {
    HomeDomination,
    AwayDomination,
    Balanced,
    SlightFavorite,
}

impl DominanceType {
    pub const ALL: [DominanceType; 4] = [
        DominanceType::HomeDomination,
        DominanceType::AwayDomination,
        DominanceType::Balanced,
        DominanceType::SlightFavorite,
    ];

    pub fn from_pressure_ratio(ratio: f64) -> Self {
        if ratio > 2.0 {
            DominanceType::HomeDomination
        } else if ratio < 0.5 {
            DominanceType::AwayDomination
        } else if ratio > 0.8 && ratio < 1.2 {
            DominanceType::Balanced
        } else {
            DominanceType::SlightFavorite
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DominanceType::HomeDomination => "HOME_DOMINATION",
            DominanceType::AwayDomination => "AWAY_DOMINATION",
            DominanceType::Balanced => "BALANCED",
            DominanceType::SlightFavorite => "SLIGHT_FAVORITE",
        }
    }

    /// `(domination_boost, balanced_boost)`
    fn boosts(self) -> (f64, f64) {
        match self {
            DominanceType::HomeDomination | DominanceType::AwayDomination => (1.0, 0.0),
            DominanceType::Balanced => (0.0, 1.0),
            DominanceType::SlightFavorite => (0.5, 0.5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GameShape {
    Open,
    Tight,
    Neutral,
}

impl GameShape {
    pub const ALL: [GameShape; 3] = [GameShape::Open, GameShape::Tight, GameShape::Neutral];

    pub fn from_defense(combined_defense_weak: f64) -> Self {
        let combined_defense_strong = GOALS_PIVOT - combined_defense_weak;
        if combined_defense_weak > 1.5 {
            GameShape::Open
        } else if combined_defense_strong > 1.2 {
            GameShape::Tight
        } else {
            GameShape::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameShape::Open => "OPEN",
            GameShape::Tight => "TIGHT",
            GameShape::Neutral => "NEUTRAL",
        }
    }

    /// `(open_game_boost, tight_game_boost)`
    fn boosts(self) -> (f64, f64) {
        match self {
            GameShape::Open => (1.0, 0.0),
            GameShape::Tight => (0.0, 1.0),
            GameShape::Neutral => (0.5, 0.5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Archetype {
    pub dominance: DominanceType,
    pub shape: GameShape,
}

impl Archetype {
    pub fn label(&self) -> String {
        format!("{}_{}", self.dominance.as_str(), self.shape.as_str())
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.dominance.as_str(), self.shape.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QualityFlags {
    pub home_full_window: bool,
    pub away_full_window: bool,
    pub home_split_ok: bool,
    pub away_split_ok: bool,
    pub h2h_available: bool,
}

/// Named fixture-level inputs to the category weight table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Feature {
    HomePressure,
    AwayPressure,
    PressureTotal,
    PressureDiff,
    PressureRatio,
    CombinedAttack,
    CombinedAttackQuality,
    CombinedDefenseWeak,
    CombinedDefenseStrong,
    CombinedOpenness,
    HighOpenness,
    Dryness,
    DrynessIndex,
    BothScore1p,
    BothAttackStrong,
    BothDefenseWeak,
    BalancedPressure,
    ExtremeRate,
    ExtremePotential,
    ZeroZeroRate,
    AttackMomentum,
    AttackMomentumBoth,
    ArchetypeBoost,
    DominationBoost,
    BalancedBoost,
    OpenGameBoost,
    TightGameBoost,
    ChaosBoost,
    BothStrongDefense,
    LowAttack,
    LowOpenness,
    HomeAttackAdvantage,
    AwayAttackAdvantage,
    HomeDefenseWeak,
    AwayDefenseWeak,
    HomePressureDominance,
    AwayPressureDominance,
    BalancedStrength,
    LowPressureDiff,
    MidRangeGoals,
    HomeForm,
    AwayForm,
    HomeAttackStrong,
    AwayAttackStrong,
    HomeAttackDecent,
    AwayAttackDecent,
    HomeDominance,
    AwayDominance,
    DefenseStrengthIndex,
    ZeroZeroCombined,
    SuppressionOverlap,
}

impl Feature {
    pub const ALL: [Feature; 51] = [
        Feature::HomePressure,
        Feature::AwayPressure,
        Feature::PressureTotal,
        Feature::PressureDiff,
        Feature::PressureRatio,
        Feature::CombinedAttack,
        Feature::CombinedAttackQuality,
        Feature::CombinedDefenseWeak,
        Feature::CombinedDefenseStrong,
        Feature::CombinedOpenness,
        Feature::HighOpenness,
        Feature::Dryness,
        Feature::DrynessIndex,
        Feature::BothScore1p,
        Feature::BothAttackStrong,
        Feature::BothDefenseWeak,
        Feature::BalancedPressure,
        Feature::ExtremeRate,
        Feature::ExtremePotential,
        Feature::ZeroZeroRate,
        Feature::AttackMomentum,
        Feature::AttackMomentumBoth,
        Feature::ArchetypeBoost,
        Feature::DominationBoost,
        Feature::BalancedBoost,
        Feature::OpenGameBoost,
        Feature::TightGameBoost,
        Feature::ChaosBoost,
        Feature::BothStrongDefense,
        Feature::LowAttack,
        Feature::LowOpenness,
        Feature::HomeAttackAdvantage,
        Feature::AwayAttackAdvantage,
        Feature::HomeDefenseWeak,
        Feature::AwayDefenseWeak,
        Feature::HomePressureDominance,
        Feature::AwayPressureDominance,
        Feature::BalancedStrength,
        Feature::LowPressureDiff,
        Feature::MidRangeGoals,
        Feature::HomeForm,
        Feature::AwayForm,
        Feature::HomeAttackStrong,
        Feature::AwayAttackStrong,
        Feature::HomeAttackDecent,
        Feature::AwayAttackDecent,
        Feature::HomeDominance,
        Feature::AwayDominance,
        Feature::DefenseStrengthIndex,
        Feature::ZeroZeroCombined,
        Feature::SuppressionOverlap,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Feature::HomePressure => "home_pressure",
            Feature::AwayPressure => "away_pressure",
            Feature::PressureTotal => "pressure_total",
            Feature::PressureDiff => "pressure_diff",
            Feature::PressureRatio => "pressure_ratio",
            Feature::CombinedAttack => "combined_attack",
            Feature::CombinedAttackQuality => "combined_attack_quality",
            Feature::CombinedDefenseWeak => "combined_defense_weak",
            Feature::CombinedDefenseStrong => "combined_defense_strong",
            Feature::CombinedOpenness => "combined_openness",
            Feature::HighOpenness => "high_openness",
            Feature::Dryness => "dryness",
            Feature::DrynessIndex => "dryness_index",
            Feature::BothScore1p => "both_score_1p",
            Feature::BothAttackStrong => "both_attack_strong",
            Feature::BothDefenseWeak => "both_defense_weak",
            Feature::BalancedPressure => "balanced_pressure",
            Feature::ExtremeRate => "extreme_rate",
            Feature::ExtremePotential => "extreme_potential",
            Feature::ZeroZeroRate => "zero_zero_rate",
            Feature::AttackMomentum => "attack_momentum",
            Feature::AttackMomentumBoth => "attack_momentum_both",
            Feature::ArchetypeBoost => "archetype_boost",
            Feature::DominationBoost => "domination_boost",
            Feature::BalancedBoost => "balanced_boost",
            Feature::OpenGameBoost => "open_game_boost",
            Feature::TightGameBoost => "tight_game_boost",
            Feature::ChaosBoost => "chaos_boost",
            Feature::BothStrongDefense => "both_strong_defense",
            Feature::LowAttack => "low_attack",
            Feature::LowOpenness => "low_openness",
            Feature::HomeAttackAdvantage => "home_attack_advantage",
            Feature::AwayAttackAdvantage => "away_attack_advantage",
            Feature::HomeDefenseWeak => "home_defense_weak",
            Feature::AwayDefenseWeak => "away_defense_weak",
            Feature::HomePressureDominance => "home_pressure_dominance",
            Feature::AwayPressureDominance => "away_pressure_dominance",
            Feature::BalancedStrength => "balanced_strength",
            Feature::LowPressureDiff => "low_pressure_diff",
            Feature::MidRangeGoals => "mid_range_goals",
            Feature::HomeForm => "home_form",
            Feature::AwayForm => "away_form",
            Feature::HomeAttackStrong => "home_attack_strong",
            Feature::AwayAttackStrong => "away_attack_strong",
            Feature::HomeAttackDecent => "home_attack_decent",
            Feature::AwayAttackDecent => "away_attack_decent",
            Feature::HomeDominance => "home_dominance",
            Feature::AwayDominance => "away_dominance",
            Feature::DefenseStrengthIndex => "defense_strength_index",
            Feature::ZeroZeroCombined => "zero_zero_combined",
            Feature::SuppressionOverlap => "suppression_overlap",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim();
        Feature::ALL.into_iter().find(|f| f.as_str() == key)
    }
}

/// Fixture-level features derived from both team profiles and H2H.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureInteraction {
    pub fixture: Fixture,
    pub archetype: Archetype,
    pub h2h: H2HSummary,
    pub league_avg_total_goals: f64,
    pub quality: QualityFlags,

    pub home_pressure: f64,
    pub away_pressure: f64,
    pub pressure_total: f64,
    pub pressure_diff: f64,
    pub pressure_ratio: f64,

    pub combined_attack: f64,
    pub combined_attack_quality: f64,
    pub combined_defense_weak: f64,
    pub combined_defense_strong: f64,
    pub defense_strength_index: f64,
    pub combined_openness: f64,
    pub high_openness: f64,

    pub dryness_index: f64,
    pub zero_zero_rate: f64,
    pub extreme_rate: f64,
    pub extreme_potential: f64,
    pub suppression_overlap: f64,

    pub both_attack_strong: f64,
    pub both_defense_weak: f64,
    pub balanced_pressure: f64,
    pub balanced_strength: f64,
    pub low_pressure_diff: f64,
    pub mid_range_goals: f64,

    pub attack_momentum: f64,
    pub attack_momentum_both: f64,

    pub archetype_boost: f64,
    pub domination_boost: f64,
    pub balanced_boost: f64,
    pub open_game_boost: f64,
    pub tight_game_boost: f64,
    pub chaos_boost: f64,

    pub home_attack: f64,
    pub away_attack: f64,
    pub home_defense: f64,
    pub away_defense: f64,
    pub home_attack_advantage: f64,
    pub away_attack_advantage: f64,
    pub home_pressure_dominance: f64,
    pub away_pressure_dominance: f64,
    pub home_form: f64,
    pub away_form: f64,
}

impl FixtureInteraction {
    pub fn feature(&self, feature: Feature) -> f64 {
        match feature {
            Feature::HomePressure => self.home_pressure,
            Feature::AwayPressure => self.away_pressure,
            Feature::PressureTotal => self.pressure_total,
            Feature::PressureDiff => self.pressure_diff,
            Feature::PressureRatio => self.pressure_ratio,
            Feature::CombinedAttack => self.combined_attack,
            Feature::CombinedAttackQuality => self.combined_attack_quality,
            Feature::CombinedDefenseWeak => self.combined_defense_weak,
            Feature::CombinedDefenseStrong | Feature::BothStrongDefense => {
                self.combined_defense_strong
            }
            Feature::CombinedOpenness => self.combined_openness,
            Feature::HighOpenness => self.high_openness,
            Feature::Dryness | Feature::DrynessIndex => self.dryness_index,
            Feature::BothScore1p | Feature::BothAttackStrong => self.both_attack_strong,
            Feature::BothDefenseWeak => self.both_defense_weak,
            Feature::BalancedPressure => self.balanced_pressure,
            Feature::ExtremeRate => self.extreme_rate,
            Feature::ExtremePotential => self.extreme_potential,
            Feature::ZeroZeroRate | Feature::ZeroZeroCombined => self.zero_zero_rate,
            Feature::AttackMomentum => self.attack_momentum,
            Feature::AttackMomentumBoth => self.attack_momentum_both,
            Feature::ArchetypeBoost => self.archetype_boost,
            Feature::DominationBoost => self.domination_boost,
            Feature::BalancedBoost => self.balanced_boost,
            Feature::OpenGameBoost => self.open_game_boost,
            Feature::TightGameBoost => self.tight_game_boost,
            Feature::ChaosBoost => self.chaos_boost,
            Feature::LowAttack => GOALS_PIVOT - self.combined_attack,
            Feature::LowOpenness => 1.0 - self.combined_openness,
            Feature::HomeAttackAdvantage => self.home_attack_advantage,
            Feature::AwayAttackAdvantage => self.away_attack_advantage,
            Feature::HomeDefenseWeak => self.home_defense,
            Feature::AwayDefenseWeak => self.away_defense,
            Feature::HomePressureDominance | Feature::HomeDominance => {
                self.home_pressure_dominance
            }
            Feature::AwayPressureDominance | Feature::AwayDominance => {
                self.away_pressure_dominance
            }
            Feature::BalancedStrength => self.balanced_strength,
            Feature::LowPressureDiff => self.low_pressure_diff,
            Feature::MidRangeGoals => self.mid_range_goals,
            Feature::HomeForm => self.home_form,
            Feature::AwayForm => self.away_form,
            Feature::HomeAttackStrong => self.home_attack,
            Feature::AwayAttackStrong => self.away_attack,
            Feature::HomeAttackDecent => (self.home_attack - 1.0).max(0.0),
            Feature::AwayAttackDecent => (self.away_attack - 1.0).max(0.0),
            Feature::DefenseStrengthIndex => self.defense_strength_index,
            Feature::SuppressionOverlap => self.suppression_overlap,
        }
    }
}

pub fn compute_interaction(
    fixture: &Fixture,
    home: &TeamProfile,
    away: &TeamProfile,
    h2h: H2HSummary,
    league: &LeagueContext,
    cfg: &ScoringConfig,
) -> FixtureInteraction {
    let home_attack = home.attack_home;
    let away_attack = away.attack_away;
    let home_defense = home.defense_home;
    let away_defense = away.defense_away;

    let home_pressure = home_attack * (GOALS_PIVOT - away_defense).max(PRESSURE_FLOOR);
    let away_pressure = away_attack * (GOALS_PIVOT - home_defense).max(PRESSURE_FLOOR);
    let pressure_total = home_pressure + away_pressure;
    let pressure_diff = (home_pressure - away_pressure).abs();
    let pressure_ratio = home_pressure / away_pressure.max(cfg.pressure_ratio_floor);
    let share_base = pressure_total.max(cfg.share_floor);

    let combined_attack = (home_attack + away_attack) / 2.0;
    let combined_defense_weak = (away_defense + home_defense) / 2.0;
    let combined_defense_strong = GOALS_PIVOT - combined_defense_weak;
    let combined_openness = (home.over25_rate + away.over25_rate) / 2.0;
    let high_openness = (home.over35_rate + away.over35_rate) / 2.0;

    let dominance = DominanceType::from_pressure_ratio(pressure_ratio);
    let shape = GameShape::from_defense(combined_defense_weak);
    let (domination_boost, balanced_boost) = dominance.boosts();
    let (open_game_boost, tight_game_boost) = shape.boosts();
    let chaos_boost = match shape {
        GameShape::Tight => 0.0,
        GameShape::Open | GameShape::Neutral => (home.chaos + away.chaos) / 2.0,
    };
    let archetype_boost = match shape {
        GameShape::Open => open_game_boost,
        GameShape::Tight | GameShape::Neutral => tight_game_boost,
    };

    let balanced = 1.0 - pressure_diff / share_base;

    FixtureInteraction {
        fixture: fixture.clone(),
        archetype: Archetype { dominance, shape },
        h2h,
        league_avg_total_goals: league.avg_total_goals,
        quality: QualityFlags {
            home_full_window: home.matches_n >= cfg.window_size,
            away_full_window: away.matches_n >= cfg.window_size,
            home_split_ok: home.home_n >= FULL_SPLIT_MATCHES && home.away_n >= FULL_SPLIT_MATCHES,
            away_split_ok: away.home_n >= FULL_SPLIT_MATCHES && away.away_n >= FULL_SPLIT_MATCHES,
            h2h_available: h2h.has_data(),
        },

        home_pressure,
        away_pressure,
        pressure_total,
        pressure_diff,
        pressure_ratio,

        combined_attack,
        combined_attack_quality: (home.attack_quality_adj + away.attack_quality_adj) / 2.0,
        combined_defense_weak,
        combined_defense_strong,
        defense_strength_index: (1.0 - combined_defense_weak / DEFENSE_SCALE_MAX_GA)
            .clamp(0.0, 1.0),
        combined_openness,
        high_openness,

        dryness_index: (home.under15_rate + away.under15_rate) / 2.0,
        zero_zero_rate: (home.zero_zero_rate + away.zero_zero_rate) / 2.0,
        extreme_rate: (home.extreme_rate + away.extreme_rate) / 2.0,
        extreme_potential: combined_attack * combined_defense_weak,
        suppression_overlap: home.clean_sheet_rate.min(away.failed_to_score_rate)
            + away.clean_sheet_rate.min(home.failed_to_score_rate),

        both_attack_strong: home.score_1plus_rate.min(away.score_1plus_rate),
        both_defense_weak: home.concede_1plus_rate.min(away.concede_1plus_rate),
        balanced_pressure: balanced,
        balanced_strength: balanced,
        low_pressure_diff: balanced,
        mid_range_goals: 1.0 - (combined_attack - MID_RANGE_ATTACK).abs(),

        attack_momentum: (home.attack_momentum + away.attack_momentum) / 2.0,
        attack_momentum_both: home.attack_momentum.min(away.attack_momentum),

        archetype_boost,
        domination_boost,
        balanced_boost,
        open_game_boost,
        tight_game_boost,
        chaos_boost,

        home_attack,
        away_attack,
        home_defense,
        away_defense,
        home_attack_advantage: home_attack - away_attack,
        away_attack_advantage: away_attack - home_attack,
        home_pressure_dominance: home_pressure / share_base,
        away_pressure_dominance: away_pressure / share_base,
        home_form: home.form,
        away_form: away.form,
    }
}
