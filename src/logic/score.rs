//! Score aggregation: combo, accuracy, bonus and the combined total.

use crate::error::ConfigError;
use crate::models::stats::{HitResult, HitStats};
use serde::{Deserialize, Serialize};

/// How combo progress, accuracy progress and bonus are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// 150k for combo, 850k for accuracy (scaled by accuracy), plus bonus.
    #[default]
    Mania,
    /// 500k for accuracy, 500k for combo.
    ExScore,
    /// 1M for accuracy, plus bonus.
    AccuracyOnly,
}

impl ScoringMode {
    pub fn combine(self, combo_progress: f64, accuracy_progress: f64, bonus: f64) -> f64 {
        match self {
            ScoringMode::Mania => {
                let acc = accuracy_progress;
                150_000.0 * combo_progress + 850_000.0 * acc.powf(2.0 + 2.0 * acc) * acc + bonus
            }
            ScoringMode::ExScore => 500_000.0 * accuracy_progress + 500_000.0 * combo_progress,
            ScoringMode::AccuracyOnly => 1_000_000.0 * accuracy_progress + bonus,
        }
    }
}

/// Accuracy weight of each scoring result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultWeights {
    pub perfect: f64,
    pub great: f64,
    pub good: f64,
    pub ok: f64,
    pub meh: f64,
    pub miss: f64,
}

impl ResultWeights {
    /// Weights relative to a 305 Perfect.
    pub const MANIA: ResultWeights = ResultWeights {
        perfect: 1.0,
        great: 300.0 / 305.0,
        good: 200.0 / 305.0,
        ok: 100.0 / 305.0,
        meh: 50.0 / 305.0,
        miss: 0.0,
    };

    /// EX score: two points for Perfect, one for Great.
    pub const EX_SCORE: ResultWeights = ResultWeights {
        perfect: 1.0,
        great: 0.5,
        good: 0.0,
        ok: 0.0,
        meh: 0.0,
        miss: 0.0,
    };

    pub fn weight(&self, result: HitResult) -> f64 {
        match result {
            HitResult::Perfect => self.perfect,
            HitResult::Great => self.great,
            HitResult::Good => self.good,
            HitResult::Ok => self.ok,
            HitResult::Meh => self.meh,
            HitResult::Miss => self.miss,
            HitResult::IgnoreHit | HitResult::IgnoreMiss => 0.0,
        }
    }
}

impl Default for ResultWeights {
    fn default() -> Self {
        Self::MANIA
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub mode: ScoringMode,
    #[serde(default)]
    pub weights: ResultWeights,
    /// Added to the bonus portion for each hit on a bonus-eligible part.
    #[serde(default)]
    pub bonus_value: f64,
}

impl ScoringConfig {
    pub fn ex_score() -> Self {
        Self {
            mode: ScoringMode::ExScore,
            weights: ResultWeights::EX_SCORE,
            bonus_value: 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for result in HitResult::SCORING {
            let w = self.weights.weight(result);
            if !(0.0..=1.0).contains(&w) {
                return Err(ConfigError::InvalidRuleset(format!(
                    "weight for {result:?} must be within 0..=1, got {w}"
                )));
            }
        }
        if !self.bonus_value.is_finite() || self.bonus_value < 0.0 {
            return Err(ConfigError::InvalidRuleset(format!(
                "bonus value must be non-negative, got {}",
                self.bonus_value
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreRank {
    X,
    S,
    A,
    B,
    C,
    D,
}

impl ScoreRank {
    /// Rank from accuracy. An S with no Good, Ok, Meh or Miss is upgraded to X.
    pub fn from_accuracy(accuracy: f64, stats: &HitStats) -> Self {
        let rank = if accuracy >= 1.0 {
            ScoreRank::X
        } else if accuracy >= 0.95 {
            ScoreRank::S
        } else if accuracy >= 0.9 {
            ScoreRank::A
        } else if accuracy >= 0.8 {
            ScoreRank::B
        } else if accuracy >= 0.7 {
            ScoreRank::C
        } else {
            ScoreRank::D
        };

        if rank == ScoreRank::S && stats.scoring_total() > 0 && stats.is_flawless() {
            ScoreRank::X
        } else {
            rank
        }
    }
}

/// Read-only view of the score state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub combo: u32,
    pub max_combo: u32,
    pub max_combo_possible: u32,
    pub accuracy: f64,
    pub bonus: f64,
    pub total_score: f64,
    pub rank: ScoreRank,
    pub stats: HitStats,
}

/// Folds terminal results into the session score. Results must arrive in the
/// order they were finalized.
#[derive(Debug, Clone)]
pub struct ScoreProcessor {
    config: ScoringConfig,
    combo_breaks: Vec<HitResult>,
    combo: u32,
    max_combo: u32,
    max_combo_possible: u32,
    accuracy_numerator: f64,
    accuracy_denominator: u32,
    bonus: f64,
    stats: HitStats,
}

impl ScoreProcessor {
    pub fn new(config: ScoringConfig, combo_breaks: Vec<HitResult>, max_combo_possible: u32) -> Self {
        Self {
            config,
            combo_breaks,
            combo: 0,
            max_combo: 0,
            max_combo_possible,
            accuracy_numerator: 0.0,
            accuracy_denominator: 0,
            bonus: 0.0,
            stats: HitStats::new(),
        }
    }

    /// Swaps the scoring rules. Accumulated state is kept.
    pub fn reconfigure(
        &mut self,
        config: ScoringConfig,
        combo_breaks: Vec<HitResult>,
        max_combo_possible: u32,
    ) {
        self.config = config;
        self.combo_breaks = combo_breaks;
        self.max_combo_possible = max_combo_possible;
    }

    pub fn apply(&mut self, result: HitResult, combo_affecting: bool, bonus_eligible: bool) {
        self.stats.record(result);

        if result.is_scorable() {
            self.accuracy_numerator += self.config.weights.weight(result);
            self.accuracy_denominator += 1;
        }

        if bonus_eligible && result.is_hit() {
            self.bonus += self.config.bonus_value;
        }

        if !combo_affecting {
            return;
        }
        if self.combo_breaks.contains(&result) {
            if self.combo > 0 {
                log::trace!("SCORE: combo {} broken by {:?}", self.combo, result);
            }
            self.combo = 0;
        } else if result.is_scorable() {
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);
        }
    }

    pub fn record_ghost_tap(&mut self) {
        self.stats.record_ghost_tap();
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn stats(&self) -> &HitStats {
        &self.stats
    }

    pub fn combo_progress(&self) -> f64 {
        if self.max_combo_possible == 0 {
            return 0.0;
        }
        (self.max_combo as f64 / self.max_combo_possible as f64).min(1.0)
    }

    pub fn accuracy(&self) -> f64 {
        if self.accuracy_denominator == 0 {
            return 0.0;
        }
        self.accuracy_numerator / self.accuracy_denominator as f64
    }

    pub fn total_score(&self) -> f64 {
        self.config
            .mode
            .combine(self.combo_progress(), self.accuracy(), self.bonus)
    }

    pub fn rank(&self) -> ScoreRank {
        ScoreRank::from_accuracy(self.accuracy(), &self.stats)
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            combo: self.combo,
            max_combo: self.max_combo,
            max_combo_possible: self.max_combo_possible,
            accuracy: self.accuracy(),
            bonus: self.bonus,
            total_score: self.total_score(),
            rank: self.rank(),
            stats: self.stats.clone(),
        }
    }
}
