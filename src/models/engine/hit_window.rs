//! Definitions and constructors for hit window timing thresholds.

use super::constants::O2JAM_MIN_BPM;
use crate::error::ConfigError;
use crate::models::stats::HitResult;
use serde::{Deserialize, Serialize};

/// A window bound sampled at difficulty 0, 5 and 10.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyRange {
    pub min: f64,
    pub mid: f64,
    pub max: f64,
}

impl DifficultyRange {
    pub const fn new(min: f64, mid: f64, max: f64) -> Self {
        Self { min, mid, max }
    }

    /// Linear interpolation on either side of difficulty 5.
    pub fn at(&self, difficulty: f64) -> f64 {
        if difficulty > 5.0 {
            self.mid + (self.max - self.mid) * (difficulty - 5.0) / 5.0
        } else if difficulty < 5.0 {
            self.mid + (self.mid - self.min) * (difficulty - 5.0) / 5.0
        } else {
            self.mid
        }
    }
}

const OSU_RANGES: [DifficultyRange; 6] = [
    DifficultyRange::new(22.4, 19.4, 13.9),
    DifficultyRange::new(64.0, 49.0, 34.0),
    DifficultyRange::new(97.0, 82.0, 67.0),
    DifficultyRange::new(127.0, 112.0, 97.0),
    DifficultyRange::new(151.0, 136.0, 121.0),
    DifficultyRange::new(188.0, 173.0, 158.0),
];

const CLASSIC_BASES: [f64; 5] = [34.0, 67.0, 97.0, 121.0, 158.0];

/// LR2 RANK NORMAL ladder.
pub const BMS_WINDOWS: [f64; 6] = [18.0, 40.0, 100.0, 200.0, 200.0, 1000.0];
pub const EZ2AC_WINDOWS: [f64; 6] = [18.0, 38.0, 68.0, 88.0, 88.0, 100.0];
pub const MALODY_WINDOWS: [f64; 6] = [20.0, 40.0, 60.0, 80.0, 100.0, 120.0];

/// How a hit window reacts to `set_difficulty`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HitWindowMode {
    /// Windows interpolated from overall difficulty.
    OsuOd,
    /// Windows widened linearly by inverted overall difficulty.
    OsuClassic,
    /// Windows derived from BPM; the difficulty level is the BPM.
    O2Jam,
    /// Fixed ladder, only scaled by the rate multiplier.
    Fixed { windows: [f64; 6] },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HitWindow {
    pub perfect_ms: f64,
    pub great_ms: f64,
    pub good_ms: f64,
    pub ok_ms: f64,
    pub meh_ms: f64,
    pub miss_ms: f64,
    mode: HitWindowMode,
    difficulty: f64,
    rate: f64,
    allowed: [bool; 6],
}

impl HitWindow {
    /// Builds and validates a window set for `mode` at `difficulty`.
    pub fn new(mode: HitWindowMode, difficulty: f64, rate: f64) -> Result<Self, ConfigError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ConfigError::InvalidRuleset(format!(
                "rate must be positive, got {rate}"
            )));
        }
        let window = Self::build(mode, difficulty, rate);
        window.validate()?;
        Ok(window)
    }

    fn build(mode: HitWindowMode, difficulty: f64, rate: f64) -> Self {
        let mut window = Self {
            perfect_ms: 0.0,
            great_ms: 0.0,
            good_ms: 0.0,
            ok_ms: 0.0,
            meh_ms: 0.0,
            miss_ms: 0.0,
            mode,
            difficulty: 0.0,
            rate,
            allowed: [true; 6],
        };
        window.difficulty = window.clamp_difficulty(difficulty);
        window.update_windows();
        window
    }

    /// Creates a window based on osu!mania Overall Difficulty.
    pub fn from_osu_od(od: f64) -> Self {
        Self::build(HitWindowMode::OsuOd, od, 1.0)
    }

    /// Creates a window based on the classic (score v1) osu!mania formula.
    pub fn from_osu_classic(od: f64) -> Self {
        Self::build(HitWindowMode::OsuClassic, od, 1.0)
    }

    /// Creates a BPM-driven O2Jam window.
    pub fn from_o2jam_bpm(bpm: f64) -> Self {
        Self::build(HitWindowMode::O2Jam, bpm, 1.0)
    }

    /// Utility constructor for fully custom values (Perfect through Miss).
    pub fn from_custom(windows: [f64; 6]) -> Result<Self, ConfigError> {
        Self::new(HitWindowMode::Fixed { windows }, 0.0, 1.0)
    }

    pub fn mode(&self) -> &HitWindowMode {
        &self.mode
    }

    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Rescales the windows for `level`. Fixed ladders ignore this.
    pub fn set_difficulty(&mut self, level: f64) {
        if matches!(self.mode, HitWindowMode::Fixed { .. }) {
            log::trace!("ENGINE: fixed hit windows ignore difficulty {level}");
            return;
        }
        self.difficulty = self.clamp_difficulty(level);
        self.update_windows();
    }

    /// Changes the playback rate multiplier. Non-positive rates are ignored.
    pub fn set_rate(&mut self, rate: f64) {
        if !rate.is_finite() || rate <= 0.0 {
            log::warn!("ENGINE: ignoring invalid rate {rate}");
            return;
        }
        self.rate = rate;
        self.update_windows();
    }

    /// Restricts which results this window may emit. Miss is always allowed.
    pub fn with_allowed(mut self, results: &[HitResult]) -> Self {
        self.allowed = [false; 6];
        for result in results.iter().filter(|r| r.is_scorable()) {
            self.allowed[result.rank()] = true;
        }
        self.allowed[HitResult::Miss.rank()] = true;
        self
    }

    pub fn is_allowed(&self, result: HitResult) -> bool {
        result.is_scorable() && self.allowed[result.rank()]
    }

    /// Maximum absolute offset for a scoring result.
    pub fn window_for(&self, result: HitResult) -> Option<f64> {
        match result {
            HitResult::Perfect => Some(self.perfect_ms),
            HitResult::Great => Some(self.great_ms),
            HitResult::Good => Some(self.good_ms),
            HitResult::Ok => Some(self.ok_ms),
            HitResult::Meh => Some(self.meh_ms),
            HitResult::Miss => Some(self.miss_ms),
            HitResult::IgnoreHit | HitResult::IgnoreMiss => None,
        }
    }

    pub fn as_array(&self) -> [f64; 6] {
        [
            self.perfect_ms,
            self.great_ms,
            self.good_ms,
            self.ok_ms,
            self.meh_ms,
            self.miss_ms,
        ]
    }

    /// Classifies a signed offset (early negative, late positive).
    ///
    /// The first allowed window whose bound covers `|offset|` wins, so ties go
    /// to the stricter result. Anything beyond the Miss window is a Miss.
    pub fn classify(&self, offset_ms: f64) -> HitResult {
        let abs_diff = offset_ms.abs();
        if abs_diff.is_nan() {
            return HitResult::Miss;
        }

        HitResult::SCORING
            .into_iter()
            .zip(self.as_array())
            .find(|&(result, bound)| self.is_allowed(result) && abs_diff <= bound)
            .map_or(HitResult::Miss, |(result, _)| result)
    }

    /// Returns true if a press at this offset may still be matched to a target.
    pub fn in_range(&self, offset_ms: f64) -> bool {
        offset_ms.abs() <= self.miss_ms
    }

    /// Returns true once a target at this offset can no longer be hit.
    pub fn has_expired(&self, offset_ms: f64) -> bool {
        offset_ms > self.miss_ms
    }

    /// Best allowed result that is not better than `result`.
    pub fn cap_to_allowed(&self, result: HitResult) -> HitResult {
        if result.is_ignore() {
            return result;
        }
        HitResult::SCORING[result.rank()..]
            .iter()
            .copied()
            .find(|r| self.is_allowed(*r))
            .unwrap_or(HitResult::Miss)
    }

    /// Checks that every bound is finite, non-negative and non-decreasing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds = self.as_array();
        for (result, value) in HitResult::SCORING.into_iter().zip(bounds) {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWindow { result, value });
            }
        }
        for i in 1..bounds.len() {
            if bounds[i] < bounds[i - 1] {
                return Err(ConfigError::NonMonotonicWindows {
                    better: HitResult::SCORING[i - 1],
                    better_ms: bounds[i - 1],
                    worse: HitResult::SCORING[i],
                    worse_ms: bounds[i],
                });
            }
        }
        Ok(())
    }

    fn clamp_difficulty(&self, level: f64) -> f64 {
        let level = if level.is_finite() { level } else { 0.0 };
        match self.mode {
            HitWindowMode::OsuOd | HitWindowMode::OsuClassic => level.clamp(0.0, 10.0),
            HitWindowMode::O2Jam => level.max(O2JAM_MIN_BPM),
            HitWindowMode::Fixed { .. } => level,
        }
    }

    fn update_windows(&mut self) {
        let m = self.rate;
        let bounds = match &self.mode {
            HitWindowMode::OsuOd => {
                OSU_RANGES.map(|range| (range.at(self.difficulty) * m).floor() + 0.5)
            }
            HitWindowMode::OsuClassic => {
                let inverted_od = (10.0 - self.difficulty).clamp(0.0, 10.0);
                let [great, good, ok, meh, miss] =
                    CLASSIC_BASES.map(|base| ((base + 3.0 * inverted_od) * m).floor() + 0.5);
                [(16.0 * m).floor() + 0.5, great, good, ok, meh, miss]
            }
            HitWindowMode::O2Jam => {
                let bpm = self.difficulty;
                let cool = 7500.0 / bpm * m;
                let good = 22500.0 / bpm * m;
                let bad = 31250.0 / bpm * m;
                [cool, cool, good, good, bad, bad]
            }
            HitWindowMode::Fixed { windows } => windows.map(|w| w * m),
        };

        [
            self.perfect_ms,
            self.great_ms,
            self.good_ms,
            self.ok_ms,
            self.meh_ms,
            self.miss_ms,
        ] = bounds;
    }
}
