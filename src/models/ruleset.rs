//! Variant configuration bundles.
//!
//! A `Ruleset` is everything that differs between judgement variants: the hit
//! window model, which results may appear, which ones break combo, how hold
//! bodies and tails resolve and how the score is combined.

use crate::error::ConfigError;
use crate::logic::score::ScoringConfig;
use crate::models::engine::constants::{DEFAULT_OVERALL_DIFFICULTY, O2JAM_MIN_BPM};
use crate::models::engine::hit_window::{
    BMS_WINDOWS, EZ2AC_WINDOWS, HitWindow, HitWindowMode, MALODY_WINDOWS,
};
use crate::models::engine::hold::{BodyPolicy, ReleaseLenience, TailPolicy};
use crate::models::stats::HitResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Built-in presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    #[default]
    Mania,
    ManiaClassic,
    Bms,
    #[serde(rename = "ez2ac")]
    Ez2Ac,
    #[serde(rename = "o2jam")]
    O2Jam,
    Malody,
}

impl Variant {
    pub const ALL: [Variant; 6] = [
        Variant::Mania,
        Variant::ManiaClassic,
        Variant::Bms,
        Variant::Ez2Ac,
        Variant::O2Jam,
        Variant::Malody,
    ];

    /// Difficulty used when a settings file leaves it out.
    pub fn default_difficulty(self) -> f64 {
        match self {
            Variant::O2Jam => O2JAM_MIN_BPM,
            _ => DEFAULT_OVERALL_DIFFICULTY,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Variant::Mania => "mania",
            Variant::ManiaClassic => "mania_classic",
            Variant::Bms => "bms",
            Variant::Ez2Ac => "ez2ac",
            Variant::O2Jam => "o2jam",
            Variant::Malody => "malody",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    pub name: String,
    pub window_mode: HitWindowMode,
    /// Overall difficulty, or BPM for O2Jam windows.
    pub difficulty: f64,
    #[serde(default = "default_rate")]
    pub rate: f64,
    #[serde(default = "all_results")]
    pub allowed: Vec<HitResult>,
    pub combo_breaks: Vec<HitResult>,
    #[serde(default)]
    pub body: BodyPolicy,
    #[serde(default)]
    pub tail: TailPolicy,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

fn default_rate() -> f64 {
    1.0
}

fn all_results() -> Vec<HitResult> {
    HitResult::SCORING.to_vec()
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::preset(Variant::Mania, DEFAULT_OVERALL_DIFFICULTY)
    }
}

impl Ruleset {
    pub fn preset(variant: Variant, difficulty: f64) -> Self {
        let standard_breaks = vec![HitResult::Miss, HitResult::IgnoreMiss];
        let base = Self {
            name: variant.to_string(),
            window_mode: HitWindowMode::OsuOd,
            difficulty,
            rate: 1.0,
            allowed: all_results(),
            combo_breaks: standard_breaks,
            body: BodyPolicy::Strict,
            tail: TailPolicy::default(),
            scoring: ScoringConfig::default(),
        };

        match variant {
            Variant::Mania => base,
            Variant::ManiaClassic => Self {
                window_mode: HitWindowMode::OsuClassic,
                ..base
            },
            Variant::Bms => Self {
                window_mode: HitWindowMode::Fixed {
                    windows: BMS_WINDOWS,
                },
                combo_breaks: vec![
                    HitResult::Ok,
                    HitResult::Meh,
                    HitResult::Miss,
                    HitResult::IgnoreMiss,
                ],
                tail: TailPolicy {
                    lenience: ReleaseLenience {
                        multiplier: 1.0,
                        tier: HitResult::Good,
                    },
                    ..TailPolicy::default()
                },
                scoring: ScoringConfig::ex_score(),
                ..base
            },
            Variant::Ez2Ac => Self {
                window_mode: HitWindowMode::Fixed {
                    windows: EZ2AC_WINDOWS,
                },
                body: BodyPolicy::NoMiss,
                tail: TailPolicy {
                    lenience: ReleaseLenience {
                        multiplier: 0.0,
                        tier: HitResult::Meh,
                    },
                    ..TailPolicy::default()
                },
                ..base
            },
            Variant::O2Jam => Self {
                window_mode: HitWindowMode::O2Jam,
                allowed: vec![
                    HitResult::Perfect,
                    HitResult::Good,
                    HitResult::Meh,
                    HitResult::Miss,
                ],
                combo_breaks: vec![HitResult::Meh, HitResult::Miss, HitResult::IgnoreMiss],
                ..base
            },
            Variant::Malody => Self {
                window_mode: HitWindowMode::Fixed {
                    windows: MALODY_WINDOWS,
                },
                body: BodyPolicy::NoMiss,
                tail: TailPolicy {
                    best: HitResult::IgnoreHit,
                    worst: HitResult::IgnoreMiss,
                    lenience: ReleaseLenience::default(),
                },
                ..base
            },
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let ruleset: Ruleset = toml::from_str(content)?;
        ruleset.validate()?;
        Ok(ruleset)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let ruleset: Ruleset = serde_json::from_str(content)?;
        ruleset.validate()?;
        Ok(ruleset)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Builds the hit window this ruleset describes.
    pub fn build_hit_window(&self) -> Result<HitWindow, ConfigError> {
        Ok(HitWindow::new(self.window_mode.clone(), self.difficulty, self.rate)?
            .with_allowed(&self.allowed))
    }

    /// Checks everything that would otherwise surface mid-session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.difficulty.is_finite() {
            return Err(ConfigError::InvalidRuleset(format!(
                "difficulty must be finite, got {}",
                self.difficulty
            )));
        }
        if let Some(marker) = self.allowed.iter().find(|r| r.is_ignore()) {
            return Err(ConfigError::InvalidRuleset(format!(
                "{marker:?} cannot be an allowed window result"
            )));
        }

        let TailPolicy {
            best,
            worst,
            lenience,
        } = self.tail;
        if best.is_ignore() != worst.is_ignore() || best.rank() > worst.rank() {
            return Err(ConfigError::InvalidRuleset(format!(
                "tail best {best:?} and worst {worst:?} do not form a range"
            )));
        }
        if !lenience.multiplier.is_finite() || lenience.multiplier < 0.0 {
            return Err(ConfigError::InvalidRuleset(format!(
                "release lenience multiplier must be non-negative, got {}",
                lenience.multiplier
            )));
        }
        if lenience.tier.is_ignore() {
            return Err(ConfigError::InvalidRuleset(format!(
                "release lenience tier {:?} has no window",
                lenience.tier
            )));
        }

        self.scoring.validate()?;
        self.build_hit_window()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::score::{ScoreProcessor, ScoringMode};

    fn combo_after(ruleset: &Ruleset, results: &[HitResult]) -> u32 {
        let mut score = ScoreProcessor::new(ruleset.scoring, ruleset.combo_breaks.clone(), 10);
        for &result in results {
            score.apply(result, true, false);
        }
        score.combo()
    }

    #[test]
    fn test_every_preset_is_valid() {
        for variant in Variant::ALL {
            let ruleset = Ruleset::preset(variant, variant.default_difficulty());
            assert!(ruleset.validate().is_ok(), "{variant} preset is invalid");
        }
    }

    #[test]
    fn test_bms_breaks_on_ok_and_meh() {
        let bms = Ruleset::preset(Variant::Bms, 0.0);
        let mania = Ruleset::preset(Variant::Mania, 8.0);
        let played = [HitResult::Perfect, HitResult::Great];
        for (ruleset, last, combo) in [
            (&bms, HitResult::Ok, 0),
            (&bms, HitResult::Meh, 0),
            (&mania, HitResult::Meh, 3),
            (&mania, HitResult::IgnoreMiss, 0),
        ] {
            assert_eq!(combo_after(ruleset, &[played[0], played[1], last]), combo);
        }
    }

    #[test]
    fn test_o2jam_window_forbids_great() {
        let window = Ruleset::preset(Variant::O2Jam, 150.0)
            .build_hit_window()
            .unwrap();
        assert!(!window.is_allowed(HitResult::Great));
        assert!(!window.is_allowed(HitResult::Ok));
        assert!(window.is_allowed(HitResult::Meh));
    }

    #[test]
    fn test_ruleset_from_toml() {
        let ruleset = Ruleset::from_toml_str(
            r#"
            name = "custom"
            difficulty = 0.0
            combo_breaks = ["Miss"]
            body = "no_miss"

            [window_mode]
            type = "fixed"
            windows = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0]

            [tail]
            best = "Great"
            worst = "Miss"
            "#,
        )
        .unwrap();

        assert_eq!(ruleset.rate, 1.0);
        assert_eq!(ruleset.allowed.len(), 6);
        assert_eq!(ruleset.body, BodyPolicy::NoMiss);
        assert_eq!(ruleset.tail.lenience, ReleaseLenience::default());
        assert_eq!(ruleset.scoring.mode, ScoringMode::Mania);
    }

    #[test]
    fn test_validate_rejects_inverted_tail_range() {
        let mut ruleset = Ruleset::default();
        ruleset.tail.best = HitResult::Miss;
        ruleset.tail.worst = HitResult::Perfect;
        assert!(matches!(
            ruleset.validate(),
            Err(ConfigError::InvalidRuleset(_))
        ));

        let mut ruleset = Ruleset::default();
        ruleset.window_mode = HitWindowMode::Fixed {
            windows: [50.0, 40.0, 60.0, 70.0, 80.0, 90.0],
        };
        assert!(matches!(
            ruleset.validate(),
            Err(ConfigError::NonMonotonicWindows { .. })
        ));
    }
}
