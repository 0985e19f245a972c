//! Session settings file.

use crate::error::ConfigError;
use crate::models::ruleset::{Ruleset, Variant};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub variant: Variant,
    /// OD for difficulty-scaled variants, BPM for O2Jam. Defaults per variant.
    #[serde(default)]
    pub difficulty: Option<f64>,
    #[serde(default = "default_rate")]
    pub rate: f64,
    /// Full custom ruleset; replaces the preset when present.
    #[serde(default)]
    pub ruleset: Option<Ruleset>,
}

fn default_rate() -> f64 {
    1.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            variant: Variant::Mania,
            difficulty: None,
            rate: default_rate(),
            ruleset: None,
        }
    }
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(serde_json::from_str(&content)?),
            _ => Self::from_toml_str(&content),
        }
    }

    /// Resolves the ruleset these settings describe, validated.
    pub fn to_ruleset(&self) -> Result<Ruleset, ConfigError> {
        let ruleset = match &self.ruleset {
            Some(custom) => custom.clone(),
            None => {
                let difficulty = self
                    .difficulty
                    .unwrap_or_else(|| self.variant.default_difficulty());
                Ruleset::preset(self.variant, difficulty)
            }
        }
        .with_rate(self.rate);

        ruleset.validate()?;
        Ok(ruleset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_mania_od8() {
        let ruleset = Settings::default().to_ruleset().unwrap();
        assert_eq!(ruleset.name, "mania");
        assert_eq!(ruleset.difficulty, 8.0);
    }

    #[test]
    fn test_preset_from_toml() {
        let settings = Settings::from_toml_str(
            r#"
            variant = "o2jam"
            rate = 1.5
            "#,
        )
        .unwrap();
        let ruleset = settings.to_ruleset().unwrap();
        assert_eq!(ruleset.name, "o2jam");
        assert_eq!(ruleset.difficulty, 120.0);
        assert_eq!(ruleset.rate, 1.5);
    }

    #[test]
    fn test_invalid_rate_is_rejected() {
        let settings = Settings {
            rate: 0.0,
            ..Settings::default()
        };
        assert!(settings.to_ruleset().is_err());
    }
}
