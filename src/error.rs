//! Configuration and loading errors.
//!
//! Only session construction and the loading helpers can fail. Everything that
//! happens per tick is absorbed by the engine and never surfaces here.

use crate::models::stats::HitResult;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unsupported lane count: {0} (supported range 1-{max})", max = crate::difficulty::MAX_LANES)]
    UnsupportedLaneCount(usize),

    #[error("Hit windows are not monotonic: {worse:?} ({worse_ms}ms) is tighter than {better:?} ({better_ms}ms)")]
    NonMonotonicWindows {
        better: HitResult,
        better_ms: f64,
        worse: HitResult,
        worse_ms: f64,
    },

    #[error("Invalid hit window for {result:?}: {value}")]
    InvalidWindow { result: HitResult, value: f64 },

    #[error("Invalid target #{index}: {reason}")]
    InvalidTarget { index: usize, reason: String },

    #[error("Lane {lane} is outside a {key_count}K chart")]
    LaneOutOfRange { lane: usize, key_count: usize },

    #[error("Malformed weights for {lane_count}K: expected {expected} values, got {actual}")]
    MalformedWeights {
        lane_count: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid ruleset: {0}")]
    InvalidRuleset(String),

    #[error("Failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to load beatmap {path:?}: {source}")]
    Beatmap {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Replay codec error: {0}")]
    ReplayCodec(String),
}
