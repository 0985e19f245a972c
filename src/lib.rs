//! Deterministic judgement engine for vertical scrolling rhythm games.
//!
//! A [`JudgementEngine`] consumes a [`Chart`] and a stream of
//! [`InputEvent`]s, classifies timing offsets through the active
//! [`Ruleset`]'s hit windows, drives hold notes through their state machine
//! and folds every result into a running score.

pub mod difficulty;
pub mod error;
pub mod input;
pub mod logic;
pub mod models;
pub mod system;

pub use error::ConfigError;
pub use input::InputEvent;
pub use logic::{JudgementEngine, ScoreRank, ScoreSnapshot};
pub use models::engine::{Chart, HitWindow, NoteData};
pub use models::replay::{ReplayData, ReplayResult, generate_autoplay, simulate_replay};
pub use models::ruleset::{Ruleset, Variant};
pub use models::settings::Settings;
pub use models::stats::{HitResult, HitStats};
pub use system::bus::{EngineEvent, JudgementEvent};
