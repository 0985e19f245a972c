//! Session logic: the judgement engine and the score processor it feeds.

pub mod engine;
pub mod score;

pub use engine::JudgementEngine;
pub use score::{ScoreProcessor, ScoreRank, ScoreSnapshot, ScoringConfig, ScoringMode};
