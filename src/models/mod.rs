pub mod engine;
pub mod replay;
pub mod ruleset;
pub mod settings;
pub mod stats;
