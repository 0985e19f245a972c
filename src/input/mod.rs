//! Input events consumed by the engine.

pub mod events;

pub use events::InputEvent;
