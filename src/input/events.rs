use serde::{Deserialize, Serialize};

/// A press or release transition on one lane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub time_ms: f64,
    pub lane: usize,
    pub pressed: bool,
}

impl InputEvent {
    pub fn press(time_ms: f64, lane: usize) -> Self {
        Self {
            time_ms,
            lane,
            pressed: true,
        }
    }

    pub fn release(time_ms: f64, lane: usize) -> Self {
        Self {
            time_ms,
            lane,
            pressed: false,
        }
    }
}
