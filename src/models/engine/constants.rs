//! Numeric constants shared by the judgement engine.

/// Microseconds per millisecond.
pub const US_PER_MS: i64 = 1_000;

/// Release windows are this much wider than press windows by default.
pub const RELEASE_WINDOW_LENIENCE: f64 = 1.5;

/// Synthetic release delay for instantaneous targets in autoplay.
pub const AUTOPLAY_RELEASE_DELAY_MS: f64 = 50.0;

/// O2Jam windows never scale past this BPM floor.
pub const O2JAM_MIN_BPM: f64 = 120.0;

/// Default overall difficulty used by the command-line front end.
pub const DEFAULT_OVERALL_DIFFICULTY: f64 = 8.0;

/// Converts milliseconds to microseconds, rounding to the nearest µs.
pub fn ms_to_us(ms: f64) -> i64 {
    (ms * US_PER_MS as f64).round() as i64
}

/// Converts microseconds to milliseconds.
pub fn us_to_ms(us: i64) -> f64 {
    us as f64 / US_PER_MS as f64
}
