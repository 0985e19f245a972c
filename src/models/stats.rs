//! Hit results and per-session hit statistics.
//!
//! This module defines the closed set of outcomes a target can resolve to,
//! ranked by quality, and the counters accumulated over a play session.

use serde::{Deserialize, Serialize};

/// Outcome of judging a target or one of its parts, from best to worst.
///
/// `IgnoreHit` and `IgnoreMiss` complete a part's lifecycle without touching
/// accuracy. They only reach the combo when a ruleset flags them as breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitResult {
    Perfect,
    Great,
    Good,
    Ok,
    Meh,
    Miss,
    IgnoreHit,
    IgnoreMiss,
}

impl HitResult {
    /// Scoring results in window order, strictest first.
    pub const SCORING: [HitResult; 6] = [
        HitResult::Perfect,
        HitResult::Great,
        HitResult::Good,
        HitResult::Ok,
        HitResult::Meh,
        HitResult::Miss,
    ];

    /// Position in window order. Ignore markers sort after every scoring result.
    pub fn rank(self) -> usize {
        match self {
            HitResult::Perfect => 0,
            HitResult::Great => 1,
            HitResult::Good => 2,
            HitResult::Ok => 3,
            HitResult::Meh => 4,
            HitResult::Miss => 5,
            HitResult::IgnoreHit => 6,
            HitResult::IgnoreMiss => 7,
        }
    }

    /// Returns true for the non-scoring markers.
    pub fn is_ignore(self) -> bool {
        matches!(self, HitResult::IgnoreHit | HitResult::IgnoreMiss)
    }

    /// Returns true if this result counts as a successful hit.
    pub fn is_hit(self) -> bool {
        !matches!(self, HitResult::Miss | HitResult::IgnoreMiss)
    }

    /// Returns true if this result feeds accuracy.
    pub fn is_scorable(self) -> bool {
        !self.is_ignore()
    }
}

/// Accumulated hit statistics for a play session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HitStats {
    pub perfect: u32,
    pub great: u32,
    pub good: u32,
    pub ok: u32,
    pub meh: u32,
    pub miss: u32,
    pub ignore_hit: u32,
    pub ignore_miss: u32,
    /// Presses that matched no reachable target.
    pub ghost_taps: u32,
}

impl HitStats {
    /// Creates empty hit statistics.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: HitResult) {
        match result {
            HitResult::Perfect => self.perfect += 1,
            HitResult::Great => self.great += 1,
            HitResult::Good => self.good += 1,
            HitResult::Ok => self.ok += 1,
            HitResult::Meh => self.meh += 1,
            HitResult::Miss => self.miss += 1,
            HitResult::IgnoreHit => self.ignore_hit += 1,
            HitResult::IgnoreMiss => self.ignore_miss += 1,
        }
    }

    pub fn record_ghost_tap(&mut self) {
        self.ghost_taps += 1;
    }

    pub fn count(&self, result: HitResult) -> u32 {
        match result {
            HitResult::Perfect => self.perfect,
            HitResult::Great => self.great,
            HitResult::Good => self.good,
            HitResult::Ok => self.ok,
            HitResult::Meh => self.meh,
            HitResult::Miss => self.miss,
            HitResult::IgnoreHit => self.ignore_hit,
            HitResult::IgnoreMiss => self.ignore_miss,
        }
    }

    /// Number of results that feed accuracy.
    pub fn scoring_total(&self) -> u32 {
        self.perfect + self.great + self.good + self.ok + self.meh + self.miss
    }

    /// Returns true when every scoring result was a Perfect or a Great.
    pub fn is_flawless(&self) -> bool {
        self.good + self.ok + self.meh + self.miss == 0
    }
}
