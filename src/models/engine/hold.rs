//! Hold note state machine.
//!
//! A hold owns a head, a body and a tail. The head is judged like a tap, the
//! body only records whether the hold survived, and the tail carries the
//! terminal result of the whole hold. Every transition returns the parts it
//! judged, in head, body, tail order.

use super::constants::RELEASE_WINDOW_LENIENCE;
use super::hit_window::HitWindow;
use super::target::{Judgement, SubTarget, TargetPart};
use crate::models::stats::HitResult;
use serde::{Deserialize, Serialize};

/// Parts judged by one transition.
pub type PartJudgements = Vec<(TargetPart, Judgement)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HoldState {
    #[default]
    Idle,
    Pressed,
    ReleasedEarly,
    ReleasedLate,
    Completed,
}

/// How the body of a hold resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPolicy {
    /// Any early release or unhit head fails the body.
    #[default]
    Strict,
    /// The body always resolves to IgnoreHit.
    NoMiss,
}

/// Tolerance for releasing before the tail: `multiplier * window(tier)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReleaseLenience {
    pub multiplier: f64,
    pub tier: HitResult,
}

impl Default for ReleaseLenience {
    fn default() -> Self {
        Self {
            multiplier: RELEASE_WINDOW_LENIENCE,
            tier: HitResult::Meh,
        }
    }
}

impl ReleaseLenience {
    pub fn window_ms(&self, window: &HitWindow) -> f64 {
        self.multiplier * window.window_for(self.tier).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailPolicy {
    pub best: HitResult,
    pub worst: HitResult,
    #[serde(default)]
    pub lenience: ReleaseLenience,
}

impl Default for TailPolicy {
    fn default() -> Self {
        Self {
            best: HitResult::Perfect,
            worst: HitResult::Miss,
            lenience: ReleaseLenience::default(),
        }
    }
}

/// Everything a hold needs from the active ruleset.
#[derive(Debug, Clone, Copy)]
pub struct HoldRules<'a> {
    pub window: &'a HitWindow,
    pub body: BodyPolicy,
    pub tail: &'a TailPolicy,
}

impl HoldRules<'_> {
    fn best_tail(&self) -> HitResult {
        self.window.cap_to_allowed(self.tail.best)
    }

    fn worst_tail(&self) -> HitResult {
        self.tail.worst
    }

    fn body_result(&self, survived: bool) -> HitResult {
        match self.body {
            BodyPolicy::NoMiss => HitResult::IgnoreHit,
            BodyPolicy::Strict if survived => HitResult::IgnoreHit,
            BodyPolicy::Strict => HitResult::IgnoreMiss,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoldNote {
    pub head: SubTarget,
    pub body: SubTarget,
    pub tail: SubTarget,
    state: HoldState,
    holding: bool,
}

impl HoldNote {
    pub fn new(start_time_ms: f64, end_time_ms: f64) -> Self {
        Self {
            head: SubTarget::new(TargetPart::Head, start_time_ms),
            body: SubTarget::new(TargetPart::Body, start_time_ms),
            tail: SubTarget::new(TargetPart::Tail, end_time_ms),
            state: HoldState::Idle,
            holding: false,
        }
    }

    pub fn state(&self) -> HoldState {
        self.state
    }

    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// True if the head resolved to a non-miss result.
    pub fn head_hit(&self) -> bool {
        self.head.result().is_some_and(|r| r.is_hit())
    }

    /// Press on this hold. Judges the head if it is still open, otherwise
    /// re-grabs the hold without improving any result.
    pub fn press(&mut self, time_ms: f64, window: &HitWindow) -> PartJudgements {
        let mut judged = Vec::new();
        if self.holding || self.tail.is_judged() {
            return judged;
        }

        if !self.head.is_judged() {
            let offset = time_ms - self.head.time_ms;
            let result = window.classify(offset);
            Self::push(&mut self.head, result, offset, &mut judged);
        }

        self.holding = true;
        self.state = HoldState::Pressed;
        judged
    }

    /// Release of a held hold before its tail was judged.
    pub fn release(&mut self, time_ms: f64, rules: &HoldRules) -> PartJudgements {
        let mut judged = Vec::new();
        if !self.holding {
            return judged;
        }
        self.holding = false;
        if self.tail.is_judged() {
            return judged;
        }

        let offset = time_ms - self.tail.time_ms;
        let gap = -offset;
        let head_hit = self.head_hit();

        if gap > rules.tail.lenience.window_ms(rules.window) {
            self.state = HoldState::ReleasedEarly;
            Self::push(&mut self.body, rules.body_result(false), offset, &mut judged);
            Self::push(&mut self.tail, rules.worst_tail(), offset, &mut judged);
        } else {
            self.state = HoldState::ReleasedLate;
            let tail = if head_hit {
                rules.best_tail()
            } else {
                rules.worst_tail()
            };
            Self::push(&mut self.body, rules.body_result(head_hit), offset, &mut judged);
            Self::push(&mut self.tail, tail, offset, &mut judged);
        }
        judged
    }

    /// The head was never pressed within its window.
    pub fn expire_head(&mut self, window: &HitWindow) -> PartJudgements {
        let mut judged = Vec::new();
        Self::push(&mut self.head, HitResult::Miss, window.miss_ms, &mut judged);
        judged
    }

    /// Time reached the tail. The holding flag decides the result.
    pub fn reach_tail(&mut self, rules: &HoldRules) -> PartJudgements {
        let mut judged = Vec::new();
        if self.tail.is_judged() {
            return judged;
        }

        Self::push(&mut self.head, HitResult::Miss, rules.window.miss_ms, &mut judged);

        let survived = self.holding && self.head_hit();
        let tail = if survived {
            rules.best_tail()
        } else {
            rules.worst_tail()
        };
        Self::push(&mut self.body, rules.body_result(survived), 0.0, &mut judged);
        Self::push(&mut self.tail, tail, 0.0, &mut judged);

        if self.holding {
            self.state = HoldState::Completed;
        }
        judged
    }

    /// Resolves every open part to its minimum result.
    pub fn force_miss(&mut self, rules: &HoldRules) -> PartJudgements {
        let mut judged = Vec::new();
        Self::push(&mut self.head, HitResult::Miss, rules.window.miss_ms, &mut judged);
        Self::push(&mut self.body, HitResult::IgnoreMiss, 0.0, &mut judged);
        Self::push(&mut self.tail, rules.worst_tail(), 0.0, &mut judged);
        self.holding = false;
        judged
    }

    fn push(part: &mut SubTarget, result: HitResult, offset_ms: f64, out: &mut PartJudgements) {
        if part.judge(result, offset_ms) {
            out.push((part.part, Judgement { result, offset_ms }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(judged: &PartJudgements) -> Vec<(TargetPart, HitResult)> {
        judged.iter().map(|(p, j)| (*p, j.result)).collect()
    }

    #[test]
    fn test_held_through_gives_best_tail() {
        let window = HitWindow::from_osu_od(8.0);
        let tail = TailPolicy::default();
        let rules = HoldRules {
            window: &window,
            body: BodyPolicy::Strict,
            tail: &tail,
        };
        let mut hold = HoldNote::new(2000.0, 3000.0);

        let head = hold.press(2000.0, &window);
        assert_eq!(results(&head), vec![(TargetPart::Head, HitResult::Perfect)]);
        assert_eq!(hold.state(), HoldState::Pressed);

        let rest = hold.reach_tail(&rules);
        assert_eq!(
            results(&rest),
            vec![
                (TargetPart::Body, HitResult::IgnoreHit),
                (TargetPart::Tail, HitResult::Perfect)
            ]
        );
        assert_eq!(hold.state(), HoldState::Completed);
        assert!(hold.reach_tail(&rules).is_empty());
    }

    #[test]
    fn test_early_release_beyond_lenience_fails() {
        let window = HitWindow::from_osu_od(8.0);
        let tail = TailPolicy::default();
        let rules = HoldRules {
            window: &window,
            body: BodyPolicy::Strict,
            tail: &tail,
        };
        let lenience = tail.lenience.window_ms(&window);
        let mut hold = HoldNote::new(2000.0, 3000.0);

        hold.press(2000.0, &window);
        let judged = hold.release(3000.0 - lenience - 1.0, &rules);
        assert_eq!(
            results(&judged),
            vec![
                (TargetPart::Body, HitResult::IgnoreMiss),
                (TargetPart::Tail, HitResult::Miss)
            ]
        );
        assert_eq!(hold.state(), HoldState::ReleasedEarly);
    }

    #[test]
    fn test_release_within_lenience_keeps_best() {
        let window = HitWindow::from_osu_od(8.0);
        let tail = TailPolicy::default();
        let rules = HoldRules {
            window: &window,
            body: BodyPolicy::Strict,
            tail: &tail,
        };
        let mut hold = HoldNote::new(2000.0, 3000.0);

        hold.press(2010.0, &window);
        let judged = hold.release(2900.0, &rules);
        assert_eq!(judged[1].0, TargetPart::Tail);
        assert_eq!(judged[1].1.result, HitResult::Perfect);
        assert_eq!(judged[1].1.offset_ms, -100.0);
        assert_eq!(hold.state(), HoldState::ReleasedLate);
    }

    #[test]
    fn test_no_miss_body_and_ignore_tail() {
        let window = HitWindow::from_custom([20.0, 40.0, 60.0, 80.0, 100.0, 120.0]).unwrap();
        let tail = TailPolicy {
            best: HitResult::IgnoreHit,
            worst: HitResult::IgnoreMiss,
            lenience: ReleaseLenience::default(),
        };
        let rules = HoldRules {
            window: &window,
            body: BodyPolicy::NoMiss,
            tail: &tail,
        };
        let mut hold = HoldNote::new(0.0, 1000.0);

        hold.press(0.0, &window);
        let judged = hold.release(100.0, &rules);
        assert_eq!(
            results(&judged),
            vec![
                (TargetPart::Body, HitResult::IgnoreHit),
                (TargetPart::Tail, HitResult::IgnoreMiss)
            ]
        );
    }

    #[test]
    fn test_unpressed_hold_misses_head_before_tail() {
        let window = HitWindow::from_osu_od(8.0);
        let tail = TailPolicy::default();
        let rules = HoldRules {
            window: &window,
            body: BodyPolicy::Strict,
            tail: &tail,
        };
        let mut hold = HoldNote::new(2000.0, 2100.0);

        let judged = hold.reach_tail(&rules);
        assert_eq!(
            results(&judged),
            vec![
                (TargetPart::Head, HitResult::Miss),
                (TargetPart::Body, HitResult::IgnoreMiss),
                (TargetPart::Tail, HitResult::Miss)
            ]
        );
        assert_eq!(hold.state(), HoldState::Idle);
    }

    #[test]
    fn test_regrab_after_missed_head_cannot_recover() {
        let window = HitWindow::from_osu_od(8.0);
        let tail = TailPolicy::default();
        let rules = HoldRules {
            window: &window,
            body: BodyPolicy::Strict,
            tail: &tail,
        };
        let mut hold = HoldNote::new(0.0, 2000.0);

        hold.expire_head(&window);
        assert!(hold.press(1000.0, &window).is_empty());
        assert!(hold.is_holding());

        let judged = hold.reach_tail(&rules);
        assert_eq!(judged.last().unwrap().1.result, HitResult::Miss);
    }
}
