//! Scorable targets and their judged parts.

use super::hold::HoldNote;
use super::note::NoteData;
use crate::models::stats::HitResult;
use serde::{Deserialize, Serialize};

/// Index of a target in its chart order.
pub type TargetId = usize;

/// Which part of a target a judgement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TargetPart {
    Note,
    Head,
    Body,
    Tail,
}

/// A terminal result together with its signed timing offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Judgement {
    pub result: HitResult,
    pub offset_ms: f64,
}

/// One judgeable unit. Written at most once.
#[derive(Debug, Clone, PartialEq)]
pub struct SubTarget {
    pub part: TargetPart,
    pub time_ms: f64,
    judgement: Option<Judgement>,
}

impl SubTarget {
    pub fn new(part: TargetPart, time_ms: f64) -> Self {
        Self {
            part,
            time_ms,
            judgement: None,
        }
    }

    pub fn judgement(&self) -> Option<Judgement> {
        self.judgement
    }

    pub fn result(&self) -> Option<HitResult> {
        self.judgement.map(|j| j.result)
    }

    pub fn is_judged(&self) -> bool {
        self.judgement.is_some()
    }

    /// Stores the judgement. Returns false if this part was already judged.
    pub fn judge(&mut self, result: HitResult, offset_ms: f64) -> bool {
        if self.judgement.is_some() {
            return false;
        }
        self.judgement = Some(Judgement { result, offset_ms });
        true
    }
}

/// Kind-specific state of a target.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetKind {
    Tap(SubTarget),
    Hold(HoldNote),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id: TargetId,
    pub lane: usize,
    pub start_time_ms: f64,
    pub end_time_ms: f64,
    pub kind: TargetKind,
}

impl Target {
    /// Creates the target and its sub-targets from a chart note.
    pub fn from_note(id: TargetId, note: &NoteData) -> Self {
        let kind = if note.is_hold() {
            TargetKind::Hold(HoldNote::new(note.start_time_ms, note.end_time_ms()))
        } else {
            TargetKind::Tap(SubTarget::new(TargetPart::Note, note.start_time_ms))
        };

        Self {
            id,
            lane: note.lane,
            start_time_ms: note.start_time_ms,
            end_time_ms: note.end_time_ms(),
            kind,
        }
    }

    pub fn is_hold(&self) -> bool {
        matches!(self.kind, TargetKind::Hold(_))
    }

    pub fn as_hold(&self) -> Option<&HoldNote> {
        match &self.kind {
            TargetKind::Hold(hold) => Some(hold),
            TargetKind::Tap(_) => None,
        }
    }

    /// The part a press is matched against.
    pub fn press_part(&self) -> &SubTarget {
        match &self.kind {
            TargetKind::Tap(note) => note,
            TargetKind::Hold(hold) => &hold.head,
        }
    }

    /// True once the target and every sub-target hold a terminal result.
    pub fn all_judged(&self) -> bool {
        match &self.kind {
            TargetKind::Tap(note) => note.is_judged(),
            TargetKind::Hold(hold) => {
                hold.head.is_judged() && hold.body.is_judged() && hold.tail.is_judged()
            }
        }
    }

    /// The terminal result of the whole target: the tail's for holds.
    pub fn result(&self) -> Option<HitResult> {
        match &self.kind {
            TargetKind::Tap(note) => note.result(),
            TargetKind::Hold(hold) => hold.tail.result(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_target_is_written_once() {
        let mut part = SubTarget::new(TargetPart::Note, 100.0);
        assert!(part.judge(HitResult::Great, -12.0));
        assert!(!part.judge(HitResult::Miss, 200.0));
        assert_eq!(part.result(), Some(HitResult::Great));
        assert_eq!(part.judgement().unwrap().offset_ms, -12.0);
    }

    #[test]
    fn test_hold_sub_targets_follow_parent() {
        let mut target = Target::from_note(3, &NoteData::hold(2000.0, 2, 1000.0));
        let hold = target.as_hold().unwrap();

        assert_eq!(target.lane, 2);
        assert_eq!(hold.head.time_ms, 2000.0);
        assert_eq!(hold.tail.time_ms, 3000.0);
        assert!(!target.all_judged());

        let TargetKind::Hold(hold) = &mut target.kind else {
            panic!("expected a hold");
        };
        hold.head.judge(HitResult::Perfect, 0.0);
        hold.body.judge(HitResult::IgnoreHit, 0.0);
        assert!(!target.all_judged());

        let TargetKind::Hold(hold) = &mut target.kind else {
            panic!("expected a hold");
        };
        hold.tail.judge(HitResult::Perfect, 0.0);
        assert!(target.all_judged());
    }

    #[test]
    fn test_zero_length_hold_is_a_tap() {
        let target = Target::from_note(0, &NoteData::hold(500.0, 0, 0.0));
        assert!(!target.is_hold());
        assert_eq!(target.press_part().part, TargetPart::Note);
    }
}
