//! The judgement engine: matches inputs to targets, sweeps expired windows and
//! feeds every terminal result to the score processor in finalization order.

use crate::error::ConfigError;
use crate::input::events::InputEvent;
use crate::logic::score::{ScoreProcessor, ScoreSnapshot};
use crate::models::engine::hit_window::HitWindow;
use crate::models::engine::hold::{BodyPolicy, HoldRules, PartJudgements};
use crate::models::engine::note::Chart;
use crate::models::engine::target::{Judgement, Target, TargetId, TargetKind, TargetPart};
use crate::models::ruleset::Ruleset;
use crate::models::stats::HitResult;
use crate::system::bus::{EngineEvent, EventBus, JudgementEvent};
use crossbeam_channel::Receiver;
use ordered_float::OrderedFloat;

/// Kind of a time-driven judgement. Heads sort before tails at equal time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SweepKind {
    HeadExpiry,
    Tail,
}

#[derive(Debug, Clone, Copy)]
struct Sweep {
    deadline_ms: f64,
    kind: SweepKind,
    lane: usize,
    id: TargetId,
}

impl Sweep {
    fn key(&self) -> (OrderedFloat<f64>, SweepKind, usize, TargetId) {
        (OrderedFloat(self.deadline_ms), self.kind, self.lane, self.id)
    }
}

fn hold_rules<'a>(window: &'a HitWindow, ruleset: &'a Ruleset) -> HoldRules<'a> {
    HoldRules {
        window,
        body: ruleset.body,
        tail: &ruleset.tail,
    }
}

/// Best combo a ruleset allows on these targets: one per part whose best
/// result is a scoring one.
fn max_combo_possible(targets: &[Target], ruleset: &Ruleset, window: &HitWindow) -> u32 {
    let tail_counts = !window.cap_to_allowed(ruleset.tail.best).is_ignore();
    targets
        .iter()
        .map(|t| match t.kind {
            TargetKind::Tap(_) => 1,
            TargetKind::Hold(_) => 1 + u32::from(tail_counts),
        })
        .sum()
}

/// One gameplay session over one chart.
///
/// Time only moves forward. Inputs and `advance_to` calls with a timestamp
/// before the current time are dropped, as are duplicate presses or releases
/// and unknown lanes. None of the per-tick operations can fail.
pub struct JudgementEngine {
    ruleset: Ruleset,
    hit_window: HitWindow,
    key_count: usize,
    targets: Vec<Target>,
    lanes: Vec<Vec<TargetId>>,
    lane_heads: Vec<usize>,
    head_index: usize,
    keys_held: Vec<bool>,
    held_target: Vec<Option<TargetId>>,
    current_time_ms: f64,
    score: ScoreProcessor,
    outbox: Vec<JudgementEvent>,
    bus: EventBus,
    finished: bool,
    aborted: bool,
}

impl JudgementEngine {
    pub fn new(chart: &Chart, ruleset: Ruleset) -> Result<Self, ConfigError> {
        if let Err(e) = ruleset.validate() {
            log::warn!("ENGINE: rejected ruleset '{}': {}", ruleset.name, e);
            return Err(e);
        }
        let hit_window = ruleset.build_hit_window()?;

        let targets: Vec<Target> = chart
            .notes
            .iter()
            .enumerate()
            .map(|(id, note)| Target::from_note(id, note))
            .collect();

        let mut lanes = vec![Vec::new(); chart.key_count];
        for target in &targets {
            let lane = lanes
                .get_mut(target.lane)
                .ok_or(ConfigError::LaneOutOfRange {
                    lane: target.lane,
                    key_count: chart.key_count,
                })?;
            lane.push(target.id);
        }

        let max_combo = max_combo_possible(&targets, &ruleset, &hit_window);
        let score = ScoreProcessor::new(ruleset.scoring, ruleset.combo_breaks.clone(), max_combo);

        log::info!(
            "ENGINE: session '{}' with {} targets on {}K, miss window {:.1}ms",
            ruleset.name,
            targets.len(),
            chart.key_count,
            hit_window.miss_ms
        );

        Ok(Self {
            ruleset,
            hit_window,
            key_count: chart.key_count,
            targets,
            lanes,
            lane_heads: vec![0; chart.key_count],
            head_index: 0,
            keys_held: vec![false; chart.key_count],
            held_target: vec![None; chart.key_count],
            current_time_ms: f64::NEG_INFINITY,
            score,
            outbox: Vec::new(),
            bus: EventBus::new(),
            finished: false,
            aborted: false,
        })
    }

    pub fn subscribe(&mut self) -> Receiver<EngineEvent> {
        self.bus.subscribe()
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    pub fn hit_window(&self) -> &HitWindow {
        &self.hit_window
    }

    pub fn key_count(&self) -> usize {
        self.key_count
    }

    pub fn current_time_ms(&self) -> f64 {
        self.current_time_ms
    }

    pub fn target(&self, id: TargetId) -> Option<&Target> {
        self.targets.get(id)
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        self.score.snapshot()
    }

    /// Drains judgements finalized since the last call.
    pub fn take_judgements(&mut self) -> Vec<JudgementEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Applies a new ruleset. Already judged targets keep their results.
    pub fn reconfigure(&mut self, ruleset: Ruleset) -> Result<(), ConfigError> {
        if let Err(e) = ruleset.validate() {
            log::warn!("ENGINE: rejected ruleset '{}': {}", ruleset.name, e);
            return Err(e);
        }
        let hit_window = ruleset.build_hit_window()?;
        let max_combo = max_combo_possible(&self.targets, &ruleset, &hit_window);

        self.score
            .reconfigure(ruleset.scoring, ruleset.combo_breaks.clone(), max_combo);
        self.hit_window = hit_window;
        self.ruleset = ruleset;

        log::info!("ENGINE: reconfigured to '{}'", self.ruleset.name);
        self.bus.publish(EngineEvent::Reconfigured {
            ruleset: self.ruleset.name.clone(),
        });
        Ok(())
    }

    /// Processes one press or release.
    pub fn handle_input(&mut self, input: InputEvent) {
        let InputEvent {
            time_ms,
            lane,
            pressed,
        } = input;

        if self.aborted {
            log::debug!("ENGINE: input after abort dropped");
            return;
        }
        if time_ms.is_nan() || time_ms < self.current_time_ms {
            log::debug!(
                "ENGINE: out-of-order input at {}ms dropped (now {}ms)",
                time_ms,
                self.current_time_ms
            );
            return;
        }
        if lane >= self.key_count {
            log::debug!("ENGINE: input on unknown lane {lane} dropped");
            return;
        }
        if self.keys_held[lane] == pressed {
            log::debug!(
                "ENGINE: duplicate {} on lane {} at {}ms dropped",
                if pressed { "press" } else { "release" },
                lane,
                time_ms
            );
            return;
        }

        // Expiries at exactly this instant lose to the input.
        self.run_sweeps(time_ms, false);
        self.current_time_ms = time_ms;
        self.keys_held[lane] = pressed;

        if pressed {
            self.process_press(time_ms, lane);
        } else {
            self.process_release(time_ms, lane);
        }
        self.check_finished();
    }

    /// Moves time forward, resolving every window that closed up to `time_ms`.
    pub fn advance_to(&mut self, time_ms: f64) {
        if self.aborted {
            return;
        }
        if time_ms.is_nan() || time_ms < self.current_time_ms {
            log::debug!(
                "ENGINE: advance to {}ms ignored (now {}ms)",
                time_ms,
                self.current_time_ms
            );
            return;
        }

        self.run_sweeps(time_ms, true);
        self.current_time_ms = time_ms;
        self.check_finished();
    }

    /// Resolves everything still open, as if time ran out.
    pub fn finish(&mut self) -> ScoreSnapshot {
        self.advance_to(f64::INFINITY);
        self.snapshot()
    }

    /// Stops the session. Open targets are discarded without a result.
    pub fn abort(&mut self) -> ScoreSnapshot {
        let snapshot = self.snapshot();
        if self.aborted || self.finished {
            return snapshot;
        }
        self.aborted = true;

        let discarded = self.targets[self.head_index..]
            .iter()
            .filter(|t| !t.all_judged())
            .count();
        log::info!("ENGINE: session aborted, {discarded} targets discarded");

        self.bus.publish(EngineEvent::Aborted {
            snapshot: snapshot.clone(),
            discarded,
        });
        snapshot
    }

    /// Resolves every open part of a target to its minimum result.
    pub fn miss_forcefully(&mut self, id: TargetId) {
        if self.aborted {
            return;
        }
        let Some(target) = self.targets.get_mut(id) else {
            log::debug!("ENGINE: miss_forcefully on unknown target {id}");
            return;
        };
        if target.all_judged() {
            log::trace!("ENGINE: target {id} already judged");
            return;
        }

        let time_ms = if self.current_time_ms.is_finite() {
            self.current_time_ms
        } else {
            target.start_time_ms
        };
        let lane = target.lane;
        let judged = match &mut target.kind {
            TargetKind::Tap(note) => {
                let offset = self.hit_window.miss_ms;
                if note.judge(HitResult::Miss, offset) {
                    vec![(
                        TargetPart::Note,
                        Judgement {
                            result: HitResult::Miss,
                            offset_ms: offset,
                        },
                    )]
                } else {
                    Vec::new()
                }
            }
            TargetKind::Hold(hold) => {
                hold.force_miss(&hold_rules(&self.hit_window, &self.ruleset))
            }
        };

        if self.held_target[lane] == Some(id) {
            self.held_target[lane] = None;
        }
        self.emit(id, lane, judged, time_ms);
        self.advance_heads();
        self.check_finished();
    }

    fn process_press(&mut self, time_ms: f64, lane: usize) {
        let Some(id) = self.find_press_target(time_ms, lane) else {
            if let Some(id) = self.find_regrab_target(time_ms, lane)
                && let TargetKind::Hold(hold) = &mut self.targets[id].kind
            {
                log::trace!("ENGINE: lane {lane} re-grabbed hold {id}");
                hold.press(time_ms, &self.hit_window);
                self.held_target[lane] = Some(id);
                return;
            }
            log::debug!("ENGINE: ghost tap on lane {lane} at {time_ms}ms");
            self.score.record_ghost_tap();
            return;
        };

        let target = &mut self.targets[id];
        let judged = match &mut target.kind {
            TargetKind::Tap(note) => {
                let offset = time_ms - note.time_ms;
                let result = self.hit_window.classify(offset);
                if note.judge(result, offset) {
                    vec![(
                        TargetPart::Note,
                        Judgement {
                            result,
                            offset_ms: offset,
                        },
                    )]
                } else {
                    Vec::new()
                }
            }
            TargetKind::Hold(hold) => {
                self.held_target[lane] = Some(id);
                hold.press(time_ms, &self.hit_window)
            }
        };

        self.emit(id, lane, judged, time_ms);
        self.advance_heads();
    }

    fn process_release(&mut self, time_ms: f64, lane: usize) {
        let Some(id) = self.held_target[lane].take() else {
            return;
        };
        let judged = match &mut self.targets[id].kind {
            TargetKind::Hold(hold) => {
                hold.release(time_ms, &hold_rules(&self.hit_window, &self.ruleset))
            }
            TargetKind::Tap(_) => Vec::new(),
        };
        self.emit(id, lane, judged, time_ms);
        self.advance_heads();
    }

    /// Earliest target in the lane whose press part is open and in range.
    fn find_press_target(&self, time_ms: f64, lane: usize) -> Option<TargetId> {
        for &id in &self.lanes[lane][self.lane_heads[lane]..] {
            let target = &self.targets[id];
            let part = target.press_part();
            if part.is_judged() {
                continue;
            }
            let offset = time_ms - part.time_ms;
            if self.hit_window.in_range(offset) {
                return Some(id);
            }
            if offset < 0.0 {
                break;
            }
        }
        None
    }

    /// An idle hold whose head already expired but whose tail is still ahead.
    fn find_regrab_target(&self, time_ms: f64, lane: usize) -> Option<TargetId> {
        self.lanes[lane][self.lane_heads[lane]..]
            .iter()
            .copied()
            .take_while(|&id| self.targets[id].start_time_ms <= time_ms)
            .find(|&id| {
                let target = &self.targets[id];
                target.as_hold().is_some_and(|hold| {
                    hold.head.is_judged()
                        && !hold.tail.is_judged()
                        && !hold.is_holding()
                        && time_ms < target.end_time_ms
                })
            })
    }

    /// Collects every sweep due at `time_ms`, sorts it and applies it.
    ///
    /// Head expiries are due strictly after `start + miss`. Tails are due at
    /// `tail <= time` when advancing and `tail < time` ahead of an input. A
    /// hold's tail is never due while its head window is still open.
    fn run_sweeps(&mut self, time_ms: f64, tails_inclusive: bool) {
        let miss_ms = self.hit_window.miss_ms;
        let mut due = Vec::new();

        for target in &self.targets[self.head_index..] {
            if target.start_time_ms > time_ms {
                break;
            }
            if target.all_judged() {
                continue;
            }

            let expiry = target.start_time_ms + miss_ms;
            let head_open = !target.press_part().is_judged();
            let head_expired = head_open && expiry < time_ms;
            if head_expired {
                due.push(Sweep {
                    deadline_ms: expiry,
                    kind: SweepKind::HeadExpiry,
                    lane: target.lane,
                    id: target.id,
                });
            }

            if let Some(hold) = target.as_hold() {
                // An open head keeps the tail waiting until the head expires.
                if head_open && !head_expired {
                    continue;
                }
                let tail = if head_open {
                    target.end_time_ms.max(expiry)
                } else {
                    target.end_time_ms
                };
                let tail_due = tail < time_ms || (tails_inclusive && tail <= time_ms);
                if !hold.tail.is_judged() && tail_due {
                    due.push(Sweep {
                        deadline_ms: tail,
                        kind: SweepKind::Tail,
                        lane: target.lane,
                        id: target.id,
                    });
                }
            }
        }

        if due.is_empty() {
            return;
        }
        due.sort_by_key(Sweep::key);

        for sweep in due {
            self.apply_sweep(sweep);
        }
        self.advance_heads();
    }

    fn apply_sweep(&mut self, sweep: Sweep) {
        let Sweep {
            deadline_ms,
            kind,
            lane,
            id,
        } = sweep;
        let rules = hold_rules(&self.hit_window, &self.ruleset);

        let judged = match (&mut self.targets[id].kind, kind) {
            (TargetKind::Tap(note), SweepKind::HeadExpiry) => {
                let offset = self.hit_window.miss_ms;
                if note.judge(HitResult::Miss, offset) {
                    vec![(
                        TargetPart::Note,
                        Judgement {
                            result: HitResult::Miss,
                            offset_ms: offset,
                        },
                    )]
                } else {
                    Vec::new()
                }
            }
            (TargetKind::Hold(hold), SweepKind::HeadExpiry) => hold.expire_head(&self.hit_window),
            (TargetKind::Hold(hold), SweepKind::Tail) => hold.reach_tail(&rules),
            (TargetKind::Tap(_), SweepKind::Tail) => Vec::new(),
        };

        self.emit(id, lane, judged, deadline_ms);
    }

    fn emit(&mut self, id: TargetId, lane: usize, judged: PartJudgements, time_ms: f64) {
        for (part, judgement) in judged {
            let combo_affecting = part != TargetPart::Body || self.ruleset.body == BodyPolicy::Strict;
            let bonus_eligible = part == TargetPart::Body;
            self.score
                .apply(judgement.result, combo_affecting, bonus_eligible);

            let event = JudgementEvent {
                target: id,
                part,
                lane,
                result: judgement.result,
                offset_ms: judgement.offset_ms,
                time_ms,
            };
            log::trace!(
                "ENGINE: target {} {:?} -> {:?} ({:+.1}ms)",
                id,
                part,
                judgement.result,
                judgement.offset_ms
            );
            self.outbox.push(event);
            self.bus.publish(EngineEvent::Judged(event));
        }
    }

    fn advance_heads(&mut self) {
        while self.head_index < self.targets.len() && self.targets[self.head_index].all_judged() {
            self.head_index += 1;
        }
        for (lane, ids) in self.lanes.iter().enumerate() {
            let head = &mut self.lane_heads[lane];
            while *head < ids.len() && self.targets[ids[*head]].all_judged() {
                *head += 1;
            }
        }
    }

    fn check_finished(&mut self) {
        if self.finished || self.head_index < self.targets.len() {
            return;
        }
        self.finished = true;
        let snapshot = self.snapshot();
        log::info!(
            "ENGINE: session finished, score {:.0}, accuracy {:.2}%, max combo {}",
            snapshot.total_score,
            snapshot.accuracy * 100.0,
            snapshot.max_combo
        );
        self.bus.publish(EngineEvent::Finished(snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::engine::note::NoteData;
    use crate::models::ruleset::Variant;

    fn engine(notes: Vec<NoteData>) -> JudgementEngine {
        let chart = Chart::new(4, notes).unwrap();
        JudgementEngine::new(&chart, Ruleset::preset(Variant::Mania, 8.0)).unwrap()
    }

    fn results(events: &[JudgementEvent]) -> Vec<(TargetPart, HitResult)> {
        events.iter().map(|e| (e.part, e.result)).collect()
    }

    #[test]
    fn test_press_classifies_signed_offset() {
        let mut engine = engine(vec![NoteData::tap(1000.0, 0)]);
        engine.handle_input(InputEvent::press(960.0, 0));

        let judged = engine.take_judgements();
        assert_eq!(judged.len(), 1);
        assert_eq!(judged[0].result, HitResult::Great);
        assert_eq!(judged[0].offset_ms, -40.0);
        assert!(engine.is_finished());
    }

    #[test]
    fn test_unpressed_tap_expires_strictly_after_miss_window() {
        let mut engine = engine(vec![NoteData::tap(1000.0, 0)]);
        let miss = engine.hit_window().miss_ms;

        engine.advance_to(1000.0 + miss);
        assert!(engine.take_judgements().is_empty());

        engine.advance_to(1000.0 + miss + 0.1);
        let judged = engine.take_judgements();
        assert_eq!(results(&judged), vec![(TargetPart::Note, HitResult::Miss)]);
        assert_eq!(judged[0].offset_ms, miss);
    }

    #[test]
    fn test_press_wins_tie_with_expiry() {
        let mut engine = engine(vec![NoteData::tap(1000.0, 0)]);
        let miss = engine.hit_window().miss_ms;

        engine.handle_input(InputEvent::press(1000.0 + miss, 0));
        let judged = engine.take_judgements();
        assert_eq!(judged.len(), 1);
        assert_eq!(judged[0].time_ms, 1000.0 + miss);
        assert_eq!(engine.snapshot().stats.miss, 1);
    }

    #[test]
    fn test_earliest_target_in_lane_is_taken() {
        let mut engine = engine(vec![NoteData::tap(1000.0, 1), NoteData::tap(1100.0, 1)]);
        engine.handle_input(InputEvent::press(1090.0, 1));

        let judged = engine.take_judgements();
        assert_eq!(judged[0].target, 0);
        assert_eq!(judged[0].result, HitResult::Ok);
    }

    #[test]
    fn test_anomalies_are_dropped() {
        let mut engine = engine(vec![NoteData::tap(1000.0, 0), NoteData::tap(2000.0, 0)]);

        engine.handle_input(InputEvent::press(1000.0, 0));
        engine.handle_input(InputEvent::press(1005.0, 0));
        engine.handle_input(InputEvent::release(900.0, 0));
        engine.handle_input(InputEvent::press(f64::NAN, 0));
        engine.handle_input(InputEvent::press(1010.0, 7));

        assert_eq!(engine.take_judgements().len(), 1);
        assert_eq!(engine.snapshot().stats.ghost_taps, 0);
        assert_eq!(engine.snapshot().combo, 1);
    }

    #[test]
    fn test_ghost_tap_is_counted() {
        let mut engine = engine(vec![NoteData::tap(5000.0, 0)]);
        engine.handle_input(InputEvent::press(100.0, 0));
        engine.handle_input(InputEvent::release(150.0, 0));

        assert!(engine.take_judgements().is_empty());
        assert_eq!(engine.snapshot().stats.ghost_taps, 1);
    }

    #[test]
    fn test_hold_emits_head_body_tail_in_order() {
        let mut engine = engine(vec![NoteData::hold(2000.0, 2, 1000.0)]);
        let events = engine.subscribe();

        engine.handle_input(InputEvent::press(2000.0, 2));
        engine.advance_to(3000.0);
        engine.handle_input(InputEvent::release(3000.0, 2));

        assert_eq!(
            results(&engine.take_judgements()),
            vec![
                (TargetPart::Head, HitResult::Perfect),
                (TargetPart::Body, HitResult::IgnoreHit),
                (TargetPart::Tail, HitResult::Perfect)
            ]
        );
        assert_eq!(engine.snapshot().combo, 2);

        let received: Vec<_> = events.try_iter().collect();
        assert_eq!(received.len(), 4);
        assert!(matches!(received.last(), Some(EngineEvent::Finished(_))));
    }

    #[test]
    fn test_release_at_tail_time_counts_as_held() {
        let mut engine = engine(vec![NoteData::hold(2000.0, 2, 1000.0)]);
        engine.handle_input(InputEvent::press(2000.0, 2));
        engine.handle_input(InputEvent::release(3000.0, 2));

        let judged = engine.take_judgements();
        assert_eq!(judged.last().unwrap().result, HitResult::Perfect);
        assert_eq!(judged.last().unwrap().offset_ms, 0.0);
    }

    #[test]
    fn test_unpressed_hold_resolves_head_before_tail() {
        let mut engine = engine(vec![NoteData::hold(2000.0, 0, 50.0)]);
        engine.finish();

        assert_eq!(
            results(&engine.take_judgements()),
            vec![
                (TargetPart::Head, HitResult::Miss),
                (TargetPart::Body, HitResult::IgnoreMiss),
                (TargetPart::Tail, HitResult::Miss)
            ]
        );
    }

    #[test]
    fn test_short_hold_keeps_head_window_past_its_tail() {
        let mut engine = engine(vec![NoteData::hold(2000.0, 0, 50.0)]);
        engine.advance_to(2055.0);
        assert!(engine.take_judgements().is_empty());

        engine.handle_input(InputEvent::press(2060.0, 0));
        let head = engine.take_judgements();
        assert_eq!(results(&head), vec![(TargetPart::Head, HitResult::Good)]);
        assert_eq!(head[0].offset_ms, 60.0);

        engine.finish();
        assert_eq!(
            results(&engine.take_judgements()),
            vec![
                (TargetPart::Body, HitResult::IgnoreHit),
                (TargetPart::Tail, HitResult::Perfect)
            ]
        );
        assert_eq!(engine.snapshot().stats.ghost_taps, 0);
    }

    #[test]
    fn test_miss_forcefully_is_idempotent() {
        let mut engine = engine(vec![NoteData::tap(1000.0, 0), NoteData::hold(2000.0, 1, 500.0)]);
        engine.handle_input(InputEvent::press(1000.0, 0));
        let before = engine.snapshot();

        engine.miss_forcefully(0);
        assert_eq!(engine.snapshot(), before);

        engine.miss_forcefully(1);
        engine.miss_forcefully(1);
        engine.miss_forcefully(99);
        let after = engine.snapshot();
        assert_eq!(after.stats.miss, 2);
        assert_eq!(after.stats.ignore_miss, 1);
        assert_eq!(after.combo, 0);
        assert!(engine.is_finished());
    }

    #[test]
    fn test_abort_keeps_partial_score() {
        let mut engine = engine(vec![NoteData::tap(1000.0, 0), NoteData::tap(2000.0, 0)]);
        let events = engine.subscribe();
        engine.handle_input(InputEvent::press(1000.0, 0));

        let snapshot = engine.abort();
        assert_eq!(snapshot.combo, 1);
        assert!(engine.is_aborted());

        engine.handle_input(InputEvent::release(1100.0, 0));
        engine.advance_to(10_000.0);
        assert_eq!(engine.snapshot(), snapshot);
        assert!(matches!(
            events.try_iter().last(),
            Some(EngineEvent::Aborted { discarded: 1, .. })
        ));
    }

    #[test]
    fn test_reconfigure_keeps_judged_results() {
        let mut engine = engine(vec![NoteData::tap(1000.0, 0), NoteData::tap(2000.0, 0)]);
        engine.handle_input(InputEvent::press(1100.0, 0));
        engine.handle_input(InputEvent::release(1150.0, 0));
        let first = engine.take_judgements()[0].result;

        engine
            .reconfigure(Ruleset::preset(Variant::Bms, 0.0))
            .unwrap();
        assert_eq!(engine.target(0).unwrap().result(), Some(first));
        assert_eq!(engine.hit_window().miss_ms, 1000.0);

        let mut broken = Ruleset::default();
        broken.rate = -1.0;
        assert!(engine.reconfigure(broken).is_err());
        assert_eq!(engine.ruleset().name, "bms");
    }

    #[test]
    fn test_simultaneous_tails_sort_by_lane() {
        let mut engine = engine(vec![
            NoteData::hold(1000.0, 3, 500.0),
            NoteData::hold(1000.0, 1, 500.0),
        ]);
        engine.handle_input(InputEvent::press(1000.0, 3));
        engine.handle_input(InputEvent::press(1000.0, 1));
        engine.take_judgements();

        engine.advance_to(1500.0);
        let lanes: Vec<_> = engine
            .take_judgements()
            .iter()
            .filter(|e| e.part == TargetPart::Tail)
            .map(|e| e.lane)
            .collect();
        assert_eq!(lanes, vec![1, 3]);
    }
}
