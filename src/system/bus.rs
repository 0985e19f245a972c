//! Engine event publication.
//!
//! Subscribers receive value-only events over crossbeam channels. A
//! disconnected subscriber is pruned on the next publish.

use crate::logic::score::ScoreSnapshot;
use crate::models::engine::target::{TargetId, TargetPart};
use crate::models::stats::HitResult;
use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::{Deserialize, Serialize};

/// One terminal result, tagged with the target it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JudgementEvent {
    pub target: TargetId,
    pub part: TargetPart,
    pub lane: usize,
    pub result: HitResult,
    /// Signed offset, early negative.
    pub offset_ms: f64,
    /// Engine time at which the result was finalized.
    pub time_ms: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Judged(JudgementEvent),
    /// A new ruleset was applied.
    Reconfigured { ruleset: String },
    /// Every target has been judged.
    Finished(ScoreSnapshot),
    /// The session was aborted with targets still open.
    Aborted {
        snapshot: ScoreSnapshot,
        discarded: usize,
    },
}

/// Fan-out of engine events to any number of subscribers.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<EngineEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<EngineEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, event: EngineEvent) {
        if self.subscribers.is_empty() {
            return;
        }
        self.subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let mut bus = EventBus::new();
        let kept = bus.subscribe();
        let dropped = bus.subscribe();
        drop(dropped);

        bus.publish(EngineEvent::Reconfigured {
            ruleset: "mania".to_string(),
        });

        assert_eq!(bus.subscribers.len(), 1);
        assert!(matches!(
            kept.try_recv(),
            Ok(EngineEvent::Reconfigured { .. })
        ));
    }
}
