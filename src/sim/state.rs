//! Round phase, outcomes and outbound events
//!
//! The core never calls collaborators directly. Every observable change is
//! queued as a `GameEvent` and handed out by `dispatch` or `drain`.

use serde::{Deserialize, Serialize};

use super::couple::{Couple, HazardOverlay};
use super::hazard::HazardKind;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a start command
    Idle,
    /// "3, 2, 1, GO" before input is accepted
    Countdown,
    /// Active gameplay
    Running,
    /// Round lost, waiting for a restart
    Failed,
}

/// Result of one orchestrator evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Continue,
    Scored(u32),
    /// Swiped up while a hazard was showing
    FailedWrongSwipe,
    /// Missed a beat
    FailedTimeout,
}

impl RoundOutcome {
    /// Ends the round
    pub fn is_terminal(&self) -> bool {
        matches!(self, RoundOutcome::FailedWrongSwipe | RoundOutcome::FailedTimeout)
    }

    /// Keep the more significant of two outcomes from the same tick
    pub(crate) fn merge(self, other: RoundOutcome) -> RoundOutcome {
        match (self, other) {
            (a, _) if a.is_terminal() => a,
            (_, b) if b.is_terminal() => b,
            (RoundOutcome::Scored(a), RoundOutcome::Scored(b)) => {
                RoundOutcome::Scored(a.saturating_add(b))
            }
            (RoundOutcome::Scored(a), _) | (_, RoundOutcome::Scored(a)) => RoundOutcome::Scored(a),
            _ => RoundOutcome::Continue,
        }
    }
}

/// Everything the UI, audio and progress layers may react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    CoupleVisualChanged {
        couple: Couple,
        is_up: bool,
        hazard: Option<HazardOverlay>,
    },
    ScoreIncremented {
        new_score: u32,
    },
    RoundEnded {
        outcome: RoundOutcome,
        points: u32,
    },
    /// `n` counts down to 1, then 0 for "GO"
    CountdownTick {
        n: u32,
    },
    HazardArmed {
        kind: HazardKind,
    },
    HazardCleared {
        timed_out: bool,
    },
    RhythmRequest {
        expect_up: bool,
    },
}

/// Collaborator callbacks. Every method defaults to doing nothing.
pub trait GameListener {
    fn on_couple_visual_changed(
        &mut self,
        _couple: Couple,
        _is_up: bool,
        _hazard: Option<&HazardOverlay>,
    ) {
    }
    fn on_score_incremented(&mut self, _new_score: u32) {}
    fn on_round_ended(&mut self, _outcome: RoundOutcome, _points: u32) {}
    fn on_countdown_tick(&mut self, _n: u32) {}
    fn on_hazard_armed(&mut self, _kind: HazardKind) {}
    fn on_hazard_cleared(&mut self, _timed_out: bool) {}
    fn on_rhythm_request(&mut self, _expect_up: bool) {}
}

impl GameEvent {
    /// Deliver this event to the matching listener callback
    pub fn deliver(&self, listener: &mut dyn GameListener) {
        match self {
            GameEvent::CoupleVisualChanged {
                couple,
                is_up,
                hazard,
            } => listener.on_couple_visual_changed(*couple, *is_up, hazard.as_ref()),
            GameEvent::ScoreIncremented { new_score } => listener.on_score_incremented(*new_score),
            GameEvent::RoundEnded { outcome, points } => listener.on_round_ended(*outcome, *points),
            GameEvent::CountdownTick { n } => listener.on_countdown_tick(*n),
            GameEvent::HazardArmed { kind } => listener.on_hazard_armed(*kind),
            GameEvent::HazardCleared { timed_out } => listener.on_hazard_cleared(*timed_out),
            GameEvent::RhythmRequest { expect_up } => listener.on_rhythm_request(*expect_up),
        }
    }
}

/// Outbound event buffer
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Deliver and clear every queued event, oldest first
    pub fn dispatch(&mut self, listener: &mut dyn GameListener) {
        for event in self.events.drain(..) {
            event.deliver(listener);
        }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        scores: Vec<u32>,
        ended: Vec<(RoundOutcome, u32)>,
        ticks: Vec<u32>,
    }

    impl GameListener for Recorder {
        fn on_score_incremented(&mut self, new_score: u32) {
            self.scores.push(new_score);
        }
        fn on_round_ended(&mut self, outcome: RoundOutcome, points: u32) {
            self.ended.push((outcome, points));
        }
        fn on_countdown_tick(&mut self, n: u32) {
            self.ticks.push(n);
        }
    }

    #[test]
    fn test_merge_prefers_failure_then_score() {
        use RoundOutcome::*;
        assert_eq!(Continue.merge(Scored(1)), Scored(1));
        assert_eq!(Scored(1).merge(Scored(1)), Scored(2));
        assert_eq!(Scored(1).merge(FailedTimeout), FailedTimeout);
        assert_eq!(FailedWrongSwipe.merge(FailedTimeout), FailedWrongSwipe);
        assert_eq!(Continue.merge(Continue), Continue);
    }

    #[test]
    fn test_merge_saturates_large_scores() {
        let big = RoundOutcome::Scored(u32::MAX / 2 + 1);
        assert_eq!(big.merge(big), RoundOutcome::Scored(u32::MAX));
    }

    #[test]
    fn test_dispatch_in_order_and_clears() {
        let mut queue = EventQueue::default();
        queue.push(GameEvent::CountdownTick { n: 3 });
        queue.push(GameEvent::CountdownTick { n: 2 });
        queue.push(GameEvent::ScoreIncremented { new_score: 1 });
        queue.push(GameEvent::RoundEnded {
            outcome: RoundOutcome::FailedTimeout,
            points: 1,
        });
        queue.push(GameEvent::HazardCleared { timed_out: true });

        let mut rec = Recorder::default();
        queue.dispatch(&mut rec);
        assert!(queue.is_empty());
        assert_eq!(rec.ticks, vec![3, 2]);
        assert_eq!(rec.scores, vec![1]);
        assert_eq!(rec.ended, vec![(RoundOutcome::FailedTimeout, 1)]);
    }
}
