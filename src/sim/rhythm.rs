//! Autonomous up/down beat
//!
//! The rhythm runs independently of the player. A freeze holds the clock
//! without losing phase: after it ends the next beat comes one full interval
//! later, in the direction that was due.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RhythmPhase {
    /// Not started, or stopped
    AwaitingStart,
    RequestingUp,
    RequestingDown,
}

/// One beat: the player is asked to swipe in this direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RhythmRequest {
    pub expect_up: bool,
    /// Scheduled instant of the beat
    pub at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RhythmDriver {
    interval: Duration,
    phase: RhythmPhase,
    next_at: Timestamp,
    frozen_until: Option<Timestamp>,
}

impl RhythmDriver {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            phase: RhythmPhase::AwaitingStart,
            next_at: Timestamp::ZERO,
            frozen_until: None,
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn phase(&self) -> RhythmPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase != RhythmPhase::AwaitingStart
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen_until.is_some()
    }

    /// Instant of the next beat, if one is scheduled and not frozen
    pub fn next_beat(&self) -> Option<Timestamp> {
        if self.is_running() && self.frozen_until.is_none() {
            Some(self.next_at)
        } else {
            None
        }
    }

    /// Enter the cycle. The first beat (up: the couple starts down) is
    /// emitted immediately.
    pub fn start(&mut self, now: Timestamp) -> RhythmRequest {
        self.phase = RhythmPhase::RequestingUp;
        self.next_at = now + self.interval;
        self.frozen_until = None;
        RhythmRequest { expect_up: true, at: now }
    }

    /// Leave the cycle for good (until the next `start`)
    pub fn stop(&mut self) {
        self.phase = RhythmPhase::AwaitingStart;
        self.frozen_until = None;
    }

    /// Hold the clock until `now + duration`. Extends an ongoing freeze,
    /// never shortens it.
    pub fn freeze(&mut self, now: Timestamp, duration: Duration) {
        if !self.is_running() {
            return;
        }
        let until = now + duration;
        self.frozen_until = Some(self.frozen_until.map_or(until, |t| t.max(until)));
    }

    /// End a freeze early
    pub fn resume(&mut self, now: Timestamp) {
        if self.frozen_until.take().is_some() {
            self.next_at = now + self.interval;
        }
    }

    /// Advance to `now`, emitting at most one beat per call
    pub fn advance(&mut self, now: Timestamp) -> Option<RhythmRequest> {
        if !self.is_running() {
            return None;
        }
        if let Some(until) = self.frozen_until {
            if now < until {
                return None;
            }
            self.frozen_until = None;
            self.next_at = until + self.interval;
        }
        if now < self.next_at {
            return None;
        }

        let at = self.next_at;
        self.phase = match self.phase {
            RhythmPhase::RequestingUp => RhythmPhase::RequestingDown,
            _ => RhythmPhase::RequestingUp,
        };
        self.next_at = at + self.interval;
        Some(RhythmRequest {
            expect_up: self.phase == RhythmPhase::RequestingUp,
            at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(ms: u64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    fn driver() -> RhythmDriver {
        RhythmDriver::new(Duration::from_millis(1_000))
    }

    #[test]
    fn test_idle_until_started() {
        let mut rhythm = driver();
        assert_eq!(rhythm.advance(t(50_000)), None);
        assert_eq!(rhythm.phase(), RhythmPhase::AwaitingStart);
    }

    #[test]
    fn test_alternates_on_interval() {
        let mut rhythm = driver();
        let first = rhythm.start(t(0));
        assert!(first.expect_up);

        assert_eq!(rhythm.advance(t(999)), None);
        let beat = rhythm.advance(t(1_000)).expect("down beat");
        assert!(!beat.expect_up);
        assert_eq!(beat.at, t(1_000));
        assert_eq!(rhythm.phase(), RhythmPhase::RequestingDown);

        let beat = rhythm.advance(t(2_000)).expect("up beat");
        assert!(beat.expect_up);
    }

    #[test]
    fn test_catch_up_one_beat_per_call() {
        let mut rhythm = driver();
        rhythm.start(t(0));
        let a = rhythm.advance(t(3_500)).expect("first");
        let b = rhythm.advance(t(3_500)).expect("second");
        let c = rhythm.advance(t(3_500)).expect("third");
        assert_eq!((a.at, b.at, c.at), (t(1_000), t(2_000), t(3_000)));
        assert_eq!(rhythm.advance(t(3_500)), None);
    }

    #[test]
    fn test_freeze_keeps_phase_and_restarts_interval() {
        let mut rhythm = driver();
        rhythm.start(t(0));
        rhythm.freeze(t(600), Duration::from_millis(300));

        // Original beat at 1000 is skipped
        assert_eq!(rhythm.advance(t(1_000)), None);
        assert_eq!(rhythm.advance(t(1_899)), None);
        let beat = rhythm.advance(t(1_900)).expect("beat after resume");
        assert_eq!(beat.at, t(1_900));
        assert!(!beat.expect_up, "phase preserved through freeze");
    }

    #[test]
    fn test_freeze_extends_never_shortens() {
        let mut rhythm = driver();
        rhythm.start(t(0));
        rhythm.freeze(t(100), Duration::from_millis(2_000));
        rhythm.freeze(t(200), Duration::from_millis(100));
        assert_eq!(rhythm.advance(t(2_500)), None);
        assert!(rhythm.advance(t(3_100)).is_some());
    }

    #[test]
    fn test_resume_early() {
        let mut rhythm = driver();
        rhythm.start(t(0));
        rhythm.freeze(t(500), Duration::from_millis(10_000));
        rhythm.resume(t(700));
        assert!(!rhythm.is_frozen());
        assert_eq!(rhythm.next_beat(), Some(t(1_700)));
        assert!(rhythm.advance(t(1_700)).is_some());
    }

    #[test]
    fn test_stop_returns_to_awaiting_start() {
        let mut rhythm = driver();
        rhythm.start(t(0));
        rhythm.freeze(t(10), Duration::from_millis(50));
        rhythm.stop();
        assert_eq!(rhythm.phase(), RhythmPhase::AwaitingStart);
        assert!(!rhythm.is_frozen());
        assert_eq!(rhythm.advance(t(10_000)), None);

        // Freeze on a stopped driver is a no-op
        rhythm.freeze(t(10_000), Duration::from_millis(50));
        assert!(!rhythm.is_frozen());
    }
}
