//! Single-shot countdown guards
//!
//! Both the response timeout and the hazard reaction window are the same
//! timer: armed by a triggering event, satisfied by the expected input,
//! fired once when the deadline passes. Pausing shifts the deadline so the
//! paused span never counts against the player.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// Which guard a timer is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardKind {
    Response,
    HazardReaction,
}

/// A guard deadline passed without the expected input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fired {
    pub guard: GuardKind,
    pub deadline: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub deadline: Timestamp,
    pub is_armed: bool,
    pub is_paused: bool,
    /// Budget left when paused
    remaining: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guard {
    kind: GuardKind,
    timer: TimerState,
}

/// Fails the round when the player stops responding to the rhythm
pub type ResponseTimeoutGuard = Guard;
/// Expires an armed hazard when the player does not react
pub type HazardReactionGuard = Guard;

impl Guard {
    pub fn new(kind: GuardKind) -> Self {
        Self {
            kind,
            timer: TimerState {
                deadline: Timestamp::ZERO,
                is_armed: false,
                is_paused: false,
                remaining: Duration::ZERO,
            },
        }
    }

    pub fn response() -> ResponseTimeoutGuard {
        Self::new(GuardKind::Response)
    }

    pub fn hazard_reaction() -> HazardReactionGuard {
        Self::new(GuardKind::HazardReaction)
    }

    pub fn kind(&self) -> GuardKind {
        self.kind
    }

    pub fn state(&self) -> TimerState {
        self.timer
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_armed
    }

    pub fn is_paused(&self) -> bool {
        self.timer.is_armed && self.timer.is_paused
    }

    /// Counting down right now (armed and not paused)
    pub fn is_counting(&self) -> bool {
        self.timer.is_armed && !self.timer.is_paused
    }

    /// Budget left at `now`
    pub fn remaining(&self, now: Timestamp) -> Duration {
        if !self.timer.is_armed {
            Duration::ZERO
        } else if self.timer.is_paused {
            self.timer.remaining
        } else {
            self.timer.deadline.saturating_since(now)
        }
    }

    /// Start counting `budget` from `now`.
    ///
    /// If the previous arm was never satisfied it fires first: the player
    /// missed that beat even though its deadline may not have passed yet.
    #[must_use]
    pub fn arm(&mut self, now: Timestamp, budget: Duration) -> Option<Fired> {
        let stale = self.timer.is_armed.then(|| Fired {
            guard: self.kind,
            deadline: self.timer.deadline,
        });
        if stale.is_some() {
            log::debug!("{:?} guard re-armed while armed, firing stale arm", self.kind);
        }
        self.timer = TimerState {
            deadline: now + budget,
            is_armed: true,
            is_paused: false,
            remaining: budget,
        };
        stale
    }

    /// Expected input arrived
    pub fn satisfy(&mut self) {
        self.timer.is_armed = false;
        self.timer.is_paused = false;
    }

    /// Void without firing
    pub fn cancel(&mut self) {
        self.satisfy();
    }

    pub fn pause(&mut self, now: Timestamp) {
        if !self.is_counting() {
            return;
        }
        self.timer.remaining = self.timer.deadline.saturating_since(now);
        self.timer.is_paused = true;
    }

    pub fn resume(&mut self, now: Timestamp) {
        if !self.is_paused() {
            return;
        }
        self.timer.deadline = now + self.timer.remaining;
        self.timer.is_paused = false;
    }

    /// Fire once if the deadline passed; disarms on firing
    #[must_use]
    pub fn poll(&mut self, now: Timestamp) -> Option<Fired> {
        if !self.is_counting() || now < self.timer.deadline {
            return None;
        }
        self.timer.is_armed = false;
        Some(Fired {
            guard: self.kind,
            deadline: self.timer.deadline,
        })
    }
}
