//! Swipe Couple - A swipe-in-rhythm reaction game core
//!
//! Core modules:
//! - `sim`: Deterministic round simulation (gestures, rhythm, guards, hazards)
//! - `settings`: Data-driven game balance, validated at configure time
//! - `persistence`: Progress store capability for the collaborator layer
//! - `progress`: Level ladder and round-total tracking

pub mod error;
pub mod persistence;
pub mod progress;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, PersistenceError};
pub use progress::{LevelLadder, ProgressTracker};
pub use settings::{Difficulty, Settings};

use std::ops::{Add, AddAssign};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Demo frame step (120 Hz, matches the input sampling rate)
    pub const FRAME_MS: u64 = 8;

    /// Minimum pointer travel (pixels) before a drag counts as a swipe
    pub const SWIPE_THRESHOLD: f32 = 50.0;

    /// Full down->up cycles a couple must survive before hazards or a couple change
    pub const MIN_ROUNDS_PER_COUPLE: u32 = 3;
    /// Chance to swap to another couple after each eligible up-swipe
    pub const COUPLE_CHANGE_CHANCE: f32 = 0.5;

    /// Hazard spawn chances (base, and after a long run)
    pub const BASE_HAZARD_CHANCE: f32 = 0.3;
    pub const ELEVATED_HAZARD_CHANCE: f32 = 0.6;
    /// Run lengths that switch the policy to the elevated chance
    pub const SAME_COUPLE_THRESHOLD: u32 = 5;
    pub const TOTAL_SWIPES_THRESHOLD: u32 = 12;

    /// Rhythm beat interval (seconds)
    pub const RHYTHM_INTERVAL: f32 = 1.0;
    /// Time the player has to respond to a beat (seconds)
    pub const RESPONSE_TIMEOUT: f32 = 1.5;
    /// Time the player has to react to a hazard (seconds)
    pub const HAZARD_TIME_LIMIT: f32 = 1.0;
    /// Delay between the revealing down-swipe and the hazard arming (seconds)
    pub const HAZARD_FREEZE_DURATION: f32 = 0.1;

    /// Points for each successful up-swipe
    pub const POINTS_PER_SWIPE: u32 = 1;

    /// Countdown "3, 2, 1, GO"
    pub const COUNTDOWN_FROM: u32 = 3;
    pub const COUNTDOWN_STEP: f32 = 1.0;
    pub const COUNTDOWN_GO_HOLD: f32 = 0.5;
}

/// Monotonic instant in milliseconds since an arbitrary session epoch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    #[inline]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    #[inline]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future
    #[inline]
    pub fn saturating_since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        let ms = u64::try_from(rhs.as_millis()).unwrap_or(u64::MAX);
        Timestamp(self.0.saturating_add(ms))
    }
}

impl AddAssign<Duration> for Timestamp {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

/// Convert a settings value in seconds to a millisecond-rounded duration
#[inline]
pub fn secs(seconds: f32) -> Duration {
    Duration::from_millis((seconds.max(0.0) * 1000.0).round() as u64)
}
