//! Time sources for driving `tick`

use std::time::{Duration, Instant};

use crate::Timestamp;

pub trait RhythmClock {
    fn now(&self) -> Timestamp;
}

/// Stepped by hand (tests, headless runs, replays)
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: Timestamp,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self { now: start }
    }

    pub fn advance(&mut self, by: Duration) -> Timestamp {
        self.now += by;
        self.now
    }

    pub fn set(&mut self, now: Timestamp) {
        self.now = now;
    }
}

impl RhythmClock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now
    }
}

/// Wall time since construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl RhythmClock for MonotonicClock {
    fn now(&self) -> Timestamp {
        let ms = u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX);
        Timestamp::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let mut clock = ManualClock::default();
        assert_eq!(clock.now(), Timestamp::ZERO);
        clock.advance(Duration::from_millis(16));
        clock.advance(Duration::from_millis(16));
        assert_eq!(clock.now().as_millis(), 32);
        clock.set(Timestamp::from_millis(5));
        assert_eq!(clock.now().as_millis(), 5);
    }

    #[test]
    fn test_monotonic_clock_never_goes_back() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
