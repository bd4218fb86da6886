//! Pointer stream to discrete swipe events
//!
//! Positions are in screen pixels with y growing upward. A single continuous
//! drag can emit several swipes: the anchor moves to the pointer each time a
//! swipe is recognised.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// Classified gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gesture {
    SwipeUp,
    SwipeDown,
    PointerReleased,
}

/// A gesture with the instant of the sample that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub gesture: Gesture,
    pub at: Timestamp,
}

/// Raw pointer input, queued until the next tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Sample { pos: Vec2, at: Timestamp },
    Released { at: Timestamp },
}

#[derive(Debug, Clone)]
pub struct GestureClassifier {
    threshold: f32,
    enabled: bool,
    /// Pointer is down
    active: bool,
    /// Position of the press or of the last emitted swipe
    anchor: Vec2,
}

impl GestureClassifier {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            enabled: false,
            active: false,
            anchor: Vec2::ZERO,
        }
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    /// Enable or disable detection. Disabling drops the current press
    /// without emitting a release.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.active = false;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Pointer is currently held down
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn feed(&mut self, input: PointerInput) -> Option<GestureEvent> {
        match input {
            PointerInput::Sample { pos, at } => self.sample(pos, at),
            PointerInput::Released { at } => self.release(at),
        }
    }

    /// Feed one pointer position while the pointer is down
    pub fn sample(&mut self, pos: Vec2, at: Timestamp) -> Option<GestureEvent> {
        if !self.enabled {
            return None;
        }
        if !pos.is_finite() {
            log::debug!("Dropping non-finite pointer sample {:?}", pos);
            return None;
        }

        if !self.active {
            // Press
            self.active = true;
            self.anchor = pos;
            return None;
        }

        let delta = pos - self.anchor;
        if delta.length() < self.threshold {
            return None;
        }
        if delta.y.abs() <= delta.x.abs() {
            return None;
        }

        self.anchor = pos;
        let gesture = if delta.y > 0.0 {
            Gesture::SwipeUp
        } else {
            Gesture::SwipeDown
        };
        Some(GestureEvent { gesture, at })
    }

    /// Pointer lifted. Emitted whether or not it moved.
    pub fn release(&mut self, at: Timestamp) -> Option<GestureEvent> {
        if !self.enabled {
            return None;
        }
        self.active = false;
        Some(GestureEvent {
            gesture: Gesture::PointerReleased,
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

    fn enabled(threshold: f32) -> GestureClassifier {
        let mut c = GestureClassifier::new(threshold);
        c.set_enabled(true);
        c
    }

    #[test]
    fn test_press_sets_anchor_without_event() {
        let mut c = enabled(50.0);
        assert_eq!(c.sample(Vec2::new(100.0, 100.0), t(0)), None);
        assert!(c.is_active());
    }

    #[test]
    fn test_vertical_drag_emits_swipes() {
        let mut c = enabled(50.0);
        c.sample(Vec2::new(0.0, 0.0), t(0));
        assert_eq!(c.sample(Vec2::new(0.0, 30.0), t(8)), None);

        let up = c.sample(Vec2::new(5.0, 60.0), t(16)).expect("swipe up");
        assert_eq!(up.gesture, Gesture::SwipeUp);
        assert_eq!(up.at, t(16));

        let down = c.sample(Vec2::new(5.0, 0.0), t(24)).expect("swipe down");
        assert_eq!(down.gesture, Gesture::SwipeDown);
    }

    #[test]
    fn test_continuous_drag_emits_once_per_threshold() {
        let mut c = enabled(50.0);
        c.sample(Vec2::ZERO, t(0));

        let mut ups = 0;
        for i in 1..=20 {
            if let Some(ev) = c.sample(Vec2::new(0.0, i as f32 * 10.0), t(i)) {
                assert_eq!(ev.gesture, Gesture::SwipeUp);
                ups += 1;
            }
        }
        // 200px of travel with a 50px threshold
        assert_eq!(ups, 4);
    }

    #[test]
    fn test_horizontal_drag_ignored() {
        let mut c = enabled(50.0);
        c.sample(Vec2::ZERO, t(0));
        assert_eq!(c.sample(Vec2::new(80.0, 40.0), t(8)), None);
        // Diagonal tie is not vertical-dominant
        assert_eq!(c.sample(Vec2::new(60.0, 60.0), t(16)), None);
    }

    #[test]
    fn test_release_always_emitted() {
        let mut c = enabled(50.0);
        c.sample(Vec2::ZERO, t(0));
        let ev = c.release(t(10)).expect("release");
        assert_eq!(ev.gesture, Gesture::PointerReleased);
        assert!(!c.is_active());

        // Next sample is a fresh press
        assert_eq!(c.sample(Vec2::new(0.0, 500.0), t(20)), None);
    }

    #[test]
    fn test_disable_clears_press_silently() {
        let mut c = enabled(50.0);
        c.sample(Vec2::ZERO, t(0));
        c.set_enabled(false);
        assert!(!c.is_active());
        assert_eq!(c.release(t(5)), None);
        assert_eq!(c.sample(Vec2::new(0.0, 100.0), t(6)), None);

        c.set_enabled(true);
        // First sample after re-enable is a press, not a swipe
        assert_eq!(c.sample(Vec2::new(0.0, 100.0), t(7)), None);
    }

    #[test]
    fn test_non_finite_samples_dropped() {
        let mut c = enabled(50.0);
        assert_eq!(c.sample(Vec2::new(f32::NAN, 0.0), t(0)), None);
        assert!(!c.is_active());
        c.sample(Vec2::ZERO, t(1));
        assert_eq!(c.sample(Vec2::new(0.0, f32::INFINITY), t(2)), None);
    }
}
