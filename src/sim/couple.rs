//! Active couple and hazard overlay
//!
//! The couple's identity and tenure survive a hazard: the overlay only hides
//! it for the hazard window.

use serde::{Deserialize, Serialize};

use super::hazard::HazardKind;
use super::rng::HazardRng;
use crate::Timestamp;

/// Couple variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CoupleKind {
    #[default]
    Cat,
    Dog,
    Pig,
    Frog,
    Bunny,
}

impl CoupleKind {
    pub const ALL: [CoupleKind; 5] = [
        CoupleKind::Cat,
        CoupleKind::Dog,
        CoupleKind::Pig,
        CoupleKind::Frog,
        CoupleKind::Bunny,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CoupleKind::Cat => "cat",
            CoupleKind::Dog => "dog",
            CoupleKind::Pig => "pig",
            CoupleKind::Frog => "frog",
            CoupleKind::Bunny => "bunny",
        }
    }

    /// Uniform pick among every variant except `self`
    pub fn random_other(self, rng: &mut dyn HazardRng) -> Self {
        let others: Vec<CoupleKind> = Self::ALL.into_iter().filter(|k| *k != self).collect();
        others[rng.next_index(others.len())]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Couple {
    pub kind: CoupleKind,
    /// Full down->up cycles survived
    pub rounds_completed: u32,
    pub is_up: bool,
}

/// A hazard drawn over the couple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardOverlay {
    pub kind: HazardKind,
    pub is_active: bool,
    pub armed_at: Timestamp,
    pub is_up: bool,
}

/// How a hazard left the couple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardResolution {
    /// Player swiped it away
    Cleared,
    /// Player waited it out
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoupleState {
    couple: Couple,
    overlay: Option<HazardOverlay>,
    min_rounds_per_couple: u32,
}

impl CoupleState {
    pub fn new(min_rounds_per_couple: u32) -> Self {
        Self {
            couple: Couple::default(),
            overlay: None,
            min_rounds_per_couple,
        }
    }

    pub fn couple(&self) -> Couple {
        self.couple
    }

    pub fn overlay(&self) -> Option<&HazardOverlay> {
        self.overlay.as_ref()
    }

    pub fn hazard_active(&self) -> bool {
        self.overlay.is_some_and(|o| o.is_active)
    }

    pub fn is_up(&self) -> bool {
        self.couple.is_up
    }

    pub fn min_rounds_per_couple(&self) -> u32 {
        self.min_rounds_per_couple
    }

    pub fn set_min_rounds_per_couple(&mut self, min_rounds: u32) {
        self.min_rounds_per_couple = min_rounds;
    }

    /// Default couple, down, no overlay
    pub fn reset(&mut self) {
        self.couple = Couple::default();
        self.overlay = None;
    }

    /// Couple swiped up. Returns true when a couple change may be rolled.
    ///
    /// Swiping up over an active hazard is a failure; the orchestrator
    /// handles that path and never calls this with an overlay present.
    pub fn transition_up(&mut self) -> bool {
        debug_assert!(!self.hazard_active(), "transition_up under a hazard");
        self.couple.is_up = true;
        self.couple.rounds_completed = self.couple.rounds_completed.saturating_add(1);
        self.couple.rounds_completed >= self.min_rounds_per_couple
    }

    pub fn transition_down(&mut self) {
        self.couple.is_up = false;
    }

    /// Roll for a new couple. Returns the new kind if it changed.
    pub fn maybe_change_couple(
        &mut self,
        change_chance: f32,
        rng: &mut dyn HazardRng,
    ) -> Option<CoupleKind> {
        if self.couple.rounds_completed < self.min_rounds_per_couple {
            return None;
        }
        if rng.next_unit() >= change_chance {
            return None;
        }
        let next = self.couple.kind.random_other(rng);
        log::debug!(
            "Couple change {} -> {} after {} rounds",
            self.couple.kind.as_str(),
            next.as_str(),
            self.couple.rounds_completed
        );
        self.couple.kind = next;
        self.couple.rounds_completed = 0;
        Some(next)
    }

    /// Draw a hazard over the (down) couple. Returns false and does nothing
    /// if the couple is up or a hazard is already drawn.
    pub fn arm_hazard(&mut self, kind: HazardKind, now: Timestamp) -> bool {
        if self.couple.is_up || self.overlay.is_some() {
            return false;
        }
        self.overlay = Some(HazardOverlay {
            kind,
            is_active: true,
            armed_at: now,
            is_up: false,
        });
        true
    }

    /// The failing frame: the hazard is shown swiped up
    pub fn reveal_hazard_up(&mut self) {
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.is_up = true;
        }
    }

    pub fn clear_hazard(&mut self) -> Option<HazardResolution> {
        self.overlay.take().map(|_| HazardResolution::Cleared)
    }

    pub fn hazard_timed_out(&mut self) -> Option<HazardResolution> {
        self.overlay.take().map(|_| HazardResolution::TimedOut)
    }
}
