//! Hazard spawn policy
//!
//! The chance of a hazard replacing the next down-beat depends on how long
//! the player has been swiping without one. Once either run length reaches
//! its threshold the elevated chance applies until the next hazard arms.

use serde::{Deserialize, Serialize};

use super::couple::CoupleKind;
use super::rng::HazardRng;
use crate::settings::Settings;

/// Hazard variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HazardKind {
    #[default]
    Bomb,
    Mousetrap,
    Banana,
}

impl HazardKind {
    pub const ALL: [HazardKind; 3] = [HazardKind::Bomb, HazardKind::Mousetrap, HazardKind::Banana];

    pub fn random(rng: &mut dyn HazardRng) -> Self {
        Self::ALL[rng.next_index(Self::ALL.len())]
    }
}

/// Down-swipe run lengths since the last hazard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SwipeTally {
    pub consecutive_same_couple: u32,
    pub consecutive_total: u32,
    /// Couple seen on the previous down-swipe (`None` before the first)
    pub last_couple: Option<CoupleKind>,
    /// A threshold was reached since the last hazard
    pub elevated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardPolicy {
    pub base_chance: f32,
    pub elevated_chance: f32,
    pub same_couple_threshold: u32,
    pub total_threshold: u32,
}

impl HazardPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            base_chance: settings.base_hazard_chance,
            elevated_chance: settings.elevated_hazard_chance,
            same_couple_threshold: settings.same_couple_threshold,
            total_threshold: settings.total_swipes_threshold,
        }
    }

    fn threshold_reached(&self, tally: &SwipeTally) -> bool {
        tally.consecutive_same_couple >= self.same_couple_threshold
            || tally.consecutive_total >= self.total_threshold
    }

    /// Chance that applies to the next eligible down-beat
    pub fn chance(&self, tally: &SwipeTally) -> f32 {
        if tally.elevated || self.threshold_reached(tally) {
            self.elevated_chance
        } else {
            self.base_chance
        }
    }

    /// Roll for a hazard. Never rolls (and never consumes a sample) before
    /// the couple has served its minimum tenure.
    pub fn should_spawn_hazard(
        &self,
        couple_rounds_completed: u32,
        min_rounds_per_couple: u32,
        tally: &SwipeTally,
        rng: &mut dyn HazardRng,
    ) -> bool {
        if couple_rounds_completed < min_rounds_per_couple {
            return false;
        }
        let chance = self.chance(tally);
        let sample = rng.next_unit();
        let spawn = sample < chance;
        log::debug!(
            "Hazard roll {:.3} vs {:.2} (same={}, total={}) -> {}",
            sample,
            chance,
            tally.consecutive_same_couple,
            tally.consecutive_total,
            spawn
        );
        spawn
    }

    /// Record one completed down-swipe on `current`
    pub fn track_swipe(&self, tally: SwipeTally, current: CoupleKind) -> SwipeTally {
        let consecutive_same_couple = if tally.last_couple == Some(current) {
            tally.consecutive_same_couple.saturating_add(1)
        } else {
            1
        };
        let mut next = SwipeTally {
            consecutive_same_couple,
            consecutive_total: tally.consecutive_total.saturating_add(1),
            last_couple: Some(current),
            elevated: tally.elevated,
        };
        if !next.elevated && self.threshold_reached(&next) {
            log::debug!(
                "Hazard chance elevated (same={}, total={})",
                next.consecutive_same_couple,
                next.consecutive_total
            );
            next.elevated = true;
        }
        next
    }

    /// Zero both run lengths (a hazard just armed)
    pub fn reset_tally(tally: SwipeTally) -> SwipeTally {
        SwipeTally {
            consecutive_same_couple: 0,
            consecutive_total: 0,
            last_couple: tally.last_couple,
            elevated: false,
        }
    }
}
