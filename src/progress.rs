//! Cross-round progression
//!
//! Each finished round adds its points to a running total. The total maps
//! onto a level ladder whose first five rungs sit at the level targets and
//! whose later rungs are evenly spaced.

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;
use crate::persistence::{Progress, ProgressStore};
use crate::sim::{GameListener, RoundOutcome};

/// Levels with explicit thresholds before the even spacing starts
const STEPPED_LEVELS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelLadder {
    /// Target for level 1
    pub base_target: u64,
    /// Target increase per level
    pub per_level: u64,
}

impl Default for LevelLadder {
    fn default() -> Self {
        Self {
            base_target: 100,
            per_level: 200,
        }
    }
}

impl LevelLadder {
    /// Score target for `level` (levels start at 1)
    pub fn target_for(&self, level: u32) -> u64 {
        let steps = u64::from(level.saturating_sub(1));
        self.base_target.saturating_add(self.per_level.saturating_mul(steps))
    }

    pub fn level_for(&self, total_score: u64) -> u32 {
        for level in 1..=STEPPED_LEVELS {
            if total_score < self.target_for(level) {
                return level;
            }
        }
        let past = total_score - self.target_for(STEPPED_LEVELS);
        let extra = past / self.per_level.max(1);
        STEPPED_LEVELS.saturating_add(u32::try_from(extra).unwrap_or(u32::MAX))
    }

    /// Progress toward the current level target, in [0, 1]
    pub fn progress(&self, total_score: u64) -> f32 {
        let target = self.target_for(self.level_for(total_score));
        if target == 0 {
            return 0.0;
        }
        (total_score as f64 / target as f64).clamp(0.0, 1.0) as f32
    }
}

/// Keeps totals up to date from round-end events and saves after every round
pub struct ProgressTracker<S: ProgressStore> {
    store: S,
    ladder: LevelLadder,
    progress: Progress,
    level: u32,
}

impl<S: ProgressStore> ProgressTracker<S> {
    pub fn new(store: S, ladder: LevelLadder) -> Result<Self, PersistenceError> {
        let progress = store.load()?;
        let level = ladder.level_for(progress.total_score);
        log::info!(
            "Level {} (total {}, target {})",
            level,
            progress.total_score,
            ladder.target_for(level)
        );
        Ok(Self {
            store,
            ladder,
            progress,
            level,
        })
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn ladder(&self) -> &LevelLadder {
        &self.ladder
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fold in a finished round and save. Returns the new level on a level-up.
    pub fn record_round(&mut self, points: u32) -> Result<Option<u32>, PersistenceError> {
        self.progress.record_round(points);

        let level = self.ladder.level_for(self.progress.total_score);
        let level_up = (level != self.level).then_some(level);
        if level_up.is_some() {
            log::info!(
                "Level up! {} -> {} (total {}, next target {})",
                self.level,
                level,
                self.progress.total_score,
                self.ladder.target_for(level)
            );
        }
        self.level = level;

        self.store.save(&self.progress)?;
        Ok(level_up)
    }
}

impl<S: ProgressStore> GameListener for ProgressTracker<S> {
    fn on_round_ended(&mut self, _outcome: RoundOutcome, points: u32) {
        if let Err(e) = self.record_round(points) {
            log::warn!("Failed to save progress: {}", e);
        }
    }
}
