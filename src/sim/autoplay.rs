//! Scripted player for headless runs and soak tests
//!
//! The autopilot watches the orchestrator the way a player watches the
//! screen: a beat waiting for an answer, a hazard on the couple. It answers
//! after a fixed reaction latency by synthesizing a press, a drag and a
//! release.

use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::clock::{ManualClock, RhythmClock};
use super::state::{GameListener, GamePhase, RoundOutcome};
use super::tick::GameOrchestrator;
use crate::Timestamp;

/// Screen point every synthesized drag starts from
const DRAG_ORIGIN: Vec2 = Vec2::new(180.0, 320.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
    /// Lift the pointer if needed, then swipe down
    ClearHazard,
}

#[derive(Debug, Clone, Copy)]
struct Plan {
    mv: Move,
    at: Timestamp,
    /// Deliberately let this beat go unanswered
    skip: bool,
}

#[derive(Debug, Clone)]
pub struct Autopilot {
    latency: Duration,
    miss_chance: f32,
    travel: f32,
    rng: Pcg32,
    plan: Option<Plan>,
}

impl Autopilot {
    pub fn new(latency: Duration, seed: u64) -> Self {
        Self {
            latency,
            miss_chance: 0.0,
            travel: 120.0,
            rng: Pcg32::seed_from_u64(seed),
            plan: None,
        }
    }

    /// Chance to ignore a beat entirely. Hazards are never ignored.
    pub fn with_miss_chance(mut self, chance: f32) -> Self {
        self.miss_chance = chance.clamp(0.0, 1.0);
        self
    }

    /// Drag length in pixels
    pub fn with_travel(mut self, travel: f32) -> Self {
        self.travel = travel;
        self
    }

    /// What a player would do about the current screen
    fn wanted(game: &GameOrchestrator) -> Option<Move> {
        if game.phase() != GamePhase::Running {
            return None;
        }
        if game.hazard().is_some_and(|h| h.is_active) {
            return Some(Move::ClearHazard);
        }
        if game.hazard_pending() || !game.response_guard().is_armed() {
            return None;
        }
        Some(if game.couple().is_up { Move::Down } else { Move::Up })
    }

    /// Look at the game and queue input for `now`. Call before `tick(now)`.
    /// Returns the move performed, if any.
    pub fn step(&mut self, game: &mut GameOrchestrator, now: Timestamp) -> Option<Move> {
        let Some(mv) = Self::wanted(game) else {
            self.plan = None;
            return None;
        };

        match self.plan {
            Some(plan) if plan.mv == mv => {
                if plan.skip || now < plan.at {
                    return None;
                }
                self.plan = None;
                self.perform(game, mv, now);
                Some(mv)
            }
            _ => {
                let skip = mv != Move::ClearHazard && self.rng.random::<f32>() < self.miss_chance;
                if skip {
                    log::debug!("Autopilot skipping {:?}", mv);
                }
                self.plan = Some(Plan {
                    mv,
                    at: now + self.latency,
                    skip,
                });
                None
            }
        }
    }

    fn perform(&self, game: &mut GameOrchestrator, mv: Move, now: Timestamp) {
        let dy = match mv {
            Move::Up => self.travel,
            Move::Down => -self.travel,
            Move::ClearHazard => {
                if game.pointer_down() {
                    game.feed_pointer_released(now);
                }
                -self.travel
            }
        };
        game.feed_pointer_sample(DRAG_ORIGIN, now);
        game.feed_pointer_sample(DRAG_ORIGIN + Vec2::new(0.0, dy), now);
        game.feed_pointer_released(now);
    }

    /// Play one round on a manual clock until it fails or `limit` passes.
    /// Events are dispatched to `listener` every frame.
    pub fn play_round(
        &mut self,
        game: &mut GameOrchestrator,
        clock: &mut ManualClock,
        frame: Duration,
        limit: Duration,
        listener: &mut dyn GameListener,
    ) -> RoundOutcome {
        let until = clock.now() + limit;
        if game.phase() == GamePhase::Idle || game.phase() == GamePhase::Failed {
            game.tick(clock.now());
            game.start_round();
        }

        let mut outcome = RoundOutcome::Continue;
        while clock.now() < until {
            let now = clock.advance(frame);
            self.step(game, now);
            outcome = game.tick(now);
            game.dispatch(listener);
            if outcome.is_terminal() {
                break;
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_MS;
    use crate::settings::Settings;
    use crate::sim::state::GameEvent;

    #[derive(Default)]
    struct Tape {
        hazards: u32,
        cleared: u32,
    }

    impl GameListener for Tape {
        fn on_hazard_armed(&mut self, _kind: crate::sim::HazardKind) {
            self.hazards += 1;
        }
        fn on_hazard_cleared(&mut self, timed_out: bool) {
            if !timed_out {
                self.cleared += 1;
            }
        }
    }

    const FRAME: Duration = Duration::from_millis(FRAME_MS);

    #[test]
    fn test_attentive_bot_survives_with_hazards() {
        let mut game = GameOrchestrator::with_seed(Settings::default(), 7).expect("defaults");
        let mut bot = Autopilot::new(Duration::from_millis(200), 7);
        let mut clock = ManualClock::default();
        let mut tape = Tape::default();

        let outcome = bot.play_round(
            &mut game,
            &mut clock,
            FRAME,
            Duration::from_secs(120),
            &mut tape,
        );

        assert_eq!(outcome, RoundOutcome::Continue);
        assert_eq!(game.phase(), GamePhase::Running);
        assert!(game.score() > 20, "score {}", game.score());
        assert!(tape.hazards > 0, "a long run meets at least one hazard");
        // Only a hazard armed in the final moments may be left uncleared
        assert!(tape.cleared + 1 >= tape.hazards);
    }

    #[test]
    fn test_absent_bot_times_out() {
        let mut game = GameOrchestrator::with_seed(Settings::default(), 1).expect("defaults");
        let mut bot = Autopilot::new(Duration::from_millis(200), 1).with_miss_chance(1.0);
        let mut clock = ManualClock::default();
        let mut tape = Tape::default();

        let outcome = bot.play_round(
            &mut game,
            &mut clock,
            FRAME,
            Duration::from_secs(30),
            &mut tape,
        );
        assert_eq!(outcome, RoundOutcome::FailedTimeout);
        assert_eq!(game.score(), 0);
        assert_eq!(game.phase(), GamePhase::Failed);
    }

    #[test]
    fn test_short_drag_never_registers() {
        let mut game = GameOrchestrator::with_seed(Settings::default(), 3).expect("defaults");
        let mut bot = Autopilot::new(Duration::from_millis(100), 3).with_travel(10.0);
        let mut clock = ManualClock::default();
        let mut tape = Tape::default();

        let outcome = bot.play_round(
            &mut game,
            &mut clock,
            FRAME,
            Duration::from_secs(30),
            &mut tape,
        );
        assert_eq!(outcome, RoundOutcome::FailedTimeout);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_same_seed_same_game() {
        let run = || {
            let mut game = GameOrchestrator::with_seed(Settings::default(), 42).expect("defaults");
            let mut bot = Autopilot::new(Duration::from_millis(250), 42).with_miss_chance(0.02);
            let mut clock = ManualClock::default();
            game.tick(clock.now());
            game.start_round();
            let mut log = Vec::new();
            for _ in 0..(60_000 / FRAME_MS) {
                let now = clock.advance(FRAME);
                bot.step(&mut game, now);
                game.tick(now);
                log.extend(
                    game.drain_events()
                        .into_iter()
                        .filter(|e| !matches!(e, GameEvent::CoupleVisualChanged { .. })),
                );
            }
            (log, game.score())
        };
        assert_eq!(run(), run());
    }
}
