//! Round orchestration
//!
//! `GameOrchestrator` owns every component of a round and advances them from
//! a single `tick(now)`. Within one tick the order is fixed:
//!
//! ```text
//! queued pointer input -> countdown / deferred hazard -> hazard guard
//!     -> rhythm beats -> response guard
//! ```
//!
//! so a correct swipe delivered in the same tick as a deadline always wins.

use glam::Vec2;

use super::clock::RhythmClock;
use super::couple::{Couple, CoupleState, HazardOverlay};
use super::gesture::{Gesture, GestureClassifier, GestureEvent, PointerInput};
use super::guard::{Fired, Guard, HazardReactionGuard, ResponseTimeoutGuard};
use super::hazard::{HazardKind, HazardPolicy, SwipeTally};
use super::rhythm::{RhythmDriver, RhythmRequest};
use super::rng::{HazardRng, RngState};
use super::state::{EventQueue, GameEvent, GameListener, GamePhase, RoundOutcome};
use crate::Timestamp;
use crate::error::ConfigError;
use crate::settings::Settings;

/// Next countdown step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cue {
    /// Show this number (0 is "GO")
    Show(u32),
    /// Countdown over, start the round
    Run,
}

#[derive(Debug, Clone, Copy)]
struct Countdown {
    cue: Cue,
    at: Timestamp,
}

pub struct GameOrchestrator {
    settings: Settings,
    phase: GamePhase,
    /// Latest tick time (never goes backward)
    now: Timestamp,
    score: u32,

    classifier: GestureClassifier,
    policy: HazardPolicy,
    tally: SwipeTally,
    couple: CoupleState,
    rhythm: RhythmDriver,
    response_guard: ResponseTimeoutGuard,
    hazard_guard: HazardReactionGuard,
    rng: Box<dyn HazardRng>,

    countdown: Option<Countdown>,
    /// Deferred hazard arming instant
    pending_hazard: Option<Timestamp>,
    /// A pointer release has been seen since the hazard armed
    released_since_hazard: bool,

    input: Vec<PointerInput>,
    events: EventQueue,
}

impl GameOrchestrator {
    pub fn new(settings: Settings, rng: impl HazardRng + 'static) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            phase: GamePhase::Idle,
            now: Timestamp::ZERO,
            score: 0,
            classifier: GestureClassifier::new(settings.swipe_threshold),
            policy: HazardPolicy::from_settings(&settings),
            tally: SwipeTally::default(),
            couple: CoupleState::new(settings.min_rounds_per_couple),
            rhythm: RhythmDriver::new(settings.rhythm_interval()),
            response_guard: Guard::response(),
            hazard_guard: Guard::hazard_reaction(),
            rng: Box::new(rng),
            countdown: None,
            pending_hazard: None,
            released_since_hazard: false,
            input: Vec::new(),
            events: EventQueue::default(),
            settings,
        })
    }

    /// Orchestrator drawing from a seeded `Pcg32`
    pub fn with_seed(settings: Settings, seed: u64) -> Result<Self, ConfigError> {
        Self::new(settings, RngState::new(seed).to_rng())
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn couple(&self) -> Couple {
        self.couple.couple()
    }

    pub fn hazard(&self) -> Option<&HazardOverlay> {
        self.couple.overlay()
    }

    pub fn hazard_pending(&self) -> bool {
        self.pending_hazard.is_some()
    }

    pub fn tally(&self) -> SwipeTally {
        self.tally
    }

    pub fn rhythm(&self) -> &RhythmDriver {
        &self.rhythm
    }

    pub fn response_guard(&self) -> &ResponseTimeoutGuard {
        &self.response_guard
    }

    pub fn hazard_guard(&self) -> &HazardReactionGuard {
        &self.hazard_guard
    }

    pub fn pointer_down(&self) -> bool {
        self.classifier.is_active()
    }

    // ── Events ───────────────────────────────────────────────────────

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    pub fn dispatch(&mut self, listener: &mut dyn GameListener) {
        self.events.dispatch(listener);
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the tuning. Rejected settings leave the current ones in place.
    pub fn configure(&mut self, settings: Settings) -> Result<(), ConfigError> {
        settings.validate()?;
        self.classifier.set_threshold(settings.swipe_threshold);
        self.policy = HazardPolicy::from_settings(&settings);
        self.couple.set_min_rounds_per_couple(settings.min_rounds_per_couple);
        self.rhythm.set_interval(settings.rhythm_interval());
        self.settings = settings;
        Ok(())
    }

    pub fn feed_pointer_sample(&mut self, pos: Vec2, at: Timestamp) {
        self.input.push(PointerInput::Sample { pos, at });
    }

    pub fn feed_pointer_released(&mut self, at: Timestamp) {
        self.input.push(PointerInput::Released { at });
    }

    /// Begin the countdown for a new round. A failed round is restarted
    /// first. Returns false if a round is already counting down or running.
    pub fn start_round(&mut self) -> bool {
        match self.phase {
            GamePhase::Countdown | GamePhase::Running => return false,
            GamePhase::Failed => self.restart(),
            GamePhase::Idle => {}
        }

        self.reset_round();
        self.phase = GamePhase::Countdown;
        let from = self.settings.countdown_from;
        log::info!("Round starting (countdown from {})", from);
        self.events.push(GameEvent::CountdownTick { n: from });
        self.countdown = Some(Countdown {
            cue: Cue::Show(from - 1),
            at: self.now + self.settings.countdown_step(),
        });
        self.emit_visual();
        true
    }

    /// Leave `Failed` for `Idle`
    pub fn restart(&mut self) {
        if self.phase == GamePhase::Failed {
            self.reset_round();
            self.phase = GamePhase::Idle;
        }
    }

    /// Abandon a counting-down or running round. Returns the points scored.
    pub fn stop_round(&mut self) -> u32 {
        if !matches!(self.phase, GamePhase::Countdown | GamePhase::Running) {
            return 0;
        }
        let points = self.score;
        self.halt();
        self.phase = GamePhase::Idle;
        log::info!("Round stopped with {} points", points);
        points
    }

    /// Advance to `clock.now()`
    pub fn frame(&mut self, clock: &dyn RhythmClock) -> RoundOutcome {
        self.tick(clock.now())
    }

    /// Advance the round to `now`
    pub fn tick(&mut self, now: Timestamp) -> RoundOutcome {
        self.now = self.now.max(now);
        let now = self.now;
        let mut outcome = RoundOutcome::Continue;

        if !self.classifier.is_enabled() && !self.input.is_empty() {
            log::debug!("Ignoring {} pointer inputs outside a running round", self.input.len());
        }
        for input in std::mem::take(&mut self.input) {
            if let Some(ev) = self.classifier.feed(input) {
                outcome = outcome.merge(self.on_gesture(ev));
            }
        }

        if self.phase == GamePhase::Countdown {
            self.advance_countdown(now, &mut outcome);
        }

        if self.phase == GamePhase::Running {
            if let Some(due) = self.pending_hazard.filter(|due| *due <= now) {
                self.arm_hazard(due);
            }
        }

        if self.phase == GamePhase::Running {
            if let Some(fired) = self.hazard_guard.poll(now) {
                self.on_hazard_timeout(fired);
            }
        }

        // The hazard resolves before any beat it was holding back
        while self.phase == GamePhase::Running {
            let Some(request) = self.rhythm.advance(now) else {
                break;
            };
            outcome = outcome.merge(self.on_rhythm_request(request));
        }

        if self.phase == GamePhase::Running {
            if let Some(fired) = self.response_guard.poll(now) {
                outcome = outcome.merge(self.on_response_timeout(fired));
            }
        }

        outcome
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reset_round(&mut self) {
        self.halt();
        self.score = 0;
        self.couple.reset();
        self.tally = SwipeTally::default();
        self.input.clear();
    }

    /// Void everything that could still fire
    fn halt(&mut self) {
        self.classifier.set_enabled(false);
        self.rhythm.stop();
        self.response_guard.cancel();
        self.hazard_guard.cancel();
        self.countdown = None;
        self.pending_hazard = None;
        self.released_since_hazard = false;
    }

    fn advance_countdown(&mut self, now: Timestamp, outcome: &mut RoundOutcome) {
        while let Some(countdown) = self.countdown.filter(|c| c.at <= now) {
            match countdown.cue {
                Cue::Show(n) => {
                    self.events.push(GameEvent::CountdownTick { n });
                    let (cue, wait) = if n == 0 {
                        (Cue::Run, self.settings.countdown_go_hold())
                    } else {
                        (Cue::Show(n - 1), self.settings.countdown_step())
                    };
                    self.countdown = Some(Countdown {
                        cue,
                        at: countdown.at + wait,
                    });
                }
                Cue::Run => {
                    self.countdown = None;
                    *outcome = outcome.merge(self.begin_running(countdown.at));
                }
            }
        }
    }

    fn begin_running(&mut self, at: Timestamp) -> RoundOutcome {
        self.phase = GamePhase::Running;
        self.classifier.set_enabled(true);
        log::info!("Round running");
        let first = self.rhythm.start(at);
        self.on_rhythm_request(first)
    }

    fn on_gesture(&mut self, ev: GestureEvent) -> RoundOutcome {
        if self.phase != GamePhase::Running {
            return RoundOutcome::Continue;
        }
        match ev.gesture {
            Gesture::PointerReleased => {
                if self.couple.hazard_active() {
                    self.released_since_hazard = true;
                }
                RoundOutcome::Continue
            }
            Gesture::SwipeUp => self.on_swipe_up(),
            Gesture::SwipeDown => {
                self.on_swipe_down();
                RoundOutcome::Continue
            }
        }
    }

    fn on_swipe_up(&mut self) -> RoundOutcome {
        if self.couple.hazard_active() {
            self.couple.reveal_hazard_up();
            self.emit_visual();
            return self.fail(RoundOutcome::FailedWrongSwipe);
        }
        if self.couple.is_up() {
            return RoundOutcome::Continue;
        }

        let may_change = self.couple.transition_up();
        self.response_guard.satisfy();

        let points = self.settings.points_per_swipe;
        self.score = self.score.saturating_add(points);
        self.events.push(GameEvent::ScoreIncremented {
            new_score: self.score,
        });

        if may_change {
            self.couple
                .maybe_change_couple(self.settings.couple_change_chance, self.rng.as_mut());
        }
        self.emit_visual();
        RoundOutcome::Scored(points)
    }

    fn on_swipe_down(&mut self) {
        let now = self.now;

        if self.couple.hazard_active() {
            // The swipe that revealed the hazard must not also clear it
            if !self.released_since_hazard {
                log::debug!("Hazard clear ignored until the pointer is released");
                return;
            }
            self.couple.clear_hazard();
            self.hazard_guard.satisfy();
            self.response_guard.satisfy();
            self.rhythm.resume(now);
            log::debug!("Hazard cleared by swipe");
            self.events.push(GameEvent::HazardCleared { timed_out: false });
            self.emit_visual();
            return;
        }
        if !self.couple.is_up() {
            return;
        }

        self.couple.transition_down();
        let couple = self.couple.couple();
        self.tally = self.policy.track_swipe(self.tally, couple.kind);
        self.response_guard.satisfy();
        self.emit_visual();

        if self.pending_hazard.is_none()
            && self.policy.should_spawn_hazard(
                couple.rounds_completed,
                self.couple.min_rounds_per_couple(),
                &self.tally,
                self.rng.as_mut(),
            )
        {
            let freeze = self.settings.hazard_freeze_duration();
            self.pending_hazard = Some(now + freeze);
            self.rhythm.freeze(now, freeze);
            log::debug!("Hazard scheduled in {:?}", freeze);
        }
    }

    fn arm_hazard(&mut self, due: Timestamp) {
        self.pending_hazard = None;
        // The player went up during the delay: the down-beat is gone
        if self.couple.is_up() {
            log::debug!("Pending hazard dropped, couple is up");
            return;
        }

        let kind = HazardKind::random(self.rng.as_mut());
        if !self.couple.arm_hazard(kind, due) {
            return;
        }
        let limit = self.settings.hazard_time_limit();
        if self.hazard_guard.arm(due, limit).is_some() {
            log::warn!("Hazard guard was still armed from a previous hazard");
        }
        self.response_guard.pause(due);
        self.rhythm.freeze(due, limit);
        self.tally = HazardPolicy::reset_tally(self.tally);
        self.released_since_hazard = !self.classifier.is_active();

        log::debug!("Hazard {:?} armed for {:?}", kind, limit);
        self.events.push(GameEvent::HazardArmed { kind });
        self.emit_visual();
    }

    fn on_hazard_timeout(&mut self, fired: Fired) {
        if self.couple.hazard_timed_out().is_none() {
            return;
        }
        self.response_guard.resume(fired.deadline);
        self.rhythm.resume(fired.deadline);
        self.released_since_hazard = false;
        log::debug!("Hazard expired, player avoided it");
        self.events.push(GameEvent::HazardCleared { timed_out: true });
        self.emit_visual();
    }

    fn on_rhythm_request(&mut self, request: RhythmRequest) -> RoundOutcome {
        self.events.push(GameEvent::RhythmRequest {
            expect_up: request.expect_up,
        });
        let timeout = self.settings.response_timeout();
        match self.response_guard.arm(request.at, timeout) {
            Some(stale) => self.on_response_timeout(stale),
            None => RoundOutcome::Continue,
        }
    }

    fn on_response_timeout(&mut self, fired: Fired) -> RoundOutcome {
        log::debug!("Response deadline {:?} missed", fired.deadline);
        self.fail(RoundOutcome::FailedTimeout)
    }

    fn fail(&mut self, outcome: RoundOutcome) -> RoundOutcome {
        self.halt();
        self.phase = GamePhase::Failed;
        log::info!("Round failed ({:?}) with {} points", outcome, self.score);
        self.events.push(GameEvent::RoundEnded {
            outcome,
            points: self.score,
        });
        outcome
    }

    fn emit_visual(&mut self) {
        let couple = self.couple.couple();
        let hazard = self.couple.overlay().copied();
        self.events.push(GameEvent::CoupleVisualChanged {
            couple,
            is_up: hazard.map_or(couple.is_up, |h| h.is_up),
            hazard,
        });
    }
}
