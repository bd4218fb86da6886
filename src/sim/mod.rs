//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only arrives through `tick(now)`
//! - Seeded or injected RNG only
//! - Pointer input is queued and applied at the start of the next tick
//! - No rendering, audio or platform dependencies

pub mod autoplay;
pub mod clock;
pub mod couple;
pub mod gesture;
pub mod guard;
pub mod hazard;
pub mod rhythm;
pub mod rng;
pub mod state;
pub mod tick;

pub use autoplay::Autopilot;
pub use clock::{ManualClock, MonotonicClock, RhythmClock};
pub use couple::{Couple, CoupleKind, CoupleState, HazardOverlay, HazardResolution};
pub use gesture::{Gesture, GestureClassifier, GestureEvent, PointerInput};
pub use guard::{Fired, Guard, GuardKind, HazardReactionGuard, ResponseTimeoutGuard, TimerState};
pub use hazard::{HazardKind, HazardPolicy, SwipeTally};
pub use rhythm::{RhythmDriver, RhythmPhase, RhythmRequest};
pub use rng::{ConstantRng, HazardRng, RngState, ScriptedRng};
pub use state::{EventQueue, GameEvent, GameListener, GamePhase, RoundOutcome};
pub use tick::GameOrchestrator;
