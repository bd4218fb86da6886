//! Swipe Couple - headless session runner
//!
//! Plays seeded rounds with the autopilot on a manual clock, logs every
//! event and records totals in a JSON progress file.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::time::Duration;

    use clap::Parser;

    use swipe_couple::consts::FRAME_MS;
    use swipe_couple::persistence::JsonFileProgressStore;
    use swipe_couple::sim::{
        Autopilot, Couple, GameListener, GameOrchestrator, HazardKind, HazardOverlay, ManualClock,
        RoundOutcome,
    };
    use swipe_couple::{Difficulty, LevelLadder, ProgressTracker, Settings};

    #[derive(Parser)]
    #[command(name = "swipe-couple", version, about = "Headless Swipe Couple session")]
    pub struct Cli {
        /// Settings JSON file (missing fields take defaults)
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Difficulty preset applied on top of the settings (relaxed, normal, frantic)
        #[arg(long)]
        difficulty: Option<String>,
        /// Seed for hazard and couple decisions
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Rounds to play
        #[arg(long, default_value_t = 3)]
        rounds: u32,
        /// Autopilot reaction latency in milliseconds
        #[arg(long, default_value_t = 250)]
        latency_ms: u64,
        /// Chance the autopilot ignores a beat
        #[arg(long, default_value_t = 0.05)]
        miss_chance: f32,
        /// Longest a single round may run, in seconds
        #[arg(long, default_value_t = 120)]
        max_round_secs: u64,
        /// Progress file
        #[arg(long, default_value = "swipe-couple-progress.json")]
        progress: PathBuf,
    }

    /// Logs every event and forwards round ends to the progress tracker
    struct Session {
        tracker: ProgressTracker<JsonFileProgressStore>,
    }

    impl GameListener for Session {
        fn on_couple_visual_changed(
            &mut self,
            couple: Couple,
            is_up: bool,
            hazard: Option<&HazardOverlay>,
        ) {
            match hazard {
                Some(h) => log::debug!(
                    "{} {} with {:?}",
                    couple.kind.as_str(),
                    if is_up { "up" } else { "down" },
                    h.kind
                ),
                None => log::debug!(
                    "{} {} ({} rounds)",
                    couple.kind.as_str(),
                    if is_up { "up" } else { "down" },
                    couple.rounds_completed
                ),
            }
        }

        fn on_score_incremented(&mut self, new_score: u32) {
            log::debug!("Score {}", new_score);
        }

        fn on_round_ended(&mut self, outcome: RoundOutcome, points: u32) {
            log::info!("Round over: {:?}, {} points", outcome, points);
            self.tracker.on_round_ended(outcome, points);
        }

        fn on_countdown_tick(&mut self, n: u32) {
            match n {
                0 => log::info!("GO!"),
                n => log::info!("{}...", n),
            }
        }

        fn on_hazard_armed(&mut self, kind: HazardKind) {
            log::info!("Hazard: {:?}", kind);
        }

        fn on_hazard_cleared(&mut self, timed_out: bool) {
            if timed_out {
                log::info!("Hazard expired");
            } else {
                log::info!("Hazard cleared");
            }
        }
    }

    fn load_settings(cli: &Cli) -> Result<Settings, Box<dyn std::error::Error>> {
        let mut settings = match &cli.settings {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(name) = &cli.difficulty {
            let preset = Difficulty::from_str(name)
                .ok_or_else(|| format!("unknown difficulty {:?}", name))?;
            log::info!("Difficulty: {}", preset.as_str());
            settings.apply_preset(preset);
            settings.validate()?;
        }
        Ok(settings)
    }

    pub fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
        let settings = load_settings(&cli)?;
        let mut game = GameOrchestrator::with_seed(settings, cli.seed)?;
        let mut bot = Autopilot::new(Duration::from_millis(cli.latency_ms), cli.seed)
            .with_miss_chance(cli.miss_chance);
        let mut clock = ManualClock::default();

        let store = JsonFileProgressStore::new(&cli.progress);
        let mut session = Session {
            tracker: ProgressTracker::new(store, LevelLadder::default())?,
        };

        let frame = Duration::from_millis(FRAME_MS);
        let limit = Duration::from_secs(cli.max_round_secs);
        for round in 1..=cli.rounds {
            log::info!("Round {}/{}", round, cli.rounds);
            let outcome = bot.play_round(&mut game, &mut clock, frame, limit, &mut session);
            if !outcome.is_terminal() {
                let points = game.stop_round();
                log::info!("Round hit the time limit with {} points", points);
                session.on_round_ended(outcome, points);
            }
        }

        let progress = session.tracker.progress();
        log::info!(
            "Session done: level {}, total {}, best round {}, {} rounds played",
            session.tracker.level(),
            progress.total_score,
            progress.best_round,
            progress.rounds_played
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::init();
    let cli = native::Cli::parse();
    if let Err(e) = native::run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The core is embedded by a host UI on the web; there is no binary entry
}
