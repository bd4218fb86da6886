//! Game settings and balance
//!
//! Loaded from JSON by the collaborator layer, validated once at configure
//! time. Values are never clamped: an invalid setting is a startup error.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::secs;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Relaxed,
    #[default]
    Normal,
    Frantic,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Relaxed => "Relaxed",
            Difficulty::Normal => "Normal",
            Difficulty::Frantic => "Frantic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" | "easy" => Some(Difficulty::Relaxed),
            "normal" => Some(Difficulty::Normal),
            "frantic" | "hard" => Some(Difficulty::Frantic),
            _ => None,
        }
    }

    /// Beat interval multiplier (1.0 = default rhythm)
    pub fn tempo_scale(&self) -> f32 {
        match self {
            Difficulty::Relaxed => 1.3,
            Difficulty::Normal => 1.0,
            Difficulty::Frantic => 0.7,
        }
    }

    /// Hazard chances for this preset (base, elevated)
    pub fn hazard_chances(&self) -> (f32, f32) {
        match self {
            Difficulty::Relaxed => (0.15, 0.35),
            Difficulty::Normal => (BASE_HAZARD_CHANCE, ELEVATED_HAZARD_CHANCE),
            Difficulty::Frantic => (0.45, 0.8),
        }
    }
}

/// Round tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Couple ===
    /// Full cycles a couple must survive before hazards or a change
    pub min_rounds_per_couple: u32,
    /// Chance to switch couple after each eligible up-swipe
    pub couple_change_chance: f32,

    // === Hazards ===
    pub base_hazard_chance: f32,
    pub elevated_hazard_chance: f32,
    /// Consecutive down-swipes on one couple that elevate the chance
    pub same_couple_threshold: u32,
    /// Consecutive down-swipes overall that elevate the chance
    pub total_swipes_threshold: u32,
    /// Seconds to react to a hazard before it leaves on its own
    pub hazard_time_limit: f32,
    /// Seconds between the revealing down-swipe and the hazard arming.
    /// The rhythm is frozen for this long.
    pub hazard_freeze_duration: f32,

    // === Timing ===
    /// Seconds between rhythm beats
    pub rhythm_interval: f32,
    /// Seconds the player has to respond before the round fails
    pub response_timeout: f32,

    // === Input ===
    /// Pointer travel (pixels) that counts as a swipe
    pub swipe_threshold: f32,

    // === Scoring ===
    pub points_per_swipe: u32,

    // === Countdown ===
    /// First number shown ("3" in "3, 2, 1, GO")
    pub countdown_from: u32,
    /// Seconds each number stays on screen
    pub countdown_step: f32,
    /// Seconds "GO" stays before the round runs
    pub countdown_go_hold: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_rounds_per_couple: MIN_ROUNDS_PER_COUPLE,
            couple_change_chance: COUPLE_CHANGE_CHANCE,

            base_hazard_chance: BASE_HAZARD_CHANCE,
            elevated_hazard_chance: ELEVATED_HAZARD_CHANCE,
            same_couple_threshold: SAME_COUPLE_THRESHOLD,
            total_swipes_threshold: TOTAL_SWIPES_THRESHOLD,
            hazard_time_limit: HAZARD_TIME_LIMIT,
            hazard_freeze_duration: HAZARD_FREEZE_DURATION,

            rhythm_interval: RHYTHM_INTERVAL,
            response_timeout: RESPONSE_TIMEOUT,

            swipe_threshold: SWIPE_THRESHOLD,

            points_per_swipe: POINTS_PER_SWIPE,

            countdown_from: COUNTDOWN_FROM,
            countdown_step: COUNTDOWN_STEP,
            countdown_go_hold: COUNTDOWN_GO_HOLD,
        }
    }
}

impl Settings {
    /// Create settings from a difficulty preset (applies preset defaults)
    pub fn from_preset(preset: Difficulty) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a difficulty preset (updates tempo and hazard chances)
    pub fn apply_preset(&mut self, preset: Difficulty) {
        let scale = preset.tempo_scale();
        self.rhythm_interval = RHYTHM_INTERVAL * scale;
        self.response_timeout = RESPONSE_TIMEOUT * scale;
        let (base, elevated) = preset.hazard_chances();
        self.base_hazard_chance = base;
        self.elevated_hazard_chance = elevated;
    }

    /// Reject anything that cannot drive a round
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("rhythm_interval", self.rhythm_interval)?;
        positive("response_timeout", self.response_timeout)?;
        positive("hazard_time_limit", self.hazard_time_limit)?;
        non_negative("hazard_freeze_duration", self.hazard_freeze_duration)?;
        non_negative("countdown_step", self.countdown_step)?;
        non_negative("countdown_go_hold", self.countdown_go_hold)?;

        chance("base_hazard_chance", self.base_hazard_chance)?;
        chance("elevated_hazard_chance", self.elevated_hazard_chance)?;
        chance("couple_change_chance", self.couple_change_chance)?;

        if !self.swipe_threshold.is_finite() || self.swipe_threshold <= 0.0 {
            return Err(ConfigError::InvalidSwipeThreshold(self.swipe_threshold));
        }
        if self.countdown_from == 0 {
            return Err(ConfigError::EmptyCountdown);
        }
        Ok(())
    }

    pub fn rhythm_interval(&self) -> Duration {
        secs(self.rhythm_interval)
    }

    pub fn response_timeout(&self) -> Duration {
        secs(self.response_timeout)
    }

    pub fn hazard_time_limit(&self) -> Duration {
        secs(self.hazard_time_limit)
    }

    pub fn hazard_freeze_duration(&self) -> Duration {
        secs(self.hazard_freeze_duration)
    }

    pub fn countdown_step(&self) -> Duration {
        secs(self.countdown_step)
    }

    pub fn countdown_go_hold(&self) -> Duration {
        secs(self.countdown_go_hold)
    }

    /// Parse and validate settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Pretty JSON for settings that validate. Non-finite values would be
    /// written as `null`, so invalid settings are refused.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        self.validate()?;
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidDuration { field, value });
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    non_negative(field, value)?;
    if secs(value).is_zero() {
        return Err(ConfigError::ZeroDuration { field, value });
    }
    Ok(())
}

fn chance(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidChance { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
        for preset in [Difficulty::Relaxed, Difficulty::Normal, Difficulty::Frantic] {
            assert!(Settings::from_preset(preset).validate().is_ok(), "{}", preset.as_str());
        }
    }

    #[test]
    fn test_negative_interval_rejected() {
        let settings = Settings {
            rhythm_interval: -1.0,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(ConfigError::InvalidDuration {
                field: "rhythm_interval",
                value: -1.0
            })
        );
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let settings = Settings {
            response_timeout: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::ZeroDuration { field: "response_timeout", .. })
        ));
    }

    #[test]
    fn test_chance_out_of_range_rejected() {
        let settings = Settings {
            elevated_hazard_chance: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidChance { field: "elevated_hazard_chance", .. })
        ));

        let settings = Settings {
            base_hazard_chance: f32::NAN,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_swipe_threshold_and_countdown_rules() {
        let settings = Settings {
            swipe_threshold: 0.0,
            ..Default::default()
        };
        assert_eq!(settings.validate(), Err(ConfigError::InvalidSwipeThreshold(0.0)));

        let settings = Settings {
            countdown_from: 0,
            ..Default::default()
        };
        assert_eq!(settings.validate(), Err(ConfigError::EmptyCountdown));
    }

    #[test]
    fn test_zero_freeze_is_allowed() {
        let settings = Settings {
            hazard_freeze_duration: 0.0,
            countdown_go_hold: 0.0,
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let settings = Settings::from_json(r#"{ "rhythm_interval": 0.8, "swipe_threshold": 30 }"#)
            .expect("valid json");
        assert_eq!(settings.rhythm_interval(), Duration::from_millis(800));
        assert_eq!(settings.swipe_threshold, 30.0);
        assert_eq!(settings.min_rounds_per_couple, MIN_ROUNDS_PER_COUPLE);
    }

    #[test]
    fn test_json_invalid_value_rejected() {
        let err = Settings::from_json(r#"{ "hazard_time_limit": -0.5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDuration { field: "hazard_time_limit", .. }));

        let err = Settings::from_json("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_json_roundtrip_preserves_preset() {
        let settings = Settings::from_preset(Difficulty::Frantic);
        let json = settings.to_json().expect("valid settings serialize");
        let back = Settings::from_json(&json).expect("roundtrip");
        assert_eq!(back, settings);
    }

    #[test]
    fn test_to_json_refuses_invalid_settings() {
        let settings = Settings {
            rhythm_interval: f32::NAN,
            ..Default::default()
        };
        let err = settings.to_json().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDuration { field: "rhythm_interval", .. }));
    }
}
