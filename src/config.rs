//! Session tunables
//!
//! Defaults come from [`crate::consts`]. Every field is optional in JSON so a
//! page can override just the values it cares about.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session length in seconds
    pub session_seconds: u32,
    /// Full inhale + exhale cycle in milliseconds
    pub breath_cycle_ms: u32,
    /// Phase clock tick size and cadence
    pub phase_tick_ms: u32,
    /// Active time per countdown decrement, measured in phase ticks
    pub countdown_tick_ms: u32,
    /// Spawn attempt cadence
    pub spawn_interval_ms: u32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Pixels per frame
    pub min_speed: f32,
    pub max_speed: f32,
    /// Points awarded per popped bubble
    pub pop_score: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_seconds: SESSION_SECONDS,
            breath_cycle_ms: BREATH_CYCLE_MS,
            phase_tick_ms: PHASE_TICK_MS,
            countdown_tick_ms: COUNTDOWN_TICK_MS,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            min_radius: BUBBLE_MIN_RADIUS,
            max_radius: BUBBLE_MAX_RADIUS,
            min_speed: BUBBLE_MIN_SPEED,
            max_speed: BUBBLE_MAX_SPEED,
            pop_score: POP_SCORE,
        }
    }
}

impl SessionConfig {
    /// Duration of one phase (inhale or exhale)
    pub fn half_cycle_ms(&self) -> u32 {
        self.breath_cycle_ms / 2
    }

    /// Same config with a different session length
    pub fn with_session_seconds(mut self, seconds: u32) -> Self {
        self.session_seconds = seconds;
        self
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations the loops can't run with
    pub fn validate(&self) -> Result<()> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> Error {
            Error::InvalidConfig {
                field,
                reason: reason.into(),
            }
        }

        if self.session_seconds == 0 {
            return Err(invalid("session_seconds", "must be at least 1"));
        }
        if self.countdown_tick_ms == 0 {
            return Err(invalid("countdown_tick_ms", "must be non-zero"));
        }
        if self.spawn_interval_ms == 0 {
            return Err(invalid("spawn_interval_ms", "must be non-zero"));
        }
        if self.phase_tick_ms == 0 {
            return Err(invalid("phase_tick_ms", "must be non-zero"));
        }
        if self.breath_cycle_ms < 2 * self.phase_tick_ms {
            return Err(invalid(
                "breath_cycle_ms",
                format!("must cover at least two ticks of {} ms", self.phase_tick_ms),
            ));
        }
        // Phase flips only land exactly on the half-cycle when ticks divide it
        if self.half_cycle_ms() % self.phase_tick_ms != 0 {
            return Err(invalid(
                "phase_tick_ms",
                format!(
                    "{} ms does not divide the {} ms half-cycle",
                    self.phase_tick_ms,
                    self.half_cycle_ms()
                ),
            ));
        }
        // Countdown time is counted in phase ticks
        if self.countdown_tick_ms % self.phase_tick_ms != 0 {
            return Err(invalid(
                "countdown_tick_ms",
                format!(
                    "{} ms is not a whole number of {} ms ticks",
                    self.countdown_tick_ms, self.phase_tick_ms
                ),
            ));
        }
        if !(self.min_radius > 0.0 && self.min_radius <= self.max_radius) {
            return Err(invalid(
                "min_radius",
                format!("range {}..{} is empty or non-positive", self.min_radius, self.max_radius),
            ));
        }
        if !(self.min_speed > 0.0 && self.min_speed <= self.max_speed) {
            return Err(invalid(
                "min_speed",
                format!("range {}..{} is empty or non-positive", self.min_speed, self.max_speed),
            ));
        }
        if self.pop_score == 0 {
            return Err(invalid("pop_score", "must award at least one point"));
        }
        Ok(())
    }
}
