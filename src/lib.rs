//! Breath Bubbles - a paced-breathing bubble popping exercise
//!
//! Core modules:
//! - `sim`: Deterministic simulation (countdown, breath phase, bubble field)
//! - `renderer`: Drawing surface abstraction and frame composition
//! - `platform`: Interval/frame schedulers (browser and virtual clock)
//! - `driver`: Wires the simulation loops to a scheduler and owns their handles
//! - `activities`: Breathing guide, mindfulness timer and memory match drivers
//! - `config`: Session tunables

pub mod activities;
pub mod audio;
pub mod config;
pub mod driver;
pub mod error;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use activities::{GuideDriver, MemoryDriver, MindfulnessDriver};
pub use config::SessionConfig;
pub use driver::SessionDriver;
pub use error::{Error, Result};
pub use highscores::HighScores;
pub use settings::Settings;

use glam::Vec2;

/// Session configuration defaults
pub mod consts {
    /// Session length in seconds
    pub const SESSION_SECONDS: u32 = 60;
    /// Full breathing cycle (inhale + exhale) in milliseconds
    pub const BREATH_CYCLE_MS: u32 = 8000;
    /// Phase clock resolution
    pub const PHASE_TICK_MS: u32 = 100;
    /// Active time per countdown decrement
    pub const COUNTDOWN_TICK_MS: u32 = 1000;
    /// Time between bubble spawn attempts
    pub const SPAWN_INTERVAL_MS: u32 = 1000;

    /// Bubble radius range (pixels)
    pub const BUBBLE_MIN_RADIUS: f32 = 20.0;
    pub const BUBBLE_MAX_RADIUS: f32 = 50.0;
    /// Bubble rise speed range (pixels per frame)
    pub const BUBBLE_MIN_SPEED: f32 = 1.0;
    pub const BUBBLE_MAX_SPEED: f32 = 3.0;

    /// Points per popped bubble
    pub const POP_SCORE: u64 = 10;

    /// Canvas size used when the page doesn't specify one
    pub const SURFACE_WIDTH: f32 = 800.0;
    pub const SURFACE_HEIGHT: f32 = 500.0;
}

/// Euclidean containment test for a circle
#[inline]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance(center) <= radius
}
