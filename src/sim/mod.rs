//! Deterministic simulation module
//!
//! All exercise logic lives here. This module must be pure and deterministic:
//! - Fixed tick sizes only (wall-clock time is never read)
//! - Injected random source only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod breath;
pub mod bubble;
pub mod countdown;
pub mod guide;
pub mod memory;
pub mod mindfulness;
pub mod random;
pub mod session;
pub mod state;
pub mod tick;

pub use breath::{BreathOscillator, BreathPhase};
pub use bubble::{Bubble, BubbleField};
pub use countdown::Countdown;
pub use guide::{BreathGuide, GuidePhase};
pub use memory::{Card, FLIP_BACK_MS, MemoryGame, PickOutcome};
pub use mindfulness::{Exercise, MindfulnessTimer, format_time};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use session::{SessionEvent, SessionState};
pub use state::{GameEvent, GameState};
pub use tick::{countdown_tick, frame_tick, phase_tick, pointer, second_tick, spawn_tick};
