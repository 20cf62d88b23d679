//! Game state and core simulation types
//!
//! Everything the four loops read and mutate lives in [`GameState`].

use glam::Vec2;

use super::breath::{BreathOscillator, BreathPhase};
use super::bubble::BubbleField;
use super::countdown::Countdown;
use super::random::RandomSource;
use super::session::{SessionEvent, SessionState};
use crate::config::SessionConfig;

/// Things that happened during a callback, drained by the driver
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Started,
    Paused,
    Resumed,
    Spawned { id: u32 },
    Popped { id: u32, points: u64 },
    PhaseChanged(BreathPhase),
    SessionEnded { score: u64 },
}

/// Complete session state
pub struct GameState {
    pub config: SessionConfig,
    pub session: SessionState,
    pub score: u64,
    pub countdown: Countdown,
    pub breath: BreathOscillator,
    pub field: BubbleField,
    /// Size of the drawing surface, if one is attached
    pub surface_size: Option<Vec2>,
    /// Frames advanced since the session started
    pub frame_count: u64,
    /// Active time since the last countdown decrement
    pub(crate) countdown_carry_ms: u32,
    pub(crate) rng: Box<dyn RandomSource>,
    events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(config: SessionConfig, rng: Box<dyn RandomSource>) -> Self {
        Self {
            countdown: Countdown::new(config.session_seconds),
            breath: BreathOscillator::new(config.breath_cycle_ms, config.phase_tick_ms),
            config,
            session: SessionState::Idle,
            score: 0,
            field: BubbleField::new(),
            surface_size: None,
            frame_count: 0,
            countdown_carry_ms: 0,
            rng,
            events: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    pub fn phase(&self) -> BreathPhase {
        self.breath.phase()
    }

    pub fn time_remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn set_surface_size(&mut self, size: Option<Vec2>) {
        self.surface_size = size;
    }

    /// Start (or restart) a session with a full reset
    pub fn start(&mut self) {
        self.score = 0;
        self.countdown = Countdown::new(self.config.session_seconds);
        self.breath.reset();
        self.field.clear();
        self.frame_count = 0;
        self.countdown_carry_ms = 0;
        self.events.clear();
        self.session = self.session.transition(SessionEvent::Start);
        self.events.push(GameEvent::Started);
        log::info!(
            "Session started ({} s, {} ms cycle)",
            self.config.session_seconds,
            self.config.breath_cycle_ms
        );
    }

    pub fn pause(&mut self) {
        if self.session.is_active() {
            self.session = self.session.transition(SessionEvent::Pause);
            self.events.push(GameEvent::Paused);
            log::info!("Session paused at {} s", self.countdown.remaining());
        }
    }

    pub fn resume(&mut self) {
        if self.session == SessionState::Paused {
            self.session = self.session.transition(SessionEvent::Resume);
            self.events.push(GameEvent::Resumed);
            log::info!("Session resumed at {} s", self.countdown.remaining());
        }
    }

    /// Countdown reached zero
    pub(crate) fn expire(&mut self) {
        self.session = self.session.transition(SessionEvent::Expired);
        self.events.push(GameEvent::SessionEnded { score: self.score });
        log::info!("Session ended with score {}", self.score);
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
