//! Session lifecycle state machine
//!
//! All lifecycle changes go through [`SessionState::transition`]; events that
//! don't apply to the current state leave it unchanged.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    /// Nothing started yet
    #[default]
    Idle,
    /// Countdown, oscillator and spawner running
    Active,
    /// Suspended mid-session; resumes from where it stopped
    Paused,
    /// Countdown reached zero; terminal values kept for display
    Ended,
}

/// Inputs to the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Start or restart (always a full reset)
    Start,
    Pause,
    Resume,
    /// Countdown hit zero
    Expired,
}

impl SessionState {
    pub fn transition(self, event: SessionEvent) -> SessionState {
        use SessionEvent as E;
        use SessionState as S;
        match (self, event) {
            (_, E::Start) => S::Active,
            (S::Active, E::Pause) => S::Paused,
            (S::Paused, E::Resume) => S::Active,
            (S::Active, E::Expired) => S::Ended,
            (state, _) => state,
        }
    }

    pub fn is_active(self) -> bool {
        self == SessionState::Active
    }

    /// Started and not yet ended
    pub fn is_running(self) -> bool {
        matches!(self, SessionState::Active | SessionState::Paused)
    }
}
