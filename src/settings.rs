//! User preferences
//!
//! Persisted separately from the leaderboard in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;

/// Shortest and longest session a user can pick (seconds)
pub const MIN_SESSION_SECONDS: u32 = 30;
pub const MAX_SESSION_SECONDS: u32 = 300;

/// Preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Cue volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
    /// Chime on every inhale/exhale flip
    pub phase_chimes: bool,

    // === Session ===
    /// Chosen session length
    pub session_seconds: u32,

    // === Accessibility ===
    /// Hold bubble alpha steady instead of shimmering
    pub reduced_motion: bool,
    /// Pause when the tab is hidden or the window loses focus
    pub pause_on_blur: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            phase_chimes: true,
            session_seconds: crate::consts::SESSION_SECONDS,
            reduced_motion: false,
            pause_on_blur: true,
        }
    }
}

impl Settings {
    /// Volume handed to the audio sink
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Bubble shimmer (respects reduced_motion)
    pub fn effective_shimmer(&self) -> bool {
        !self.reduced_motion
    }

    /// Session length clamped to the allowed range
    pub fn effective_session_seconds(&self) -> u32 {
        self.session_seconds
            .clamp(MIN_SESSION_SECONDS, MAX_SESSION_SECONDS)
    }

    /// Session config with the user's length applied
    pub fn session_config(&self, base: SessionConfig) -> SessionConfig {
        base.with_session_seconds(self.effective_session_seconds())
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "breath_bubbles_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Discarding unreadable settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
