//! Session leaderboard
//!
//! Persisted to LocalStorage, tracks the top 10 session scores.

use serde::{Deserialize, Serialize};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Length of the session that produced it
    pub session_seconds: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "breath_bubbles_highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, score: u64, session_seconds: u32, timestamp: f64) -> Option<usize> {
        let rank = self.potential_rank(score)?;

        self.entries.insert(
            rank - 1,
            HighScoreEntry {
                score,
                session_seconds,
                timestamp,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    return scores;
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert_eq!(scores.potential_rank(0), None);
    }

    #[test]
    fn test_sorted_descending() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(50, 60, 1.0), Some(1));
        assert_eq!(scores.add_score(120, 60, 2.0), Some(1));
        assert_eq!(scores.add_score(80, 60, 3.0), Some(2));
        // Ties rank below the existing entry
        assert_eq!(scores.add_score(80, 60, 4.0), Some(3));

        let order: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(order, vec![120, 80, 80, 50]);
        assert_eq!(scores.top_score(), Some(120));
    }

    #[test]
    fn test_full_board_drops_lowest() {
        let mut scores = HighScores::new();
        for i in 1..=MAX_HIGH_SCORES as u64 {
            scores.add_score(i * 10, 60, i as f64);
        }
        assert!(!scores.qualifies(10));
        assert_eq!(scores.add_score(5, 60, 0.0), None);
        assert_eq!(scores.add_score(15, 60, 0.0), Some(10));
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.entries.last().map(|e| e.score), Some(15));
    }
}
