//! Whole-second session countdown

use serde::{Deserialize, Serialize};

/// Counts down from a fixed length, one second per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    duration: u32,
    remaining: u32,
}

impl Countdown {
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            remaining: duration,
        }
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Back to the full duration
    pub fn reset(&mut self) {
        self.remaining = self.duration;
    }

    /// Decrement by one second. Returns true on the tick that reaches zero;
    /// ticks after expiry do nothing.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_to_zero_once() {
        let mut c = Countdown::new(3);
        assert!(!c.tick());
        assert!(!c.tick());
        assert!(c.tick());
        assert!(c.is_expired());
        // Never negative, never re-reports
        assert!(!c.tick());
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn test_reset_restores_duration() {
        let mut c = Countdown::new(60);
        c.tick();
        c.tick();
        assert_eq!(c.remaining(), 58);
        c.reset();
        assert_eq!(c.remaining(), 60);
    }
}
