//! Four-phase breathing guide
//!
//! Inhale, hold, exhale, rest. Driven by frame timestamps rather than a fixed
//! tick, so progress is smooth at any refresh rate.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuidePhase {
    Inhale,
    Hold,
    Exhale,
    Rest,
}

impl GuidePhase {
    pub fn duration_ms(self) -> f64 {
        match self {
            GuidePhase::Inhale => 4000.0,
            GuidePhase::Hold => 2000.0,
            GuidePhase::Exhale => 4000.0,
            GuidePhase::Rest => 2000.0,
        }
    }

    pub fn next(self) -> Self {
        match self {
            GuidePhase::Inhale => GuidePhase::Hold,
            GuidePhase::Hold => GuidePhase::Exhale,
            GuidePhase::Exhale => GuidePhase::Rest,
            GuidePhase::Rest => GuidePhase::Inhale,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            GuidePhase::Inhale => "Breathe In",
            GuidePhase::Hold => "Hold",
            GuidePhase::Exhale => "Breathe Out",
            GuidePhase::Rest => "Pause",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreathGuide {
    phase: GuidePhase,
    active: bool,
    /// Timestamp the current phase began (ms); set on the first frame
    phase_start: Option<f64>,
    progress: f32,
}

impl Default for BreathGuide {
    fn default() -> Self {
        Self::new()
    }
}

impl BreathGuide {
    pub fn new() -> Self {
        Self {
            phase: GuidePhase::Inhale,
            active: false,
            phase_start: None,
            progress: 0.0,
        }
    }

    pub fn phase(&self) -> GuidePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Start from a fresh inhale, or stop
    pub fn toggle(&mut self) {
        self.active = !self.active;
        if self.active {
            self.phase = GuidePhase::Inhale;
            self.progress = 0.0;
        }
        self.phase_start = None;
    }

    /// Advance to the frame at `now_ms`; skips whole phases after a long gap
    pub fn frame(&mut self, now_ms: f64) {
        if !self.active {
            return;
        }
        let mut start = *self.phase_start.get_or_insert(now_ms);
        let mut elapsed = now_ms - start;
        while elapsed >= self.phase.duration_ms() {
            start += self.phase.duration_ms();
            elapsed -= self.phase.duration_ms();
            self.phase = self.phase.next();
        }
        self.phase_start = Some(start);
        self.progress = (elapsed / self.phase.duration_ms()) as f32;
    }

    /// Scale of the guide circle, 0.5 (empty lungs) to 1.0 (full)
    pub fn circle_scale(&self) -> f32 {
        match self.phase {
            GuidePhase::Inhale => 0.5 + self.progress * 0.5,
            GuidePhase::Hold => 1.0,
            GuidePhase::Exhale => 1.0 - self.progress * 0.5,
            GuidePhase::Rest => 0.5,
        }
    }

    /// Text under the circle
    pub fn message(&self) -> &'static str {
        if self.active {
            self.phase.message()
        } else {
            "Ready?"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walks_all_phases() {
        let mut guide = BreathGuide::new();
        guide.toggle();
        guide.frame(1000.0);
        assert_eq!(guide.phase(), GuidePhase::Inhale);
        assert_eq!(guide.circle_scale(), 0.5);

        guide.frame(3000.0);
        assert!((guide.circle_scale() - 0.75).abs() < 1e-6);

        guide.frame(5000.0);
        assert_eq!(guide.phase(), GuidePhase::Hold);
        assert_eq!(guide.circle_scale(), 1.0);

        guide.frame(7000.0);
        assert_eq!(guide.phase(), GuidePhase::Exhale);
        guide.frame(11000.0);
        assert_eq!(guide.phase(), GuidePhase::Rest);
        guide.frame(13000.0);
        assert_eq!(guide.phase(), GuidePhase::Inhale);
        assert_eq!(guide.progress(), 0.0);
    }

    #[test]
    fn test_toggle_stops_and_restarts_at_inhale() {
        let mut guide = BreathGuide::new();
        assert_eq!(guide.message(), "Ready?");
        guide.toggle();
        guide.frame(0.0);
        guide.frame(9000.0);
        assert_eq!(guide.phase(), GuidePhase::Exhale);

        guide.toggle();
        assert!(!guide.is_active());
        guide.frame(20000.0);
        assert_eq!(guide.phase(), GuidePhase::Exhale);

        guide.toggle();
        assert_eq!(guide.phase(), GuidePhase::Inhale);
        assert_eq!(guide.message(), "Breathe In");
    }
}
