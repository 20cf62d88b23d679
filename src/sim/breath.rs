//! Two-phase breath oscillator
//!
//! Elapsed time accumulates in fixed ticks; when it reaches half of the full
//! cycle the phase flips and elapsed restarts at zero.

use serde::{Deserialize, Serialize};

/// Current half of the breathing cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BreathPhase {
    #[default]
    Inhale,
    Exhale,
}

impl BreathPhase {
    pub fn flipped(self) -> Self {
        match self {
            BreathPhase::Inhale => BreathPhase::Exhale,
            BreathPhase::Exhale => BreathPhase::Inhale,
        }
    }

    /// Prompt shown above the progress bar
    pub fn prompt(self) -> &'static str {
        match self {
            BreathPhase::Inhale => "Breathe In",
            BreathPhase::Exhale => "Breathe Out",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreathOscillator {
    phase: BreathPhase,
    /// Milliseconds into the current phase
    elapsed_ms: u32,
    half_cycle_ms: u32,
    tick_ms: u32,
}

impl BreathOscillator {
    pub fn new(cycle_ms: u32, tick_ms: u32) -> Self {
        Self {
            phase: BreathPhase::Inhale,
            elapsed_ms: 0,
            half_cycle_ms: (cycle_ms / 2).max(1),
            tick_ms,
        }
    }

    pub fn phase(&self) -> BreathPhase {
        self.phase
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    pub fn half_cycle_ms(&self) -> u32 {
        self.half_cycle_ms
    }

    /// Back to the start of an inhale
    pub fn reset(&mut self) {
        self.phase = BreathPhase::Inhale;
        self.elapsed_ms = 0;
    }

    /// Advance one tick. Returns the new phase if this tick flipped it.
    pub fn tick(&mut self) -> Option<BreathPhase> {
        self.elapsed_ms += self.tick_ms;
        if self.elapsed_ms >= self.half_cycle_ms {
            self.phase = self.phase.flipped();
            self.elapsed_ms = 0;
            Some(self.phase)
        } else {
            None
        }
    }

    /// Fraction of the current phase completed, in [0, 1]
    pub fn progress(&self) -> f32 {
        (self.elapsed_ms as f32 / self.half_cycle_ms as f32).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(osc: &mut BreathOscillator, ms: u32) {
        for _ in 0..ms / 100 {
            osc.tick();
        }
    }

    #[test]
    fn test_flip_at_half_cycle() {
        let mut osc = BreathOscillator::new(8000, 100);
        run(&mut osc, 3900);
        assert_eq!(osc.phase(), BreathPhase::Inhale);
        assert_eq!(osc.elapsed_ms(), 3900);

        assert_eq!(osc.tick(), Some(BreathPhase::Exhale));
        assert_eq!(osc.elapsed_ms(), 0);
    }

    #[test]
    fn test_full_cycle_returns_to_inhale() {
        let mut osc = BreathOscillator::new(8000, 100);
        run(&mut osc, 8000);
        assert_eq!(osc.phase(), BreathPhase::Inhale);
        assert_eq!(osc.elapsed_ms(), 0);
    }

    #[test]
    fn test_progress() {
        let mut osc = BreathOscillator::new(8000, 100);
        assert_eq!(osc.progress(), 0.0);
        run(&mut osc, 2000);
        assert!((osc.progress() - 0.5).abs() < 1e-6);
        osc.reset();
        assert_eq!(osc.progress(), 0.0);
        assert_eq!(osc.phase(), BreathPhase::Inhale);
    }
}
