//! Guided mindfulness session timer
//!
//! Counts down an exercise of whole minutes, rotating through its
//! instructions while running. Pausing keeps the remaining time.

use serde::{Deserialize, Serialize};

use super::countdown::Countdown;

/// Seconds each instruction stays on screen
pub const INSTRUCTION_SECONDS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub title: String,
    pub minutes: u32,
    pub instructions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindfulnessTimer {
    exercise: Exercise,
    countdown: Countdown,
    running: bool,
    started: bool,
    instruction: usize,
    /// Seconds the current instruction has been shown
    instruction_elapsed: u32,
}

impl MindfulnessTimer {
    pub fn new(exercise: Exercise) -> Self {
        let countdown = Countdown::new(exercise.minutes * 60);
        Self {
            exercise,
            countdown,
            running: false,
            started: false,
            instruction: 0,
            instruction_elapsed: 0,
        }
    }

    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    /// Fraction of the exercise completed, in [0, 1]
    pub fn progress(&self) -> f32 {
        let total = self.countdown.duration();
        if total == 0 {
            return 1.0;
        }
        1.0 - self.countdown.remaining() as f32 / total as f32
    }

    pub fn current_instruction(&self) -> Option<&str> {
        self.exercise
            .instructions
            .get(self.instruction)
            .map(String::as_str)
    }

    /// Start, pause, or resume
    pub fn toggle(&mut self) {
        if self.countdown.is_expired() {
            return;
        }
        self.started = true;
        self.running = !self.running;
    }

    pub fn reset(&mut self) {
        self.countdown.reset();
        self.running = false;
        self.started = false;
        self.instruction = 0;
        self.instruction_elapsed = 0;
    }

    /// One second elapsed. Returns true exactly once, when the exercise completes.
    pub fn second_tick(&mut self) -> bool {
        if !self.running {
            return false;
        }

        let count = self.exercise.instructions.len();
        if count > 1 {
            self.instruction_elapsed += 1;
            if self.instruction_elapsed >= INSTRUCTION_SECONDS {
                self.instruction_elapsed = 0;
                self.instruction = (self.instruction + 1) % count;
            }
        }

        if self.countdown.tick() {
            self.running = false;
            log::info!("Exercise \"{}\" complete", self.exercise.title);
            return true;
        }
        false
    }
}

/// `MM:SS`
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
