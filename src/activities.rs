//! Companion activities
//!
//! Guided breathing, a timed mindfulness exercise and memory match. Each
//! driver owns the handle of the one loop its activity needs, the same way
//! [`SessionDriver`](crate::SessionDriver) owns the session loops: dropping
//! the driver or stopping the activity cancels it.

use std::cell::RefCell;
use std::ops::ControlFlow;
use std::rc::Rc;

use crate::audio::{AudioSink, SoundCue};
use crate::error::Result;
use crate::platform::{FrameScheduler, IntervalTimer, TimerHandle};
use crate::renderer::{Surface, draw_guide};
use crate::sim::{
    BreathGuide, Exercise, FLIP_BACK_MS, MemoryGame, MindfulnessTimer, PickOutcome, RandomSource,
};

struct GuideShared {
    guide: BreathGuide,
    surface: Option<Box<dyn Surface>>,
}

impl GuideShared {
    fn redraw(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            draw_guide(surface.as_mut(), &self.guide);
        }
    }
}

/// Animated box-breathing guide, redrawn every frame while active
pub struct GuideDriver {
    shared: Rc<RefCell<GuideShared>>,
    frames: Option<TimerHandle>,
}

impl Default for GuideDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl GuideDriver {
    pub fn new() -> Self {
        Self {
            shared: Rc::new(RefCell::new(GuideShared {
                guide: BreathGuide::new(),
                surface: None,
            })),
            frames: None,
        }
    }

    pub fn attach_surface(&mut self, surface: Box<dyn Surface>) {
        let mut shared = self.shared.borrow_mut();
        shared.surface = Some(surface);
        shared.redraw();
    }

    /// Start from a fresh inhale, or stop and show the idle prompt
    pub fn toggle(&mut self, frames: &mut impl FrameScheduler) -> Result<()> {
        if self.frames.take().is_some() {
            let mut shared = self.shared.borrow_mut();
            shared.guide.toggle();
            shared.redraw();
            log::debug!("Breathing guide stopped");
            return Ok(());
        }

        let shared = self.shared.clone();
        let handle = frames.request_frames(Box::new(move |time_ms| {
            let mut shared = shared.borrow_mut();
            shared.guide.frame(time_ms);
            shared.redraw();
            ControlFlow::Continue(())
        }))?;
        self.shared.borrow_mut().guide.toggle();
        self.frames = Some(handle);
        log::debug!("Breathing guide started");
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.frames.is_some()
    }

    pub fn guide(&self) -> BreathGuide {
        self.shared.borrow().guide.clone()
    }
}

struct MindfulnessShared {
    timer: MindfulnessTimer,
    audio: Box<dyn AudioSink>,
}

/// Runs a [`MindfulnessTimer`] on a one-second interval.
///
/// Pausing cancels the interval and resuming registers a fresh one, so time
/// spent paused never counts.
pub struct MindfulnessDriver {
    shared: Rc<RefCell<MindfulnessShared>>,
    ticker: Option<TimerHandle>,
}

impl MindfulnessDriver {
    pub fn new(exercise: Exercise, audio: Box<dyn AudioSink>) -> Self {
        Self {
            shared: Rc::new(RefCell::new(MindfulnessShared {
                timer: MindfulnessTimer::new(exercise),
                audio,
            })),
            ticker: None,
        }
    }

    /// Start, pause, or resume. Does nothing once the exercise is complete.
    pub fn toggle(&mut self, intervals: &mut impl IntervalTimer) -> Result<()> {
        {
            let mut shared = self.shared.borrow_mut();
            if shared.timer.is_running() {
                shared.timer.toggle();
                self.ticker = None;
                return Ok(());
            }
            if shared.timer.remaining() == 0 {
                return Ok(());
            }
        }

        let shared = self.shared.clone();
        let handle = intervals.set_interval(
            1000,
            Box::new(move || {
                let mut shared = shared.borrow_mut();
                if shared.timer.second_tick() {
                    shared.audio.play(SoundCue::SessionEnd);
                    return ControlFlow::Break(());
                }
                ControlFlow::Continue(())
            }),
        )?;
        self.shared.borrow_mut().timer.toggle();
        self.ticker = Some(handle);
        Ok(())
    }

    /// Back to the full duration, stopped
    pub fn reset(&mut self) {
        self.ticker = None;
        self.shared.borrow_mut().timer.reset();
    }

    pub fn with_timer<R>(&self, f: impl FnOnce(&MindfulnessTimer) -> R) -> R {
        f(&self.shared.borrow().timer)
    }
}

struct MemoryShared {
    game: MemoryGame,
    rng: Box<dyn RandomSource>,
    audio: Box<dyn AudioSink>,
}

/// Memory match with the mismatch flip-back on a one-shot timer
pub struct MemoryDriver {
    shared: Rc<RefCell<MemoryShared>>,
    flip_back: Option<TimerHandle>,
}

impl MemoryDriver {
    pub fn new(rng: Box<dyn RandomSource>, audio: Box<dyn AudioSink>) -> Self {
        Self {
            shared: Rc::new(RefCell::new(MemoryShared {
                game: MemoryGame::new(),
                rng,
                audio,
            })),
            flip_back: None,
        }
    }

    /// Deal a new board, dropping any pending flip-back
    pub fn deal(&mut self, pairs: usize) {
        self.flip_back = None;
        let shared = &mut *self.shared.borrow_mut();
        shared.game.deal(pairs, shared.rng.as_mut());
    }

    pub fn pick(&mut self, index: usize, intervals: &mut impl IntervalTimer) -> Result<PickOutcome> {
        let outcome = {
            let mut shared = self.shared.borrow_mut();
            let outcome = shared.game.pick(index);
            if outcome == PickOutcome::Matched {
                shared.audio.play(SoundCue::Pop);
                if shared.game.is_complete() {
                    shared.audio.play(SoundCue::SessionEnd);
                }
            }
            outcome
        };

        if outcome == PickOutcome::Mismatched {
            let shared = self.shared.clone();
            let handle = intervals.set_interval(
                FLIP_BACK_MS,
                Box::new(move || {
                    shared.borrow_mut().game.resolve_mismatch();
                    ControlFlow::Break(())
                }),
            );
            match handle {
                Ok(handle) => self.flip_back = Some(handle),
                Err(e) => {
                    // Never leave the board locked
                    self.shared.borrow_mut().game.resolve_mismatch();
                    return Err(e);
                }
            }
        }
        Ok(outcome)
    }

    pub fn with_game<R>(&self, f: impl FnOnce(&MemoryGame) -> R) -> R {
        f(&self.shared.borrow().game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingAudio;
    use crate::platform::VirtualClock;
    use crate::renderer::RecordingSurface;
    use crate::sim::{GuidePhase, ScriptedRandom};

    fn exercise(minutes: u32) -> Exercise {
        Exercise {
            title: "Breath Awareness".to_string(),
            minutes,
            instructions: vec!["Notice the breath".into(), "Let thoughts pass".into()],
        }
    }

    #[test]
    fn test_guide_follows_frames() {
        let mut driver = GuideDriver::new();
        let surface = Rc::new(RefCell::new(RecordingSurface::new(400.0, 400.0)));
        driver.attach_surface(Box::new(surface.clone()));
        assert!(surface.borrow().texts().any(|t| t == "Ready?"));

        let mut clock = VirtualClock::new();
        driver.toggle(&mut clock).unwrap();
        assert!(driver.is_active());
        // First frame anchors the phase
        clock.advance(16);
        assert_eq!(driver.guide().phase(), GuidePhase::Inhale);
        clock.advance(4000);
        assert_eq!(driver.guide().phase(), GuidePhase::Hold);
        assert!(surface.borrow().texts().any(|t| t == GuidePhase::Hold.message()));
        assert_eq!(surface.borrow().circles().next().map(|(_, r)| r), Some(200.0));

        driver.toggle(&mut clock).unwrap();
        assert!(!driver.is_active());
        assert_eq!(clock.pending(), 0);
        assert!(surface.borrow().texts().any(|t| t == "Ready?"));
    }

    #[test]
    fn test_mindfulness_pause_holds_time() {
        let audio = RecordingAudio::new();
        let cues = audio.cues();
        let mut driver = MindfulnessDriver::new(exercise(1), Box::new(audio));
        let mut clock = VirtualClock::new();

        driver.toggle(&mut clock).unwrap();
        clock.advance(30_000);
        assert_eq!(driver.with_timer(|t| t.remaining()), 30);

        driver.toggle(&mut clock).unwrap();
        assert_eq!(clock.pending(), 0);
        clock.advance(10_000);
        assert_eq!(driver.with_timer(|t| t.remaining()), 30);

        driver.toggle(&mut clock).unwrap();
        clock.advance(30_000);
        assert_eq!(driver.with_timer(|t| t.remaining()), 0);
        assert!(!driver.with_timer(|t| t.is_running()));
        assert_eq!(clock.pending(), 0);
        assert_eq!(*cues.borrow(), vec![SoundCue::SessionEnd]);

        // Complete stays complete until reset
        driver.toggle(&mut clock).unwrap();
        clock.advance(5000);
        assert_eq!(clock.pending(), 0);
        assert_eq!(cues.borrow().len(), 1);

        driver.reset();
        assert_eq!(driver.with_timer(|t| t.remaining()), 60);
        assert!(!driver.with_timer(|t| t.has_started()));
    }

    #[test]
    fn test_memory_flip_back_after_delay() {
        let audio = RecordingAudio::new();
        let cues = audio.cues();
        let mut driver = MemoryDriver::new(Box::new(ScriptedRandom::new([0.0])), Box::new(audio));
        driver.deal(2);
        let faces: Vec<usize> = driver.with_game(|g| g.cards().iter().map(|c| c.face).collect());
        let a: Vec<usize> = (0..4).filter(|&i| faces[i] == 0).collect();
        let b: Vec<usize> = (0..4).filter(|&i| faces[i] == 1).collect();

        let mut clock = VirtualClock::new();
        driver.pick(a[0], &mut clock).unwrap();
        assert_eq!(driver.pick(b[0], &mut clock).unwrap(), PickOutcome::Mismatched);
        clock.advance(FLIP_BACK_MS as u64 - 1);
        assert!(driver.with_game(|g| g.is_locked()));
        clock.advance(1);
        assert!(!driver.with_game(|g| g.is_locked()));
        assert_eq!(clock.pending(), 0);

        driver.pick(a[0], &mut clock).unwrap();
        assert_eq!(driver.pick(a[1], &mut clock).unwrap(), PickOutcome::Matched);
        driver.pick(b[0], &mut clock).unwrap();
        assert_eq!(driver.pick(b[1], &mut clock).unwrap(), PickOutcome::Matched);
        assert!(driver.with_game(|g| g.is_complete()));
        assert_eq!(driver.with_game(|g| g.turns()), 3);
        assert_eq!(
            *cues.borrow(),
            vec![SoundCue::Pop, SoundCue::Pop, SoundCue::SessionEnd]
        );
    }

    #[test]
    fn test_memory_redeal_cancels_flip_back() {
        let mut driver = MemoryDriver::new(
            Box::new(ScriptedRandom::new([0.0])),
            Box::new(RecordingAudio::new()),
        );
        driver.deal(2);
        let faces: Vec<usize> = driver.with_game(|g| g.cards().iter().map(|c| c.face).collect());
        let first = faces.iter().position(|&f| f == 0).unwrap();
        let other = faces.iter().position(|&f| f == 1).unwrap();

        let mut clock = VirtualClock::new();
        driver.pick(first, &mut clock).unwrap();
        driver.pick(other, &mut clock).unwrap();
        assert_eq!(clock.pending(), 1);

        driver.deal(2);
        assert_eq!(clock.pending(), 0);
        assert!(!driver.with_game(|g| g.is_locked()));
        assert_eq!(driver.with_game(|g| g.turns()), 0);
    }
}
