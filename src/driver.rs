//! Session driver
//!
//! Registers the four loops (countdown, phase clock, spawner, frames) with a
//! scheduler and owns their handles. Dropping the driver, calling
//! [`SessionDriver::stop`], or starting again cancels every loop; the loops
//! also stop themselves once the session ends.
//!
//! All loops share one `Rc<RefCell<_>>` and each callback holds the borrow
//! for its whole update, so no callback sees another's partial work.

use std::cell::RefCell;
use std::ops::ControlFlow;
use std::rc::Rc;

use glam::Vec2;

use crate::audio::{AudioSink, SoundCue};
use crate::config::SessionConfig;
use crate::error::Result;
use crate::highscores::HighScores;
use crate::platform::{PointerSource, Scheduler, TimerHandle};
use crate::renderer::{Surface, draw_frame};
use crate::settings::Settings;
use crate::sim::{
    BreathPhase, GameEvent, GameState, RandomSource, SessionState, frame_tick, phase_tick,
    countdown_tick, pointer, spawn_tick,
};

/// Values the page shows outside the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hud {
    pub session: SessionState,
    pub score: u64,
    pub time_remaining: u32,
    pub phase: BreathPhase,
    pub progress: f32,
    pub bubbles: usize,
}

/// Outcome of the last finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionResult {
    pub score: u64,
    /// Leaderboard rank, if it placed
    pub rank: Option<usize>,
}

/// Everything the loop callbacks touch
struct Shared {
    game: GameState,
    surface: Option<Box<dyn Surface>>,
    audio: Box<dyn AudioSink>,
    settings: Settings,
    highscores: HighScores,
    /// Wall-clock source for leaderboard timestamps (Unix ms)
    now: fn() -> f64,
    last_result: Option<SessionResult>,
}

impl Shared {
    /// Stop a loop once its session has ended
    fn flow(&self) -> ControlFlow<()> {
        if self.game.session == SessionState::Ended {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    fn redraw(&mut self, time_ms: f64) {
        if let Some(surface) = self.surface.as_mut() {
            draw_frame(
                surface.as_mut(),
                &self.game,
                time_ms,
                self.settings.effective_shimmer(),
            );
        }
    }

    /// Turn drained game events into cues and leaderboard updates
    fn dispatch_events(&mut self) {
        for event in self.game.drain_events() {
            match event {
                GameEvent::Popped { .. } => self.audio.play(SoundCue::Pop),
                GameEvent::PhaseChanged(phase) if self.settings.phase_chimes => {
                    self.audio.play(match phase {
                        BreathPhase::Inhale => SoundCue::Inhale,
                        BreathPhase::Exhale => SoundCue::Exhale,
                    });
                }
                GameEvent::SessionEnded { score } => {
                    self.audio.play(SoundCue::SessionEnd);
                    // Length the session was started with
                    let seconds = self.game.countdown.duration();
                    let rank = self.highscores.add_score(score, seconds, (self.now)());
                    if let Some(rank) = rank {
                        log::info!("Score {} placed #{}", score, rank);
                        self.highscores.save();
                        if rank == 1 {
                            self.audio.play(SoundCue::HighScore);
                        }
                    }
                    self.last_result = Some(SessionResult { score, rank });
                }
                _ => {}
            }
        }
    }
}

fn no_clock() -> f64 {
    0.0
}

pub struct SessionDriver {
    shared: Rc<RefCell<Shared>>,
    handles: Vec<TimerHandle>,
    /// Outlives restarts; input stays connected between sessions
    pointer_handle: Option<TimerHandle>,
}

impl SessionDriver {
    pub fn new(
        config: SessionConfig,
        rng: Box<dyn RandomSource>,
        audio: Box<dyn AudioSink>,
        settings: Settings,
        highscores: HighScores,
    ) -> Self {
        let mut audio = audio;
        audio.set_volume(settings.effective_volume());
        audio.set_muted(settings.muted);
        Self {
            shared: Rc::new(RefCell::new(Shared {
                game: GameState::new(config, rng),
                surface: None,
                audio,
                settings,
                highscores,
                now: no_clock,
                last_result: None,
            })),
            handles: Vec::new(),
            pointer_handle: None,
        }
    }

    /// Use `now` (Unix ms) to timestamp leaderboard entries
    pub fn with_wall_clock(self, now: fn() -> f64) -> Self {
        self.shared.borrow_mut().now = now;
        self
    }

    /// Attach the drawing surface; spawning and drawing are skipped without one
    pub fn attach_surface(&mut self, surface: Box<dyn Surface>) {
        let mut shared = self.shared.borrow_mut();
        shared.game.set_surface_size(Some(surface.size()));
        shared.surface = Some(surface);
    }

    /// Follow a viewport resize; new bubbles spawn within the new bounds
    pub fn resize_surface(&mut self, width: f32, height: f32) {
        let mut shared = self.shared.borrow_mut();
        let Some(surface) = shared.surface.as_mut() else {
            return;
        };
        surface.resize(width, height);
        let size = surface.size();
        log::debug!("Surface resized to {}x{}", size.x, size.y);
        shared.game.set_surface_size(Some(size));
    }

    pub fn detach_surface(&mut self) -> Option<Box<dyn Surface>> {
        let mut shared = self.shared.borrow_mut();
        shared.game.set_surface_size(None);
        shared.surface.take()
    }

    /// Start (or restart) a session and register its loops.
    ///
    /// Loops run in registration order when due together: countdown, phase
    /// clock, spawner, frame. The session only (re)starts once every new
    /// loop is in place; a registration error leaves the current session and
    /// its loops as they were.
    pub fn start(&mut self, scheduler: &mut impl Scheduler) -> Result<()> {
        let config = self.shared.borrow().game.config.clone();
        let handles = self.register_loops(scheduler, &config)?;
        self.stop();

        {
            let mut shared = self.shared.borrow_mut();
            shared.game.start();
            shared.dispatch_events();
        }
        self.handles = handles;
        Ok(())
    }

    /// Registered into a local: an error drops (cancels) what was set up
    fn register_loops(
        &self,
        scheduler: &mut impl Scheduler,
        config: &SessionConfig,
    ) -> Result<Vec<TimerHandle>> {
        let mut handles = Vec::with_capacity(4);

        // Runs at the phase-tick cadence so paused time is dropped per tick
        let shared = self.shared.clone();
        let step_ms = config.phase_tick_ms;
        handles.push(scheduler.set_interval(
            step_ms,
            Box::new(move || {
                let mut shared = shared.borrow_mut();
                countdown_tick(&mut shared.game, step_ms);
                shared.dispatch_events();
                shared.flow()
            }),
        )?);

        let shared = self.shared.clone();
        handles.push(scheduler.set_interval(
            config.phase_tick_ms,
            Box::new(move || {
                let mut shared = shared.borrow_mut();
                phase_tick(&mut shared.game);
                shared.dispatch_events();
                shared.flow()
            }),
        )?);

        let shared = self.shared.clone();
        handles.push(scheduler.set_interval(
            config.spawn_interval_ms,
            Box::new(move || {
                let mut shared = shared.borrow_mut();
                spawn_tick(&mut shared.game);
                shared.dispatch_events();
                shared.flow()
            }),
        )?);

        let shared = self.shared.clone();
        handles.push(scheduler.request_frames(Box::new(move |time_ms| {
            let mut shared = shared.borrow_mut();
            // Motion before the redraw that reads it
            frame_tick(&mut shared.game);
            shared.redraw(time_ms);
            shared.dispatch_events();
            shared.flow()
        }))?);

        Ok(handles)
    }

    /// Cancel every loop (teardown or navigation away)
    pub fn stop(&mut self) {
        if !self.handles.is_empty() {
            log::debug!("Cancelling {} session loops", self.handles.len());
        }
        self.handles.clear();
    }

    /// Any loop still scheduled
    pub fn is_running(&self) -> bool {
        self.handles.iter().any(|h| !h.is_cancelled())
    }

    pub fn pause(&self) {
        let mut shared = self.shared.borrow_mut();
        shared.game.pause();
        shared.dispatch_events();
    }

    pub fn resume(&self) {
        let mut shared = self.shared.borrow_mut();
        shared.game.resume();
        shared.dispatch_events();
    }

    /// Route presses from `source` into the session, replacing any earlier
    /// source. Disconnected when the driver is dropped.
    pub fn connect_pointer(&mut self, source: &mut impl PointerSource) -> Result<()> {
        let weak = Rc::downgrade(&self.shared);
        let handle = source.on_press(Box::new(move |pos: Vec2| {
            if let Some(shared) = weak.upgrade() {
                let mut shared = shared.borrow_mut();
                pointer(&mut shared.game, pos);
                shared.dispatch_events();
            }
        }))?;
        self.pointer_handle = Some(handle);
        Ok(())
    }

    /// Pointer press at surface-local pixel coordinates
    pub fn pointer(&self, x: f32, y: f32) -> u64 {
        let mut shared = self.shared.borrow_mut();
        let awarded = pointer(&mut shared.game, Vec2::new(x, y));
        shared.dispatch_events();
        awarded
    }

    /// Draw the current state outside the frame loop (e.g. while idle)
    pub fn redraw(&self, time_ms: f64) {
        self.shared.borrow_mut().redraw(time_ms);
    }

    pub fn hud(&self) -> Hud {
        let shared = self.shared.borrow();
        let game = &shared.game;
        Hud {
            session: game.session,
            score: game.score,
            time_remaining: game.time_remaining(),
            phase: game.phase(),
            progress: game.breath.progress(),
            bubbles: game.field.len(),
        }
    }

    pub fn last_result(&self) -> Option<SessionResult> {
        self.shared.borrow().last_result
    }

    pub fn settings(&self) -> Settings {
        self.shared.borrow().settings.clone()
    }

    /// Apply new preferences. A changed session length takes effect on the
    /// next start; an unchanged one keeps the configured length.
    pub fn set_settings(&self, settings: Settings) {
        let mut shared = self.shared.borrow_mut();
        shared.audio.set_volume(settings.effective_volume());
        shared.audio.set_muted(settings.muted);
        if settings.session_seconds != shared.settings.session_seconds {
            let config = settings.session_config(shared.game.config.clone());
            shared.game.config = config;
        }
        shared.settings = settings;
        shared.settings.save();
    }

    pub fn highscores(&self) -> HighScores {
        self.shared.borrow().highscores.clone()
    }

    /// Inspect the game state (tests and debugging)
    pub fn with_state<R>(&self, f: impl FnOnce(&GameState) -> R) -> R {
        f(&self.shared.borrow().game)
    }
}

impl Drop for SessionDriver {
    fn drop(&mut self) {
        self.stop();
        self.pointer_handle = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingAudio;
    use crate::error::Error;
    use crate::platform::{
        FrameCallback, FrameScheduler, IntervalTimer, TickCallback, VirtualClock, VirtualPointer,
    };
    use crate::renderer::RecordingSurface;
    use crate::sim::ScriptedRandom;

    /// Intervals run on the clock; the display refuses frame callbacks
    struct NoDisplay<'a>(&'a mut VirtualClock);

    impl IntervalTimer for NoDisplay<'_> {
        fn set_interval(&mut self, period_ms: u32, callback: TickCallback) -> Result<TimerHandle> {
            self.0.set_interval(period_ms, callback)
        }
    }

    impl FrameScheduler for NoDisplay<'_> {
        fn request_frames(&mut self, _callback: FrameCallback) -> Result<TimerHandle> {
            Err(Error::Platform("no display".into()))
        }
    }

    /// radius 20, centered x (400 on an 800 px surface), speed 1
    fn driver(audio: RecordingAudio) -> SessionDriver {
        driver_with(SessionConfig::default(), audio)
    }

    fn driver_with(config: SessionConfig, audio: RecordingAudio) -> SessionDriver {
        SessionDriver::new(
            config,
            Box::new(ScriptedRandom::new([0.0, 0.5, 0.0])),
            Box::new(audio),
            Settings::default(),
            HighScores::new(),
        )
    }

    #[test]
    fn test_end_to_end_session() {
        let audio = RecordingAudio::new();
        let cues = audio.cues();
        let mut driver = driver(audio);
        let surface = Rc::new(RefCell::new(RecordingSurface::new(800.0, 500.0)));
        driver.attach_surface(Box::new(surface.clone()));

        let mut clock = VirtualClock::new();
        driver.start(&mut clock).unwrap();
        assert!(driver.is_running());

        // Phase flips to exhale at 4000 ms before that instant's spawn check
        clock.advance(4000);
        let hud = driver.hud();
        assert_eq!(hud.phase, BreathPhase::Exhale);
        assert_eq!(hud.bubbles, 1);
        assert_eq!(hud.time_remaining, 56);

        // Spawns at 5000, 6000, 7000; back to inhale at 8000 before the spawn check
        clock.advance(4000);
        let hud = driver.hud();
        assert_eq!(hud.phase, BreathPhase::Inhale);
        assert_eq!(hud.bubbles, 4);

        let before: Vec<_> = driver.with_state(|s| s.field.bubbles().to_vec());
        let target = before[0].clone();
        assert_eq!(driver.pointer(target.pos.x, target.pos.y), 10);

        let after: Vec<_> = driver.with_state(|s| s.field.bubbles().to_vec());
        assert_eq!(after.len(), 3);
        assert!(after.iter().all(|b| b.id != target.id));
        // The click didn't move anything else
        assert_eq!(after, before[1..].to_vec());
        assert_eq!(driver.hud().score, 10);

        // Last frame drawn before the pop
        assert_eq!(surface.borrow().circles().count(), 4);

        // Run the session out
        clock.advance(52_000);
        let hud = driver.hud();
        assert_eq!(hud.session, SessionState::Ended);
        assert_eq!(hud.time_remaining, 0);
        assert!(!driver.is_running());
        assert_eq!(clock.pending(), 0);

        assert_eq!(
            driver.last_result(),
            Some(SessionResult {
                score: 10,
                rank: Some(1)
            })
        );
        let cues = cues.borrow();
        assert!(cues.contains(&SoundCue::Pop));
        assert!(cues.contains(&SoundCue::Exhale));
        assert_eq!(&cues[cues.len() - 2..], &[SoundCue::SessionEnd, SoundCue::HighScore]);

        // Ended state stays put
        let frames = surface.borrow().frames();
        clock.advance(5000);
        assert_eq!(surface.borrow().frames(), frames);
        assert_eq!(driver.hud().score, 10);
    }

    #[test]
    fn test_pop_during_exhale_ignored() {
        let mut driver = driver(RecordingAudio::new());
        driver.attach_surface(Box::new(RecordingSurface::new(800.0, 500.0)));
        let mut clock = VirtualClock::new();
        driver.start(&mut clock).unwrap();

        clock.advance(5000);
        assert_eq!(driver.hud().phase, BreathPhase::Exhale);
        let bubble = driver.with_state(|s| s.field.bubbles()[0].clone());
        assert_eq!(driver.pointer(bubble.pos.x, bubble.pos.y), 0);
        assert_eq!(driver.hud().bubbles, 2);
        assert_eq!(driver.hud().score, 0);
    }

    #[test]
    fn test_pointer_source_pops_while_inhaling() {
        let mut driver = driver(RecordingAudio::new());
        driver.attach_surface(Box::new(RecordingSurface::new(800.0, 500.0)));
        let mut pointer = VirtualPointer::new();
        driver.connect_pointer(&mut pointer).unwrap();
        let mut clock = VirtualClock::new();
        driver.start(&mut clock).unwrap();

        clock.advance(8000);
        let bubble = driver.with_state(|s| s.field.bubbles()[1].clone());
        pointer.press(bubble.pos.x, bubble.pos.y);
        assert_eq!(driver.hud().score, 10);
        assert_eq!(driver.hud().bubbles, 3);

        // A miss changes nothing
        pointer.press(5.0, 5.0);
        assert_eq!(driver.hud().score, 10);

        drop(driver);
        assert_eq!(pointer.listeners(), 0);
    }

    #[test]
    fn test_drop_cancels_loops() {
        let mut clock = VirtualClock::new();
        {
            let mut driver = driver(RecordingAudio::new());
            driver.start(&mut clock).unwrap();
            assert_eq!(clock.pending(), 4);
        }
        clock.advance(1000);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn test_restart_replaces_loops() {
        let mut driver = driver(RecordingAudio::new());
        let mut clock = VirtualClock::new();
        driver.start(&mut clock).unwrap();
        clock.advance(3000);
        driver.start(&mut clock).unwrap();
        clock.advance(1000);

        // Only one countdown running
        assert_eq!(driver.hud().time_remaining, 59);
        assert_eq!(clock.pending(), 4);
    }

    #[test]
    fn test_pause_resume_keeps_countdown() {
        let mut driver = driver(RecordingAudio::new());
        driver.attach_surface(Box::new(RecordingSurface::new(800.0, 500.0)));
        let mut clock = VirtualClock::new();
        driver.start(&mut clock).unwrap();

        clock.advance(10_000);
        driver.pause();
        let paused = driver.hud();
        clock.advance(10_000);
        let still = driver.hud();
        assert_eq!(still.session, SessionState::Paused);
        assert_eq!(still.time_remaining, 50);
        assert_eq!(still.bubbles, paused.bubbles);

        driver.resume();
        clock.advance(1000);
        assert_eq!(driver.hud().time_remaining, 49);
    }

    #[test]
    fn test_without_surface_nothing_spawns() {
        let mut driver = driver(RecordingAudio::new());
        let mut clock = VirtualClock::new();
        driver.start(&mut clock).unwrap();
        clock.advance(8000);
        assert_eq!(driver.hud().bubbles, 0);
        assert!(driver.hud().session.is_active());
    }

    #[test]
    fn test_phase_chimes_follow_settings() {
        let audio = RecordingAudio::new();
        let cues = audio.cues();
        let mut driver = driver(audio);
        driver.set_settings(Settings {
            phase_chimes: false,
            ..Default::default()
        });
        let mut clock = VirtualClock::new();
        driver.start(&mut clock).unwrap();
        clock.advance(8000);
        assert!(cues.borrow().is_empty());
    }

    #[test]
    fn test_paused_time_never_counts() {
        let mut driver = driver(RecordingAudio::new());
        let mut clock = VirtualClock::new();
        driver.start(&mut clock).unwrap();

        for _ in 0..5 {
            clock.advance(100);
            driver.pause();
            clock.advance(800);
            driver.resume();
            clock.advance(100);
        }
        // 1000 ms active in total
        assert_eq!(driver.hud().time_remaining, 59);
        assert_eq!(driver.with_state(|s| s.breath.elapsed_ms()), 1000);
    }

    #[test]
    fn test_unchanged_settings_keep_configured_length() {
        let config = SessionConfig::default().with_session_seconds(10);
        let mut driver = driver_with(config, RecordingAudio::new());
        driver.set_settings(Settings {
            phase_chimes: false,
            ..Default::default()
        });
        let mut clock = VirtualClock::new();
        driver.start(&mut clock).unwrap();
        assert_eq!(driver.hud().time_remaining, 10);

        clock.advance(10_000);
        assert_eq!(driver.hud().session, SessionState::Ended);
    }

    #[test]
    fn test_length_change_applies_next_session() {
        let mut driver = driver(RecordingAudio::new());
        driver.attach_surface(Box::new(RecordingSurface::new(800.0, 500.0)));
        let mut clock = VirtualClock::new();
        driver.start(&mut clock).unwrap();

        clock.advance(8000);
        let bubble = driver.with_state(|s| s.field.bubbles()[0].clone());
        assert_eq!(driver.pointer(bubble.pos.x, bubble.pos.y), 10);

        driver.set_settings(Settings {
            session_seconds: 120,
            ..Default::default()
        });
        clock.advance(52_000);
        assert_eq!(driver.hud().session, SessionState::Ended);
        // Recorded with the length it was played at
        let entries = driver.highscores().entries;
        assert_eq!(entries[0].score, 10);
        assert_eq!(entries[0].session_seconds, 60);

        driver.start(&mut clock).unwrap();
        assert_eq!(driver.hud().time_remaining, 120);
    }

    #[test]
    fn test_failed_registration_leaves_session_idle() {
        let mut driver = driver(RecordingAudio::new());
        let mut clock = VirtualClock::new();
        assert!(matches!(
            driver.start(&mut NoDisplay(&mut clock)),
            Err(Error::Platform(_))
        ));
        assert_eq!(driver.hud().session, SessionState::Idle);
        assert!(!driver.is_running());
        assert_eq!(clock.pending(), 0);

        // A running session survives a failed restart
        driver.start(&mut clock).unwrap();
        clock.advance(2000);
        assert!(driver.start(&mut NoDisplay(&mut clock)).is_err());
        assert!(driver.hud().session.is_active());
        assert_eq!(driver.hud().time_remaining, 58);
        assert_eq!(clock.pending(), 4);
    }

    #[test]
    fn test_resize_moves_spawn_bounds() {
        let mut driver = driver(RecordingAudio::new());
        let surface = Rc::new(RefCell::new(RecordingSurface::new(800.0, 500.0)));
        driver.attach_surface(Box::new(surface.clone()));
        driver.resize_surface(100.0, 200.0);
        assert_eq!(surface.borrow().size(), Vec2::new(100.0, 200.0));
        assert_eq!(
            driver.with_state(|s| s.surface_size),
            Some(Vec2::new(100.0, 200.0))
        );

        let mut clock = VirtualClock::new();
        driver.start(&mut clock).unwrap();
        clock.advance(4000);
        let bubble = driver.with_state(|s| s.field.bubbles()[0].clone());
        // radius 20 inset into the 100 px width, entering below the 200 px floor
        assert_eq!(bubble.pos.x, 50.0);
        assert!(bubble.pos.y > 200.0 && bubble.pos.y <= 220.0);
    }
}
