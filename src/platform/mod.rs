//! Platform abstraction layer
//!
//! Periodic callbacks come from two kinds of scheduler:
//! - [`IntervalTimer`]: fixed-period ticks (countdown, phase clock, spawner)
//! - [`FrameScheduler`]: once per display refresh (motion + redraw)
//!
//! Pointer presses come from a [`PointerSource`].
//!
//! Registering returns a [`TimerHandle`]; dropping the handle cancels the
//! callback, so whoever owns the handles owns the callbacks' lifetime.
//! A callback may also stop itself by returning `ControlFlow::Break`.

use std::cell::Cell;
use std::ops::ControlFlow;
use std::rc::Rc;

use glam::Vec2;

use crate::error::Result;

pub mod virtual_clock;
pub mod virtual_pointer;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use virtual_clock::VirtualClock;
pub use virtual_pointer::VirtualPointer;
#[cfg(target_arch = "wasm32")]
pub use web::{BrowserScheduler, CanvasPointer};

/// Fixed-period tick callback
pub type TickCallback = Box<dyn FnMut() -> ControlFlow<()>>;
/// Per-frame callback, given the frame timestamp in milliseconds
pub type FrameCallback = Box<dyn FnMut(f64) -> ControlFlow<()>>;

pub trait IntervalTimer {
    fn set_interval(&mut self, period_ms: u32, callback: TickCallback) -> Result<TimerHandle>;
}

pub trait FrameScheduler {
    fn request_frames(&mut self, callback: FrameCallback) -> Result<TimerHandle>;
}

/// Press handler, given surface-local pixel coordinates
pub type PointerCallback = Box<dyn FnMut(Vec2)>;

pub trait PointerSource {
    fn on_press(&mut self, callback: PointerCallback) -> Result<TimerHandle>;
}

/// Both kinds of scheduling, as one session needs
pub trait Scheduler: IntervalTimer + FrameScheduler {}

impl<T: IntervalTimer + FrameScheduler> Scheduler for T {}

/// Cancels its callback when cancelled or dropped
pub struct TimerHandle {
    cancelled: Rc<Cell<bool>>,
    cleanup: Option<Box<dyn FnOnce()>>,
}

impl TimerHandle {
    /// Handle over a shared cancel flag the scheduler checks before each call
    pub fn new(cancelled: Rc<Cell<bool>>) -> Self {
        Self {
            cancelled,
            cleanup: None,
        }
    }

    /// Like [`TimerHandle::new`], also running `cleanup` once on cancel
    pub fn with_cleanup(cancelled: Rc<Cell<bool>>, cleanup: impl FnOnce() + 'static) -> Self {
        Self {
            cancelled,
            cleanup: Some(Box::new(cleanup)),
        }
    }

    /// True once cancelled, or once the callback stopped itself
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    pub fn cancel(&mut self) {
        self.cancelled.set(true);
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle")
            .field("cancelled", &self.cancelled.get())
            .finish()
    }
}
