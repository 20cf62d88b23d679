//! Deterministic scheduler driven by an explicit virtual clock
//!
//! Callbacks due at the same instant run in registration order. Frames are
//! delivered at a fixed interval (60 Hz by default).

use std::cell::Cell;
use std::rc::Rc;

use super::{FrameCallback, FrameScheduler, IntervalTimer, TickCallback, TimerHandle};
use crate::error::Result;

/// ~60 Hz
pub const DEFAULT_FRAME_MS: u64 = 16;

enum Callback {
    Interval(TickCallback),
    Frame(FrameCallback),
}

struct Entry {
    seq: u64,
    period_ms: u64,
    next_due: u64,
    cancelled: Rc<Cell<bool>>,
    callback: Callback,
}

pub struct VirtualClock {
    now_ms: u64,
    frame_ms: u64,
    next_seq: u64,
    entries: Vec<Entry>,
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::with_frame_interval(DEFAULT_FRAME_MS)
    }

    pub fn with_frame_interval(frame_ms: u64) -> Self {
        Self {
            now_ms: 0,
            frame_ms: frame_ms.max(1),
            next_seq: 0,
            entries: Vec::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Registered callbacks that haven't been cancelled
    pub fn pending(&self) -> usize {
        self.entries.iter().filter(|e| !e.cancelled.get()).count()
    }

    fn register(&mut self, period_ms: u64, callback: Callback) -> TimerHandle {
        let cancelled = Rc::new(Cell::new(false));
        let period_ms = period_ms.max(1);
        self.entries.push(Entry {
            seq: self.next_seq,
            period_ms,
            next_due: self.now_ms + period_ms,
            cancelled: cancelled.clone(),
            callback,
        });
        self.next_seq += 1;
        TimerHandle::new(cancelled)
    }

    /// Run every callback due within the next `ms` milliseconds, in time order
    pub fn advance(&mut self, ms: u64) {
        let target = self.now_ms + ms;
        loop {
            self.entries.retain(|e| !e.cancelled.get());
            let next = self
                .entries
                .iter_mut()
                .filter(|e| e.next_due <= target)
                .min_by_key(|e| (e.next_due, e.seq));
            let Some(entry) = next else {
                break;
            };

            self.now_ms = entry.next_due;
            let flow = match &mut entry.callback {
                Callback::Interval(cb) => cb(),
                Callback::Frame(cb) => cb(self.now_ms as f64),
            };
            // Break stops the callback for good
            if flow.is_break() {
                entry.cancelled.set(true);
            }
            entry.next_due += entry.period_ms;
        }
        self.now_ms = target;
    }
}

impl IntervalTimer for VirtualClock {
    fn set_interval(&mut self, period_ms: u32, callback: TickCallback) -> Result<TimerHandle> {
        Ok(self.register(period_ms as u64, Callback::Interval(callback)))
    }
}

impl FrameScheduler for VirtualClock {
    fn request_frames(&mut self, callback: FrameCallback) -> Result<TimerHandle> {
        let frame_ms = self.frame_ms;
        Ok(self.register(frame_ms, Callback::Frame(callback)))
    }
}
