//! Pointer source driven by explicit presses (tests and headless runs)

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

use super::{PointerCallback, PointerSource, TimerHandle};
use crate::error::Result;

#[derive(Default)]
pub struct VirtualPointer {
    listeners: Vec<(Rc<Cell<bool>>, PointerCallback)>,
}

impl VirtualPointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a press to every live listener
    pub fn press(&mut self, x: f32, y: f32) {
        self.listeners.retain(|(cancelled, _)| !cancelled.get());
        for (_, callback) in &mut self.listeners {
            callback(Vec2::new(x, y));
        }
    }

    pub fn listeners(&self) -> usize {
        self.listeners.iter().filter(|(c, _)| !c.get()).count()
    }
}

impl PointerSource for VirtualPointer {
    fn on_press(&mut self, callback: PointerCallback) -> Result<TimerHandle> {
        let cancelled = Rc::new(Cell::new(false));
        self.listeners.push((cancelled.clone(), callback));
        Ok(TimerHandle::new(cancelled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_dropped_listener_stops_receiving() {
        let mut pointer = VirtualPointer::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let handle = pointer
            .on_press(Box::new(move |pos| s.borrow_mut().push(pos)))
            .unwrap();

        pointer.press(1.0, 2.0);
        drop(handle);
        pointer.press(3.0, 4.0);

        assert_eq!(*seen.borrow(), vec![Vec2::new(1.0, 2.0)]);
        assert_eq!(pointer.listeners(), 0);
    }
}
