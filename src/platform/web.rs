//! Browser schedulers (`setInterval`, `requestAnimationFrame`) and canvas
//! pointer input

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent, Window};

use super::{
    FrameCallback, FrameScheduler, IntervalTimer, PointerCallback, PointerSource, TickCallback,
    TimerHandle,
};
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct BrowserScheduler {
    window: Window,
}

impl BrowserScheduler {
    pub fn new() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| Error::Platform("no window".into()))?;
        Ok(Self { window })
    }
}

impl IntervalTimer for BrowserScheduler {
    fn set_interval(&mut self, period_ms: u32, mut callback: TickCallback) -> Result<TimerHandle> {
        let cancelled = Rc::new(Cell::new(false));
        let interval_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));

        let closure = {
            let cancelled = cancelled.clone();
            let interval_id = interval_id.clone();
            let window = self.window.clone();
            Closure::<dyn FnMut()>::new(move || {
                if cancelled.get() {
                    return;
                }
                if callback().is_break() {
                    cancelled.set(true);
                    if let Some(id) = interval_id.get() {
                        window.clear_interval_with_handle(id);
                    }
                }
            })
        };

        let id = self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                period_ms as i32,
            )
            .map_err(|e| Error::Platform(format!("setInterval failed: {:?}", e)))?;
        interval_id.set(Some(id));

        let window = self.window.clone();
        Ok(TimerHandle::with_cleanup(cancelled, move || {
            window.clear_interval_with_handle(id);
            drop(closure);
        }))
    }
}

impl FrameScheduler for BrowserScheduler {
    fn request_frames(&mut self, mut callback: FrameCallback) -> Result<TimerHandle> {
        let cancelled = Rc::new(Cell::new(false));
        let frame_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
        // Self-referencing slot so each frame can request the next one
        let slot: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));

        {
            let cancelled = cancelled.clone();
            let frame_id = frame_id.clone();
            let next = slot.clone();
            let window = self.window.clone();
            *slot.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |time: f64| {
                frame_id.set(None);
                if cancelled.get() {
                    return;
                }
                if callback(time).is_break() {
                    cancelled.set(true);
                    return;
                }
                if let Some(closure) = next.borrow().as_ref() {
                    match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
                        Ok(id) => frame_id.set(Some(id)),
                        Err(e) => log::warn!("requestAnimationFrame failed: {:?}", e),
                    }
                }
            }));
        }

        let id = {
            let borrowed = slot.borrow();
            let closure = borrowed
                .as_ref()
                .ok_or_else(|| Error::Platform("frame closure missing".into()))?;
            self.window
                .request_animation_frame(closure.as_ref().unchecked_ref())
                .map_err(|e| Error::Platform(format!("requestAnimationFrame failed: {:?}", e)))?
        };
        frame_id.set(Some(id));

        let window = self.window.clone();
        Ok(TimerHandle::with_cleanup(cancelled, move || {
            if let Some(id) = frame_id.get() {
                let _ = window.cancel_animation_frame(id);
            }
            // Breaks the closure <-> slot cycle
            slot.borrow_mut().take();
        }))
    }
}

/// `pointerdown` on a canvas, mapped to canvas pixels
pub struct CanvasPointer {
    canvas: HtmlCanvasElement,
}

impl CanvasPointer {
    pub fn new(canvas: &HtmlCanvasElement) -> Self {
        Self {
            canvas: canvas.clone(),
        }
    }
}

impl PointerSource for CanvasPointer {
    fn on_press(&mut self, mut callback: PointerCallback) -> Result<TimerHandle> {
        let cancelled = Rc::new(Cell::new(false));

        let closure = {
            let cancelled = cancelled.clone();
            let canvas = self.canvas.clone();
            Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if cancelled.get() {
                    return;
                }
                // offset is in CSS pixels, the surface in canvas pixels
                let sx = canvas.width() as f32 / canvas.client_width().max(1) as f32;
                let sy = canvas.height() as f32 / canvas.client_height().max(1) as f32;
                callback(Vec2::new(
                    event.offset_x() as f32 * sx,
                    event.offset_y() as f32 * sy,
                ));
            })
        };

        self.canvas
            .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())
            .map_err(|e| Error::Platform(format!("addEventListener failed: {:?}", e)))?;

        let canvas = self.canvas.clone();
        Ok(TimerHandle::with_cleanup(cancelled, move || {
            let _ = canvas.remove_event_listener_with_callback(
                "pointerdown",
                closure.as_ref().unchecked_ref(),
            );
            drop(closure);
        }))
    }
}
