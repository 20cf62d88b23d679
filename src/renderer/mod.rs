//! Rendering module
//!
//! The scene draws through the [`Surface`] trait; the browser build backs it
//! with a 2D canvas, headless builds and tests with a command recorder.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod recording;
pub mod scene;
pub mod surface;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use recording::{DrawCommand, RecordingSurface};
pub use scene::{draw_frame, draw_guide};
pub use surface::{Color, Surface, TextAlign, TextStyle};
