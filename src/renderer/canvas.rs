//! Canvas 2D surface (browser only)

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::surface::{Color, Surface, TextStyle};
use crate::error::{Error, Result};

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    width: f32,
    height: f32,
}

impl CanvasSurface {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| Error::Platform(format!("getContext failed: {:?}", e)))?
            .ok_or_else(|| Error::Platform("canvas has no 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| Error::Platform("2d context has unexpected type".into()))?;

        Ok(Self {
            ctx,
            width: canvas.width() as f32,
            height: canvas.height() as f32,
        })
    }
}

impl Surface for CanvasSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    /// Resizes the backing canvas too, which clears it
    fn resize(&mut self, width: f32, height: f32) {
        if let Some(canvas) = self.ctx.canvas() {
            canvas.set_width(width as u32);
            canvas.set_height(height as u32);
        }
        self.width = width;
        self.height = height;
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.width as f64, self.height as f64);
    }

    fn fill_background(&mut self, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx
            .fill_rect(0.0, 0.0, self.width as f64, self.height as f64);
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, fill: Color, stroke: Color) {
        self.ctx.begin_path();
        if self
            .ctx
            .arc(
                center.x as f64,
                center.y as f64,
                radius as f64,
                0.0,
                std::f64::consts::TAU,
            )
            .is_err()
        {
            return;
        }
        self.ctx.set_fill_style_str(&fill.to_css());
        self.ctx.fill();
        self.ctx.set_stroke_style_str(&stroke.to_css());
        self.ctx.stroke();
    }

    fn draw_rect(&mut self, origin: Vec2, size: Vec2, fill: Color) {
        self.ctx.set_fill_style_str(&fill.to_css());
        self.ctx
            .fill_rect(origin.x as f64, origin.y as f64, size.x as f64, size.y as f64);
    }

    fn draw_text(&mut self, text: &str, pos: Vec2, style: &TextStyle) {
        self.ctx.set_fill_style_str(&style.color.to_css());
        self.ctx.set_font(&format!("{}px Arial", style.size_px));
        self.ctx.set_text_align(style.align.as_str());
        let _ = self.ctx.fill_text(text, pos.x as f64, pos.y as f64);
    }
}
