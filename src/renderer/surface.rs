//! Drawing surface abstraction
//!
//! The scene only needs filled rects, filled+stroked circles and text, in
//! device pixels with the origin at the top-left.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

/// RGBA color, 8-bit channels plus float alpha (canvas style)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// CSS color string
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size_px: f32,
    pub color: Color,
    pub align: TextAlign,
}

/// A 2D surface the scene draws onto
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    fn size(&self) -> Vec2 {
        Vec2::new(self.width(), self.height())
    }

    /// Follow a viewport change, in device pixels
    fn resize(&mut self, width: f32, height: f32);

    fn clear(&mut self);
    fn fill_background(&mut self, color: Color);
    fn draw_circle(&mut self, center: Vec2, radius: f32, fill: Color, stroke: Color);
    fn draw_rect(&mut self, origin: Vec2, size: Vec2, fill: Color);
    fn draw_text(&mut self, text: &str, pos: Vec2, style: &TextStyle);
}

/// Shared surfaces draw through the cell
impl<S: Surface> Surface for Rc<RefCell<S>> {
    fn width(&self) -> f32 {
        self.borrow().width()
    }

    fn height(&self) -> f32 {
        self.borrow().height()
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.borrow_mut().resize(width, height);
    }

    fn clear(&mut self) {
        self.borrow_mut().clear();
    }

    fn fill_background(&mut self, color: Color) {
        self.borrow_mut().fill_background(color);
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, fill: Color, stroke: Color) {
        self.borrow_mut().draw_circle(center, radius, fill, stroke);
    }

    fn draw_rect(&mut self, origin: Vec2, size: Vec2, fill: Color) {
        self.borrow_mut().draw_rect(origin, size, fill);
    }

    fn draw_text(&mut self, text: &str, pos: Vec2, style: &TextStyle) {
        self.borrow_mut().draw_text(text, pos, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css() {
        assert_eq!(Color::rgb(0xf3, 0xf1, 0xfe).to_css(), "#f3f1fe");
        assert_eq!(
            Color::rgb(155, 135, 245).with_alpha(0.4).to_css(),
            "rgba(155, 135, 245, 0.400)"
        );
    }
}
