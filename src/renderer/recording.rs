//! In-memory surface that records draw calls
//!
//! Used headless (native builds) and in tests to inspect what a frame drew.

use glam::Vec2;

use super::surface::{Color, Surface, TextStyle};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Background(Color),
    Circle {
        center: Vec2,
        radius: f32,
        fill: Color,
        stroke: Color,
    },
    Rect {
        origin: Vec2,
        size: Vec2,
        fill: Color,
    },
    Text {
        text: String,
        pos: Vec2,
        style: TextStyle,
    },
}

#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    commands: Vec<DrawCommand>,
    frames: u64,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
            frames: 0,
        }
    }

    /// Commands since the most recent clear
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of clears seen (one per drawn frame)
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn circles(&self) -> impl Iterator<Item = (Vec2, f32)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Circle { center, radius, .. } => Some((*center, *radius)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
        self.frames += 1;
    }

    fn fill_background(&mut self, color: Color) {
        self.commands.push(DrawCommand::Background(color));
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, fill: Color, stroke: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            fill,
            stroke,
        });
    }

    fn draw_rect(&mut self, origin: Vec2, size: Vec2, fill: Color) {
        self.commands.push(DrawCommand::Rect { origin, size, fill });
    }

    fn draw_text(&mut self, text: &str, pos: Vec2, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
            style: style.clone(),
        });
    }
}
