//! Frame composition
//!
//! Background, bubbles, then the breath indicator bar with its prompt.

use glam::Vec2;

use super::surface::{Color, Surface, TextAlign, TextStyle};
use crate::sim::{BreathGuide, BreathPhase, GameState};

/// Colors for scene elements
pub mod colors {
    use super::Color;

    pub const BACKGROUND: Color = Color::rgb(0xf3, 0xf1, 0xfe);
    pub const BUBBLE_FILL: Color = Color::rgb(155, 135, 245);
    pub const BUBBLE_STROKE: Color = Color::rgb(0x78, 0x57, 0xea);
    pub const INDICATOR_TRACK: Color = Color::rgb(0xe9, 0xe4, 0xfd);
    pub const INDICATOR_INHALE: Color = Color::rgb(0x9b, 0x87, 0xf5);
    pub const INDICATOR_EXHALE: Color = Color::rgb(0x78, 0x57, 0xea);
    pub const TEXT: Color = Color::rgb(0, 0, 0);
    pub const GUIDE_CIRCLE: Color = Color::rgb(0xe9, 0xe4, 0xfd);
}

/// Indicator bar layout (pixels from the surface edges)
const INDICATOR_MARGIN_X: f32 = 50.0;
const INDICATOR_BOTTOM: f32 = 50.0;
const INDICATOR_HEIGHT: f32 = 20.0;
const PROMPT_GAP: f32 = 10.0;
const PROMPT_SIZE: f32 = 14.0;

/// Bubble fill alpha at `time_ms`; shimmers unless `shimmer` is off
pub fn bubble_alpha(time_ms: f64, shimmer: bool) -> f32 {
    if shimmer {
        0.4 + (time_ms * 0.003).sin() as f32 * 0.2
    } else {
        0.4
    }
}

/// Draw one frame of the bubble exercise
pub fn draw_frame(surface: &mut dyn Surface, state: &GameState, time_ms: f64, shimmer: bool) {
    let size = surface.size();
    surface.clear();
    surface.fill_background(colors::BACKGROUND);

    let fill = colors::BUBBLE_FILL.with_alpha(bubble_alpha(time_ms, shimmer));
    for bubble in state.field.bubbles() {
        surface.draw_circle(bubble.pos, bubble.radius, fill, colors::BUBBLE_STROKE);
    }

    draw_indicator(surface, size, state.phase(), state.breath.progress());
}

fn draw_indicator(surface: &mut dyn Surface, size: Vec2, phase: BreathPhase, progress: f32) {
    let origin = Vec2::new(INDICATOR_MARGIN_X, size.y - INDICATOR_BOTTOM);
    let width = (size.x - 2.0 * INDICATOR_MARGIN_X).max(0.0);

    surface.draw_rect(
        origin,
        Vec2::new(width, INDICATOR_HEIGHT),
        colors::INDICATOR_TRACK,
    );

    let bar = match phase {
        BreathPhase::Inhale => colors::INDICATOR_INHALE,
        BreathPhase::Exhale => colors::INDICATOR_EXHALE,
    };
    surface.draw_rect(
        origin,
        Vec2::new(width * progress.clamp(0.0, 1.0), INDICATOR_HEIGHT),
        bar,
    );

    surface.draw_text(
        phase.prompt(),
        Vec2::new(size.x / 2.0, origin.y - PROMPT_GAP),
        &TextStyle {
            size_px: PROMPT_SIZE,
            color: colors::TEXT,
            align: TextAlign::Center,
        },
    );
}

/// Draw the four-phase guide: a circle that grows and shrinks with the breath
pub fn draw_guide(surface: &mut dyn Surface, guide: &BreathGuide) {
    let size = surface.size();
    let center = size / 2.0;
    let max_radius = size.x.min(size.y) / 2.0;

    surface.clear();
    surface.fill_background(colors::BACKGROUND);
    surface.draw_circle(
        center,
        max_radius * guide.circle_scale(),
        colors::GUIDE_CIRCLE,
        colors::BUBBLE_STROKE,
    );
    surface.draw_text(
        guide.message(),
        center,
        &TextStyle {
            size_px: 18.0,
            color: colors::TEXT,
            align: TextAlign::Center,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::renderer::recording::{DrawCommand, RecordingSurface};
    use crate::sim::{Bubble, ScriptedRandom, phase_tick};

    fn state() -> GameState {
        let mut state = GameState::new(SessionConfig::default(), Box::new(ScriptedRandom::new([0.5])));
        state.start();
        state
    }

    #[test]
    fn test_frame_draws_bubbles_and_prompt() {
        let mut state = state();
        state.field.insert(Bubble {
            id: 0,
            pos: Vec2::new(100.0, 100.0),
            radius: 30.0,
            speed: 1.0,
        });
        let mut surface = RecordingSurface::new(800.0, 500.0);
        draw_frame(&mut surface, &state, 0.0, true);

        assert_eq!(surface.commands()[0], DrawCommand::Clear);
        assert_eq!(surface.commands()[1], DrawCommand::Background(colors::BACKGROUND));
        let circles: Vec<_> = surface.circles().collect();
        assert_eq!(circles, vec![(Vec2::new(100.0, 100.0), 30.0)]);
        assert_eq!(surface.texts().collect::<Vec<_>>(), vec!["Breathe In"]);
    }

    #[test]
    fn test_indicator_progress_width() {
        let mut state = state();
        for _ in 0..20 {
            phase_tick(&mut state);
        }
        let mut surface = RecordingSurface::new(800.0, 500.0);
        draw_frame(&mut surface, &state, 0.0, false);

        let rects: Vec<_> = surface
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Rect { origin, size, .. } => Some((*origin, *size)),
                _ => None,
            })
            .collect();
        assert_eq!(rects[0], (Vec2::new(50.0, 450.0), Vec2::new(700.0, 20.0)));
        assert_eq!(rects[1], (Vec2::new(50.0, 450.0), Vec2::new(350.0, 20.0)));
    }

    #[test]
    fn test_alpha_without_shimmer_is_constant() {
        assert_eq!(bubble_alpha(0.0, false), 0.4);
        assert_eq!(bubble_alpha(1234.0, false), 0.4);
        let a = bubble_alpha(523.0, true);
        assert!((0.2..=0.6).contains(&a));
    }

    #[test]
    fn test_guide_circle_scales() {
        let mut guide = BreathGuide::new();
        guide.toggle();
        guide.frame(0.0);
        let mut surface = RecordingSurface::new(400.0, 400.0);
        draw_guide(&mut surface, &guide);
        let circles: Vec<_> = surface.circles().collect();
        assert_eq!(circles, vec![(Vec2::new(200.0, 200.0), 100.0)]);
        assert_eq!(surface.texts().collect::<Vec<_>>(), vec!["Breathe In"]);
    }
}
