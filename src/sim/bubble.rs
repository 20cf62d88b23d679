//! Rising bubble field
//!
//! Bubbles spawn just below the bottom edge, rise by their own speed every
//! rendered frame, and are evicted once fully above the top edge.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::random::RandomSource;
use crate::config::SessionConfig;
use crate::point_in_circle;

/// A single pop-able bubble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bubble {
    pub id: u32,
    /// Center in surface pixels; x is fixed at spawn
    pub pos: Vec2,
    pub radius: f32,
    /// Pixels risen per frame
    pub speed: f32,
}

impl Bubble {
    /// Still (partly) below the top edge
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.pos.y + self.radius > 0.0
    }

    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point_in_circle(point, self.pos, self.radius)
    }
}

/// Live bubbles in spawn order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BubbleField {
    bubbles: Vec<Bubble>,
    next_id: u32,
}

impl BubbleField {
    pub fn new() -> Self {
        Self {
            bubbles: Vec::new(),
            next_id: 1,
        }
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    pub fn clear(&mut self) {
        self.bubbles.clear();
    }

    /// Insert an already-built bubble (keeps ids unique)
    pub fn insert(&mut self, mut bubble: Bubble) -> u32 {
        bubble.id = self.allocate_id();
        let id = bubble.id;
        self.bubbles.push(bubble);
        id
    }

    fn allocate_id(&mut self) -> u32 {
        // Default-constructed fields start at zero
        self.next_id = self.next_id.max(1);
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    /// Spawn one bubble for a surface of the given size.
    ///
    /// Draw order from the random source: radius, horizontal position, speed.
    pub fn spawn(
        &mut self,
        rng: &mut dyn RandomSource,
        surface: Vec2,
        config: &SessionConfig,
    ) -> &Bubble {
        let radius = rng.range(config.min_radius, config.max_radius);
        // Inset by the radius so the bubble is fully on-surface
        let usable = surface.x - 2.0 * radius;
        let x = if usable > 0.0 {
            radius + rng.next_unit() * usable
        } else {
            rng.next_unit();
            surface.x / 2.0
        };
        let speed = rng.range(config.min_speed, config.max_speed);

        let id = self.allocate_id();
        self.bubbles.push(Bubble {
            id,
            pos: Vec2::new(x, surface.y + radius),
            radius,
            speed,
        });
        let bubble = &self.bubbles[self.bubbles.len() - 1];
        log::debug!(
            "Spawned bubble {} at ({:.0}, {:.0}) r={:.1} v={:.2}",
            bubble.id,
            bubble.pos.x,
            bubble.pos.y,
            bubble.radius,
            bubble.speed
        );
        bubble
    }

    /// Move every bubble up by its own speed
    pub fn advance(&mut self) {
        for bubble in &mut self.bubbles {
            bubble.pos.y -= bubble.speed;
        }
    }

    /// Drop bubbles that are fully off the top. Returns how many were removed.
    pub fn evict(&mut self) -> usize {
        let before = self.bubbles.len();
        self.bubbles.retain(Bubble::is_visible);
        before - self.bubbles.len()
    }

    /// One frame of motion: advance then evict
    pub fn step(&mut self) -> usize {
        self.advance();
        self.evict()
    }

    /// Remove every bubble containing `point` and return them.
    ///
    /// Overlapping bubbles are all popped by the same point.
    pub fn pop_at(&mut self, point: Vec2) -> Vec<Bubble> {
        let mut popped = Vec::new();
        self.bubbles.retain(|bubble| {
            if bubble.contains(point) {
                popped.push(bubble.clone());
                false
            } else {
                true
            }
        });
        popped
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::sim::random::{ScriptedRandom, SeededRandom};
    use proptest::prelude::*;

    fn bubble(x: f32, y: f32, radius: f32, speed: f32) -> Bubble {
        Bubble {
            id: 0,
            pos: Vec2::new(x, y),
            radius,
            speed,
        }
    }

    #[test]
    fn test_spawn_below_bottom_edge() {
        let mut field = BubbleField::new();
        // radius 20, x at left inset, speed 1
        let mut rng = ScriptedRandom::new([0.0, 0.0, 0.0]);
        let config = SessionConfig::default();
        let b = field.spawn(&mut rng, Vec2::new(800.0, 500.0), &config).clone();

        assert_eq!(b.radius, 20.0);
        assert_eq!(b.pos.x, 20.0);
        assert_eq!(b.pos.y, 520.0);
        assert_eq!(b.speed, 1.0);
    }

    #[test]
    fn test_spawn_inset_by_radius() {
        let mut field = BubbleField::new();
        let mut rng = SeededRandom::new(7);
        let config = SessionConfig::default();
        for _ in 0..200 {
            let b = field.spawn(&mut rng, Vec2::new(800.0, 500.0), &config);
            assert!(b.pos.x - b.radius >= 0.0);
            assert!(b.pos.x + b.radius <= 800.0);
            assert!((config.min_radius..=config.max_radius).contains(&b.radius));
            assert!((config.min_speed..=config.max_speed).contains(&b.speed));
        }
        // Ids unique within the live set
        let ids: HashSet<u32> = field.bubbles().iter().map(|b| b.id).collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn test_advance_then_evict() {
        let mut field = BubbleField::new();
        field.insert(bubble(100.0, 25.0, 20.0, 3.0));
        field.insert(bubble(200.0, 300.0, 20.0, 1.0));

        // First bubble: 25 -> 22, still visible (22 + 20 > 0)
        assert_eq!(field.step(), 0);
        for _ in 0..13 {
            field.step();
        }
        // 25 - 14*3 = -17, -17 + 20 > 0
        assert_eq!(field.len(), 2);
        // -20 + 20 == 0 -> gone
        assert_eq!(field.step(), 1);
        assert_eq!(field.len(), 1);
        assert_eq!(field.bubbles()[0].pos.y, 285.0);
    }

    #[test]
    fn test_pop_center_and_miss() {
        let mut field = BubbleField::new();
        let id = field.insert(bubble(100.0, 100.0, 30.0, 1.0));

        assert!(field.pop_at(Vec2::new(300.0, 300.0)).is_empty());
        assert_eq!(field.len(), 1);

        let popped = field.pop_at(Vec2::new(100.0, 100.0));
        assert_eq!(popped.len(), 1);
        assert_eq!(popped[0].id, id);
        assert!(field.is_empty());
    }

    #[test]
    fn test_pop_on_rim_counts() {
        let mut field = BubbleField::new();
        field.insert(bubble(100.0, 100.0, 30.0, 1.0));
        assert_eq!(field.pop_at(Vec2::new(130.0, 100.0)).len(), 1);
    }

    #[test]
    fn test_overlapping_bubbles_pop_together() {
        let mut field = BubbleField::new();
        field.insert(bubble(100.0, 100.0, 30.0, 1.0));
        field.insert(bubble(120.0, 100.0, 30.0, 1.0));
        field.insert(bubble(400.0, 100.0, 30.0, 1.0));

        let popped = field.pop_at(Vec2::new(110.0, 100.0));
        assert_eq!(popped.len(), 2);
        assert_eq!(field.len(), 1);
        assert_eq!(field.bubbles()[0].pos.x, 400.0);
    }

    proptest! {
        #[test]
        fn prop_evicted_field_is_visible(
            specs in prop::collection::vec((-100.0f32..600.0, 20.0f32..50.0, 1.0f32..3.0), 0..40),
            frames in 0usize..400,
        ) {
            let mut field = BubbleField::new();
            for (y, r, v) in specs {
                field.insert(bubble(100.0, y, r, v));
            }
            field.evict();
            for _ in 0..frames {
                field.step();
                for b in field.bubbles() {
                    prop_assert!(b.pos.y + b.radius > 0.0);
                }
            }
        }

        #[test]
        fn prop_pop_removes_exactly_containing(
            centers in prop::collection::vec((0.0f32..800.0, 0.0f32..500.0), 1..20),
            px in 0.0f32..800.0,
            py in 0.0f32..500.0,
        ) {
            let mut field = BubbleField::new();
            for (x, y) in &centers {
                field.insert(bubble(*x, *y, 35.0, 1.0));
            }
            let point = Vec2::new(px, py);
            let expected = field.bubbles().iter().filter(|b| b.contains(point)).count();
            let popped = field.pop_at(point);
            prop_assert_eq!(popped.len(), expected);
            prop_assert!(field.bubbles().iter().all(|b| !b.contains(point)));
        }
    }
}
