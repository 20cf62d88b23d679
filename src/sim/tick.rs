//! Per-callback simulation steps
//!
//! Each function is one invocation of one loop and applies its whole update
//! before returning, so no other callback observes a half-updated field.

use glam::Vec2;

use super::breath::BreathPhase;
use super::state::{GameEvent, GameState};

/// Countdown loop: one second elapsed
pub fn second_tick(state: &mut GameState) {
    if !state.is_active() {
        return;
    }
    if state.countdown.tick() {
        state.expire();
    }
}

/// Countdown loop at phase-tick resolution. Only time spent active counts
/// toward the next decrement, so a pause never credits a partial second.
pub fn countdown_tick(state: &mut GameState, elapsed_ms: u32) {
    if !state.is_active() {
        return;
    }
    state.countdown_carry_ms += elapsed_ms;
    let period = state.config.countdown_tick_ms.max(1);
    while state.is_active() && state.countdown_carry_ms >= period {
        state.countdown_carry_ms -= period;
        second_tick(state);
    }
}

/// Oscillator loop: one phase tick elapsed
pub fn phase_tick(state: &mut GameState) {
    if !state.is_active() {
        return;
    }
    if let Some(phase) = state.breath.tick() {
        log::debug!("Phase -> {:?}", phase);
        state.push_event(GameEvent::PhaseChanged(phase));
    }
}

/// Spawner loop: one bubble per tick while active and breathing out.
///
/// Returns the new bubble's id. Without a surface there is nowhere to spawn.
pub fn spawn_tick(state: &mut GameState) -> Option<u32> {
    if !state.is_active() || state.phase() != BreathPhase::Exhale {
        return None;
    }
    let size = state.surface_size?;
    let id = state.field.spawn(state.rng.as_mut(), size, &state.config).id;
    state.push_event(GameEvent::Spawned { id });
    Some(id)
}

/// Frame loop: rise and evict. Must run before the frame is drawn.
pub fn frame_tick(state: &mut GameState) {
    if !state.is_active() {
        return;
    }
    state.field.step();
    state.frame_count += 1;
}

/// Pointer input in surface pixels. Pops every bubble under the point while
/// breathing in; returns the points awarded.
pub fn pointer(state: &mut GameState, point: Vec2) -> u64 {
    if !state.is_active() || state.phase() != BreathPhase::Inhale {
        return 0;
    }
    let mut awarded = 0;
    for bubble in state.field.pop_at(point) {
        let points = state.config.pop_score;
        state.score += points;
        awarded += points;
        log::debug!("Popped bubble {} (+{})", bubble.id, points);
        state.push_event(GameEvent::Popped {
            id: bubble.id,
            points,
        });
    }
    awarded
}
