//! Test helpers for building engines and scenarios.

use glam::DVec2;

use crate::clock::ManualClock;
use crate::config::Tuning;
use crate::engine::Engine;
use crate::entity::PlayerId;
use crate::output::GameEvent;

// =============================================================================
// Engine Setup
// =============================================================================

/// Engine with default tuning on a manual clock reading zero.
pub fn test_engine(seed: u64) -> (Engine, ManualClock) {
    test_engine_with(Tuning::default(), seed)
}

/// Engine with custom tuning on a manual clock reading zero.
pub fn test_engine_with(tuning: Tuning, seed: u64) -> (Engine, ManualClock) {
    let clock = ManualClock::new();
    let engine = Engine::with_clock(tuning, seed, clock.clone()).expect("valid tuning");
    (engine, clock)
}

/// Joins `id` (named after it in upper case) and moves the boat into place.
pub fn spawn_at(engine: &mut Engine, id: &str, position: DVec2, depth: f64, heading: f64) -> PlayerId {
    let id = PlayerId::from(id);
    engine
        .add_player(id.clone(), id.as_str().to_uppercase())
        .expect("fresh player id");
    assert!(engine.place_player(&id, position, depth, heading));
    id
}

// =============================================================================
// Time
// =============================================================================

/// Advances the clock by `dt` and ticks once.
pub fn step(engine: &mut Engine, clock: &ManualClock, dt: f64) -> Vec<GameEvent> {
    clock.advance(dt);
    engine.tick()
}

/// Runs `ticks` ticks of `dt` seconds, collecting every event in order.
pub fn run(engine: &mut Engine, clock: &ManualClock, ticks: usize, dt: f64) -> Vec<GameEvent> {
    (0..ticks).flat_map(|_| step(engine, clock, dt)).collect()
}

// =============================================================================
// Queries
// =============================================================================

/// Whether the player's boat is in play.
pub fn is_alive(engine: &Engine, id: &PlayerId) -> bool {
    engine.player(id).is_some_and(crate::entity::Submarine::is_alive)
}

/// Hit events only.
pub fn hits(events: &[GameEvent]) -> Vec<&crate::output::HitEvent> {
    events
        .iter()
        .filter_map(|event| match event {
            GameEvent::Hit(hit) => Some(hit),
            GameEvent::RespawnReady { .. } => None,
        })
        .collect()
}
