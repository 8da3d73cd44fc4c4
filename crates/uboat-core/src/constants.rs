//! Reference tuning for the arena.
//!
//! These values seed [`Tuning::default`](crate::config::Tuning::default).
//! Code inside the engine reads the [`Tuning`](crate::config::Tuning) it was
//! constructed with, never these constants directly, so a deployment can
//! override any of them at startup.

// =============================================================================
// World
// =============================================================================

/// Side length of the toroidal plane, in world units.
pub const WORLD_SIZE: f64 = 2000.0;
/// Deepest a submarine can go, in meters.
pub const MAX_DEPTH: f64 = 300.0;
/// Simulation updates per second.
pub const TICK_RATE: f64 = 5.0;

// =============================================================================
// Ordnance
// =============================================================================

/// Torpedo speed in world units per second.
pub const TORPEDO_SPEED: f64 = 30.0;
/// Seconds a torpedo runs before it is dropped.
pub const TORPEDO_LIFETIME: f64 = 20.0;

// =============================================================================
// Submarine performance
// =============================================================================

/// Top speed in world units per second.
pub const SUB_MAX_SPEED: f64 = 20.0;
/// Degrees per second.
pub const MAX_TURN_RATE: f64 = 25.0;
/// Speed change per second.
pub const MAX_ACCELERATION: f64 = 20.0;
/// Meters per second when stopped.
pub const BASE_DIVE_RATE: f64 = 8.0;
/// Extra dive rate per unit of speed.
pub const DIVE_RATE_PER_SPEED: f64 = 0.15;
/// Depth on spawn and respawn.
pub const DEFAULT_DEPTH: f64 = 50.0;
/// Highest throttle notch; speed commands at or below it are notches.
pub const SPEED_ORDER_MAX: f64 = 4.0;

// =============================================================================
// Sonar
// =============================================================================

/// Active sonar range (3-D, depth included).
pub const SONAR_RANGE: f64 = 500.0;
/// Seconds a ping keeps pinger and targets mutually visible.
pub const PING_VISIBILITY_WINDOW: f64 = 5.0;
/// Passive sonar range (3-D, depth included).
pub const PASSIVE_SONAR_RANGE: f64 = 750.0;
/// Passive bearing jitter, +/- degrees.
pub const PASSIVE_SONAR_NOISE_BEARING: f64 = 15.0;
/// Passive distance jitter, +/- fraction of the true distance.
pub const PASSIVE_SONAR_NOISE_DISTANCE: f64 = 0.2;

// =============================================================================
// Hull and damage
// =============================================================================

/// Cylindrical radius of the hull.
pub const HIT_RADIUS: f64 = 12.0;
/// Hull length in meters.
pub const SUB_LENGTH: f64 = 55.0;
/// Seconds between a hit and respawn readiness.
pub const RESPAWN_TIME: f64 = 10.0;
