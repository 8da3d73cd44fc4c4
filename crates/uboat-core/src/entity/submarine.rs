//! The player-controlled submarine.
//!
//! Player input never moves the boat directly. [`Submarine::set_controls`]
//! only changes the *targets*; [`Submarine::advance`] then converges heading,
//! speed and depth toward them at bounded rates and moves the hull along its
//! current heading.
//!
//! # Life Cycle
//!
//! ```text
//! spawn ──► alive ──take_hit──► dead (respawn_at set)
//!             ▲                    │ timer elapses (engine marks ready)
//!             └──────respawn───────┘ only on explicit player request
//! ```

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;
use crate::command::ControlCommand;
use crate::config::Tuning;
use crate::entity::PlayerId;
use crate::physics::{
    clamp, heading_vector, interpret_speed_command, move_towards, normalize_heading,
    turn_towards, wrap_position,
};

/// Upper bound (exclusive) for randomized spawn headings.
const SPAWN_HEADING_MAX: f64 = 359.0;

/// A player's submarine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submarine {
    id: PlayerId,
    name: String,

    // Kinematic state
    position: DVec2,
    depth: f64,
    heading: f64,
    speed: f64,

    // Command targets; no heading target until the captain gives one
    target_heading: Option<f64>,
    target_speed: f64,
    target_depth: f64,

    // Life cycle
    alive: bool,
    respawn_at: Option<Timestamp>,
    respawn_ready: bool,

    last_sonar_ping: Option<Timestamp>,
}

impl Submarine {
    /// Creates a live submarine at a random position and heading, stopped at
    /// the default depth.
    pub fn spawn<R: Rng + ?Sized>(
        id: PlayerId,
        name: impl Into<String>,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Self {
        let mut sub = Self {
            id,
            name: name.into(),
            position: DVec2::ZERO,
            depth: tuning.default_depth,
            heading: 0.0,
            speed: 0.0,
            target_heading: None,
            target_speed: 0.0,
            target_depth: tuning.default_depth,
            alive: true,
            respawn_at: None,
            respawn_ready: false,
            last_sonar_ping: None,
        };
        sub.randomize_placement(tuning, rng);
        sub
    }

    fn randomize_placement<R: Rng + ?Sized>(&mut self, tuning: &Tuning, rng: &mut R) {
        self.position = DVec2::new(
            rng.gen_range(0.0..tuning.world_size),
            rng.gen_range(0.0..tuning.world_size),
        );
        self.heading = rng.gen_range(0.0..SPAWN_HEADING_MAX);
    }

    /// Player id.
    #[must_use]
    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position on the plane.
    #[must_use]
    pub fn position(&self) -> DVec2 {
        self.position
    }

    /// Current depth.
    #[must_use]
    pub fn depth(&self) -> f64 {
        self.depth
    }

    /// Current heading in degrees.
    #[must_use]
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Current speed.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Heading the boat is turning toward, if one was ordered.
    #[must_use]
    pub fn target_heading(&self) -> Option<f64> {
        self.target_heading
    }

    /// Speed the boat is converging toward.
    #[must_use]
    pub fn target_speed(&self) -> f64 {
        self.target_speed
    }

    /// Depth the boat is converging toward.
    #[must_use]
    pub fn target_depth(&self) -> f64 {
        self.target_depth
    }

    /// Whether the boat is in play.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// When a dead boat may respawn; `None` while alive.
    #[must_use]
    pub fn respawn_at(&self) -> Option<Timestamp> {
        self.respawn_at
    }

    /// True once the respawn timer has elapsed and the engine has announced it.
    #[must_use]
    pub fn is_respawn_ready(&self) -> bool {
        self.respawn_ready
    }

    /// Time of the last active ping, if any.
    #[must_use]
    pub fn last_sonar_ping(&self) -> Option<Timestamp> {
        self.last_sonar_ping
    }

    /// Moves the boat, wrapping the position and clamping depth into range.
    ///
    /// The boat then holds the placed depth and heading until new controls
    /// arrive. Intended for scenario setup; gameplay moves boats through
    /// [`Submarine::advance`] only.
    pub fn place(&mut self, position: DVec2, depth: f64, heading: f64, tuning: &Tuning) {
        self.position = wrap_position(position, tuning.world_size);
        self.depth = clamp(depth, 0.0, tuning.max_depth);
        self.heading = normalize_heading(heading);
        self.target_depth = self.depth;
        self.target_heading = None;
    }

    /// Updates control targets from any subset of heading, speed and depth.
    ///
    /// Ignored entirely while the boat is dead. Non-finite values are dropped
    /// field by field.
    pub fn set_controls(&mut self, controls: &ControlCommand, tuning: &Tuning) {
        if !self.alive {
            return;
        }
        if let Some(heading) = controls.heading.filter(|h| h.is_finite()) {
            self.target_heading = Some(normalize_heading(heading));
        }
        if let Some(order) = controls.speed.filter(|s| s.is_finite()) {
            self.target_speed =
                interpret_speed_command(order, tuning.speed_order_max, tuning.sub_max_speed);
        }
        if let Some(depth) = controls.depth.filter(|d| d.is_finite()) {
            self.target_depth = clamp(depth, 0.0, tuning.max_depth);
        }
    }

    /// Integrates one step of `dt` seconds. No-op while dead.
    pub fn advance(&mut self, dt: f64, tuning: &Tuning) {
        if !self.alive {
            return;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        let target_heading = self.target_heading.unwrap_or(self.heading);
        self.heading = turn_towards(self.heading, target_heading, tuning.max_turn_rate * dt);

        let target_speed = clamp(self.target_speed, 0.0, tuning.sub_max_speed);
        self.speed = clamp(
            move_towards(self.speed, target_speed, tuning.max_acceleration * dt),
            0.0,
            tuning.sub_max_speed,
        );

        let target_depth = clamp(self.target_depth, 0.0, tuning.max_depth);
        let dive_rate = tuning.base_dive_rate + self.speed * tuning.dive_rate_per_speed;
        self.depth = clamp(
            move_towards(self.depth, target_depth, dive_rate * dt),
            0.0,
            tuning.max_depth,
        );

        let displacement = heading_vector(self.heading) * self.speed * dt;
        self.position = wrap_position(self.position + displacement, tuning.world_size);
    }

    /// Kills the boat and starts its respawn timer.
    pub fn take_hit(&mut self, now: Timestamp, tuning: &Tuning) {
        self.alive = false;
        self.respawn_at = Some(now + tuning.respawn_time);
        self.respawn_ready = false;
    }

    /// True when dead and the respawn timer has elapsed at `now`.
    #[must_use]
    pub fn respawn_due(&self, now: Timestamp) -> bool {
        !self.alive && self.respawn_at.is_some_and(|at| now >= at)
    }

    /// Flags the boat respawn-ready the first time its timer is found elapsed.
    ///
    /// Returns `true` only on that first transition.
    pub fn mark_respawn_ready(&mut self, now: Timestamp) -> bool {
        if self.respawn_ready || !self.respawn_due(now) {
            return false;
        }
        self.respawn_ready = true;
        true
    }

    /// Returns the boat to play at a fresh random placement with default
    /// depth, zero speed and cleared targets.
    pub fn respawn<R: Rng + ?Sized>(&mut self, tuning: &Tuning, rng: &mut R) {
        self.randomize_placement(tuning, rng);
        self.depth = tuning.default_depth;
        self.speed = 0.0;
        self.target_heading = None;
        self.target_speed = 0.0;
        self.target_depth = tuning.default_depth;
        self.alive = true;
        self.respawn_at = None;
        self.respawn_ready = false;
    }

    /// Records an active ping at `now`.
    pub fn record_ping(&mut self, now: Timestamp) {
        self.last_sonar_ping = Some(now);
    }

    /// True if this boat pinged within `window` seconds before `now`.
    #[must_use]
    pub fn pinged_within(&self, now: Timestamp, window: f64) -> bool {
        self.last_sonar_ping
            .is_some_and(|at| now.secs_since(at) <= window)
    }
}
