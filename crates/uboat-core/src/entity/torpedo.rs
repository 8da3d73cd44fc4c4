//! Straight-running torpedoes.
//!
//! A torpedo inherits position, depth and heading from the boat that fired
//! it and then runs on its own: constant speed, fixed heading, fixed depth,
//! until it expires or hits something.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;
use crate::config::Tuning;
use crate::entity::{PlayerId, Submarine, TorpedoId};
use crate::physics::{heading_vector, wrap_position};

/// A torpedo in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Torpedo {
    id: TorpedoId,
    owner: PlayerId,
    position: DVec2,
    depth: f64,
    heading: f64,
    created_at: Timestamp,
    expires_at: Timestamp,
}

impl Torpedo {
    /// Launches a torpedo from `shooter`'s current position, depth and heading.
    #[must_use]
    pub fn launch(id: TorpedoId, shooter: &Submarine, now: Timestamp, tuning: &Tuning) -> Self {
        Self {
            id,
            owner: shooter.id().clone(),
            position: shooter.position(),
            depth: shooter.depth(),
            heading: shooter.heading(),
            created_at: now,
            expires_at: now + tuning.torpedo_lifetime,
        }
    }

    /// Torpedo id.
    #[must_use]
    pub fn id(&self) -> TorpedoId {
        self.id
    }

    /// Player who fired it.
    #[must_use]
    pub fn owner(&self) -> &PlayerId {
        &self.owner
    }

    /// Position on the plane.
    #[must_use]
    pub fn position(&self) -> DVec2 {
        self.position
    }

    /// Running depth.
    #[must_use]
    pub fn depth(&self) -> f64 {
        self.depth
    }

    /// Running heading in degrees.
    #[must_use]
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Launch time.
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Time at which the torpedo is dropped.
    #[must_use]
    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    /// Runs the torpedo forward for `dt` seconds.
    pub fn advance(&mut self, dt: f64, tuning: &Tuning) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let displacement = heading_vector(self.heading) * tuning.torpedo_speed * dt;
        self.position = wrap_position(self.position + displacement, tuning.world_size);
    }

    /// True once `now` has reached the expiry time.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}
