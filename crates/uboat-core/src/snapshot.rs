//! Per-player views of the arena.
//!
//! A [`PlayerView`] is what one captain is allowed to know at one instant:
//! their own boat in full, every torpedo in the water, and whatever sonar
//! reveals about the other boats. Exact positions of other boats appear only
//! in [`PlayerView::sonar_contacts`], and only inside an active-ping window.

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;
use crate::config::Tuning;
use crate::entity::{PlayerId, Submarine, Torpedo, TorpedoId};
use crate::sonar::{PassiveContact, SonarContact};

/// The viewer's own boat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SelfView {
    /// Boat is in play.
    Alive {
        /// Player id
        id: PlayerId,
        /// Display name
        username: String,
        /// X position
        x: f64,
        /// Y position
        y: f64,
        /// Current depth
        depth: f64,
        /// Current heading in degrees
        heading: f64,
        /// Current speed
        speed: f64,
        /// Heading being turned toward, if ordered
        target_heading: Option<f64>,
        /// Speed being converged toward
        target_speed: f64,
        /// Depth being converged toward
        target_depth: f64,
    },
    /// Boat is sunk and waiting to respawn.
    Dead {
        /// Player id
        id: PlayerId,
        /// Display name
        username: String,
        /// When respawn becomes possible
        respawn_at: Option<Timestamp>,
        /// Whether the timer has elapsed
        respawn_ready: bool,
    },
}

impl SelfView {
    /// Describes `sub` from its own captain's point of view.
    #[must_use]
    pub fn of(sub: &Submarine) -> Self {
        if sub.is_alive() {
            Self::Alive {
                id: sub.id().clone(),
                username: sub.name().to_owned(),
                x: sub.position().x,
                y: sub.position().y,
                depth: sub.depth(),
                heading: sub.heading(),
                speed: sub.speed(),
                target_heading: sub.target_heading(),
                target_speed: sub.target_speed(),
                target_depth: sub.target_depth(),
            }
        } else {
            Self::Dead {
                id: sub.id().clone(),
                username: sub.name().to_owned(),
                respawn_at: sub.respawn_at(),
                respawn_ready: sub.is_respawn_ready(),
            }
        }
    }

    /// Whether the boat is in play.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        matches!(self, Self::Alive { .. })
    }
}

/// A torpedo as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorpedoView {
    /// Torpedo id
    pub id: TorpedoId,
    /// Player who fired it
    pub owner_id: PlayerId,
    /// X position
    pub x: f64,
    /// Y position
    pub y: f64,
    /// Running depth
    pub depth: f64,
    /// Running heading
    pub heading: f64,
    /// Launch time
    pub created_at: Timestamp,
    /// Expiry time
    pub expires_at: Timestamp,
}

impl From<&Torpedo> for TorpedoView {
    fn from(torpedo: &Torpedo) -> Self {
        Self {
            id: torpedo.id(),
            owner_id: torpedo.owner().clone(),
            x: torpedo.position().x,
            y: torpedo.position().y,
            depth: torpedo.depth(),
            heading: torpedo.heading(),
            created_at: torpedo.created_at(),
            expires_at: torpedo.expires_at(),
        }
    }
}

/// Arena dimensions, for client rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldInfo {
    /// Side length of the square plane
    pub size: f64,
    /// Deepest allowed depth
    pub max_depth: f64,
    /// Active sonar range
    pub sonar_range: f64,
    /// Passive sonar range
    pub passive_sonar_range: f64,
    /// Top submarine speed
    pub sub_max_speed: f64,
    /// Highest throttle notch
    pub speed_order_max: f64,
}

impl From<&Tuning> for WorldInfo {
    fn from(tuning: &Tuning) -> Self {
        Self {
            size: tuning.world_size,
            max_depth: tuning.max_depth,
            sonar_range: tuning.sonar_range,
            passive_sonar_range: tuning.passive_sonar_range,
            sub_max_speed: tuning.sub_max_speed,
            speed_order_max: tuning.speed_order_max,
        }
    }
}

/// Everything one player may know at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    /// The viewer's own boat
    pub you: SelfView,
    /// Every torpedo in the water
    pub torpedoes: Vec<TorpedoView>,
    /// Boats lit by a recent active ping, with exact positions
    pub sonar_contacts: Vec<SonarContact>,
    /// Boats heard passively, with noisy range and bearing
    pub passive_contacts: Vec<PassiveContact>,
    /// Arena dimensions
    pub world: WorldInfo,
    /// Engine time when the view was taken
    pub server_time: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::json;

    fn sub() -> Submarine {
        let t = Tuning::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut sub = Submarine::spawn(PlayerId::from("p1"), "Nemo", &t, &mut rng);
        sub.place(DVec2::new(10.0, 20.0), 60.0, 90.0, &t);
        sub
    }

    #[test]
    fn alive_view_carries_kinematics() {
        let view = SelfView::of(&sub());
        assert!(view.is_alive());
        let SelfView::Alive { x, y, depth, heading, target_heading, .. } = view else {
            panic!("expected alive view");
        };
        assert_eq!((x, y, depth, heading), (10.0, 20.0, 60.0, 90.0));
        assert_eq!(target_heading, None);
    }

    #[test]
    fn dead_view_hides_kinematics() {
        let mut s = sub();
        s.take_hit(Timestamp::from_secs(3.0), &Tuning::default());
        let json = serde_json::to_value(SelfView::of(&s)).unwrap();
        assert_eq!(
            json,
            json!({
                "state": "dead",
                "id": "p1",
                "username": "Nemo",
                "respawn_at": 13.0,
                "respawn_ready": false,
            })
        );
    }

    #[test]
    fn torpedo_view_uses_prefixed_id() {
        let t = Tuning::default();
        let torp = Torpedo::launch(TorpedoId::new(3), &sub(), Timestamp::from_secs(1.0), &t);
        let json = serde_json::to_value(TorpedoView::from(&torp)).unwrap();
        assert_eq!(json["id"], "torp-3");
        assert_eq!(json["owner_id"], "p1");
        assert_eq!(json["expires_at"], 21.0);
    }

    #[test]
    fn world_info_from_tuning() {
        let info = WorldInfo::from(&Tuning::default());
        assert_eq!(info.size, 2000.0);
        assert_eq!(info.max_depth, 300.0);
        assert_eq!(info.passive_sonar_range, 750.0);
        assert_eq!(info.speed_order_max, 4.0);
    }
}
