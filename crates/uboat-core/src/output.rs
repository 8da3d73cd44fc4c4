//! Engine output: game events and addressed outbound messages.
//!
//! The engine never talks to sockets. It returns [`GameEvent`]s from
//! [`Engine::tick`](crate::engine::Engine::tick) and [`Outbound`] messages from
//! [`Engine::handle`](crate::engine::Engine::handle); the transport only has to
//! honor each message's [`Recipient`].
//!
//! # Event Fan-out
//!
//! | Event | Recipient | Message |
//! |---|---|---|
//! | `RespawnReady` | the dead player | `respawn_ready` |
//! | `Hit` | everyone | `sub_hit` |
//! | `Hit` | attacker (if still connected) | `hit_confirmed` |
//! | `Hit` | victim | `you_were_hit` |

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;
use crate::entity::{PlayerId, TorpedoId};
use crate::snapshot::PlayerView;
use crate::sonar::ActiveContact;

/// Name reported for an attacker who has already left.
pub const UNKNOWN_ATTACKER: &str = "Unknown";

// =============================================================================
// Game Events
// =============================================================================

/// A torpedo sank a submarine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitEvent {
    /// Boat that was sunk
    pub victim_id: PlayerId,
    /// Victim's display name
    pub victim_name: String,
    /// Player who fired the torpedo
    pub attacker_id: PlayerId,
    /// Attacker's display name, or [`UNKNOWN_ATTACKER`]
    pub attacker_name: String,
    /// Torpedo that hit
    pub torpedo_id: TorpedoId,
    /// When the victim may respawn
    pub respawn_at: Timestamp,
}

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A dead player's respawn timer elapsed. Emitted once per death.
    RespawnReady {
        /// Player who may now respawn
        player_id: PlayerId,
    },
    /// A torpedo hit a submarine.
    Hit(HitEvent),
}

impl GameEvent {
    /// Addressed messages announcing this event.
    #[must_use]
    pub fn deliveries(&self) -> Vec<Outbound> {
        match self {
            Self::RespawnReady { player_id } => {
                vec![Outbound::to(player_id.clone(), OutboundMessage::RespawnReady)]
            }
            Self::Hit(hit) => vec![
                Outbound::everyone(OutboundMessage::SubHit {
                    victim_id: hit.victim_id.clone(),
                    victim_username: hit.victim_name.clone(),
                    attacker_id: hit.attacker_id.clone(),
                    attacker_username: hit.attacker_name.clone(),
                }),
                Outbound::to(
                    hit.attacker_id.clone(),
                    OutboundMessage::HitConfirmed {
                        victim_id: hit.victim_id.clone(),
                        victim_username: hit.victim_name.clone(),
                    },
                ),
                Outbound::to(
                    hit.victim_id.clone(),
                    OutboundMessage::YouWereHit {
                        attacker_id: hit.attacker_id.clone(),
                        attacker_username: hit.attacker_name.clone(),
                        respawn_at: hit.respawn_at,
                    },
                ),
            ],
        }
    }
}

// =============================================================================
// Outbound Messages
// =============================================================================

/// Who should receive an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Recipient {
    /// One player.
    Player(PlayerId),
    /// Every connected player.
    Everyone,
    /// Every connected player except one.
    EveryoneExcept(PlayerId),
}

impl Recipient {
    /// Whether `player` is among the recipients.
    #[must_use]
    pub fn includes(&self, player: &PlayerId) -> bool {
        match self {
            Self::Player(id) => id == player,
            Self::Everyone => true,
            Self::EveryoneExcept(id) => id != player,
        }
    }
}

/// Payload of an outbound message, tagged by event name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Join accepted.
    Joined {
        /// Assigned player id
        id: PlayerId,
        /// Sanitized display name
        username: String,
    },
    /// Free-text announcement.
    SystemMessage {
        /// Announcement text
        message: String,
    },
    /// Periodic view of the arena.
    StateUpdate(PlayerView),
    /// Broadcast that a boat was sunk.
    SubHit {
        /// Boat that was sunk
        victim_id: PlayerId,
        /// Victim's display name
        victim_username: String,
        /// Shooter
        attacker_id: PlayerId,
        /// Shooter's display name
        attacker_username: String,
    },
    /// Tells the shooter their torpedo hit.
    HitConfirmed {
        /// Boat that was sunk
        victim_id: PlayerId,
        /// Victim's display name
        victim_username: String,
    },
    /// Tells the victim who sank them.
    YouWereHit {
        /// Shooter
        attacker_id: PlayerId,
        /// Shooter's display name
        attacker_username: String,
        /// When respawn becomes possible
        respawn_at: Timestamp,
    },
    /// Respawn timer elapsed.
    RespawnReady,
    /// Respawn request granted.
    Respawned,
    /// Respawn request refused (still alive, or timer running).
    RespawnDenied {
        /// When respawn becomes possible, if dead
        respawn_at: Option<Timestamp>,
    },
    /// Torpedo launched.
    TorpedoFired {
        /// New torpedo's id
        id: TorpedoId,
    },
    /// Result of the player's own active ping.
    SonarResult {
        /// Exact contacts
        contacts: Vec<ActiveContact>,
    },
    /// Someone pinged this player.
    SonarPingDetected {
        /// Pinging boat
        pinging_id: PlayerId,
        /// Pinger's display name
        pinging_username: String,
        /// Rough range to the pinger
        approx_distance: f64,
    },
}

/// A message and who should receive it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outbound {
    /// Recipient(s)
    pub to: Recipient,
    /// Payload
    pub message: OutboundMessage,
}

impl Outbound {
    /// Message for one player.
    #[must_use]
    pub fn to(player: PlayerId, message: OutboundMessage) -> Self {
        Self {
            to: Recipient::Player(player),
            message,
        }
    }

    /// Message for every player.
    #[must_use]
    pub fn everyone(message: OutboundMessage) -> Self {
        Self {
            to: Recipient::Everyone,
            message,
        }
    }

    /// Message for every player but `skip`.
    #[must_use]
    pub fn everyone_except(skip: PlayerId, message: OutboundMessage) -> Self {
        Self {
            to: Recipient::EveryoneExcept(skip),
            message,
        }
    }
}
