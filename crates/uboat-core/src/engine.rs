//! The authoritative simulation engine.
//!
//! [`Engine`] owns the player table, the torpedoes in flight, the clock and
//! the random source. Everything outside talks to it through id-parameterized
//! operations; nothing hands out mutable access to the tables.
//!
//! # Tick Order
//!
//! 1. Advance every submarine by the wall-clock delta since the last tick.
//! 2. Announce `respawn_ready` for boats whose timer just elapsed (once each).
//! 3. Advance torpedoes; drop expired ones without a collision check.
//! 4. Test each surviving torpedo against live non-owner boats in player-id
//!    order. The first hull hit takes the torpedo.
//!
//! # Determinism
//!
//! The player table is a `BTreeMap` keyed by [`PlayerId`], and all randomness
//! comes from a `ChaCha8Rng` seeded at construction. With a
//! [`ManualClock`](crate::clock::ManualClock) the same seed and the same
//! command sequence always produce the same world.
//!
//! # Example
//!
//! ```
//! use uboat_core::clock::{ManualClock, Timestamp};
//! use uboat_core::config::Tuning;
//! use uboat_core::engine::Engine;
//! use uboat_core::entity::PlayerId;
//! use glam::DVec2;
//!
//! let clock = ManualClock::new();
//! let mut engine = Engine::with_clock(Tuning::default(), 42, clock.clone())?;
//!
//! let a = PlayerId::from("a");
//! let b = PlayerId::from("b");
//! engine.add_player(a.clone(), "Able").unwrap();
//! engine.add_player(b.clone(), "Baker").unwrap();
//! engine.place_player(&a, DVec2::new(0.0, 0.0), 50.0, 0.0);
//! engine.place_player(&b, DVec2::new(100.0, 0.0), 50.0, 0.0);
//!
//! let ping = engine.perform_active_ping(&a);
//! assert_eq!(ping.contacts[0].bearing, 90.0);
//! assert_eq!(ping.contacts[0].distance, 100.0);
//!
//! clock.set(Timestamp::from_secs(0.2));
//! assert!(engine.tick().is_empty());
//! # Ok::<(), uboat_core::config::ConfigError>(())
//! ```

use std::collections::BTreeMap;
use std::fmt;

use glam::DVec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::clock::{Clock, MonotonicClock, Timestamp};
use crate::command::{sanitize_name, Command, ControlCommand};
use crate::config::{ConfigError, Tuning};
use crate::entity::{PlayerId, Submarine, Torpedo, TorpedoId};
use crate::output::{GameEvent, HitEvent, Outbound, OutboundMessage, UNKNOWN_ATTACKER};
use crate::physics::capsule_hit_test;
use crate::snapshot::{PlayerView, SelfView, TorpedoView, WorldInfo};
use crate::sonar::{self, PingResult};

/// Errors returned by [`Engine`] operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A player with this id is already registered.
    #[error("player {0} is already in the arena")]
    DuplicatePlayer(PlayerId),
}

// =============================================================================
// Engine
// =============================================================================

/// Authoritative game state for one arena.
pub struct Engine {
    tuning: Tuning,
    clock: Box<dyn Clock>,
    rng: ChaCha8Rng,
    seed: u64,
    submarines: BTreeMap<PlayerId, Submarine>,
    torpedoes: Vec<Torpedo>,
    next_torpedo_seq: u64,
    last_tick: Timestamp,
    ticks: u64,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("seed", &self.seed)
            .field("players", &self.submarines.len())
            .field("torpedoes", &self.torpedoes.len())
            .field("last_tick", &self.last_tick)
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Creates an empty arena on a monotonic clock.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `tuning` fails validation.
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self, ConfigError> {
        Self::with_clock(tuning, seed, MonotonicClock::new())
    }

    /// Creates an empty arena on the given clock.
    ///
    /// The first tick measures its delta from the clock's reading here.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `tuning` fails validation.
    pub fn with_clock(
        tuning: Tuning,
        seed: u64,
        clock: impl Clock + 'static,
    ) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let last_tick = clock.now();
        Ok(Self {
            tuning,
            clock: Box::new(clock),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            submarines: BTreeMap::new(),
            torpedoes: Vec::new(),
            next_torpedo_seq: 1,
            last_tick,
            ticks: 0,
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Tuning in effect.
    #[must_use]
    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Seed the random source was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Current engine time.
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Number of completed ticks.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Read access to one player's submarine.
    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&Submarine> {
        self.submarines.get(id)
    }

    /// Registered player ids in iteration order.
    #[must_use]
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.submarines.keys().cloned().collect()
    }

    /// Number of registered players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.submarines.len()
    }

    /// Number of torpedoes in flight.
    #[must_use]
    pub fn torpedo_count(&self) -> usize {
        self.torpedoes.len()
    }

    // -------------------------------------------------------------------------
    // Player lifecycle
    // -------------------------------------------------------------------------

    /// Registers a new submarine at a random placement.
    ///
    /// # Errors
    ///
    /// [`EngineError::DuplicatePlayer`] if `id` is already registered.
    pub fn add_player(
        &mut self,
        id: PlayerId,
        name: impl Into<String>,
    ) -> Result<&Submarine, EngineError> {
        if self.submarines.contains_key(&id) {
            warn!(player = %id, "duplicate join ignored");
            return Err(EngineError::DuplicatePlayer(id));
        }
        let sub = Submarine::spawn(id.clone(), name, &self.tuning, &mut self.rng);
        debug!(
            player = %id,
            name = sub.name(),
            x = sub.position().x,
            y = sub.position().y,
            "player joined"
        );
        Ok(self.submarines.entry(id).or_insert(sub))
    }

    /// Unregisters a player. Torpedoes they fired stay in the water.
    pub fn remove_player(&mut self, id: &PlayerId) -> Option<Submarine> {
        let removed = self.submarines.remove(id);
        if let Some(sub) = &removed {
            debug!(player = %id, name = sub.name(), "player left");
        }
        removed
    }

    /// Moves a player's boat. Used for scenario setup.
    ///
    /// Returns `false` for an unknown id.
    pub fn place_player(&mut self, id: &PlayerId, position: DVec2, depth: f64, heading: f64) -> bool {
        let Some(sub) = self.submarines.get_mut(id) else {
            return false;
        };
        sub.place(position, depth, heading, &self.tuning);
        true
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Updates a boat's control targets.
    ///
    /// Returns `true` if the boat exists and is alive.
    pub fn set_controls(&mut self, id: &PlayerId, controls: &ControlCommand) -> bool {
        let Some(sub) = self.submarines.get_mut(id) else {
            return false;
        };
        let non_finite = [controls.heading, controls.speed, controls.depth]
            .into_iter()
            .flatten()
            .any(|v| !v.is_finite());
        if non_finite {
            warn!(player = %id, ?controls, "non-finite control input dropped");
        }
        if !sub.is_alive() {
            return false;
        }
        sub.set_controls(controls, &self.tuning);
        true
    }

    /// Launches a torpedo from a live boat.
    pub fn fire_torpedo(&mut self, id: &PlayerId) -> Option<TorpedoId> {
        let now = self.clock.now();
        let shooter = self.submarines.get(id).filter(|sub| sub.is_alive())?;
        let torpedo_id = TorpedoId::new(self.next_torpedo_seq);
        self.next_torpedo_seq += 1;
        let torpedo = Torpedo::launch(torpedo_id, shooter, now, &self.tuning);
        debug!(
            player = %id,
            torpedo = %torpedo_id,
            heading = torpedo.heading(),
            depth = torpedo.depth(),
            "torpedo fired"
        );
        self.torpedoes.push(torpedo);
        Some(torpedo_id)
    }

    /// Returns a dead boat to play once its timer has elapsed.
    ///
    /// Returns `false` if the player is unknown, alive, or still waiting.
    pub fn request_respawn(&mut self, id: &PlayerId) -> bool {
        let now = self.clock.now();
        let Some(sub) = self.submarines.get_mut(id) else {
            return false;
        };
        if !sub.respawn_due(now) {
            return false;
        }
        sub.respawn(&self.tuning, &mut self.rng);
        debug!(player = %id, x = sub.position().x, y = sub.position().y, "respawned");
        true
    }

    /// Active sonar ping from `id`.
    ///
    /// Unknown or dead pingers get an empty result and no ping is recorded.
    pub fn perform_active_ping(&mut self, id: &PlayerId) -> PingResult {
        let Some(pinger) = self.submarines.get(id).filter(|sub| sub.is_alive()) else {
            return PingResult::default();
        };
        let result = sonar::active_ping(pinger, self.submarines.values(), &self.tuning);
        let now = self.clock.now();
        if let Some(sub) = self.submarines.get_mut(id) {
            sub.record_ping(now);
        }
        debug!(player = %id, contacts = result.contacts.len(), "active ping");
        result
    }

    // -------------------------------------------------------------------------
    // Simulation step
    // -------------------------------------------------------------------------

    /// Advances the world by the time elapsed since the previous tick.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let now = self.clock.now();
        let dt = now.secs_since(self.last_tick).max(0.0);
        self.last_tick = now;
        self.ticks += 1;

        let mut events = Vec::new();

        for sub in self.submarines.values_mut() {
            sub.advance(dt, &self.tuning);
            if sub.mark_respawn_ready(now) {
                debug!(player = %sub.id(), "respawn ready");
                events.push(GameEvent::RespawnReady {
                    player_id: sub.id().clone(),
                });
            }
        }

        let in_flight = std::mem::take(&mut self.torpedoes);
        let mut survivors = Vec::with_capacity(in_flight.len());
        for mut torpedo in in_flight {
            torpedo.advance(dt, &self.tuning);
            if torpedo.is_expired(now) {
                trace!(torpedo = %torpedo.id(), "torpedo expired");
                continue;
            }
            match self.find_victim(&torpedo) {
                Some(victim) => events.extend(self.resolve_hit(&torpedo, &victim, now)),
                None => survivors.push(torpedo),
            }
        }
        self.torpedoes = survivors;

        trace!(
            tick = self.ticks,
            dt,
            players = self.submarines.len(),
            torpedoes = self.torpedoes.len(),
            events = events.len(),
            "tick"
        );
        events
    }

    fn find_victim(&self, torpedo: &Torpedo) -> Option<PlayerId> {
        let half_length = self.tuning.hull_half_length();
        self.submarines
            .values()
            .filter(|sub| sub.is_alive() && sub.id() != torpedo.owner())
            .find(|sub| {
                capsule_hit_test(
                    torpedo.position(),
                    torpedo.depth(),
                    sub.position(),
                    sub.depth(),
                    sub.heading(),
                    half_length,
                    self.tuning.hit_radius,
                )
            })
            .map(|sub| sub.id().clone())
    }

    fn resolve_hit(&mut self, torpedo: &Torpedo, victim_id: &PlayerId, now: Timestamp) -> Option<GameEvent> {
        let attacker_name = self
            .submarines
            .get(torpedo.owner())
            .map_or_else(|| UNKNOWN_ATTACKER.to_owned(), |sub| sub.name().to_owned());
        let victim = self.submarines.get_mut(victim_id)?;
        victim.take_hit(now, &self.tuning);
        let respawn_at = victim.respawn_at().unwrap_or(now);
        info!(
            victim = %victim_id,
            attacker = %torpedo.owner(),
            torpedo = %torpedo.id(),
            "submarine hit"
        );
        Some(GameEvent::Hit(HitEvent {
            victim_id: victim_id.clone(),
            victim_name: victim.name().to_owned(),
            attacker_id: torpedo.owner().clone(),
            attacker_name,
            torpedo_id: torpedo.id(),
            respawn_at,
        }))
    }

    // -------------------------------------------------------------------------
    // Views
    // -------------------------------------------------------------------------

    /// Builds what `id` may currently see. `None` for an unknown id.
    ///
    /// Passive readings draw fresh noise on every call.
    pub fn get_snapshot(&mut self, id: &PlayerId) -> Option<PlayerView> {
        let now = self.clock.now();
        let viewer = self.submarines.get(id)?;
        let sonar_contacts = sonar::active_contacts(viewer, self.submarines.values(), now, &self.tuning);
        let passive_contacts =
            sonar::passive_contacts(viewer, self.submarines.values(), &self.tuning, &mut self.rng);
        Some(PlayerView {
            you: SelfView::of(viewer),
            torpedoes: self.torpedoes.iter().map(TorpedoView::from).collect(),
            sonar_contacts,
            passive_contacts,
            world: WorldInfo::from(&self.tuning),
            server_time: now,
        })
    }

    /// Snapshots for every player, in player-id order.
    pub fn snapshot_all(&mut self) -> Vec<(PlayerId, PlayerView)> {
        self.player_ids()
            .into_iter()
            .filter_map(|id| self.get_snapshot(&id).map(|view| (id, view)))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Command dispatch
    // -------------------------------------------------------------------------

    /// Applies one inbound command and returns the messages to deliver.
    pub fn handle(&mut self, id: &PlayerId, command: Command) -> Vec<Outbound> {
        match command {
            Command::Join { name } => {
                let name = sanitize_name(&name);
                match self.add_player(id.clone(), name) {
                    Ok(sub) => {
                        let username = sub.name().to_owned();
                        vec![
                            Outbound::to(
                                id.clone(),
                                OutboundMessage::Joined {
                                    id: id.clone(),
                                    username: username.clone(),
                                },
                            ),
                            Outbound::everyone_except(
                                id.clone(),
                                OutboundMessage::SystemMessage {
                                    message: format!("{username} has joined the hunt."),
                                },
                            ),
                        ]
                    }
                    Err(_) => Vec::new(),
                }
            }
            Command::Leave => self
                .remove_player(id)
                .map(|sub| {
                    vec![Outbound::everyone(OutboundMessage::SystemMessage {
                        message: format!("{} has left the hunt.", sub.name()),
                    })]
                })
                .unwrap_or_default(),
            Command::SetControls(controls) => {
                self.set_controls(id, &controls);
                Vec::new()
            }
            Command::FireTorpedo => self
                .fire_torpedo(id)
                .map(|torpedo| vec![Outbound::to(id.clone(), OutboundMessage::TorpedoFired { id: torpedo })])
                .unwrap_or_default(),
            Command::ActivePing => {
                if !self.submarines.contains_key(id) {
                    return Vec::new();
                }
                let PingResult {
                    contacts,
                    detections,
                } = self.perform_active_ping(id);
                let mut out = vec![Outbound::to(id.clone(), OutboundMessage::SonarResult { contacts })];
                out.extend(detections.into_iter().map(|detection| {
                    Outbound::to(
                        detection.target_id,
                        OutboundMessage::SonarPingDetected {
                            pinging_id: detection.pinger_id,
                            pinging_username: detection.pinger_name,
                            approx_distance: detection.distance,
                        },
                    )
                }));
                out
            }
            Command::RequestRespawn => {
                if self.request_respawn(id) {
                    vec![Outbound::to(id.clone(), OutboundMessage::Respawned)]
                } else {
                    self.submarines
                        .get(id)
                        .map(|sub| {
                            vec![Outbound::to(
                                id.clone(),
                                OutboundMessage::RespawnDenied {
                                    respawn_at: sub.respawn_at(),
                                },
                            )]
                        })
                        .unwrap_or_default()
                }
            }
        }
    }
}
