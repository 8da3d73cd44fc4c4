//! # U-Boat Core
//!
//! Authoritative simulation core for a real-time multiplayer submarine arena.
//!
//! Captains steer by setting targets for heading, speed and depth; the engine
//! converges each boat toward its targets at bounded rates on a toroidal
//! plane. Boats find each other by sonar only: an always-on noisy passive
//! channel, and an active ping that reveals exact positions but announces the
//! pinger. Torpedoes run straight, hit hulls modelled as capsules, and sunk
//! boats come back only when their captain asks after the respawn delay.
//!
//! ## Architecture
//!
//! - [`engine::Engine`]: player table, torpedoes, clock, seeded RNG; the only
//!   mutable state
//! - [`entity`]: submarine and torpedo integration rules
//! - [`sonar`]: active ping, ping visibility window, passive noise model
//! - [`physics`]: wrapping, bounded convergence, bearing, capsule hit test
//! - [`output`] / [`snapshot`]: what the transport sends back to players
//! - [`shared`]: mutex-guarded engine handle and the fixed-rate tick driver
//!
//! The core performs no I/O. Inbound messages become [`command::Command`]s,
//! and everything to send comes back as addressed [`output::Outbound`]s.
//!
//! ## Usage
//!
//! ```
//! use uboat_core::command::Command;
//! use uboat_core::config::Tuning;
//! use uboat_core::entity::PlayerId;
//! use uboat_core::shared::{CollectingOutbox, SharedEngine, TickDriver};
//! use uboat_core::Engine;
//!
//! let arena = SharedEngine::new(Engine::new(Tuning::default(), 7)?);
//! let nemo = PlayerId::from("sid-1");
//! let replies = arena.handle(&nemo, Command::Join { name: "Nemo".into() });
//! assert_eq!(replies.len(), 2);
//!
//! let outbox = CollectingOutbox::new();
//! TickDriver::run_once(&arena, &outbox);
//! assert_eq!(outbox.len(), 1); // one state_update for Nemo
//! # Ok::<(), uboat_core::ConfigError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod clock;
pub mod command;
pub mod config;
pub mod constants;
pub mod engine;
pub mod entity;
pub mod output;
pub mod physics;
pub mod shared;
pub mod snapshot;
pub mod sonar;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, MonotonicClock, Timestamp};
pub use command::{Command, ControlCommand};
pub use config::{ConfigError, Tuning};
pub use engine::{Engine, EngineError};
pub use entity::{PlayerId, Submarine, Torpedo, TorpedoId};
pub use output::{GameEvent, HitEvent, Outbound, OutboundMessage, Recipient};
pub use shared::{CollectingOutbox, Outbox, SharedEngine, TickDriver};
pub use snapshot::PlayerView;
pub use sonar::PingResult;
