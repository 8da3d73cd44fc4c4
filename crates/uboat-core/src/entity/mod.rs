//! Entity models for the arena.
//!
//! - [`PlayerId`]: stable identifier handed over by the transport
//! - [`TorpedoId`]: engine-assigned torpedo identifier
//! - [`Submarine`]: one per connected player
//! - [`Torpedo`]: straight-running ordnance
//!
//! Entities own their per-tick integration rules but know nothing about each
//! other; collision and sonar are the engine's business.

pub mod submarine;
pub mod torpedo;

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use submarine::Submarine;
pub use torpedo::Torpedo;

/// Identifier of a connected player (and of their submarine).
///
/// The transport chooses the value, typically its connection id. Player ids
/// are ordered so the player table iterates deterministically.
///
/// ```
/// use uboat_core::entity::PlayerId;
///
/// let id = PlayerId::from("sid-42");
/// assert_eq!(id.as_str(), "sid-42");
/// assert!(PlayerId::from("a") < PlayerId::from("b"));
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wraps a transport-assigned identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerId({})", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for PlayerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Identifier of a torpedo, unique for the lifetime of an engine.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TorpedoId(u64);

impl TorpedoId {
    /// Creates a torpedo id from its sequence number.
    #[must_use]
    pub const fn new(seq: u64) -> Self {
        Self(seq)
    }

    /// The sequence number.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TorpedoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TorpedoId({})", self.0)
    }
}

impl fmt::Display for TorpedoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "torp-{}", self.0)
    }
}

impl From<TorpedoId> for String {
    fn from(id: TorpedoId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for TorpedoId {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.strip_prefix("torp-")
            .and_then(|seq| seq.parse().ok())
            .map(Self)
            .ok_or_else(|| format!("not a torpedo id: {raw}"))
    }
}
