//! Time sources for the engine.
//!
//! All engine timing (tick delta, torpedo expiry, respawn timers, ping
//! windows) is expressed as a [`Timestamp`]: seconds since the clock's epoch.
//! Production code uses [`MonotonicClock`] so wall-clock jumps cannot stall
//! respawns or expire torpedoes early. Tests use [`ManualClock`] and advance
//! time by hand.

use std::fmt;
use std::ops::{Add, Sub};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Seconds since the engine's clock epoch.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(f64);

impl Timestamp {
    /// The clock epoch.
    pub const ZERO: Self = Self(0.0);

    /// Creates a timestamp from seconds since the epoch.
    #[must_use]
    pub const fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    /// Seconds since the epoch.
    #[must_use]
    pub const fn as_secs(self) -> f64 {
        self.0
    }

    /// Seconds elapsed from `earlier` to `self`; negative if `earlier` is later.
    #[must_use]
    pub fn secs_since(self, earlier: Self) -> f64 {
        self.0 - earlier.0
    }
}

impl Add<f64> for Timestamp {
    type Output = Self;

    fn add(self, secs: f64) -> Self {
        Self(self.0 + secs)
    }
}

impl Sub for Timestamp {
    type Output = f64;

    fn sub(self, rhs: Self) -> f64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}

/// A source of [`Timestamp`]s.
pub trait Clock: Send + Sync {
    /// Current time. Must never go backwards.
    fn now(&self) -> Timestamp;
}

/// Monotonic clock measuring from the moment it was created.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    /// Starts a clock whose epoch is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.epoch.elapsed().as_secs_f64())
    }
}

/// Hand-driven clock. Clones share the same time.
///
/// ```
/// use uboat_core::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// handle.advance(1.5);
/// assert_eq!(clock.now().as_secs(), 1.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<f64>>,
}

impl ManualClock {
    /// Creates a clock reading zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward by `secs`. Negative or non-finite steps are ignored.
    pub fn advance(&self, secs: f64) {
        if secs.is_finite() && secs > 0.0 {
            *self.now.lock().unwrap_or_else(PoisonError::into_inner) += secs;
        }
    }

    /// Jumps to `at` if it is not earlier than the current reading.
    pub fn set(&self, at: Timestamp) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        if at.0 > *now {
            *now = at.0;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(*self.now.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
