//! Arena tuning, read once at startup.
//!
//! [`Tuning`] carries every constant the engine needs. `Tuning::default()`
//! reproduces the values in [`constants`](crate::constants); a JSON
//! document may override any subset of fields:
//!
//! ```
//! use uboat_core::config::Tuning;
//!
//! let tuning = Tuning::from_json_str(r#"{ "world_size": 500.0, "tick_rate": 10.0 }"#).unwrap();
//! assert_eq!(tuning.world_size, 500.0);
//! assert_eq!(tuning.max_depth, uboat_core::constants::MAX_DEPTH);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;

/// Errors raised while loading or validating a [`Tuning`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The tuning file could not be read.
    #[error("failed to read tuning file {}: {source}", path.display())]
    Io {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The document was not valid tuning JSON.
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field holds a value the engine cannot run with.
    #[error("invalid tuning field `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Tuning constants for one arena.
///
/// Distances are world units (the depth axis is meters, on the same scale),
/// times are seconds, angles are degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Side length of the toroidal plane.
    pub world_size: f64,
    /// Depth axis upper bound.
    pub max_depth: f64,
    /// Ticks per second for the fixed-rate driver.
    pub tick_rate: f64,
    /// Torpedo speed.
    pub torpedo_speed: f64,
    /// Seconds a torpedo runs before expiring.
    pub torpedo_lifetime: f64,
    /// Submarine top speed.
    pub sub_max_speed: f64,
    /// Heading change limit, degrees per second.
    pub max_turn_rate: f64,
    /// Speed change limit per second.
    pub max_acceleration: f64,
    /// Dive rate when stopped.
    pub base_dive_rate: f64,
    /// Additional dive rate per unit of speed.
    pub dive_rate_per_speed: f64,
    /// Spawn and respawn depth.
    pub default_depth: f64,
    /// Highest throttle notch.
    pub speed_order_max: f64,
    /// Active sonar range.
    pub sonar_range: f64,
    /// Seconds a ping keeps both sides visible on active sonar.
    pub ping_visibility_window: f64,
    /// Passive sonar range.
    pub passive_sonar_range: f64,
    /// Passive bearing jitter, +/- degrees.
    pub passive_noise_bearing: f64,
    /// Passive distance jitter, +/- fraction.
    pub passive_noise_distance: f64,
    /// Capsule radius for torpedo hits.
    pub hit_radius: f64,
    /// Hull length for torpedo hits.
    pub sub_length: f64,
    /// Seconds from a hit until respawn is allowed.
    pub respawn_time: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world_size: constants::WORLD_SIZE,
            max_depth: constants::MAX_DEPTH,
            tick_rate: constants::TICK_RATE,
            torpedo_speed: constants::TORPEDO_SPEED,
            torpedo_lifetime: constants::TORPEDO_LIFETIME,
            sub_max_speed: constants::SUB_MAX_SPEED,
            max_turn_rate: constants::MAX_TURN_RATE,
            max_acceleration: constants::MAX_ACCELERATION,
            base_dive_rate: constants::BASE_DIVE_RATE,
            dive_rate_per_speed: constants::DIVE_RATE_PER_SPEED,
            default_depth: constants::DEFAULT_DEPTH,
            speed_order_max: constants::SPEED_ORDER_MAX,
            sonar_range: constants::SONAR_RANGE,
            ping_visibility_window: constants::PING_VISIBILITY_WINDOW,
            passive_sonar_range: constants::PASSIVE_SONAR_RANGE,
            passive_noise_bearing: constants::PASSIVE_SONAR_NOISE_BEARING,
            passive_noise_distance: constants::PASSIVE_SONAR_NOISE_DISTANCE,
            hit_radius: constants::HIT_RADIUS,
            sub_length: constants::SUB_LENGTH,
            respawn_time: constants::RESPAWN_TIME,
        }
    }
}

impl Tuning {
    /// Parses a (possibly partial) JSON tuning document and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value fails [`Tuning::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reads and validates a JSON tuning file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`Tuning::from_json_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Seconds between ticks of the fixed-rate driver.
    #[must_use]
    pub fn tick_interval(&self) -> f64 {
        1.0 / self.tick_rate
    }

    /// Half the hull length; the capsule extends this far fore and aft.
    #[must_use]
    pub fn hull_half_length(&self) -> f64 {
        self.sub_length / 2.0
    }

    /// Checks that every field is usable by the engine.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("world_size", self.world_size),
            ("max_depth", self.max_depth),
            ("tick_rate", self.tick_rate),
            ("torpedo_speed", self.torpedo_speed),
            ("torpedo_lifetime", self.torpedo_lifetime),
            ("sub_max_speed", self.sub_max_speed),
            ("max_turn_rate", self.max_turn_rate),
            ("max_acceleration", self.max_acceleration),
            ("base_dive_rate", self.base_dive_rate),
            ("speed_order_max", self.speed_order_max),
            ("sonar_range", self.sonar_range),
            ("passive_sonar_range", self.passive_sonar_range),
            ("hit_radius", self.hit_radius),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(field, format!("must be finite and > 0, got {value}")));
            }
        }

        let non_negative = [
            ("dive_rate_per_speed", self.dive_rate_per_speed),
            ("ping_visibility_window", self.ping_visibility_window),
            ("sub_length", self.sub_length),
            ("respawn_time", self.respawn_time),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, format!("must be finite and >= 0, got {value}")));
            }
        }

        if !(0.0..=self.max_depth).contains(&self.default_depth) {
            return Err(invalid(
                "default_depth",
                format!("must lie within [0, {}], got {}", self.max_depth, self.default_depth),
            ));
        }
        if !(0.0..=180.0).contains(&self.passive_noise_bearing) {
            return Err(invalid(
                "passive_noise_bearing",
                format!("must lie within [0, 180], got {}", self.passive_noise_bearing),
            ));
        }
        if !(0.0..1.0).contains(&self.passive_noise_distance) {
            return Err(invalid(
                "passive_noise_distance",
                format!("must lie within [0, 1), got {}", self.passive_noise_distance),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
