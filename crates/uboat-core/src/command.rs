//! Inbound commands from the transport.
//!
//! The transport maps each connection to a [`PlayerId`](crate::entity::PlayerId)
//! and turns client messages into [`Command`] values. Numeric control fields
//! are parsed leniently by [`ControlCommand::from_json`]: numbers and numeric
//! strings are accepted, anything else leaves that field untouched.
//!
//! ```
//! use uboat_core::command::{Command, ControlCommand};
//! use serde_json::json;
//!
//! let cmd = Command::from_wire("update_controls", &json!({ "heading": "270", "speed": 2, "depth": "deep" }));
//! assert_eq!(
//!     cmd,
//!     Some(Command::SetControls(ControlCommand {
//!         heading: Some(270.0),
//!         speed: Some(2.0),
//!         depth: None,
//!     }))
//! );
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name given to captains who join without one.
pub const DEFAULT_CAPTAIN_NAME: &str = "Captain";

/// Longest display name kept, in characters.
pub const MAX_NAME_CHARS: usize = 24;

/// New control targets for a submarine. Absent fields keep their target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlCommand {
    /// Desired heading in degrees (normalized on apply).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    /// Throttle notch (`0..=speed_order_max`) or absolute speed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Desired depth (clamped on apply).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
}

impl ControlCommand {
    /// Sets the heading target.
    #[must_use]
    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }

    /// Sets the speed order.
    #[must_use]
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Sets the depth target.
    #[must_use]
    pub fn with_depth(mut self, depth: f64) -> Self {
        self.depth = Some(depth);
        self
    }

    /// True if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heading.is_none() && self.speed.is_none() && self.depth.is_none()
    }

    /// Reads a client payload, dropping fields that are not finite numbers.
    #[must_use]
    pub fn from_json(payload: &Value) -> Self {
        Self {
            heading: numeric_field(payload, "heading"),
            speed: numeric_field(payload, "speed"),
            depth: numeric_field(payload, "depth"),
        }
    }
}

fn numeric_field(payload: &Value, key: &str) -> Option<f64> {
    let value = match payload.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}

/// A command issued by one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Enter the arena under a display name.
    Join {
        /// Requested display name
        name: String,
    },
    /// Leave the arena (disconnect).
    Leave,
    /// Update heading/speed/depth targets.
    SetControls(ControlCommand),
    /// Fire a torpedo along the current heading.
    FireTorpedo,
    /// Emit an active sonar ping.
    ActivePing,
    /// Re-enter after the respawn timer has elapsed.
    RequestRespawn,
}

impl Command {
    /// Maps a client event name and payload onto a command.
    ///
    /// Event names follow the browser client: `join_game`, `leave`,
    /// `update_controls`, `fire_torpedo`, `sonar_ping`, `request_respawn`.
    /// Returns `None` for unknown events.
    #[must_use]
    pub fn from_wire(event: &str, payload: &Value) -> Option<Self> {
        let command = match event {
            "join_game" => Self::Join {
                name: payload
                    .get("username")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned(),
            },
            "leave" | "disconnect" => Self::Leave,
            "update_controls" => Self::SetControls(ControlCommand::from_json(payload)),
            "fire_torpedo" => Self::FireTorpedo,
            "sonar_ping" => Self::ActivePing,
            "request_respawn" => Self::RequestRespawn,
            _ => return None,
        };
        Some(command)
    }
}

/// Trims a requested display name, falling back to [`DEFAULT_CAPTAIN_NAME`]
/// and truncating to [`MAX_NAME_CHARS`] characters.
#[must_use]
pub fn sanitize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_CAPTAIN_NAME.to_owned();
    }
    trimmed.chars().take(MAX_NAME_CHARS).collect()
}
