//! Scripted captains that exercise the arena without a transport.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde_json::json;
use uboat_core::command::Command;
use uboat_core::entity::PlayerId;
use uboat_core::shared::SharedEngine;
use uboat_core::Outbound;

const CALLSIGNS: [&str; 8] = [
    "Ahab", "Nemo", "Ramius", "Kapitan", "Dahl", "Holt", "Ivers", "Mako",
];

/// One scripted captain.
#[derive(Debug)]
pub struct Bot {
    id: PlayerId,
    name: String,
}

impl Bot {
    /// Creates bot number `index`.
    pub fn new(index: usize) -> Self {
        let callsign = CALLSIGNS[index % CALLSIGNS.len()];
        Self {
            id: PlayerId::new(format!("bot-{index}")),
            name: format!("{callsign} {}", index / CALLSIGNS.len() + 1),
        }
    }

    /// The bot's player id.
    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    /// Joins the arena.
    pub fn join(&self, arena: &SharedEngine) -> Vec<Outbound> {
        arena.handle(&self.id, Command::Join { name: self.name.clone() })
    }

    /// Leaves the arena.
    pub fn leave(&self, arena: &SharedEngine) -> Vec<Outbound> {
        arena.handle(&self.id, Command::Leave)
    }

    /// Picks and issues this turn's orders.
    ///
    /// Dead bots only ask to respawn. Live bots sometimes change course,
    /// occasionally fire or ping.
    pub fn act(&self, arena: &SharedEngine, rng: &mut ChaCha8Rng) -> Vec<Outbound> {
        let alive = arena.with(|engine| engine.player(&self.id).map(uboat_core::Submarine::is_alive));
        match alive {
            None => Vec::new(),
            Some(false) => arena.handle(&self.id, Command::RequestRespawn),
            Some(true) => {
                let mut out = Vec::new();
                if rng.gen_bool(0.3) {
                    // Go through the wire parser, as a browser client would
                    let payload = json!({
                        "heading": rng.gen_range(0.0..360.0),
                        "speed": rng.gen_range(0..=4),
                        "depth": rng.gen_range(20.0..250.0),
                    });
                    if let Some(command) = Command::from_wire("update_controls", &payload) {
                        out.extend(arena.handle(&self.id, command));
                    }
                }
                if rng.gen_bool(0.15) {
                    out.extend(arena.handle(&self.id, Command::FireTorpedo));
                }
                if rng.gen_bool(0.05) {
                    out.extend(arena.handle(&self.id, Command::ActivePing));
                }
                out
            }
        }
    }
}
