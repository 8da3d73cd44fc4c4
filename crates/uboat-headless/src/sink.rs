//! Outbox that writes deliveries to the log instead of a socket.

use std::sync::atomic::{AtomicU64, Ordering};

use uboat_core::output::{Outbound, OutboundMessage, Recipient};
use uboat_core::shared::Outbox;

/// Logs every outbound message and keeps delivery counters.
#[derive(Debug, Default)]
pub struct LogSink {
    state_updates: AtomicU64,
    announcements: AtomicU64,
}

impl LogSink {
    /// `(state_updates, other messages)` delivered so far.
    pub fn counts(&self) -> (u64, u64) {
        (
            self.state_updates.load(Ordering::Relaxed),
            self.announcements.load(Ordering::Relaxed),
        )
    }
}

fn describe(to: &Recipient) -> String {
    match to {
        Recipient::Player(id) => id.to_string(),
        Recipient::Everyone => "*".to_owned(),
        Recipient::EveryoneExcept(id) => format!("*-{id}"),
    }
}

impl Outbox for LogSink {
    fn deliver(&self, outbound: Outbound) {
        let to = describe(&outbound.to);
        if let OutboundMessage::StateUpdate(view) = &outbound.message {
            self.state_updates.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(
                %to,
                alive = view.you.is_alive(),
                torpedoes = view.torpedoes.len(),
                sonar = view.sonar_contacts.len(),
                passive = view.passive_contacts.len(),
                "state_update"
            );
            return;
        }
        self.announcements.fetch_add(1, Ordering::Relaxed);
        match serde_json::to_string(&outbound.message) {
            Ok(json) => tracing::info!(%to, message = %json, "deliver"),
            Err(e) => tracing::warn!(%to, error = %e, "unserializable message"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uboat_core::entity::PlayerId;

    #[test]
    fn counts_split_state_from_announcements() {
        let sink = LogSink::default();
        sink.deliver(Outbound::everyone(OutboundMessage::SystemMessage {
            message: "hello".into(),
        }));
        sink.deliver(Outbound::to(PlayerId::from("p"), OutboundMessage::RespawnReady));
        assert_eq!(sink.counts(), (0, 2));
    }

    #[test]
    fn recipients_render_compactly() {
        assert_eq!(describe(&Recipient::Everyone), "*");
        assert_eq!(describe(&Recipient::EveryoneExcept(PlayerId::from("a"))), "*-a");
    }
}
