//! Notifications emitted by the market.
//!
//! Events are fire-and-forget: a notifier cannot fail the operation that
//! produced them.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::info;

use tycoon_types::PlayerId;

/// Something observers of the market should know about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MarketEvent {
    /// A player's wallet balance changed.
    WalletChanged {
        /// Whose wallet.
        player: PlayerId,
    },
    /// Map tiles changed and clients should redraw.
    MapReload,
    /// A message for every player.
    PublicAnnouncement {
        /// Announcement text.
        text: String,
    },
}

/// Delivers market events.
pub trait MarketNotifier: Send + Sync {
    /// Deliver one event.
    fn notify(&self, event: MarketEvent);
}

/// Notifier that writes events to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl MarketNotifier for TracingNotifier {
    fn notify(&self, event: MarketEvent) {
        match event {
            MarketEvent::WalletChanged { player } => info!(%player, "Wallet changed"),
            MarketEvent::MapReload => info!("Map reload"),
            MarketEvent::PublicAnnouncement { text } => info!(%text, "Public announcement"),
        }
    }
}

/// Notifier that keeps events in memory until drained.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    events: Mutex<Vec<MarketEvent>>,
}

impl CollectingNotifier {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return every collected event.
    pub fn drain(&self) -> Vec<MarketEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl MarketNotifier for CollectingNotifier {
    fn notify(&self, event: MarketEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_drains_in_order() {
        let collector = CollectingNotifier::new();
        collector.notify(MarketEvent::MapReload);
        collector.notify(MarketEvent::PublicAnnouncement {
            text: "hello".to_owned(),
        });
        let events = collector.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events.first(), Some(&MarketEvent::MapReload));
        assert!(collector.drain().is_empty());
    }

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_string(&MarketEvent::MapReload);
        assert_eq!(json.ok().as_deref(), Some(r#"{"event":"map_reload"}"#));
    }
}
