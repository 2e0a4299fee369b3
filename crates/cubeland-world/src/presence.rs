//! Presence fan-out: delivering room events to member connections.

use std::collections::HashMap;

use cubeland_protocol::{ServerEvent, Username};
use tokio::sync::mpsc;

/// Channel sender for pushing events to one player's connection task.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// The subscriber list for one room.
///
/// Lives inside the room actor, so subscribing and unsubscribing happen
/// at exactly the points where membership changes — the two lists can
/// never disagree. Sends to a subscriber whose connection task has gone
/// away are silently dropped; the registry cleans the member up through
/// the normal release path.
#[derive(Debug, Default)]
pub struct Presence {
    senders: HashMap<Username, EventSender>,
}

impl Presence {
    /// Creates an empty subscriber list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber. Replaces any previous sender for the name.
    pub fn subscribe(&mut self, username: Username, sender: EventSender) {
        self.senders.insert(username, sender);
    }

    /// Removes a subscriber.
    pub fn unsubscribe(&mut self, username: &Username) {
        self.senders.remove(username);
    }

    /// Sends an event to a single subscriber, if present.
    pub fn send_to(&self, username: &Username, event: ServerEvent) {
        if let Some(sender) = self.senders.get(username) {
            let _ = sender.send(event);
        }
    }

    /// Sends an event to every subscriber.
    pub fn broadcast(&self, event: ServerEvent) {
        for sender in self.senders.values() {
            let _ = sender.send(event.clone());
        }
    }

    /// Sends an event to every subscriber except one — used for deltas
    /// the originator already knows about (their own moves).
    pub fn broadcast_except(&self, excluded: &Username, event: ServerEvent) {
        for (username, sender) in &self.senders {
            if username != excluded {
                let _ = sender.send(event.clone());
            }
        }
    }

    /// Number of current subscribers.
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    /// Returns `true` if nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscriber() -> (EventSender, mpsc::UnboundedReceiver<ServerEvent>) {
        mpsc::unbounded_channel()
    }

    fn chat(text: &str) -> ServerEvent {
        ServerEvent::Chat {
            from: Username::new("x"),
            text: text.into(),
        }
    }

    #[test]
    fn test_broadcast_reaches_every_subscriber() {
        let mut presence = Presence::new();
        let (tx_a, mut rx_a) = subscriber();
        let (tx_b, mut rx_b) = subscriber();
        presence.subscribe(Username::new("a"), tx_a);
        presence.subscribe(Username::new("b"), tx_b);

        presence.broadcast(chat("hello"));

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
    }

    #[test]
    fn test_broadcast_except_skips_the_originator() {
        let mut presence = Presence::new();
        let (tx_a, mut rx_a) = subscriber();
        let (tx_b, mut rx_b) = subscriber();
        presence.subscribe(Username::new("a"), tx_a);
        presence.subscribe(Username::new("b"), tx_b);

        presence.broadcast_except(&Username::new("a"), chat("moved"));

        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_ok());
    }

    #[test]
    fn test_send_to_dead_subscriber_is_silent() {
        let mut presence = Presence::new();
        let (tx, rx) = subscriber();
        drop(rx);
        presence.subscribe(Username::new("a"), tx);

        // Must not panic or error.
        presence.send_to(&Username::new("a"), chat("anyone home?"));
        presence.broadcast(chat("still fine"));
    }

    #[test]
    fn test_unsubscribe_removes_the_subscriber() {
        let mut presence = Presence::new();
        let (tx, mut rx) = subscriber();
        presence.subscribe(Username::new("a"), tx);
        presence.unsubscribe(&Username::new("a"));

        presence.broadcast(chat("gone"));
        assert!(rx.try_recv().is_err());
        assert!(presence.is_empty());
    }
}
