//! Event fan-out to the connections attached to one game session.

use std::collections::HashMap;
use std::sync::Arc;

use dropline_core::{ConnectionId, ServerEvent};
use metrics::counter;
use parking_lot::RwLock;
use tracing::{debug, warn};

use super::connection::ClientConnection;
use crate::metrics::WS_BROADCAST_DROPS_TOTAL;

/// The live connections of one session, indexed by connection ID.
pub struct ParticipantSet {
    members: RwLock<HashMap<ConnectionId, Arc<ClientConnection>>>,
}

impl ParticipantSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            members: RwLock::new(HashMap::new()),
        }
    }

    /// Attach a connection.
    pub fn add(&self, connection: Arc<ClientConnection>) {
        let _ = self
            .members
            .write()
            .insert(connection.id.clone(), connection);
    }

    /// Detach a connection. Returns whether it was present.
    pub fn remove(&self, connection_id: &ConnectionId) -> bool {
        self.members.write().remove(connection_id).is_some()
    }

    /// Number of attached connections.
    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    /// Whether no connection is attached.
    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }

    /// Point-in-time copy of the attached connections.
    pub fn snapshot(&self) -> Vec<Arc<ClientConnection>> {
        self.members.read().values().cloned().collect()
    }

    /// Send `event` to every attached connection.
    ///
    /// The event is serialized once and enqueued on a snapshot of the set, so
    /// joins and leaves during delivery never affect this broadcast. Returns
    /// how many connections accepted it.
    pub fn broadcast(&self, event: &ServerEvent) -> usize {
        let json: Arc<str> = match event.encode() {
            Ok(json) => Arc::from(json),
            Err(error) => {
                warn!(event_type = event.kind(), %error, "failed to serialize event");
                return 0;
            }
        };

        let recipients = self.snapshot();
        let mut delivered = 0;
        for conn in &recipients {
            if conn.send(json.clone()) {
                delivered += 1;
            } else {
                counter!(WS_BROADCAST_DROPS_TOTAL).increment(1);
                warn!(
                    connection_id = %conn.id,
                    event_type = event.kind(),
                    dropped = conn.drop_count(),
                    "failed to deliver event to participant"
                );
            }
        }
        debug!(
            event_type = event.kind(),
            recipients = recipients.len(),
            delivered,
            "broadcast event to session"
        );
        delivered
    }
}

impl Default for ParticipantSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::connection::Outbound;
    use dropline_core::Player;
    use tokio::sync::mpsc;

    fn make_connection(capacity: usize) -> (Arc<ClientConnection>, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Arc::new(ClientConnection::new(ConnectionId::new(), tx)), rx)
    }

    fn win() -> ServerEvent {
        ServerEvent::Win {
            player: Player::Second,
        }
    }

    #[test]
    fn add_and_remove() {
        let set = ParticipantSet::new();
        let (a, _rx) = make_connection(4);
        set.add(a.clone());
        assert_eq!(set.snapshot()[0].id, a.id);
        assert_eq!(set.len(), 1);
        assert!(set.remove(&a.id));
        assert!(!set.remove(&a.id));
        assert!(set.is_empty());
    }

    #[test]
    fn broadcast_reaches_every_member() {
        let set = ParticipantSet::new();
        let (a, mut rx_a) = make_connection(4);
        let (b, mut rx_b) = make_connection(4);
        set.add(a);
        set.add(b);

        assert_eq!(set.broadcast(&win()), 2);

        let expected = Outbound::Text(Arc::from(r#"{"type":"win","player":"yellow"}"#));
        assert_eq!(rx_a.try_recv().unwrap(), expected);
        assert_eq!(rx_b.try_recv().unwrap(), expected);
    }

    #[test]
    fn removed_member_gets_nothing() {
        let set = ParticipantSet::new();
        let (a, mut rx_a) = make_connection(4);
        let (b, mut rx_b) = make_connection(4);
        set.add(a);
        set.add(b.clone());
        let _ = set.remove(&b.id);

        assert_eq!(set.broadcast(&win()), 1);
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn slow_member_does_not_block_others() {
        let set = ParticipantSet::new();
        let (slow, _rx_slow) = make_connection(1);
        let (fast, mut rx_fast) = make_connection(8);
        set.add(slow.clone());
        set.add(fast);

        assert_eq!(set.broadcast(&win()), 2);
        assert_eq!(set.broadcast(&win()), 1);
        assert_eq!(slow.drop_count(), 1);
        assert!(rx_fast.try_recv().is_ok());
        assert!(rx_fast.try_recv().is_ok());
    }

    #[test]
    fn empty_set_broadcast_is_noop() {
        let set = ParticipantSet::default();
        assert_eq!(set.broadcast(&win()), 0);
    }
}
