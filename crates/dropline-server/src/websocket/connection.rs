//! Per-connection outbound channel and liveness state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dropline_core::{ConnectionId, ServerEvent};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::warn;

/// A frame queued for the connection's writer task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outbound {
    /// A serialized server event.
    Text(Arc<str>),
    /// Close the socket with this code and reason, then stop writing.
    Close {
        /// WebSocket close code.
        code: u16,
        /// Human-readable reason.
        reason: String,
    },
}

/// One connected client as seen by the rest of the broker.
///
/// Everything that wants to talk to the client goes through the bounded
/// channel; only the writer task touches the socket.
pub struct ClientConnection {
    /// Unique connection ID.
    pub id: ConnectionId,
    tx: mpsc::Sender<Outbound>,
    connected_at: Instant,
    /// Whether the client has shown any activity since the last heartbeat tick.
    pub is_alive: AtomicBool,
    last_pong: Mutex<Instant>,
    /// Count of frames dropped because the queue was full or closed.
    pub dropped_messages: AtomicU64,
}

impl ClientConnection {
    /// Create a connection around the sending half of its outbound queue.
    pub fn new(id: ConnectionId, tx: mpsc::Sender<Outbound>) -> Self {
        let now = Instant::now();
        Self {
            id,
            tx,
            connected_at: now,
            is_alive: AtomicBool::new(true),
            last_pong: Mutex::new(now),
            dropped_messages: AtomicU64::new(0),
        }
    }

    /// Queue a pre-serialized text frame.
    ///
    /// Never waits. Returns `false` and bumps the drop counter if the queue
    /// is full or the writer has gone away.
    pub fn send(&self, text: Arc<str>) -> bool {
        self.enqueue(Outbound::Text(text))
    }

    /// Serialize an event and queue it.
    pub fn send_event(&self, event: &ServerEvent) -> bool {
        match event.encode() {
            Ok(json) => self.send(Arc::from(json)),
            Err(error) => {
                warn!(connection_id = %self.id, %error, "failed to encode server event");
                false
            }
        }
    }

    /// Queue a close frame. The writer stops after sending it.
    pub fn close(&self, code: u16, reason: impl Into<String>) -> bool {
        self.enqueue(Outbound::Close {
            code,
            reason: reason.into(),
        })
    }

    fn enqueue(&self, frame: Outbound) -> bool {
        if self.tx.try_send(frame).is_ok() {
            true
        } else {
            let _ = self.dropped_messages.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Total frames dropped for this connection.
    pub fn drop_count(&self) -> u64 {
        self.dropped_messages.load(Ordering::Relaxed)
    }

    /// Record client activity (pong or any inbound frame).
    pub fn mark_alive(&self) {
        self.is_alive.store(true, Ordering::Relaxed);
        *self.last_pong.lock() = Instant::now();
    }

    /// Time since the last recorded activity.
    pub fn last_pong_elapsed(&self) -> Duration {
        self.last_pong.lock().elapsed()
    }

    /// Read and clear the alive flag.
    pub fn check_alive(&self) -> bool {
        self.is_alive.swap(false, Ordering::Relaxed)
    }

    /// Connection age.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

impl std::fmt::Debug for ClientConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConnection")
            .field("id", &self.id)
            .field("dropped_messages", &self.drop_count())
            .finish_non_exhaustive()
    }
}
