//! Liveness monitoring.
//!
//! The writer task pings the client every interval; inbound frames (pongs
//! included) mark the connection alive. This loop only counts silent ticks.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::connection::ClientConnection;

/// Why the heartbeat loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatResult {
    /// The client stayed silent for the whole timeout window.
    TimedOut,
    /// The token fired.
    Cancelled,
}

/// Consecutive silent ticks tolerated: `timeout / interval`, at least 1.
fn max_missed(interval: Duration, timeout: Duration) -> u64 {
    let interval_secs = interval.as_secs().max(1);
    (timeout.as_secs() / interval_secs).max(1)
}

/// Watch `connection` until it goes quiet for `timeout` or `cancel` fires.
pub async fn run_heartbeat(
    connection: Arc<ClientConnection>,
    interval: Duration,
    timeout: Duration,
    cancel: CancellationToken,
) -> HeartbeatResult {
    let mut ticks = time::interval(interval);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the connection was just opened.
    let _ = ticks.tick().await;

    let limit = max_missed(interval, timeout);
    let mut missed = 0;

    loop {
        tokio::select! {
            _ = ticks.tick() => {
                if connection.check_alive() {
                    missed = 0;
                } else {
                    missed += 1;
                    debug!(connection_id = %connection.id, missed, limit, "heartbeat missed");
                    if missed >= limit {
                        return HeartbeatResult::TimedOut;
                    }
                }
            }
            () = cancel.cancelled() => return HeartbeatResult::Cancelled,
        }
    }
}
