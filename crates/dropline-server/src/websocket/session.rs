//! Connection task: one connected client from upgrade through disconnect.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use dropline_core::{ConnectionId, ProtocolError};
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge, histogram};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::field::display;
use tracing::{Span, debug, info, instrument, warn};

use super::connection::{ClientConnection, Outbound};
use super::handler::{CloseReason, Flow, ProtocolHandler};
use super::heartbeat::{HeartbeatResult, run_heartbeat};
use crate::config::ServerConfig;
use crate::game::SessionRegistry;
use crate::metrics::{
    WS_CONNECTION_DURATION_SECONDS, WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL,
    WS_DISCONNECTIONS_TOTAL,
};

/// How long the writer gets to flush a close frame before it is aborted.
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Run one client connection.
///
/// 1. Spawns the writer, which drains the outbound queue and sends pings
/// 2. Feeds inbound text (or UTF-8 binary) frames to the [`ProtocolHandler`]
/// 3. Stops on peer close, a fatal protocol error, heartbeat timeout or shutdown
/// 4. Releases the seat, then flushes the close frame if the peer is reachable
#[instrument(
    skip_all,
    fields(
        connection_id = %connection_id,
        token = tracing::field::Empty,
        player = tracing::field::Empty
    )
)]
pub async fn run_ws_session(
    ws: WebSocket,
    connection_id: ConnectionId,
    registry: Arc<SessionRegistry>,
    config: Arc<ServerConfig>,
    shutdown: CancellationToken,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();
    let (send_tx, mut send_rx) = mpsc::channel::<Outbound>(config.send_queue.max(1));
    let connection = Arc::new(ClientConnection::new(connection_id, send_tx));

    info!("client connected");
    counter!(WS_CONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);

    let ping_every = config.heartbeat_interval();
    let mut writer = tokio::spawn(async move {
        let mut ping = tokio::time::interval(ping_every);
        // Skip the immediate first tick
        let _ = ping.tick().await;

        loop {
            tokio::select! {
                frame = send_rx.recv() => match frame {
                    Some(Outbound::Text(text)) => {
                        if ws_tx.send(Message::Text(text.to_string().into())).await.is_err() {
                            break;
                        }
                    }
                    Some(Outbound::Close { code, reason }) => {
                        let frame = CloseFrame { code, reason: reason.into() };
                        let _ = ws_tx.send(Message::Close(Some(frame))).await;
                        break;
                    }
                    None => break,
                },
                _ = ping.tick() => {
                    if ws_tx.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    let mut handler = ProtocolHandler::new(connection.clone(), registry);
    let heartbeat = run_heartbeat(
        connection.clone(),
        config.heartbeat_interval(),
        config.heartbeat_timeout(),
        shutdown.clone(),
    );
    tokio::pin!(heartbeat);
    let mut seat_recorded = false;

    let reason = loop {
        tokio::select! {
            frame = ws_rx.next() => {
                let Some(Ok(msg)) = frame else {
                    debug!("socket closed by peer");
                    break None;
                };
                connection.mark_alive();
                let flow = match msg {
                    Message::Text(text) => handler.handle_text(text.as_str()),
                    Message::Binary(data) => match std::str::from_utf8(&data) {
                        Ok(text) => handler.handle_text(text),
                        Err(_) => handler.violation(&ProtocolError::NonUtf8Frame),
                    },
                    Message::Close(_) => {
                        info!("client sent close frame");
                        break None;
                    }
                    Message::Ping(_) | Message::Pong(_) => Flow::Continue,
                };
                if !seat_recorded {
                    seat_recorded = record_seat(&handler);
                }
                if let Flow::Close(reason) = flow {
                    break Some(reason);
                }
            }
            result = &mut heartbeat => {
                break Some(match result {
                    HeartbeatResult::TimedOut => {
                        warn!(
                            silent_for = ?connection.last_pong_elapsed(),
                            "client unresponsive, disconnecting"
                        );
                        CloseReason::Unresponsive
                    }
                    HeartbeatResult::Cancelled => CloseReason::Shutdown,
                });
            }
        }
    };

    // Release the seat before the close frame goes out.
    handler.close();

    let closing = match reason.as_ref().and_then(CloseReason::frame) {
        Some((code, text)) => connection.close(code, text),
        None => false,
    };
    if closing {
        if tokio::time::timeout(CLOSE_FLUSH_TIMEOUT, &mut writer)
            .await
            .is_err()
        {
            debug!("close frame not flushed in time");
            writer.abort();
        }
    } else {
        writer.abort();
    }

    info!(
        reason = ?reason,
        dropped = connection.drop_count(),
        "client disconnected"
    );
    counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
    histogram!(WS_CONNECTION_DURATION_SECONDS).record(connection.age().as_secs_f64());
}

/// Tag the connection span with its session once the handler has a seat.
fn record_seat(handler: &ProtocolHandler) -> bool {
    let (Some(token), Some(player)) = (handler.token(), handler.player()) else {
        return false;
    };
    let span = Span::current();
    let _ = span.record("token", token.as_str());
    let _ = span.record("player", display(player));
    true
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
