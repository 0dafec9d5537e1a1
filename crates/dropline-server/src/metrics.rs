//! Prometheus recorder and metric names.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the global Prometheus recorder.
///
/// Returns the handle that renders `/metrics`. Fails if a recorder is
/// already installed in this process.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

/// A handle backed by a recorder that is not installed globally.
///
/// Renders an empty exposition; used when another recorder owns the process.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

/// WebSocket connections opened (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// WebSocket connections closed (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Open WebSocket connections (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// Upgrades refused at the connection cap (counter).
pub const WS_CONNECTIONS_REJECTED_TOTAL: &str = "ws_connections_rejected_total";
/// Connection lifetime (histogram, seconds).
pub const WS_CONNECTION_DURATION_SECONDS: &str = "ws_connection_duration_seconds";
/// Events dropped on a full or closed outbound queue (counter).
pub const WS_BROADCAST_DROPS_TOTAL: &str = "ws_broadcast_drops_total";
/// Sessions created (counter).
pub const SESSIONS_CREATED_TOTAL: &str = "sessions_created_total";
/// Sessions in the registry (gauge).
pub const SESSIONS_ACTIVE: &str = "sessions_active";
/// Successful joins (counter).
pub const SESSION_JOINS_TOTAL: &str = "session_joins_total";
/// Joins refused (counter, labels: reason).
pub const SESSION_JOIN_FAILURES_TOTAL: &str = "session_join_failures_total";
/// Moves applied (counter).
pub const MOVES_APPLIED_TOTAL: &str = "moves_applied_total";
/// Moves rejected by the engine (counter).
pub const MOVES_REJECTED_TOTAL: &str = "moves_rejected_total";
/// Games that ended with a winner (counter).
pub const GAMES_WON_TOTAL: &str = "games_won_total";
/// Connections closed for a protocol violation (counter).
pub const PROTOCOL_VIOLATIONS_TOTAL: &str = "protocol_violations_total";
