//! `/health` endpoint body.

use std::time::Instant;

use serde::Serialize;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the server is running.
    pub status: &'static str,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Open WebSocket connections.
    pub connections: usize,
    /// Sessions reachable through the registry.
    pub active_sessions: usize,
}

impl HealthResponse {
    /// Snapshot the live counters.
    pub fn collect(started: Instant, connections: usize, active_sessions: usize) -> Self {
        Self {
            status: "ok",
            uptime_secs: started.elapsed().as_secs(),
            connections,
            active_sessions,
        }
    }
}
