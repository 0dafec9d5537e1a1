//! # dropline-server
//!
//! Axum HTTP + `WebSocket` broker for two-player Connect Four sessions.
//!
//! - [`game`]: session registry and per-session state (game + participants)
//! - [`websocket`]: connection channel, protocol state machine, broadcast,
//!   heartbeat and the per-connection task
//! - [`server`]: `/ws`, `/health` and `/metrics` routes with a connection cap
//! - [`shutdown`]: graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod game;
pub mod health;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod websocket;
