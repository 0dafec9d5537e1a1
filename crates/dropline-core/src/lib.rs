//! # dropline-core
//!
//! Types shared by every Dropline crate:
//!
//! - [`ids`]: connection IDs and unguessable join tokens
//! - [`player`]: the two fixed player roles
//! - [`protocol`]: client/server wire events and decoding
//! - [`errors`]: protocol-level error type
//! - [`logging`]: `tracing` subscriber setup

#![deny(unsafe_code)]

pub mod errors;
pub mod ids;
pub mod logging;
pub mod player;
pub mod protocol;

pub use errors::ProtocolError;
pub use ids::{ConnectionId, JoinToken};
pub use player::Player;
pub use protocol::{ClientEvent, ServerEvent};
