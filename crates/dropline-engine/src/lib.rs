//! # dropline-engine
//!
//! The rules side of a Dropline session.
//!
//! - [`GameEngine`]: the contract any turn-based rules engine fulfils
//! - [`ConnectFour`]: the bundled 7×6 four-in-a-row engine
//! - [`GameAdapter`]: the boundary the session broker calls into
//!
//! The adapter is not thread-safe on its own; callers serialize access per
//! session.

#![deny(unsafe_code)]

pub mod adapter;
pub mod connect_four;
pub mod engine;
pub mod errors;

pub use adapter::{GameAdapter, MoveRecord};
pub use connect_four::ConnectFour;
pub use engine::GameEngine;
pub use errors::InvalidMove;
