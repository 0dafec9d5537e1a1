//! Live game sessions and the registry that indexes them by join token.

pub mod registry;
pub mod session;

pub use registry::SessionRegistry;
pub use session::{GameSession, MoveOutcome};
