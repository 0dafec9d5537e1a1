//! Player roles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two fixed seats in a session.
///
/// The session creator is always [`Player::First`] and moves first; the one
/// participant allowed to join is [`Player::Second`]. On the wire the roles
/// are the disc colours `"red"` and `"yellow"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// First mover (session creator).
    #[serde(rename = "red")]
    First,
    /// Second mover (joiner).
    #[serde(rename = "yellow")]
    Second,
}

impl Player {
    /// The other seat.
    #[must_use]
    pub fn opponent(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    /// Wire name of the role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::First => "red",
            Self::Second => "yellow",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
