//! Boundary between the session broker and a rules engine.

use dropline_core::Player;

use crate::connect_four::ConnectFour;
use crate::engine::GameEngine;
use crate::errors::InvalidMove;

/// One applied move, ready to be broadcast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    /// Who moved.
    pub player: Player,
    /// Column played.
    pub column: usize,
    /// Row the disc landed in.
    pub row: usize,
}

/// Owns one game and exposes the two calls the broker needs.
pub struct GameAdapter {
    engine: Box<dyn GameEngine>,
}

impl GameAdapter {
    /// Wrap an engine.
    pub fn new(engine: impl GameEngine + 'static) -> Self {
        Self {
            engine: Box::new(engine),
        }
    }

    /// A fresh Connect Four game.
    pub fn connect_four() -> Self {
        Self::new(ConnectFour::new())
    }

    /// Try `player`'s move into `column`.
    pub fn attempt_move(&mut self, player: Player, column: i64) -> Result<MoveRecord, InvalidMove> {
        let row = self.engine.play(player, column)?;
        // A successful play only happens for an in-range column.
        let column = usize::try_from(column).map_err(|_| InvalidMove::ColumnOutOfRange { column })?;
        Ok(MoveRecord {
            player,
            column,
            row,
        })
    }

    /// The winner, if the game is over.
    pub fn winner(&self) -> Option<Player> {
        self.engine.winner()
    }
}

impl std::fmt::Debug for GameAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameAdapter")
            .field("winner", &self.winner())
            .finish_non_exhaustive()
    }
}
