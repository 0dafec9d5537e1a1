//! Connect Four on the standard 7×6 board.
//!
//! Discs fall to the lowest free cell of a column; row 0 is the bottom. The
//! first mover plays first and the players alternate. Four discs of one
//! colour in a line (horizontal, vertical or diagonal) win.

use dropline_core::Player;

use crate::engine::GameEngine;
use crate::errors::InvalidMove;

/// Number of columns.
pub const COLUMNS: usize = 7;
/// Number of rows.
pub const ROWS: usize = 6;
/// Discs in a line needed to win.
const CONNECT: usize = 4;

/// Line directions checked from the last disc placed, as (column, row) steps.
const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Board state of one Connect Four game.
#[derive(Clone, Debug)]
pub struct ConnectFour {
    cells: [[Option<Player>; ROWS]; COLUMNS],
    heights: [usize; COLUMNS],
    last_player: Option<Player>,
    winner: Option<Player>,
    moves: usize,
}

impl ConnectFour {
    /// Empty board, first mover to play.
    pub fn new() -> Self {
        Self {
            cells: [[None; ROWS]; COLUMNS],
            heights: [0; COLUMNS],
            last_player: None,
            winner: None,
            moves: 0,
        }
    }

    /// The player whose turn it is.
    pub fn next_player(&self) -> Player {
        self.last_player.map_or(Player::First, Player::opponent)
    }

    /// Disc at `(column, row)`, if any.
    pub fn cell(&self, column: usize, row: usize) -> Option<Player> {
        self.cells.get(column)?.get(row).copied().flatten()
    }

    /// Number of discs played so far.
    pub fn move_count(&self) -> usize {
        self.moves
    }

    /// Board full without a winner.
    pub fn is_draw(&self) -> bool {
        self.winner.is_none() && self.moves == COLUMNS * ROWS
    }

    fn connects(&self, column: usize, row: usize, player: Player) -> bool {
        DIRECTIONS.iter().any(|&(dc, dr)| {
            1 + self.run(column, row, dc, dr, player) + self.run(column, row, -dc, -dr, player)
                >= CONNECT
        })
    }

    /// Consecutive discs of `player` starting one step away from the origin.
    fn run(&self, column: usize, row: usize, dc: isize, dr: isize, player: Player) -> usize {
        let mut count = 0;
        let (mut c, mut r) = (column, row);
        loop {
            let (Some(nc), Some(nr)) = (c.checked_add_signed(dc), r.checked_add_signed(dr)) else {
                break;
            };
            if self.cell(nc, nr) != Some(player) {
                break;
            }
            count += 1;
            (c, r) = (nc, nr);
        }
        count
    }
}

impl Default for ConnectFour {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEngine for ConnectFour {
    fn play(&mut self, player: Player, column: i64) -> Result<usize, InvalidMove> {
        if self.winner.is_some() {
            return Err(InvalidMove::GameOver);
        }
        if player != self.next_player() {
            return Err(InvalidMove::NotYourTurn);
        }
        let col = usize::try_from(column)
            .ok()
            .filter(|c| *c < COLUMNS)
            .ok_or(InvalidMove::ColumnOutOfRange { column })?;

        let row = self.heights[col];
        if row == ROWS {
            return Err(InvalidMove::ColumnFull { column: col });
        }

        self.cells[col][row] = Some(player);
        self.heights[col] += 1;
        self.last_player = Some(player);
        self.moves += 1;

        if self.connects(col, row, player) {
            self.winner = Some(player);
        }
        Ok(row)
    }

    fn winner(&self) -> Option<Player> {
        self.winner
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
