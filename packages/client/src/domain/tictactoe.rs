//! Tic-tac-toe rule engine.
//!
//! The board is client-local: it is derived from, but not itself, the
//! shared Game record. Only lifecycle metadata (status, winner,
//! timestamps) round-trips through the remote store; each client replays
//! its own move sequence.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    entity::{Game, GameStatus},
    error::BoardError,
    value_object::UserId,
};

/// A player symbol. `players[0]` of the game plays X, `players[1]` plays O.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// The other symbol.
    pub fn opponent(&self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => write!(f, "X"),
            Mark::O => write!(f, "O"),
        }
    }
}

/// Terminal result of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win(Mark),
    Draw,
}

/// What a successful claim led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimResult {
    /// The claim completed a line; the match is over.
    Won { mark: Mark, winner: UserId },
    /// The claim filled the last cell without completing a line.
    Draw,
    /// The turn passes to the other symbol.
    NextTurn(Mark),
}

/// The 3x3 grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Mark>; 3]; 3],
}

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// The mark at (row, col), if any. Out-of-range coordinates read as empty.
    pub fn get(&self, row: usize, col: usize) -> Option<Mark> {
        self.cells.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Whether every cell is claimed.
    pub fn is_full(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_some()))
    }

    /// Scan for three equal non-empty symbols: rows, then columns, then
    /// both diagonals. At most one line can complete per move, so the
    /// scan order never changes the winner.
    pub fn winner(&self) -> Option<Mark> {
        let c = &self.cells;

        for row in c {
            if row[0].is_some() && row[0] == row[1] && row[1] == row[2] {
                return row[0];
            }
        }

        for col in 0..3 {
            if c[0][col].is_some() && c[0][col] == c[1][col] && c[1][col] == c[2][col] {
                return c[0][col];
            }
        }

        if c[0][0].is_some() && c[0][0] == c[1][1] && c[1][1] == c[2][2] {
            return c[0][0];
        }
        if c[0][2].is_some() && c[0][2] == c[1][1] && c[1][1] == c[2][0] {
            return c[0][2];
        }

        None
    }

    fn set(&mut self, row: usize, col: usize, mark: Mark) {
        self.cells[row][col] = Some(mark);
    }
}

/// A client-local tic-tac-toe match bound to the two players of a Game.
///
/// Enforces the claim rules: the game record must be active, the match
/// undecided, the acting user must hold the current turn, and the target
/// cell must be empty. A rejected claim leaves the board untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    board: Board,
    turn: Mark,
    outcome: Option<Outcome>,
    player_x: UserId,
    player_o: UserId,
}

impl Match {
    /// Start a fresh match between two players. X moves first.
    pub fn new(player_x: UserId, player_o: UserId) -> Self {
        Self {
            board: Board::new(),
            turn: Mark::X,
            outcome: None,
            player_x,
            player_o,
        }
    }

    /// Bind a match to a game's first two players.
    ///
    /// # Errors
    ///
    /// Returns `BoardError::NotEnoughPlayers` while the game has fewer
    /// than two participants.
    pub fn from_game(game: &Game) -> Result<Self, BoardError> {
        match (game.players.first(), game.players.get(1)) {
            (Some(x), Some(o)) => Ok(Self::new(x.clone(), o.clone())),
            _ => Err(BoardError::NotEnoughPlayers),
        }
    }

    /// The symbol assigned to the user, if they are one of the two players.
    pub fn mark_of(&self, user_id: &UserId) -> Option<Mark> {
        if *user_id == self.player_x {
            Some(Mark::X)
        } else if *user_id == self.player_o {
            Some(Mark::O)
        } else {
            None
        }
    }

    /// The player bound to a symbol.
    pub fn player_for(&self, mark: Mark) -> &UserId {
        match mark {
            Mark::X => &self.player_x,
            Mark::O => &self.player_o,
        }
    }

    /// The player holding the current turn.
    pub fn current_player(&self) -> &UserId {
        self.player_for(self.turn)
    }

    /// Whether the user may claim a cell right now.
    pub fn can_play(&self, status: GameStatus, user_id: &UserId) -> bool {
        status == GameStatus::Active
            && self.outcome.is_none()
            && self.mark_of(user_id) == Some(self.turn)
    }

    /// Claim a cell for the acting user.
    ///
    /// On success the board is updated and the result says whether the
    /// move won, drew, or passed the turn. On error nothing changes.
    pub fn claim(
        &mut self,
        status: GameStatus,
        user_id: &UserId,
        row: usize,
        col: usize,
    ) -> Result<ClaimResult, BoardError> {
        if row >= 3 || col >= 3 {
            return Err(BoardError::OutOfBounds { row, col });
        }
        if status != GameStatus::Active {
            return Err(BoardError::GameNotActive);
        }
        if self.outcome.is_some() {
            return Err(BoardError::AlreadyDecided);
        }
        match self.mark_of(user_id) {
            None => {
                return Err(BoardError::NotAPlayer {
                    user_id: user_id.as_str().to_string(),
                });
            }
            Some(mark) if mark != self.turn => {
                return Err(BoardError::NotYourTurn {
                    user_id: user_id.as_str().to_string(),
                });
            }
            Some(_) => {}
        }
        if self.board.get(row, col).is_some() {
            return Err(BoardError::CellOccupied { row, col });
        }

        self.board.set(row, col, self.turn);

        if let Some(mark) = self.board.winner() {
            self.outcome = Some(Outcome::Win(mark));
            return Ok(ClaimResult::Won {
                mark,
                winner: self.player_for(mark).clone(),
            });
        }
        if self.board.is_full() {
            self.outcome = Some(Outcome::Draw);
            return Ok(ClaimResult::Draw);
        }

        self.turn = self.turn.opponent();
        Ok(ClaimResult::NextTurn(self.turn))
    }

    /// Reset for "play again": empty board, X to move, no outcome.
    pub fn reset(&mut self) {
        self.board = Board::new();
        self.turn = Mark::X;
        self.outcome = None;
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Mark {
        self.turn
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }
}
