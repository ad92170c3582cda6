//! Domain layer error definitions.

use thiserror::Error;

use super::entity::GameStatus;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// UserId validation error
    #[error("UserId cannot be empty")]
    UserIdEmpty,

    /// UserId too long error
    #[error("UserId cannot exceed {max} characters (got {actual})")]
    UserIdTooLong { max: usize, actual: usize },

    /// RoomId validation error
    #[error("RoomId cannot be empty")]
    RoomIdEmpty,

    /// RoomId too long error
    #[error("RoomId cannot exceed {max} characters (got {actual})")]
    RoomIdTooLong { max: usize, actual: usize },

    /// GameId validation error
    #[error("GameId cannot be empty")]
    GameIdEmpty,

    /// GameId too long error
    #[error("GameId cannot exceed {max} characters (got {actual})")]
    GameIdTooLong { max: usize, actual: usize },

    /// MessageId validation error
    #[error("MessageId cannot be empty")]
    MessageIdEmpty,

    /// MessageId too long error
    #[error("MessageId cannot exceed {max} characters (got {actual})")]
    MessageIdTooLong { max: usize, actual: usize },

    /// RoomName validation error
    #[error("RoomName cannot be empty")]
    RoomNameEmpty,

    /// RoomName too long error
    #[error("RoomName cannot exceed {max} characters (got {actual})")]
    RoomNameTooLong { max: usize, actual: usize },

    /// MessageContent validation error
    #[error("MessageContent cannot be empty")]
    MessageContentEmpty,

    /// MessageContent too long error
    #[error("MessageContent cannot exceed {max} characters (got {actual})")]
    MessageContentTooLong { max: usize, actual: usize },
}

/// Errors related to Room domain logic
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// A room may reference at most one active game at a time
    #[error("Room already has an active game ({game_id})")]
    GameAlreadyActive { game_id: String },
}

/// Errors related to Game lifecycle transitions
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Player capacity reached
    #[error("Game is full: maximum {max_players} players allowed")]
    GameFull { max_players: usize },

    /// Joining is only possible while the game is waiting or active
    #[error("Game cannot be joined in status {status}")]
    NotJoinable { status: GameStatus },

    /// Restart (play again) is only valid from the finished state
    #[error("Game can only be restarted after it has finished (status {status})")]
    NotFinished { status: GameStatus },

    /// Finish is not valid once the game has already finished
    #[error("Game has already finished")]
    AlreadyFinished,
}

/// Errors rejected by the tic-tac-toe rule engine.
///
/// A rejected claim never mutates the board.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Moves are only accepted while the game record is active
    #[error("Game is not active")]
    GameNotActive,

    /// The board already has a winner or a draw recorded
    #[error("The match has already been decided")]
    AlreadyDecided,

    /// The acting user is not one of the two bound players
    #[error("User {user_id} is not a player in this match")]
    NotAPlayer { user_id: String },

    /// The acting user does not hold the current turn
    #[error("It is not {user_id}'s turn")]
    NotYourTurn { user_id: String },

    /// Cell coordinates outside the 3x3 grid
    #[error("Cell ({row}, {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },

    /// The target cell is already claimed
    #[error("Cell ({row}, {col}) is already occupied")]
    CellOccupied { row: usize, col: usize },

    /// Tic-tac-toe needs two assigned players before moves are legal
    #[error("The match does not have two players yet")]
    NotEnoughPlayers,
}
