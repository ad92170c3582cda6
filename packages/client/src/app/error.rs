//! Client orchestrator errors.

use thiserror::Error;

use crate::domain::{StoreError, ValueObjectError};
use crate::usecase::{
    CreateRoomError, EndGameError, JoinGameError, MembershipError, PlayTurnError,
    SendMessageError, StartGameError,
};

/// Errors surfaced by [`crate::app::Client`] operations.
///
/// None of these are fatal: the client stays interactive, at worst
/// showing stale or placeholder data.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No session is established with the identity provider
    #[error("not signed in")]
    NotSignedIn,

    /// The operation needs a selected room
    #[error("no room selected")]
    NoRoomSelected,

    /// The operation needs an active game in the selected room
    #[error("no active game in this room")]
    NoActiveGame,

    /// The active game's kind has no rule engine in this client
    #[error("game type {0} is not playable in this client")]
    UnsupportedGame(String),

    /// The board needs two players before moves are possible
    #[error("waiting for another player to join")]
    BoardNotReady,

    #[error(transparent)]
    Validation(#[from] ValueObjectError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    CreateRoom(#[from] CreateRoomError),

    #[error(transparent)]
    Membership(#[from] MembershipError),

    #[error(transparent)]
    SendMessage(#[from] SendMessageError),

    #[error(transparent)]
    StartGame(#[from] StartGameError),

    #[error(transparent)]
    JoinGame(#[from] JoinGameError),

    #[error(transparent)]
    EndGame(#[from] EndGameError),

    #[error(transparent)]
    Play(#[from] PlayTurnError),
}
