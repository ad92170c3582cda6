//! Domain layer for the chat application.
//!
//! This module contains business logic that is independent of
//! wire-format records and infrastructure concerns: entities, value
//! objects, the game rules, and the ports (gateway traits) the
//! infrastructure layer implements.

pub mod entity;
pub mod error;
pub mod factory;
pub mod games;
pub mod gateway;
pub mod identity;
pub mod tictactoe;
pub mod value_object;

pub use entity::{Game, GameStatus, Message, Room, User};
pub use error::{BoardError, GameError, RoomError, ValueObjectError};
pub use factory::{GameIdFactory, MessageIdFactory, RoomIdFactory};
pub use games::{GameKind, GameSpec};
pub use gateway::{ChangeEvent, RemoteStore, StoreError, Subscription};
#[cfg(test)]
pub use gateway::MockRemoteStore;
pub use identity::{IdentityProvider, Session};
pub use value_object::{
    GameId, MessageContent, MessageId, RoomId, RoomName, Timestamp, UserId,
};
