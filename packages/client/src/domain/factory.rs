//! Domain factories for creating identifier value objects.

use super::{
    error::ValueObjectError,
    value_object::{GameId, MessageId, RoomId},
};

/// Factory for generating RoomId instances.
///
/// This factory encapsulates the logic for generating new room identifiers,
/// separating the generation concern from the validation logic in RoomId.
pub struct RoomIdFactory;

impl RoomIdFactory {
    /// Generate a new RoomId with a random UUID v4.
    ///
    /// # Errors
    ///
    /// This method should not fail in practice, but returns Result for
    /// consistency with the domain error handling pattern.
    pub fn generate() -> Result<RoomId, ValueObjectError> {
        RoomId::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Factory for generating MessageId instances.
pub struct MessageIdFactory;

impl MessageIdFactory {
    /// Generate a new MessageId with a random UUID v4.
    pub fn generate() -> Result<MessageId, ValueObjectError> {
        MessageId::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Factory for generating GameId instances.
pub struct GameIdFactory;

impl GameIdFactory {
    /// Generate a new GameId with a random UUID v4.
    pub fn generate() -> Result<GameId, ValueObjectError> {
        GameId::new(uuid::Uuid::new_v4().to_string())
    }
}
