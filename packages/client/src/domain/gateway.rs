//! Remote store gateway port.
//!
//! ドメイン層が定義する RemoteStore trait。
//! 具体的な実装（インメモリ、外部マネージドストア）は infrastructure 層が
//! 提供し、上位層は trait にのみ依存します（依存性の逆転）。

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::{
    entity::{Game, Message, Room, User},
    value_object::{GameId, RoomId, UserId},
};

/// Errors surfaced by the remote store gateway.
///
/// A failed write leaves local state unchanged; callers log and surface
/// the error instead of crashing the transition pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record with the given id in the collection
    #[error("{collection} record not found: {id}")]
    NotFound {
        collection: &'static str,
        id: String,
    },

    /// Insert with an id that already exists
    #[error("{collection} record already exists: {id}")]
    Duplicate {
        collection: &'static str,
        id: String,
    },

    /// A stored row that does not translate into a domain entity
    #[error("invalid record in {collection}: {reason}")]
    InvalidRecord {
        collection: &'static str,
        reason: String,
    },

    /// Network or backend failure
    #[error("store backend error: {0}")]
    Backend(String),
}

/// A tagged row-change notification delivered to subscribers.
///
/// Mirrors the external store's change feed: every committed write is
/// eventually broadcast to all clients whose subscription filter matches.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent<T> {
    Insert(T),
    Update { new: T, old: Option<T> },
    Delete { old: Option<T> },
}

/// A scoped, cancellable subscription to a filtered change feed.
///
/// Dropping (or cancelling) the subscription releases it: the store
/// prunes the dead channel on its next delivery attempt. Holders must
/// release the subscription whenever the selection it was acquired for
/// changes, so stale-room events never land in the wrong state slot.
#[derive(Debug)]
pub struct Subscription<T> {
    events: mpsc::UnboundedReceiver<ChangeEvent<T>>,
}

impl<T> Subscription<T> {
    pub fn new(events: mpsc::UnboundedReceiver<ChangeEvent<T>>) -> Self {
        Self { events }
    }

    /// Wait for the next change event. `None` means the feed closed.
    pub async fn recv(&mut self) -> Option<ChangeEvent<T>> {
        self.events.recv().await
    }

    /// Stop receiving events. Subsequent `recv` calls drain anything
    /// already buffered, then return `None`.
    pub fn cancel(&mut self) {
        self.events.close();
    }
}

/// Typed CRUD and subscription operations against the external store's
/// collections (`profiles`, `rooms`, `messages`, `games`).
///
/// Writes are visible to all other subscribed clients, typically
/// sub-second; no cross-write ordering is guaranteed and the last write
/// wins per record. Incoming events must be treated as authoritative
/// whole-record overwrites, never merged field-by-field.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteStore: Send + Sync {
    // --- profiles ---

    async fn fetch_profile(&self, id: &UserId) -> Result<User, StoreError>;

    async fn list_profiles(&self) -> Result<Vec<User>, StoreError>;

    /// Flip a profile's online flag.
    async fn set_profile_online(&self, id: &UserId, is_online: bool) -> Result<(), StoreError>;

    // --- rooms ---

    async fn insert_room(&self, room: &Room) -> Result<(), StoreError>;

    /// Whole-record overwrite (last write wins).
    async fn update_room(&self, room: &Room) -> Result<(), StoreError>;

    async fn fetch_room(&self, id: &RoomId) -> Result<Room, StoreError>;

    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError>;

    // --- messages ---

    async fn insert_message(&self, message: &Message) -> Result<(), StoreError>;

    /// All messages of a room, ordered ascending by creation time.
    async fn list_messages(&self, room_id: &RoomId) -> Result<Vec<Message>, StoreError>;

    // --- games ---

    async fn insert_game(&self, game: &Game) -> Result<(), StoreError>;

    /// Whole-record overwrite (last write wins).
    async fn update_game(&self, game: &Game) -> Result<(), StoreError>;

    async fn fetch_game(&self, id: &GameId) -> Result<Game, StoreError>;

    // --- subscriptions (filtered by exact foreign-key equality) ---

    /// Change feed of messages in one room.
    async fn subscribe_messages(
        &self,
        room_id: &RoomId,
    ) -> Result<Subscription<Message>, StoreError>;

    /// Change feed of a single game record.
    async fn subscribe_game(&self, game_id: &GameId) -> Result<Subscription<Game>, StoreError>;

    /// Change feed of all room records.
    async fn subscribe_rooms(&self) -> Result<Subscription<Room>, StoreError>;

    /// Change feed of all profile records.
    async fn subscribe_profiles(&self) -> Result<Subscription<User>, StoreError>;
}
