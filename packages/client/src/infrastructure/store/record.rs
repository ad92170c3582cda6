//! Wire-format records for the external store collections.
//!
//! Field names follow the external system's column naming (`room_id`,
//! `is_system_message`, `game_active_id`, ...). Translation to and from
//! domain entities happens here, at the gateway boundary; a row that does
//! not translate is reported as `StoreError::InvalidRecord`.

use serde::{Deserialize, Serialize};

use crate::domain::{
    Game, GameId, GameStatus, Message, MessageContent, MessageId, Room, RoomId, RoomName,
    StoreError, Timestamp, User, UserId,
};

/// `profiles(id, username, avatar, is_online, joined_at)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: String,
    pub username: String,
    pub avatar: Option<String>,
    pub is_online: bool,
    pub joined_at: i64,
}

impl ProfileRecord {
    pub const COLLECTION: &'static str = "profiles";
}

impl From<&User> for ProfileRecord {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_str().to_string(),
            username: user.username.clone(),
            avatar: user.avatar.clone(),
            is_online: user.is_online,
            joined_at: user.joined_at.value(),
        }
    }
}

impl TryFrom<ProfileRecord> for User {
    type Error = StoreError;

    fn try_from(record: ProfileRecord) -> Result<Self, Self::Error> {
        let id = UserId::new(record.id).map_err(|e| invalid(ProfileRecord::COLLECTION, e))?;
        Ok(User {
            id,
            username: record.username,
            avatar: record.avatar,
            is_online: record.is_online,
            joined_at: Timestamp::new(record.joined_at),
        })
    }
}

/// `rooms(id, name, description, created_by, members[], moderators[],
/// is_private, game_active_id, created_at)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_by: String,
    pub members: Vec<String>,
    pub moderators: Vec<String>,
    pub is_private: bool,
    pub game_active_id: Option<String>,
    pub created_at: i64,
}

impl RoomRecord {
    pub const COLLECTION: &'static str = "rooms";
}

impl From<&Room> for RoomRecord {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            name: room.name.as_str().to_string(),
            description: room.description.clone(),
            created_by: room.created_by.as_str().to_string(),
            members: room.members.iter().map(|m| m.as_str().to_string()).collect(),
            moderators: room
                .moderators
                .iter()
                .map(|m| m.as_str().to_string())
                .collect(),
            is_private: room.is_private,
            game_active_id: room.active_game.as_ref().map(|g| g.as_str().to_string()),
            created_at: room.created_at.value(),
        }
    }
}

impl TryFrom<RoomRecord> for Room {
    type Error = StoreError;

    fn try_from(record: RoomRecord) -> Result<Self, Self::Error> {
        let collection = RoomRecord::COLLECTION;
        let id = RoomId::new(record.id).map_err(|e| invalid(collection, e))?;
        let name = RoomName::new(record.name).map_err(|e| invalid(collection, e))?;
        let created_by =
            UserId::new(record.created_by).map_err(|e| invalid(collection, e))?;
        let members = record
            .members
            .into_iter()
            .map(|m| UserId::new(m).map_err(|e| invalid(collection, e)))
            .collect::<Result<Vec<_>, _>>()?;
        let moderators = record
            .moderators
            .into_iter()
            .map(|m| UserId::new(m).map_err(|e| invalid(collection, e)))
            .collect::<Result<Vec<_>, _>>()?;
        let active_game = record
            .game_active_id
            .map(|g| GameId::new(g).map_err(|e| invalid(collection, e)))
            .transpose()?;
        Ok(Room {
            id,
            name,
            description: record.description,
            created_at: Timestamp::new(record.created_at),
            created_by,
            members,
            moderators,
            is_private: record.is_private,
            active_game,
        })
    }
}

/// `messages(id, room_id, user_id, content, is_system_message, created_at)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub room_id: String,
    pub user_id: String,
    pub content: String,
    pub is_system_message: bool,
    pub created_at: i64,
}

impl MessageRecord {
    pub const COLLECTION: &'static str = "messages";
}

impl From<&Message> for MessageRecord {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.as_str().to_string(),
            room_id: message.room_id.as_str().to_string(),
            user_id: message.user_id.as_str().to_string(),
            content: message.content.as_str().to_string(),
            is_system_message: message.is_system,
            created_at: message.created_at.value(),
        }
    }
}

impl TryFrom<MessageRecord> for Message {
    type Error = StoreError;

    fn try_from(record: MessageRecord) -> Result<Self, Self::Error> {
        let collection = MessageRecord::COLLECTION;
        Ok(Message {
            id: MessageId::new(record.id).map_err(|e| invalid(collection, e))?,
            room_id: RoomId::new(record.room_id).map_err(|e| invalid(collection, e))?,
            user_id: UserId::new(record.user_id).map_err(|e| invalid(collection, e))?,
            content: MessageContent::new(record.content).map_err(|e| invalid(collection, e))?,
            created_at: Timestamp::new(record.created_at),
            is_system: record.is_system_message,
        })
    }
}

/// `games(id, name, description, min_players, max_players, players[],
/// status, started_at, ended_at, winner)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub min_players: usize,
    pub max_players: usize,
    pub players: Vec<String>,
    pub status: String,
    pub started_at: Option<i64>,
    pub ended_at: Option<i64>,
    pub winner: Option<String>,
}

impl GameRecord {
    pub const COLLECTION: &'static str = "games";
}

impl From<&Game> for GameRecord {
    fn from(game: &Game) -> Self {
        Self {
            id: game.id.as_str().to_string(),
            name: game.name.clone(),
            description: game.description.clone(),
            min_players: game.min_players,
            max_players: game.max_players,
            players: game.players.iter().map(|p| p.as_str().to_string()).collect(),
            status: game.status.to_string(),
            started_at: game.started_at.map(|t| t.value()),
            ended_at: game.ended_at.map(|t| t.value()),
            winner: game.winner.as_ref().map(|w| w.as_str().to_string()),
        }
    }
}

impl TryFrom<GameRecord> for Game {
    type Error = StoreError;

    fn try_from(record: GameRecord) -> Result<Self, Self::Error> {
        let collection = GameRecord::COLLECTION;
        let status = record
            .status
            .parse::<GameStatus>()
            .map_err(|reason| StoreError::InvalidRecord { collection, reason })?;
        let players = record
            .players
            .into_iter()
            .map(|p| UserId::new(p).map_err(|e| invalid(collection, e)))
            .collect::<Result<Vec<_>, _>>()?;
        let winner = record
            .winner
            .map(|w| UserId::new(w).map_err(|e| invalid(collection, e)))
            .transpose()?;
        Ok(Game {
            id: GameId::new(record.id).map_err(|e| invalid(collection, e))?,
            name: record.name,
            description: record.description,
            min_players: record.min_players,
            max_players: record.max_players,
            players,
            status,
            started_at: record.started_at.map(Timestamp::new),
            ended_at: record.ended_at.map(Timestamp::new),
            winner,
        })
    }
}

fn invalid(collection: &'static str, error: impl std::fmt::Display) -> StoreError {
    StoreError::InvalidRecord {
        collection,
        reason: error.to_string(),
    }
}
