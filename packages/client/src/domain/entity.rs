//! Core domain models for the chat application.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    error::{GameError, RoomError},
    games::GameKind,
    value_object::{GameId, MessageContent, MessageId, RoomId, RoomName, Timestamp, UserId},
};

/// Represents a user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User identifier
    pub id: UserId,
    /// Display name
    pub username: String,
    /// Optional avatar URL
    pub avatar: Option<String>,
    /// Whether the user is currently online
    pub is_online: bool,
    /// Timestamp when the user joined
    pub joined_at: Timestamp,
}

impl User {
    /// Create a new user profile
    pub fn new(id: UserId, username: String, joined_at: Timestamp) -> Self {
        Self {
            id,
            username,
            avatar: None,
            is_online: false,
            joined_at,
        }
    }
}

/// Represents a chat room with a member list and at most one active game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Room identifier
    pub id: RoomId,
    /// Room name
    pub name: RoomName,
    /// Optional room description
    pub description: Option<String>,
    /// Timestamp when the room was created
    pub created_at: Timestamp,
    /// User who created the room
    pub created_by: UserId,
    /// Member user ids (unique, order irrelevant)
    pub members: Vec<UserId>,
    /// Moderator user ids (subset of members)
    pub moderators: Vec<UserId>,
    /// Visibility hint: private rooms are hidden from non-member listings
    pub is_private: bool,
    /// Reference to the single currently active game, if any
    pub active_game: Option<GameId>,
}

impl Room {
    /// Create a new room with the creator as sole member and moderator
    pub fn new(
        id: RoomId,
        name: RoomName,
        description: Option<String>,
        created_by: UserId,
        is_private: bool,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            description,
            created_at,
            created_by: created_by.clone(),
            members: vec![created_by.clone()],
            moderators: vec![created_by],
            is_private,
            active_game: None,
        }
    }

    /// Whether the user is a member of this room
    pub fn is_member(&self, user_id: &UserId) -> bool {
        self.members.contains(user_id)
    }

    /// Whether the user is a moderator of this room
    pub fn is_moderator(&self, user_id: &UserId) -> bool {
        self.moderators.contains(user_id)
    }

    /// Add a member. Idempotent: adding an existing member is a no-op.
    ///
    /// Returns true if the member set changed.
    pub fn add_member(&mut self, user_id: UserId) -> bool {
        if self.is_member(&user_id) {
            return false;
        }
        self.members.push(user_id);
        true
    }

    /// Remove a member. Idempotent: removing a non-member is a no-op.
    ///
    /// Returns true if the member set changed.
    pub fn remove_member(&mut self, user_id: &UserId) -> bool {
        let before = self.members.len();
        self.members.retain(|id| id != user_id);
        self.members.len() != before
    }

    /// Point this room at its active game.
    ///
    /// # Errors
    ///
    /// Returns `RoomError::GameAlreadyActive` if another game is already
    /// referenced. Re-setting the same game id is a no-op.
    pub fn set_active_game(&mut self, game_id: GameId) -> Result<(), RoomError> {
        match &self.active_game {
            Some(current) if *current != game_id => Err(RoomError::GameAlreadyActive {
                game_id: current.as_str().to_string(),
            }),
            _ => {
                self.active_game = Some(game_id);
                Ok(())
            }
        }
    }

    /// Clear the active-game reference
    pub fn clear_active_game(&mut self) {
        self.active_game = None;
    }
}

/// Represents a chat message in the domain model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier
    pub id: MessageId,
    /// Room the message belongs to
    pub room_id: RoomId,
    /// Author user id
    pub user_id: UserId,
    /// Message content
    pub content: MessageContent,
    /// Timestamp when the message was created
    pub created_at: Timestamp,
    /// Automated notice (join, game start/end) rather than user text
    pub is_system: bool,
}

impl Message {
    /// Create a new user-authored chat message
    pub fn new(
        id: MessageId,
        room_id: RoomId,
        user_id: UserId,
        content: MessageContent,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            room_id,
            user_id,
            content,
            created_at,
            is_system: false,
        }
    }

    /// Create a new system message
    pub fn system(
        id: MessageId,
        room_id: RoomId,
        user_id: UserId,
        content: MessageContent,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            room_id,
            user_id,
            content,
            created_at,
            is_system: true,
        }
    }
}

/// Game lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Active,
    Finished,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Waiting => write!(f, "waiting"),
            GameStatus::Active => write!(f, "active"),
            GameStatus::Finished => write!(f, "finished"),
        }
    }
}

impl std::str::FromStr for GameStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(GameStatus::Waiting),
            "active" => Ok(GameStatus::Active),
            "finished" => Ok(GameStatus::Finished),
            other => Err(format!("unknown game status: {other}")),
        }
    }
}

/// Represents one game session with its own player list and lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    /// Game identifier
    pub id: GameId,
    /// Display name, copied from the game catalog at creation time
    pub name: String,
    /// Description, copied from the game catalog at creation time
    pub description: String,
    /// Minimum players needed before the game becomes active
    pub min_players: usize,
    /// Maximum players allowed
    pub max_players: usize,
    /// Participant user ids; order determines turn order and symbol assignment
    pub players: Vec<UserId>,
    /// Lifecycle status
    pub status: GameStatus,
    /// Timestamp when the game started
    pub started_at: Option<Timestamp>,
    /// Timestamp when the game ended
    pub ended_at: Option<Timestamp>,
    /// Winner user id, set on a win
    pub winner: Option<UserId>,
}

impl Game {
    /// Create a new game session of the given kind.
    ///
    /// The creator is the sole player and the game starts in `waiting`.
    /// Name, description and player bounds are copied from the catalog.
    pub fn new(id: GameId, kind: GameKind, creator: UserId, started_at: Timestamp) -> Self {
        let spec = kind.spec();
        Self {
            id,
            name: spec.name.to_string(),
            description: spec.description.to_string(),
            min_players: spec.min_players,
            max_players: spec.max_players,
            players: vec![creator],
            status: GameStatus::Waiting,
            started_at: Some(started_at),
            ended_at: None,
            winner: None,
        }
    }

    /// The game kind, recovered from the catalog by display name.
    ///
    /// Returns `None` for game types this client does not know, which the
    /// caller renders as "not implemented" rather than failing.
    pub fn kind(&self) -> Option<GameKind> {
        GameKind::from_display_name(&self.name)
    }

    /// Whether the user participates in this game
    pub fn has_player(&self, user_id: &UserId) -> bool {
        self.players.contains(user_id)
    }

    /// Whether the player count has reached the minimum threshold
    pub fn meets_minimum(&self) -> bool {
        self.players.len() >= self.min_players
    }

    /// Add a player, preserving join order.
    ///
    /// Flips `waiting -> active` once the minimum player threshold is met.
    /// Adding an existing player is an idempotent no-op.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NotJoinable` for a finished game and
    /// `GameError::GameFull` when capacity is reached.
    pub fn add_player(&mut self, user_id: UserId) -> Result<(), GameError> {
        if self.has_player(&user_id) {
            return Ok(());
        }
        if self.status == GameStatus::Finished {
            return Err(GameError::NotJoinable {
                status: self.status,
            });
        }
        if self.players.len() >= self.max_players {
            return Err(GameError::GameFull {
                max_players: self.max_players,
            });
        }
        self.players.push(user_id);
        if self.status == GameStatus::Waiting && self.meets_minimum() {
            self.status = GameStatus::Active;
        }
        Ok(())
    }

    /// Transition to the terminal `finished` state.
    ///
    /// # Errors
    ///
    /// Returns `GameError::AlreadyFinished` if the game is already over.
    pub fn finish(&mut self, winner: Option<UserId>, at: Timestamp) -> Result<(), GameError> {
        if self.status == GameStatus::Finished {
            return Err(GameError::AlreadyFinished);
        }
        self.status = GameStatus::Finished;
        self.ended_at = Some(at);
        self.winner = winner;
        Ok(())
    }

    /// Explicit "play again": back to `active` with a fresh start time,
    /// clearing the previous winner and end time.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NotFinished` unless the game has finished —
    /// `finished -> active` never happens automatically.
    pub fn restart(&mut self, at: Timestamp) -> Result<(), GameError> {
        if self.status != GameStatus::Finished {
            return Err(GameError::NotFinished {
                status: self.status,
            });
        }
        self.status = GameStatus::Active;
        self.started_at = Some(at);
        self.ended_at = None;
        self.winner = None;
        Ok(())
    }
}
