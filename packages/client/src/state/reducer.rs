//! The state tree and its pure transition function.
//!
//! Transitions are synchronous and total: unknown room/user ids in
//! payloads cause defensive no-ops, never errors. Network effects live
//! outside the reducer; this function is testable in isolation from the
//! gateway.

use std::collections::HashMap;

use crate::domain::{Game, GameId, Message, Room, RoomId, User, UserId};

/// The full reducer-managed state tree of one client.
///
/// All references between entities resolve through these id-indexed
/// maps; rendering degrades to placeholders when a reference dangles.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// The authenticated user's profile
    pub current_user: Option<User>,
    /// The room currently selected for viewing
    pub current_room: Option<Room>,
    /// Known user profiles by id
    pub users: HashMap<UserId, User>,
    /// Known rooms by id
    pub rooms: HashMap<RoomId, Room>,
    /// Known game sessions by id
    pub games: HashMap<GameId, Game>,
    /// Message log per room, in arrival order
    pub messages: HashMap<RoomId, Vec<Message>>,
}

impl AppState {
    /// Messages of a room, empty when none are loaded.
    pub fn room_messages(&self, room_id: &RoomId) -> &[Message] {
        self.messages.get(room_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Display name of a user, with the placeholder fallback for
    /// references that have not been loaded yet.
    pub fn username(&self, user_id: &UserId) -> &str {
        self.users
            .get(user_id)
            .map(|user| user.username.as_str())
            .unwrap_or("Unknown User")
    }

    /// The active game of the currently selected room, when both resolve.
    pub fn active_game(&self) -> Option<&Game> {
        let game_id = self.current_room.as_ref()?.active_game.as_ref()?;
        self.games.get(game_id)
    }
}

/// Named state transitions.
#[derive(Debug, Clone)]
pub enum Action {
    /// Replace the current identity
    SetCurrentUser(User),
    /// Switch the active room; history fetch and subscription happen outside
    SetCurrentRoom(Room),
    /// Append one message to its room's log (caller ensures chronological
    /// delivery; duplicate ids are dropped)
    AddMessage(Message),
    /// Replace a room's full message list (bulk load, pre-sorted ascending)
    SetMessages { room_id: RoomId, messages: Vec<Message> },
    /// Upsert a room by id
    AddRoom(Room),
    /// Upsert a room by id, refreshing `current_room` if it is the one updated
    UpdateRoom(Room),
    /// Idempotent member addition
    JoinRoom { room_id: RoomId, user_id: UserId },
    /// Idempotent member removal
    LeaveRoom { room_id: RoomId, user_id: UserId },
    /// Upsert a game by id (callers manage the room's active-game reference)
    AddGame(Game),
    /// Upsert a game by id
    UpdateGame(Game),
    /// Upsert a user profile by id
    UpsertUser(User),
    /// Flip a known user's online flag; no-op when unknown
    SetUserOnlineStatus { user_id: UserId, is_online: bool },
    /// Reset the entire tree to its empty initial shape
    Logout,
}

/// Pure transition function: current state + action -> next state.
pub fn reduce(mut state: AppState, action: Action) -> AppState {
    match action {
        Action::SetCurrentUser(user) => {
            state.current_user = Some(user);
        }

        Action::SetCurrentRoom(room) => {
            state.current_room = Some(room);
        }

        Action::AddMessage(message) => {
            let log = state.messages.entry(message.room_id.clone()).or_default();
            // 楽観的な追加と購読エコーが重なっても ID で重複を落とす
            if !log.iter().any(|m| m.id == message.id) {
                log.push(message);
            }
        }

        Action::SetMessages { room_id, messages } => {
            state.messages.insert(room_id, messages);
        }

        Action::AddRoom(room) => {
            state.rooms.insert(room.id.clone(), room);
        }

        Action::UpdateRoom(room) => {
            if let Some(current) = &state.current_room
                && current.id == room.id
            {
                state.current_room = Some(room.clone());
            }
            state.rooms.insert(room.id.clone(), room);
        }

        Action::JoinRoom { room_id, user_id } => {
            if let Some(room) = state.rooms.get_mut(&room_id) {
                room.add_member(user_id);
            }
        }

        Action::LeaveRoom { room_id, user_id } => {
            if let Some(room) = state.rooms.get_mut(&room_id) {
                room.remove_member(&user_id);
            }
        }

        Action::AddGame(game) | Action::UpdateGame(game) => {
            state.games.insert(game.id.clone(), game);
        }

        Action::UpsertUser(user) => {
            state.users.insert(user.id.clone(), user);
        }

        Action::SetUserOnlineStatus { user_id, is_online } => {
            if let Some(user) = state.users.get_mut(&user_id) {
                user.is_online = is_online;
            }
        }

        Action::Logout => {
            state = AppState::default();
        }
    }
    state
}
