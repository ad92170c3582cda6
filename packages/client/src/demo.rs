//! Demo fixtures for local runs.
//!
//! Seeds the in-memory store with a small community so the interactive
//! client has rooms and history to show without an external backend.

use crate::domain::{
    Message, MessageContent, MessageId, RemoteStore, Room, RoomId, RoomName, Timestamp, User,
    UserId,
};
use crate::infrastructure::InMemoryStore;

fn user(id: &str, name: &str, avatar: Option<&str>, joined_at: i64) -> User {
    User {
        id: UserId::new(id.to_string()).expect("seed user id"),
        username: name.to_string(),
        avatar: avatar.map(str::to_string),
        is_online: false,
        joined_at: Timestamp::new(joined_at),
    }
}

fn room(
    id: &str,
    name: &str,
    description: &str,
    creator: &str,
    members: &[&str],
    is_private: bool,
    created_at: i64,
) -> Room {
    Room {
        id: RoomId::new(id.to_string()).expect("seed room id"),
        name: RoomName::new(name.to_string()).expect("seed room name"),
        description: Some(description.to_string()),
        created_at: Timestamp::new(created_at),
        created_by: UserId::new(creator.to_string()).expect("seed creator id"),
        members: members
            .iter()
            .map(|m| UserId::new((*m).to_string()).expect("seed member id"))
            .collect(),
        moderators: vec![UserId::new(creator.to_string()).expect("seed moderator id")],
        is_private,
        active_game: None,
    }
}

fn message(id: &str, room_id: &str, author: &str, content: &str, at: i64) -> Message {
    Message::new(
        MessageId::new(id.to_string()).expect("seed message id"),
        RoomId::new(room_id.to_string()).expect("seed room id"),
        UserId::new(author.to_string()).expect("seed author id"),
        MessageContent::new(content.to_string()).expect("seed message content"),
        Timestamp::new(at),
    )
}

/// Populate the store with the demo community.
///
/// Returns the usernames that can be passed to `--username`.
pub async fn seed(store: &InMemoryStore) -> Vec<String> {
    let users = [
        user("alice", "alice", Some("https://example.com/avatars/alice.png"), 1_672_531_200_000),
        user("bob", "bob", None, 1_675_209_600_000),
        user("carol", "carol", None, 1_677_628_800_000),
        user("dave", "dave", None, 1_680_307_200_000),
    ];
    for u in &users {
        store.seed_profile(u).await;
    }

    let rooms = [
        room(
            "room-general",
            "General Chat",
            "A place for general discussions",
            "alice",
            &["alice", "bob", "carol", "dave"],
            false,
            1_672_531_200_000,
        ),
        room(
            "room-gaming",
            "Gaming Room",
            "Let's play games together!",
            "bob",
            &["alice", "bob", "dave"],
            false,
            1_676_419_200_000,
        ),
        room(
            "room-private",
            "Private Discussion",
            "Invitation only",
            "carol",
            &["alice", "carol"],
            true,
            1_679_270_400_000,
        ),
    ];
    for r in &rooms {
        if let Err(error) = store.insert_room(r).await {
            tracing::warn!(%error, "demo room not seeded");
        }
    }

    let messages = [
        message("msg-1", "room-general", "alice", "Hello everyone!", 1_681_120_800_000),
        message("msg-2", "room-general", "bob", "Hey Alice, how are you?", 1_681_121_100_000),
        message("msg-3", "room-general", "carol", "Good morning all!", 1_681_121_400_000),
        message("msg-4", "room-gaming", "bob", "Anyone want to play Tic-Tac-Toe?", 1_681_221_600_000),
        message("msg-5", "room-gaming", "alice", "I'm in!", 1_681_221_900_000),
        message("msg-6", "room-private", "carol", "Thanks for joining this private room.", 1_681_290_000_000),
        message("msg-7", "room-private", "alice", "Happy to be here!", 1_681_290_300_000),
    ];
    for m in &messages {
        if let Err(error) = store.insert_message(m).await {
            tracing::warn!(%error, "demo message not seeded");
        }
    }

    users.iter().map(|u| u.username.clone()).collect()
}
