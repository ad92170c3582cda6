//! InMemory RemoteStore 実装
//!
//! ドメイン層が定義する RemoteStore trait の具体的な実装。
//! HashMap をインメモリ DB として使用し、書き込みごとに変更イベントを
//! フィルタ一致する購読者へ配信します。行単位では last write wins です。
//!
//! 外部マネージドストアと同じワイヤーフォーマット（record モジュール）で
//! 保持し、trait 境界でドメインモデルへ変換します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use crate::domain::{
    ChangeEvent, Game, GameId, Message, RemoteStore, Room, RoomId, StoreError, Subscription, User,
    UserId,
};

use super::record::{GameRecord, MessageRecord, ProfileRecord, RoomRecord};

struct MessageSubscriber {
    room_id: String,
    sender: mpsc::UnboundedSender<ChangeEvent<Message>>,
}

struct GameSubscriber {
    game_id: String,
    sender: mpsc::UnboundedSender<ChangeEvent<Game>>,
}

#[derive(Default)]
struct Subscribers {
    messages: Vec<MessageSubscriber>,
    games: Vec<GameSubscriber>,
    rooms: Vec<mpsc::UnboundedSender<ChangeEvent<Room>>>,
    profiles: Vec<mpsc::UnboundedSender<ChangeEvent<User>>>,
}

/// インメモリ RemoteStore 実装
///
/// 全クライアントが同じ `Arc<InMemoryStore>` を共有することで、外部
/// ストアのブロードキャスト挙動（書き込みが他クライアントの購読へ
/// 届く）をローカルで再現します。
#[derive(Default)]
pub struct InMemoryStore {
    profiles: Mutex<HashMap<String, ProfileRecord>>,
    rooms: Mutex<HashMap<String, RoomRecord>>,
    messages: Mutex<Vec<MessageRecord>>,
    games: Mutex<HashMap<String, GameRecord>>,
    subscribers: Mutex<Subscribers>,
}

impl InMemoryStore {
    /// 新しい空のストアを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// プロフィールを直接投入する。
    ///
    /// プロフィールの作成は外部の ID プロバイダ側の責務なので trait には
    /// 含めず、ローカル実行とテストのシード専用としています。
    pub async fn seed_profile(&self, user: &User) {
        let mut profiles = self.profiles.lock().await;
        profiles.insert(user.id.as_str().to_string(), ProfileRecord::from(user));
    }

    async fn publish_message(&self, room_id: &str, event: ChangeEvent<Message>) {
        let mut subs = self.subscribers.lock().await;
        subs.messages.retain(|sub| {
            if sub.room_id != room_id {
                return true;
            }
            if sub.sender.send(event.clone()).is_err() {
                tracing::debug!(room_id, "pruning closed message subscription");
                return false;
            }
            true
        });
    }

    async fn publish_game(&self, game_id: &str, event: ChangeEvent<Game>) {
        let mut subs = self.subscribers.lock().await;
        subs.games.retain(|sub| {
            if sub.game_id != game_id {
                return true;
            }
            if sub.sender.send(event.clone()).is_err() {
                tracing::debug!(game_id, "pruning closed game subscription");
                return false;
            }
            true
        });
    }

    async fn publish_room(&self, event: ChangeEvent<Room>) {
        let mut subs = self.subscribers.lock().await;
        subs.rooms.retain(|sender| sender.send(event.clone()).is_ok());
    }

    async fn publish_profile(&self, event: ChangeEvent<User>) {
        let mut subs = self.subscribers.lock().await;
        subs.profiles
            .retain(|sender| sender.send(event.clone()).is_ok());
    }
}

#[async_trait]
impl RemoteStore for InMemoryStore {
    async fn fetch_profile(&self, id: &UserId) -> Result<User, StoreError> {
        let profiles = self.profiles.lock().await;
        let record = profiles
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                collection: ProfileRecord::COLLECTION,
                id: id.as_str().to_string(),
            })?;
        User::try_from(record)
    }

    async fn list_profiles(&self) -> Result<Vec<User>, StoreError> {
        let profiles = self.profiles.lock().await;
        let mut users: Vec<User> = profiles
            .values()
            .cloned()
            .filter_map(|record| match User::try_from(record) {
                Ok(user) => Some(user),
                Err(error) => {
                    tracing::warn!(%error, "skipping invalid profile record");
                    None
                }
            })
            .collect();
        users.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));
        Ok(users)
    }

    async fn set_profile_online(&self, id: &UserId, is_online: bool) -> Result<(), StoreError> {
        let updated = {
            let mut profiles = self.profiles.lock().await;
            let record = profiles
                .get_mut(id.as_str())
                .ok_or_else(|| StoreError::NotFound {
                    collection: ProfileRecord::COLLECTION,
                    id: id.as_str().to_string(),
                })?;
            record.is_online = is_online;
            record.clone()
        };
        match User::try_from(updated) {
            Ok(user) => {
                self.publish_profile(ChangeEvent::Update {
                    new: user,
                    old: None,
                })
                .await;
            }
            Err(error) => {
                tracing::warn!(%error, "profile update not broadcast");
            }
        }
        Ok(())
    }

    async fn insert_room(&self, room: &Room) -> Result<(), StoreError> {
        {
            let mut rooms = self.rooms.lock().await;
            if rooms.contains_key(room.id.as_str()) {
                return Err(StoreError::Duplicate {
                    collection: RoomRecord::COLLECTION,
                    id: room.id.as_str().to_string(),
                });
            }
            rooms.insert(room.id.as_str().to_string(), RoomRecord::from(room));
        }
        self.publish_room(ChangeEvent::Insert(room.clone())).await;
        Ok(())
    }

    async fn update_room(&self, room: &Room) -> Result<(), StoreError> {
        let old = {
            let mut rooms = self.rooms.lock().await;
            let previous = rooms
                .insert(room.id.as_str().to_string(), RoomRecord::from(room))
                .ok_or_else(|| StoreError::NotFound {
                    collection: RoomRecord::COLLECTION,
                    id: room.id.as_str().to_string(),
                });
            match previous {
                Ok(record) => Room::try_from(record).ok(),
                Err(error) => {
                    // Do not keep a phantom row around after a bad update.
                    rooms.remove(room.id.as_str());
                    return Err(error);
                }
            }
        };
        self.publish_room(ChangeEvent::Update {
            new: room.clone(),
            old,
        })
        .await;
        Ok(())
    }

    async fn fetch_room(&self, id: &RoomId) -> Result<Room, StoreError> {
        let rooms = self.rooms.lock().await;
        let record = rooms
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                collection: RoomRecord::COLLECTION,
                id: id.as_str().to_string(),
            })?;
        Room::try_from(record)
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
        let rooms = self.rooms.lock().await;
        let mut listed: Vec<Room> = rooms
            .values()
            .cloned()
            .filter_map(|record| match Room::try_from(record) {
                Ok(room) => Some(room),
                Err(error) => {
                    tracing::warn!(%error, "skipping invalid room record");
                    None
                }
            })
            .collect();
        listed.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(listed)
    }

    async fn insert_message(&self, message: &Message) -> Result<(), StoreError> {
        {
            let mut messages = self.messages.lock().await;
            if messages.iter().any(|m| m.id == message.id.as_str()) {
                return Err(StoreError::Duplicate {
                    collection: MessageRecord::COLLECTION,
                    id: message.id.as_str().to_string(),
                });
            }
            messages.push(MessageRecord::from(message));
        }
        self.publish_message(
            message.room_id.as_str(),
            ChangeEvent::Insert(message.clone()),
        )
        .await;
        Ok(())
    }

    async fn list_messages(&self, room_id: &RoomId) -> Result<Vec<Message>, StoreError> {
        let messages = self.messages.lock().await;
        let mut listed: Vec<Message> = messages
            .iter()
            .filter(|m| m.room_id == room_id.as_str())
            .cloned()
            .filter_map(|record| match Message::try_from(record) {
                Ok(message) => Some(message),
                Err(error) => {
                    tracing::warn!(%error, "skipping invalid message record");
                    None
                }
            })
            .collect();
        // 同時刻のメッセージは挿入順を保つ（安定ソート）
        listed.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(listed)
    }

    async fn insert_game(&self, game: &Game) -> Result<(), StoreError> {
        {
            let mut games = self.games.lock().await;
            if games.contains_key(game.id.as_str()) {
                return Err(StoreError::Duplicate {
                    collection: GameRecord::COLLECTION,
                    id: game.id.as_str().to_string(),
                });
            }
            games.insert(game.id.as_str().to_string(), GameRecord::from(game));
        }
        self.publish_game(game.id.as_str(), ChangeEvent::Insert(game.clone()))
            .await;
        Ok(())
    }

    async fn update_game(&self, game: &Game) -> Result<(), StoreError> {
        let old = {
            let mut games = self.games.lock().await;
            let previous = games
                .insert(game.id.as_str().to_string(), GameRecord::from(game))
                .ok_or_else(|| StoreError::NotFound {
                    collection: GameRecord::COLLECTION,
                    id: game.id.as_str().to_string(),
                });
            match previous {
                Ok(record) => Game::try_from(record).ok(),
                Err(error) => {
                    games.remove(game.id.as_str());
                    return Err(error);
                }
            }
        };
        self.publish_game(
            game.id.as_str(),
            ChangeEvent::Update {
                new: game.clone(),
                old,
            },
        )
        .await;
        Ok(())
    }

    async fn fetch_game(&self, id: &GameId) -> Result<Game, StoreError> {
        let games = self.games.lock().await;
        let record = games
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                collection: GameRecord::COLLECTION,
                id: id.as_str().to_string(),
            })?;
        Game::try_from(record)
    }

    async fn subscribe_messages(
        &self,
        room_id: &RoomId,
    ) -> Result<Subscription<Message>, StoreError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut subs = self.subscribers.lock().await;
        subs.messages.push(MessageSubscriber {
            room_id: room_id.as_str().to_string(),
            sender,
        });
        Ok(Subscription::new(receiver))
    }

    async fn subscribe_game(&self, game_id: &GameId) -> Result<Subscription<Game>, StoreError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut subs = self.subscribers.lock().await;
        subs.games.push(GameSubscriber {
            game_id: game_id.as_str().to_string(),
            sender,
        });
        Ok(Subscription::new(receiver))
    }

    async fn subscribe_rooms(&self) -> Result<Subscription<Room>, StoreError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut subs = self.subscribers.lock().await;
        subs.rooms.push(sender);
        Ok(Subscription::new(receiver))
    }

    async fn subscribe_profiles(&self) -> Result<Subscription<User>, StoreError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut subs = self.subscribers.lock().await;
        subs.profiles.push(sender);
        Ok(Subscription::new(receiver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        MessageContent, MessageId, MessageIdFactory, RoomIdFactory, RoomName, Timestamp,
    };

    fn user_id(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn test_room(name: &str, creator: &str, at: i64) -> Room {
        Room::new(
            RoomIdFactory::generate().unwrap(),
            RoomName::new(name.to_string()).unwrap(),
            None,
            user_id(creator),
            false,
            Timestamp::new(at),
        )
    }

    fn test_message(room: &Room, author: &str, content: &str, at: i64) -> Message {
        Message::new(
            MessageIdFactory::generate().unwrap(),
            room.id.clone(),
            user_id(author),
            MessageContent::new(content.to_string()).unwrap(),
            Timestamp::new(at),
        )
    }

    #[tokio::test]
    async fn test_insert_and_fetch_room() {
        // テスト項目: ルームを挿入して取得できる
        // given (前提条件):
        let store = InMemoryStore::new();
        let room = test_room("General Chat", "u1", 100);

        // when (操作):
        store.insert_room(&room).await.unwrap();
        let fetched = store.fetch_room(&room.id).await.unwrap();

        // then (期待する結果):
        assert_eq!(fetched.id, room.id);
        assert_eq!(fetched.members, room.members);
    }

    #[tokio::test]
    async fn test_insert_duplicate_room_fails() {
        // テスト項目: 同じ ID のルームは二重挿入できない
        // given (前提条件):
        let store = InMemoryStore::new();
        let room = test_room("General Chat", "u1", 100);
        store.insert_room(&room).await.unwrap();

        // when (操作):
        let result = store.insert_room(&room).await;

        // then (期待する結果):
        assert!(matches!(result, Err(StoreError::Duplicate { .. })));
    }

    #[tokio::test]
    async fn test_update_missing_room_fails() {
        // テスト項目: 存在しないルームの更新は NotFound になる
        // given (前提条件):
        let store = InMemoryStore::new();
        let room = test_room("General Chat", "u1", 100);

        // when (操作):
        let result = store.update_room(&room).await;

        // then (期待する結果): 幻の行が残らない
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert!(store.fetch_room(&room.id).await.is_err());
    }

    #[tokio::test]
    async fn test_update_room_is_last_write_wins() {
        // テスト項目: 更新はレコード全体を上書きする（last write wins）
        // given (前提条件):
        let store = InMemoryStore::new();
        let mut room = test_room("General Chat", "u1", 100);
        store.insert_room(&room).await.unwrap();

        // when (操作): 2つの「クライアント」が続けて書き込む
        let mut first = room.clone();
        first.add_member(user_id("u2"));
        store.update_room(&first).await.unwrap();

        room.add_member(user_id("u3"));
        store.update_room(&room).await.unwrap();

        // then (期待する結果): 後勝ちでフィールド単位のマージはされない
        let fetched = store.fetch_room(&room.id).await.unwrap();
        assert_eq!(fetched.members, vec![user_id("u1"), user_id("u3")]);
    }

    #[tokio::test]
    async fn test_list_messages_sorted_ascending() {
        // テスト項目: メッセージ一覧は作成時刻の昇順で返される
        // given (前提条件):
        let store = InMemoryStore::new();
        let room = test_room("General Chat", "u1", 100);
        store.insert_room(&room).await.unwrap();

        let late = test_message(&room, "u1", "second", 300);
        let early = test_message(&room, "u2", "first", 200);
        store.insert_message(&late).await.unwrap();
        store.insert_message(&early).await.unwrap();

        // when (操作):
        let listed = store.list_messages(&room.id).await.unwrap();

        // then (期待する結果):
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].content.as_str(), "first");
        assert_eq!(listed[1].content.as_str(), "second");
    }

    #[tokio::test]
    async fn test_message_subscription_filters_by_room() {
        // テスト項目: メッセージ購読はルーム ID で絞り込まれる
        // given (前提条件):
        let store = InMemoryStore::new();
        let watched = test_room("watched", "u1", 100);
        let other = test_room("other", "u1", 100);
        store.insert_room(&watched).await.unwrap();
        store.insert_room(&other).await.unwrap();

        let mut subscription = store.subscribe_messages(&watched.id).await.unwrap();

        // when (操作): 両方のルームへ書き込む
        store
            .insert_message(&test_message(&other, "u1", "elsewhere", 200))
            .await
            .unwrap();
        let expected = test_message(&watched, "u2", "here", 201);
        store.insert_message(&expected).await.unwrap();

        // then (期待する結果): 購読対象ルームのイベントだけが届く
        match subscription.recv().await {
            Some(ChangeEvent::Insert(message)) => {
                assert_eq!(message.id, expected.id);
                assert_eq!(message.room_id, watched.id);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancelled_subscription_is_pruned() {
        // テスト項目: 解放された購読は次の配信時に破棄され、書き込みは成功し続ける
        // given (前提条件):
        let store = InMemoryStore::new();
        let room = test_room("General Chat", "u1", 100);
        store.insert_room(&room).await.unwrap();

        let subscription = store.subscribe_messages(&room.id).await.unwrap();
        drop(subscription);

        // when (操作):
        store
            .insert_message(&test_message(&room, "u1", "hello", 200))
            .await
            .unwrap();

        // then (期待する結果):
        let subs = store.subscribers.lock().await;
        assert!(subs.messages.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_message_id_rejected() {
        // テスト項目: 同じ ID のメッセージは二重挿入できない（購読エコーの重複防止）
        // given (前提条件):
        let store = InMemoryStore::new();
        let room = test_room("General Chat", "u1", 100);
        store.insert_room(&room).await.unwrap();
        let message = test_message(&room, "u1", "hello", 200);
        store.insert_message(&message).await.unwrap();

        // when (操作):
        let result = store.insert_message(&message).await;

        // then (期待する結果):
        assert!(matches!(result, Err(StoreError::Duplicate { .. })));
        assert_eq!(store.list_messages(&room.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_profile_online_flag_roundtrip() {
        // テスト項目: プロフィールのオンライン状態を更新・取得できる
        // given (前提条件):
        let store = InMemoryStore::new();
        let user = User::new(user_id("u1"), "alice".to_string(), Timestamp::new(100));
        store.seed_profile(&user).await;
        let mut subscription = store.subscribe_profiles().await.unwrap();

        // when (操作):
        store.set_profile_online(&user.id, true).await.unwrap();

        // then (期待する結果):
        let fetched = store.fetch_profile(&user.id).await.unwrap();
        assert!(fetched.is_online);
        match subscription.recv().await {
            Some(ChangeEvent::Update { new, .. }) => assert!(new.is_online),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
