//! UseCase: ゲームの明示的な終了
//!
//! ルームのモデレーターまたはゲーム作成者（players[0]）だけが実行
//! できます。ゲームを finished にし、ルームのアクティブゲーム参照を
//! 外し、終了通知を投稿します。

use std::sync::Arc;

use izakaya_shared::time::current_timestamp;

use crate::domain::{Game, GameStatus, RemoteStore, RoomId, Timestamp, User};

use super::{error::EndGameError, post_system_message};

/// ゲーム終了のユースケース
pub struct EndGameUseCase {
    store: Arc<dyn RemoteStore>,
}

impl EndGameUseCase {
    /// 新しい EndGameUseCase を作成
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// ゲーム終了を実行
    ///
    /// 盤面上の決着（勝敗・引き分け）で既に finished になっている場合は
    /// レコードをそのままに、ルームの参照クリアだけを行います。
    pub async fn execute(&self, room_id: &RoomId, user: &User) -> Result<Game, EndGameError> {
        let mut room = self.store.fetch_room(room_id).await?;
        let game_id = room.active_game.clone().ok_or(EndGameError::NoActiveGame)?;
        let mut game = self.store.fetch_game(&game_id).await?;

        let is_creator = game.players.first() == Some(&user.id);
        if !room.is_moderator(&user.id) && !is_creator {
            return Err(EndGameError::NotAuthorized);
        }

        let now = Timestamp::new(current_timestamp());
        if game.status != GameStatus::Finished {
            game.finish(None, now)?;
            self.store.update_game(&game).await?;
        }

        room.clear_active_game();
        self.store.update_room(&room).await?;

        if let Err(error) = post_system_message(
            self.store.as_ref(),
            room_id,
            &user.id,
            "The game has ended".to_string(),
            now,
        )
        .await
        {
            tracing::warn!(%error, game_id = %game.id, "failed to record game end notice");
        }

        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        GameIdFactory, GameKind, Room, RoomIdFactory, RoomName, UserId,
    };
    use crate::infrastructure::InMemoryStore;

    fn test_user(id: &str, name: &str) -> User {
        User::new(
            UserId::new(id.to_string()).unwrap(),
            name.to_string(),
            Timestamp::new(0),
        )
    }

    async fn seeded_room_with_game(store: &InMemoryStore, creator: &User, joiner: &User) -> Room {
        let mut room = Room::new(
            RoomIdFactory::generate().unwrap(),
            RoomName::new("Gaming Room".to_string()).unwrap(),
            None,
            creator.id.clone(),
            false,
            Timestamp::new(0),
        );
        room.add_member(joiner.id.clone());
        let mut game = Game::new(
            GameIdFactory::generate().unwrap(),
            GameKind::TicTacToe,
            creator.id.clone(),
            Timestamp::new(100),
        );
        game.add_player(joiner.id.clone()).unwrap();
        room.set_active_game(game.id.clone()).unwrap();
        store.insert_room(&room).await.unwrap();
        store.insert_game(&game).await.unwrap();
        room
    }

    #[tokio::test]
    async fn test_end_game_by_moderator() {
        // テスト項目: モデレーターの終了でゲームが finished・参照がクリアされる
        // given (前提条件): alice はモデレーター
        let store = Arc::new(InMemoryStore::new());
        let alice = test_user("u1", "alice");
        let bob = test_user("u2", "bob");
        let room = seeded_room_with_game(&store, &alice, &bob).await;
        let usecase = EndGameUseCase::new(store.clone());

        // when (操作):
        let game = usecase.execute(&room.id, &alice).await.unwrap();

        // then (期待する結果):
        assert_eq!(game.status, GameStatus::Finished);
        assert!(game.ended_at.is_some());
        assert!(game.winner.is_none());

        let stored_room = store.fetch_room(&room.id).await.unwrap();
        assert!(stored_room.active_game.is_none());

        // 終了したゲームの実体は履歴として残る
        let stored_game = store.fetch_game(&game.id).await.unwrap();
        assert_eq!(stored_game.status, GameStatus::Finished);

        let messages = store.list_messages(&room.id).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content.as_str(), "The game has ended");
    }

    #[tokio::test]
    async fn test_end_game_rejected_for_ordinary_member() {
        // テスト項目: モデレーターでも作成者でもないメンバーは終了できない
        // given (前提条件): bob は一般メンバーでゲーム作成者でもない
        let store = Arc::new(InMemoryStore::new());
        let alice = test_user("u1", "alice");
        let bob = test_user("u2", "bob");
        let mut room = Room::new(
            RoomIdFactory::generate().unwrap(),
            RoomName::new("Gaming Room".to_string()).unwrap(),
            None,
            alice.id.clone(),
            false,
            Timestamp::new(0),
        );
        room.add_member(bob.id.clone());
        let game = Game::new(
            GameIdFactory::generate().unwrap(),
            GameKind::TicTacToe,
            alice.id.clone(),
            Timestamp::new(100),
        );
        room.set_active_game(game.id.clone()).unwrap();
        store.insert_room(&room).await.unwrap();
        store.insert_game(&game).await.unwrap();
        let usecase = EndGameUseCase::new(store.clone());

        // when (操作):
        let result = usecase.execute(&room.id, &bob).await;

        // then (期待する結果): ゲームは変化しない
        assert_eq!(result.unwrap_err(), EndGameError::NotAuthorized);
        let stored = store.fetch_game(&game.id).await.unwrap();
        assert_eq!(stored.status, GameStatus::Waiting);
    }

    #[tokio::test]
    async fn test_end_game_creator_allowed_without_moderator_role() {
        // テスト項目: ゲーム作成者はモデレーターでなくても終了できる
        // given (前提条件): bob がモデレーターではないがゲームを作成した
        let store = Arc::new(InMemoryStore::new());
        let alice = test_user("u1", "alice");
        let bob = test_user("u2", "bob");
        let mut room = Room::new(
            RoomIdFactory::generate().unwrap(),
            RoomName::new("Gaming Room".to_string()).unwrap(),
            None,
            alice.id.clone(),
            false,
            Timestamp::new(0),
        );
        room.add_member(bob.id.clone());
        let game = Game::new(
            GameIdFactory::generate().unwrap(),
            GameKind::TicTacToe,
            bob.id.clone(),
            Timestamp::new(100),
        );
        room.set_active_game(game.id.clone()).unwrap();
        store.insert_room(&room).await.unwrap();
        store.insert_game(&game).await.unwrap();
        let usecase = EndGameUseCase::new(store.clone());

        // when (操作):
        let result = usecase.execute(&room.id, &bob).await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_end_without_active_game_fails() {
        // テスト項目: アクティブなゲームがない場合はエラー
        // given (前提条件):
        let store = Arc::new(InMemoryStore::new());
        let alice = test_user("u1", "alice");
        let room = Room::new(
            RoomIdFactory::generate().unwrap(),
            RoomName::new("Quiet".to_string()).unwrap(),
            None,
            alice.id.clone(),
            false,
            Timestamp::new(0),
        );
        store.insert_room(&room).await.unwrap();
        let usecase = EndGameUseCase::new(store);

        // when (操作):
        let result = usecase.execute(&room.id, &alice).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), EndGameError::NoActiveGame);
    }
}
