//! UseCase: ゲーム開始
//!
//! 3段階の書き込み（ゲーム作成 → ルームの参照設定 → システムメッセージ）
//! を順に実行します。トランザクションは張れないため、各ステップは
//! check-before-write で冪等にしてあり、途中で失敗しても同じ game id で
//! 再実行すれば未適用のステップだけが走って収束します。

use std::sync::Arc;

use izakaya_shared::time::current_timestamp;

use crate::domain::{
    Game, GameId, GameKind, RemoteStore, RoomId, StoreError, Timestamp, User,
};

use super::{error::StartGameError, post_system_message};

/// ゲーム開始のユースケース
pub struct StartGameUseCase {
    store: Arc<dyn RemoteStore>,
}

impl StartGameUseCase {
    /// 新しい StartGameUseCase を作成
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// ゲーム開始を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - 対象ルーム
    /// * `creator` - 開始者（ルームメンバーであること。唯一のプレイヤーになる）
    /// * `kind` - 開始するゲームの種別
    /// * `game_id` - 呼び出し側で生成したゲーム ID。失敗後の再実行では
    ///   同じ ID を渡すことで途中から再開できる
    ///
    /// # Returns
    ///
    /// * `Ok(Game)` - `waiting` 状態のゲーム
    /// * `Err(StartGameError)` - 最初に失敗したステップのエラー
    pub async fn execute(
        &self,
        room_id: &RoomId,
        creator: &User,
        kind: GameKind,
        game_id: GameId,
    ) -> Result<Game, StartGameError> {
        let now = Timestamp::new(current_timestamp());

        let mut room = self.store.fetch_room(room_id).await?;
        if !room.is_member(&creator.id) {
            return Err(StartGameError::NotARoomMember);
        }
        if let Some(active) = &room.active_game
            && *active != game_id
        {
            return Err(StartGameError::RoomBusy {
                game_id: active.as_str().to_string(),
            });
        }

        // ステップ1: ゲームレコード（既に存在すれば前回実行の続きとして再利用）
        let (game, inserted) = match self.store.fetch_game(&game_id).await {
            Ok(existing) => (existing, false),
            Err(StoreError::NotFound { .. }) => {
                let game = Game::new(game_id.clone(), kind, creator.id.clone(), now);
                self.store.insert_game(&game).await?;
                (game, true)
            }
            Err(error) => return Err(error.into()),
        };

        // ステップ2: ルームのアクティブゲーム参照
        if room.active_game.as_ref() != Some(&game_id) {
            room.set_active_game(game_id.clone())
                .map_err(|_| StartGameError::RoomBusy {
                    game_id: game_id.as_str().to_string(),
                })?;
            self.store.update_room(&room).await?;
        }

        // ステップ3: 開始通知（初回の作成時のみ）
        if inserted {
            let notice = format!("{} started a game of {}", creator.username, game.name);
            post_system_message(self.store.as_ref(), room_id, &creator.id, notice, now).await?;
        }

        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        GameIdFactory, GameStatus, Room, RoomIdFactory, RoomName, UserId,
    };
    use crate::infrastructure::InMemoryStore;

    fn test_user(id: &str, name: &str) -> User {
        User::new(
            UserId::new(id.to_string()).unwrap(),
            name.to_string(),
            Timestamp::new(0),
        )
    }

    async fn seeded_room(store: &InMemoryStore, creator: &User) -> Room {
        let room = Room::new(
            RoomIdFactory::generate().unwrap(),
            RoomName::new("Gaming Room".to_string()).unwrap(),
            None,
            creator.id.clone(),
            false,
            Timestamp::new(0),
        );
        store.insert_room(&room).await.unwrap();
        room
    }

    #[tokio::test]
    async fn test_start_game_waiting_with_creator() {
        // テスト項目: メンバー1人でゲームを開始すると waiting 状態・players=[u1]
        // given (前提条件):
        let store = Arc::new(InMemoryStore::new());
        let creator = test_user("u1", "alice");
        let room = seeded_room(&store, &creator).await;
        let usecase = StartGameUseCase::new(store.clone());

        // when (操作):
        let game = usecase
            .execute(
                &room.id,
                &creator,
                GameKind::TicTacToe,
                GameIdFactory::generate().unwrap(),
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(game.status, GameStatus::Waiting);
        assert_eq!(game.players, vec![creator.id.clone()]);

        // ルームの参照とシステムメッセージも書かれている
        let stored_room = store.fetch_room(&room.id).await.unwrap();
        assert_eq!(stored_room.active_game, Some(game.id.clone()));

        let messages = store.list_messages(&room.id).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].is_system);
        assert_eq!(
            messages[0].content.as_str(),
            "alice started a game of Tic-Tac-Toe"
        );
    }

    #[tokio::test]
    async fn test_start_game_rejected_for_nonmember() {
        // テスト項目: 非メンバーはゲームを開始できない
        // given (前提条件):
        let store = Arc::new(InMemoryStore::new());
        let creator = test_user("u1", "alice");
        let room = seeded_room(&store, &creator).await;
        let usecase = StartGameUseCase::new(store.clone());
        let outsider = test_user("u9", "mallory");

        // when (操作):
        let result = usecase
            .execute(
                &room.id,
                &outsider,
                GameKind::TicTacToe,
                GameIdFactory::generate().unwrap(),
            )
            .await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), StartGameError::NotARoomMember);
    }

    #[tokio::test]
    async fn test_start_game_rejected_while_room_busy() {
        // テスト項目: アクティブなゲームがあるルームでは新しいゲームを開始できない
        // given (前提条件):
        let store = Arc::new(InMemoryStore::new());
        let creator = test_user("u1", "alice");
        let room = seeded_room(&store, &creator).await;
        let usecase = StartGameUseCase::new(store.clone());
        let first = usecase
            .execute(
                &room.id,
                &creator,
                GameKind::TicTacToe,
                GameIdFactory::generate().unwrap(),
            )
            .await
            .unwrap();

        // when (操作):
        let result = usecase
            .execute(
                &room.id,
                &creator,
                GameKind::Hangman,
                GameIdFactory::generate().unwrap(),
            )
            .await;

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            StartGameError::RoomBusy {
                game_id: first.id.as_str().to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_start_game_retry_converges_after_partial_failure() {
        // テスト項目: ゲーム作成だけ成功した状態から同じ ID で再実行すると
        //             残りのステップだけが適用され、通知が重複しない
        // given (前提条件): ステップ1のみ完了した「部分的な失敗」状態を再現
        let store = Arc::new(InMemoryStore::new());
        let creator = test_user("u1", "alice");
        let room = seeded_room(&store, &creator).await;
        let game_id = GameIdFactory::generate().unwrap();
        let orphan = Game::new(
            game_id.clone(),
            GameKind::TicTacToe,
            creator.id.clone(),
            Timestamp::new(100),
        );
        store.insert_game(&orphan).await.unwrap();

        // when (操作): 同じ game id で再実行
        let usecase = StartGameUseCase::new(store.clone());
        let game = usecase
            .execute(&room.id, &creator, GameKind::TicTacToe, game_id.clone())
            .await
            .unwrap();

        // then (期待する結果): ルーム参照が設定され、ゲームは二重作成されない
        assert_eq!(game.id, game_id);
        let stored_room = store.fetch_room(&room.id).await.unwrap();
        assert_eq!(stored_room.active_game, Some(game_id));

        // 開始通知は初回作成時のみなので 0 件のまま
        let messages = store.list_messages(&room.id).await.unwrap();
        assert!(messages.is_empty());
    }
}
