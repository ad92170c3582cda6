//! UseCase: ゲームへの参加
//!
//! ルームメンバーが待機中・進行中のゲームに加わります。参加順は
//! プレイヤーリストに保存され、手番・シンボルの割り当てを決めます。

use std::sync::Arc;

use izakaya_shared::time::current_timestamp;

use crate::domain::{Game, RemoteStore, RoomId, Timestamp, User};

use super::{error::JoinGameError, post_system_message};

/// ゲーム参加のユースケース
pub struct JoinGameUseCase {
    store: Arc<dyn RemoteStore>,
}

impl JoinGameUseCase {
    /// 新しい JoinGameUseCase を作成
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// ゲーム参加を実行
    ///
    /// 既に参加済みの場合はエラーではなく no-op として現在のゲームを
    /// 返します。最少人数に達するとステータスが `active` へ遷移します。
    pub async fn execute(&self, room_id: &RoomId, user: &User) -> Result<Game, JoinGameError> {
        let room = self.store.fetch_room(room_id).await?;
        let game_id = room.active_game.clone().ok_or(JoinGameError::NoActiveGame)?;
        let mut game = self.store.fetch_game(&game_id).await?;

        if game.has_player(&user.id) {
            // 二重参加は no-op ガード
            return Ok(game);
        }
        if !room.is_member(&user.id) {
            return Err(JoinGameError::NotARoomMember);
        }

        game.add_player(user.id.clone())?;
        self.store.update_game(&game).await?;

        let now = Timestamp::new(current_timestamp());
        let notice = format!("{} joined the game", user.username);
        if let Err(error) =
            post_system_message(self.store.as_ref(), room_id, &user.id, notice, now).await
        {
            tracing::warn!(%error, game_id = %game.id, "failed to record game join notice");
        }

        Ok(game)
    }
}
