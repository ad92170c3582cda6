//! UseCase: ルームへの参加
//!
//! メンバー集合の更新はリモートのルームレコードへ往復させます。
//! ローカルの reducer だけを更新すると他クライアントへ伝搬しないため、
//! 必ず `update_room` を先に発行し、成功したルームを返します。

use std::sync::Arc;

use crate::domain::{RemoteStore, Room, RoomId, UserId};

use super::error::MembershipError;

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    store: Arc<dyn RemoteStore>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// ルーム参加を実行
    ///
    /// 既にメンバーの場合は書き込みを省略する冪等な操作です。
    ///
    /// # Returns
    ///
    /// * `Ok(Room)` - 参加後のルーム
    /// * `Err(MembershipError)` - リモート読み書きの失敗
    pub async fn execute(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
    ) -> Result<Room, MembershipError> {
        let mut room = self.store.fetch_room(room_id).await?;

        if !room.add_member(user_id.clone()) {
            // 既にメンバー: 冪等な no-op
            return Ok(room);
        }

        self.store.update_room(&room).await?;
        Ok(room)
    }
}
