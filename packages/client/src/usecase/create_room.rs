//! UseCase: ルーム作成
//!
//! ルーム名を検証し、作成者を唯一のメンバー兼モデレーターとして
//! ルームを書き込み、作成を記録するシステムメッセージを1件投稿します。

use std::sync::Arc;

use izakaya_shared::time::current_timestamp;

use crate::domain::{RemoteStore, Room, RoomIdFactory, RoomName, Timestamp, User};

use super::{error::CreateRoomError, post_system_message};

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    store: Arc<dyn RemoteStore>,
}

impl CreateRoomUseCase {
    /// 新しい CreateRoomUseCase を作成
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// ルーム作成を実行
    ///
    /// # Arguments
    ///
    /// * `creator` - 作成者（唯一のメンバー兼モデレーターになる）
    /// * `name` - ルーム名（空・空白のみは書き込み前に拒否）
    /// * `description` - 任意の説明
    /// * `is_private` - 非公開フラグ（非メンバーの一覧から隠す）
    ///
    /// # Returns
    ///
    /// * `Ok(Room)` - 書き込み済みの新しいルーム
    /// * `Err(CreateRoomError)` - 検証エラーまたはリモート書き込み失敗
    pub async fn execute(
        &self,
        creator: &User,
        name: String,
        description: Option<String>,
        is_private: bool,
    ) -> Result<Room, CreateRoomError> {
        let name = RoomName::new(name)?;
        let now = Timestamp::new(current_timestamp());

        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let room = Room::new(
            RoomIdFactory::generate()?,
            name,
            description,
            creator.id.clone(),
            is_private,
            now,
        );

        self.store.insert_room(&room).await?;

        let notice = format!("{} created this room", creator.username);
        if let Err(error) =
            post_system_message(self.store.as_ref(), &room.id, &creator.id, notice, now).await
        {
            // ルーム自体は作成済みなので通知の失敗で巻き戻さない
            tracing::warn!(%error, room_id = %room.id, "failed to record room creation notice");
        }

        Ok(room)
    }
}
