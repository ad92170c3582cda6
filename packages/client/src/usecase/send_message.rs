//! UseCase: メッセージ送信
//!
//! 送信は必ずリモートストアへの `insert` になります。ローカルにだけ
//! 追加されたメッセージは他クライアントの購読に届かないため、reducer
//! への反映は購読エコー（または成功後の楽観的追加）に任せます。

use std::sync::Arc;

use izakaya_shared::time::current_timestamp;

use crate::domain::{
    Message, MessageContent, MessageIdFactory, RemoteStore, RoomId, StoreError, Timestamp, User,
};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    store: Arc<dyn RemoteStore>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `author` - 送信者
    /// * `room_id` - 宛先ルーム
    /// * `content` - 本文（空は書き込み前に拒否）
    ///
    /// # Returns
    ///
    /// * `Ok(Message)` - ストアへ書き込まれたメッセージ
    /// * `Err(SendMessageError)` - 検証エラーまたはリモート書き込み失敗
    pub async fn execute(
        &self,
        author: &User,
        room_id: &RoomId,
        content: String,
    ) -> Result<Message, SendMessageError> {
        let content = MessageContent::new(content)?;
        let id = MessageIdFactory::generate().map_err(|error| {
            SendMessageError::Store(StoreError::InvalidRecord {
                collection: "messages",
                reason: error.to_string(),
            })
        })?;

        let message = Message::new(
            id,
            room_id.clone(),
            author.id.clone(),
            content,
            Timestamp::new(current_timestamp()),
        );

        self.store.insert_message(&message).await?;
        Ok(message)
    }
}
