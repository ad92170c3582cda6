//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! app 層から呼び出され、Domain 層と RemoteStore を操作します。
//! リモートへの書き込みが先、ローカル状態の更新は呼び出し側が
//! 成功後に行います（失敗時は従前の状態を保つ）。

pub mod create_room;
pub mod end_game;
pub mod error;
pub mod join_game;
pub mod join_room;
pub mod leave_room;
pub mod play_turn;
pub mod send_message;
pub mod start_game;

pub use create_room::CreateRoomUseCase;
pub use end_game::EndGameUseCase;
pub use error::{
    CreateRoomError, EndGameError, JoinGameError, MembershipError, PlayTurnError,
    SendMessageError, StartGameError,
};
pub use join_game::JoinGameUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use play_turn::PlayTurnUseCase;
pub use send_message::SendMessageUseCase;
pub use start_game::StartGameUseCase;

use crate::domain::{
    Message, MessageContent, MessageIdFactory, RemoteStore, RoomId, StoreError, Timestamp, UserId,
};

/// ルームへシステムメッセージを1件書き込む。
///
/// 本文が不正（空など）な場合は不正レコードとして扱います。
pub(crate) async fn post_system_message(
    store: &dyn RemoteStore,
    room_id: &RoomId,
    user_id: &UserId,
    text: String,
    at: Timestamp,
) -> Result<(), StoreError> {
    let id = MessageIdFactory::generate().map_err(|error| StoreError::InvalidRecord {
        collection: "messages",
        reason: error.to_string(),
    })?;
    let content = MessageContent::new(text).map_err(|error| StoreError::InvalidRecord {
        collection: "messages",
        reason: error.to_string(),
    })?;
    let message = Message::system(id, room_id.clone(), user_id.clone(), content, at);
    store.insert_message(&message).await
}
