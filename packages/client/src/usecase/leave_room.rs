//! UseCase: ルームからの退出
//!
//! 参加と対になる操作。非メンバーの退出は no-op です。

use std::sync::Arc;

use crate::domain::{RemoteStore, Room, RoomId, UserId};

use super::error::MembershipError;

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    store: Arc<dyn RemoteStore>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// ルーム退出を実行
    ///
    /// 非メンバーの場合は書き込みを省略する冪等な操作です。
    pub async fn execute(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
    ) -> Result<Room, MembershipError> {
        let mut room = self.store.fetch_room(room_id).await?;

        if !room.remove_member(user_id) {
            // 非メンバー: 冪等な no-op
            return Ok(room);
        }

        self.store.update_room(&room).await?;
        Ok(room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RoomIdFactory, RoomName, Timestamp};
    use crate::infrastructure::InMemoryStore;

    fn user_id(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    async fn seeded_room(store: &InMemoryStore) -> Room {
        let mut room = Room::new(
            RoomIdFactory::generate().unwrap(),
            RoomName::new("Test".to_string()).unwrap(),
            None,
            user_id("u1"),
            false,
            Timestamp::new(0),
        );
        room.add_member(user_id("u2"));
        store.insert_room(&room).await.unwrap();
        room
    }

    #[tokio::test]
    async fn test_leave_room_round_trips_member_list() {
        // テスト項目: 退出がリモートのメンバーリストへ反映される
        // given (前提条件):
        let store = Arc::new(InMemoryStore::new());
        let room = seeded_room(&store).await;
        let usecase = LeaveRoomUseCase::new(store.clone());

        // when (操作):
        let left = usecase.execute(&room.id, &user_id("u2")).await.unwrap();

        // then (期待する結果):
        assert!(!left.is_member(&user_id("u2")));
        let stored = store.fetch_room(&room.id).await.unwrap();
        assert_eq!(stored.members, vec![user_id("u1")]);
    }

    #[tokio::test]
    async fn test_leave_room_nonmember_is_noop() {
        // テスト項目: 非メンバーの退出は状態を変えない
        // given (前提条件):
        let store = Arc::new(InMemoryStore::new());
        let room = seeded_room(&store).await;
        let usecase = LeaveRoomUseCase::new(store.clone());

        // when (操作):
        let result = usecase.execute(&room.id, &user_id("u9")).await.unwrap();

        // then (期待する結果):
        assert_eq!(result.members, vec![user_id("u1"), user_id("u2")]);
        let stored = store.fetch_room(&room.id).await.unwrap();
        assert_eq!(stored.members.len(), 2);
    }
}
