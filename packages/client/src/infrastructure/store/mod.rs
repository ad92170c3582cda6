//! Remote store gateway implementations.
//!
//! `record` は外部ストアのカラム命名（snake_case）そのままのワイヤー
//! フォーマットで、ドメインモデルとの変換をこの境界で行います。
//! `inmemory` は HashMap をインメモリ DB として使用する実装です。

pub mod inmemory;
pub mod record;

pub use inmemory::InMemoryStore;
pub use record::{GameRecord, MessageRecord, ProfileRecord, RoomRecord};
