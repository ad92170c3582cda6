//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{BoardError, GameError, StoreError, ValueObjectError};

/// ルーム作成の失敗
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CreateRoomError {
    /// 入力検証エラー（空のルーム名など）: 書き込み前に拒否される
    #[error("invalid room input: {0}")]
    Validation(#[from] ValueObjectError),

    /// リモート書き込みの失敗
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// ルームへの参加・退出の失敗
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MembershipError {
    /// リモート書き込みの失敗
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// メッセージ送信の失敗
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    /// 入力検証エラー（空メッセージなど）: 書き込み前に拒否される
    #[error("invalid message input: {0}")]
    Validation(#[from] ValueObjectError),

    /// リモート書き込みの失敗
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// ゲーム開始の失敗
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StartGameError {
    /// 開始者がルームのメンバーではない
    #[error("only room members can start a game")]
    NotARoomMember,

    /// ルームには既に別のアクティブなゲームがある
    #[error("room already has an active game ({game_id})")]
    RoomBusy { game_id: String },

    /// 入力検証エラー
    #[error("invalid game input: {0}")]
    Validation(#[from] ValueObjectError),

    /// リモート書き込みの失敗（途中で失敗した場合、同じ game id での
    /// 再実行により残りのステップだけが適用される）
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// ゲーム参加の失敗
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinGameError {
    /// 参加者がルームのメンバーではない
    #[error("only room members can join the game")]
    NotARoomMember,

    /// ルームにアクティブなゲームがない
    #[error("room has no active game")]
    NoActiveGame,

    /// ゲームのライフサイクル制約（満員・終了済み）に違反
    #[error(transparent)]
    Game(#[from] GameError),

    /// リモート書き込みの失敗
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// ゲーム終了の失敗
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EndGameError {
    /// モデレーターまたはゲーム作成者のみが終了できる
    #[error("only a room moderator or the game creator can end the game")]
    NotAuthorized,

    /// ルームにアクティブなゲームがない
    #[error("room has no active game")]
    NoActiveGame,

    /// ゲームのライフサイクル制約に違反
    #[error(transparent)]
    Game(#[from] GameError),

    /// リモート書き込みの失敗
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// 手番実行・再戦の失敗
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlayTurnError {
    /// ルールエンジンが手を拒否（盤面は変化しない）
    #[error(transparent)]
    Board(#[from] BoardError),

    /// ゲームのライフサイクル制約に違反
    #[error(transparent)]
    Game(#[from] GameError),

    /// リモート書き込みの失敗
    #[error(transparent)]
    Store(#[from] StoreError),
}
