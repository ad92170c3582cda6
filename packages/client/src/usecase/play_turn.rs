//! UseCase: 三目並べの手番実行と再戦
//!
//! 手の合法性判定はクライアントローカルの盤面（`tictactoe::Match`）が
//! 行い、決着したときだけ共有ゲームレコードへ finished（と勝者）を書き
//! 戻します。盤面そのものは共有ストアに永続化されません。

use std::sync::Arc;

use izakaya_shared::time::current_timestamp;

use crate::domain::{
    Game, RemoteStore, Room, Timestamp, User,
    tictactoe::{ClaimResult, Match},
};

use super::{error::PlayTurnError, post_system_message};

/// 手番実行のユースケース
pub struct PlayTurnUseCase {
    store: Arc<dyn RemoteStore>,
}

impl PlayTurnUseCase {
    /// 新しい PlayTurnUseCase を作成
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// セルを1つ取得する
    ///
    /// # Arguments
    ///
    /// * `room` - ゲームが進行中のルーム（通知の宛先）
    /// * `game` - 共有ゲームレコードの現在値（ステータス判定に使用）
    /// * `board` - クライアントローカルの対局状態。合法手なら更新される
    /// * `user` - 手を打つユーザー
    /// * `row`, `col` - 対象セル
    ///
    /// # Returns
    ///
    /// * `Ok(ClaimResult)` - 勝利・引き分け・手番交代のいずれか。勝利と
    ///   引き分けでは finished がリモートへ書き戻され、通知が投稿される
    /// * `Err(PlayTurnError)` - 非合法手（盤面は不変）またはリモート失敗
    pub async fn execute(
        &self,
        room: &Room,
        game: &Game,
        board: &mut Match,
        user: &User,
        row: usize,
        col: usize,
    ) -> Result<ClaimResult, PlayTurnError> {
        let result = board.claim(game.status, &user.id, row, col)?;
        let now = Timestamp::new(current_timestamp());

        match &result {
            ClaimResult::Won { winner, .. } => {
                let mut finished = game.clone();
                finished.finish(Some(winner.clone()), now)?;
                self.store.update_game(&finished).await?;

                let winner_name = match self.store.fetch_profile(winner).await {
                    Ok(profile) => profile.username,
                    Err(_) => "Unknown User".to_string(),
                };
                let notice = format!("{} won the {} game!", winner_name, finished.name);
                if let Err(error) =
                    post_system_message(self.store.as_ref(), &room.id, winner, notice, now).await
                {
                    tracing::warn!(%error, game_id = %game.id, "failed to record win notice");
                }
            }
            ClaimResult::Draw => {
                let mut finished = game.clone();
                finished.finish(None, now)?;
                self.store.update_game(&finished).await?;

                let notice = format!("The {} game ended in a draw!", finished.name);
                if let Err(error) =
                    post_system_message(self.store.as_ref(), &room.id, &user.id, notice, now).await
                {
                    tracing::warn!(%error, game_id = %game.id, "failed to record draw notice");
                }
            }
            ClaimResult::NextTurn(_) => {}
        }

        Ok(result)
    }

    /// 再戦（play again）
    ///
    /// 共有レコードを `active` に戻して新しい開始時刻を打ち、前回の勝者
    /// と終了時刻をクリアします。リモート更新が成功したときだけローカル
    /// 盤面をリセットします。
    pub async fn play_again(&self, game: &Game, board: &mut Match) -> Result<Game, PlayTurnError> {
        let mut restarted = game.clone();
        restarted.restart(Timestamp::new(current_timestamp()))?;
        self.store.update_game(&restarted).await?;
        board.reset();
        Ok(restarted)
    }
}
