//! End-to-end scenarios: multiple clients sharing one store, state kept
//! consistent through the fetch-then-subscribe loop.

mod fixtures;

use fixtures::{TestBackend, wait_until};

use izakaya_client::domain::{
    GameKind, GameStatus, RemoteStore,
    tictactoe::{ClaimResult, Mark, Match},
};
use izakaya_client::usecase::PlayTurnUseCase;

#[tokio::test]
async fn test_create_room_scenario() {
    // テスト項目: ルーム作成で members=[作成者]・moderators=[作成者] となり
    //             「alice created this room」のシステムメッセージが残る
    // given (前提条件):
    let backend = TestBackend::start().await;
    let mut alice = backend.client_for("alice").await;

    // when (操作):
    let room = alice
        .create_room("Test".to_string(), None, false)
        .await
        .unwrap();

    // then (期待する結果):
    let state = alice.state();
    let snapshot = state.snapshot();
    let current = snapshot.current_room.as_ref().unwrap();
    assert_eq!(current.id, room.id);
    assert_eq!(current.members.len(), 1);
    assert_eq!(current.moderators, current.members);

    wait_until(&state, "creation notice arrives", |s| {
        s.room_messages(&room.id)
            .iter()
            .any(|m| m.is_system && m.content.as_str() == "alice created this room")
    })
    .await;
}

#[tokio::test]
async fn test_message_propagates_between_clients() {
    // テスト項目: 片方のクライアントの送信がもう片方の購読に届き、
    //             送信側では楽観的追加とエコーが重複しない
    // given (前提条件): alice がルームを作成し、bob が参加して同じルームを選択
    let backend = TestBackend::start().await;
    let mut alice = backend.client_for("alice").await;
    let mut bob = backend.client_for("bob").await;

    let room = alice
        .create_room("Test".to_string(), None, false)
        .await
        .unwrap();

    wait_until(&bob.state(), "room visible to bob", |s| {
        s.rooms.contains_key(&room.id)
    })
    .await;
    bob.join_room(&room.id).await.unwrap();
    bob.select_room(&room.id).await.unwrap();

    // when (操作):
    bob.send_message("Hello from bob!".to_string()).await.unwrap();

    // then (期待する結果): alice へ購読経由で届く
    wait_until(&alice.state(), "message reaches alice", |s| {
        s.room_messages(&room.id)
            .iter()
            .any(|m| m.content.as_str() == "Hello from bob!")
    })
    .await;

    // bob 側は楽観的追加 + エコーでも1件のまま
    tokio::task::yield_now().await;
    let bob_copies = bob.state().select(|s| {
        s.room_messages(&room.id)
            .iter()
            .filter(|m| m.content.as_str() == "Hello from bob!")
            .count()
    });
    assert_eq!(bob_copies, 1);
}

#[tokio::test]
async fn test_game_start_and_join_flow() {
    // テスト項目: メンバー1人で開始 → waiting・players=[alice]、
    //             bob の参加で players=[alice,bob]・active に遷移し、
    //             その更新が alice の購読にも届く
    // given (前提条件):
    let backend = TestBackend::start().await;
    let mut alice = backend.client_for("alice").await;
    let mut bob = backend.client_for("bob").await;

    let room = alice
        .create_room("Gaming".to_string(), None, false)
        .await
        .unwrap();
    wait_until(&bob.state(), "room visible to bob", |s| {
        s.rooms.contains_key(&room.id)
    })
    .await;
    bob.join_room(&room.id).await.unwrap();
    bob.select_room(&room.id).await.unwrap();

    // when (操作): alice がゲームを開始
    let game = alice.start_game(GameKind::TicTacToe).await.unwrap();

    // then (期待する結果):
    assert_eq!(game.status, GameStatus::Waiting);
    assert_eq!(game.players.len(), 1);

    // bob のルームに参照が伝搬してから参加
    wait_until(&bob.state(), "active game visible to bob", |s| {
        s.current_room
            .as_ref()
            .and_then(|r| r.active_game.as_ref())
            .is_some()
    })
    .await;
    bob.sync_game().await.unwrap();
    let joined = bob.join_game().await.unwrap();
    assert_eq!(joined.status, GameStatus::Active);
    assert_eq!(joined.players.len(), 2);

    // alice のゲーム購読にも active への遷移が届く
    wait_until(&alice.state(), "game goes active for alice", |s| {
        s.games
            .get(&game.id)
            .map(|g| g.status == GameStatus::Active && g.players.len() == 2)
            .unwrap_or(false)
    })
    .await;
}

#[tokio::test]
async fn test_win_is_written_back_and_broadcast() {
    // テスト項目: 盤面 [[X,X,_],[O,O,_],[_,_,_]] から X が (0,2) を取ると
    //             行0の勝利で finished + 勝者が書き戻され、両クライアントの
    //             ゲーム購読へ伝搬する
    // given (前提条件): 2人対局が active
    let backend = TestBackend::start().await;
    let mut alice = backend.client_for("alice").await;
    let mut bob = backend.client_for("bob").await;

    let room = alice
        .create_room("Gaming".to_string(), None, false)
        .await
        .unwrap();
    wait_until(&bob.state(), "room visible to bob", |s| {
        s.rooms.contains_key(&room.id)
    })
    .await;
    bob.join_room(&room.id).await.unwrap();
    bob.select_room(&room.id).await.unwrap();

    alice.start_game(GameKind::TicTacToe).await.unwrap();
    wait_until(&bob.state(), "active game visible to bob", |s| {
        s.current_room
            .as_ref()
            .and_then(|r| r.active_game.as_ref())
            .is_some()
    })
    .await;
    bob.sync_game().await.unwrap();
    let game = bob.join_game().await.unwrap();

    // 盤面はクライアントローカルなので、検証用に1つの盤で両者の手を進める
    let alice_user = backend
        .store
        .fetch_profile(&game.players[0])
        .await
        .unwrap();
    let bob_user = backend.store.fetch_profile(&game.players[1]).await.unwrap();
    let mut board = Match::from_game(&game).unwrap();
    let usecase = PlayTurnUseCase::new(backend.store.clone());

    for (user, row, col) in [
        (&alice_user, 0, 0),
        (&bob_user, 1, 0),
        (&alice_user, 0, 1),
        (&bob_user, 1, 1),
    ] {
        usecase
            .execute(&room, &game, &mut board, user, row, col)
            .await
            .unwrap();
    }

    // when (操作):
    let result = usecase
        .execute(&room, &game, &mut board, &alice_user, 0, 2)
        .await
        .unwrap();

    // then (期待する結果):
    assert!(matches!(result, ClaimResult::Won { mark: Mark::X, .. }));

    let game_id = game.id.clone();
    let winner_id = alice_user.id.clone();
    for state in [alice.state(), bob.state()] {
        wait_until(&state, "finished game propagates", |s| {
            s.games
                .get(&game_id)
                .map(|g| g.status == GameStatus::Finished && g.winner.as_ref() == Some(&winner_id))
                .unwrap_or(false)
        })
        .await;
    }

    // 勝利通知もルームのメッセージログへ届く
    wait_until(&bob.state(), "win notice arrives", |s| {
        s.room_messages(&room.id)
            .iter()
            .any(|m| m.is_system && m.content.as_str() == "alice won the Tic-Tac-Toe game!")
    })
    .await;
}

#[tokio::test]
async fn test_explicit_end_clears_reference_everywhere() {
    // テスト項目: モデレーターによる明示終了でルームの参照が消え、
    //             もう一方のクライアントにも伝搬する
    // given (前提条件):
    let backend = TestBackend::start().await;
    let mut alice = backend.client_for("alice").await;
    let mut bob = backend.client_for("bob").await;

    let room = alice
        .create_room("Gaming".to_string(), None, false)
        .await
        .unwrap();
    wait_until(&bob.state(), "room visible to bob", |s| {
        s.rooms.contains_key(&room.id)
    })
    .await;
    bob.join_room(&room.id).await.unwrap();
    bob.select_room(&room.id).await.unwrap();
    let game = alice.start_game(GameKind::TicTacToe).await.unwrap();

    // when (操作): alice（モデレーター）が終了する
    let ended = alice.end_game().await.unwrap();

    // then (期待する結果):
    assert_eq!(ended.status, GameStatus::Finished);
    assert!(alice
        .state()
        .select(|s| s.current_room.as_ref().unwrap().active_game.is_none()));

    wait_until(&bob.state(), "cleared reference reaches bob", |s| {
        s.current_room
            .as_ref()
            .map(|r| r.active_game.is_none())
            .unwrap_or(false)
    })
    .await;

    // 終了したゲームは履歴としてストアに残る
    let stored = backend.store.fetch_game(&game.id).await.unwrap();
    assert_eq!(stored.status, GameStatus::Finished);
}

#[tokio::test]
async fn test_private_room_hidden_from_nonmembers() {
    // テスト項目: 非公開ルームは非メンバーの一覧に現れない
    // given (前提条件): carol が非公開ルームを作成
    let backend = TestBackend::start().await;
    let mut carol = backend.client_for("carol").await;
    let private = carol
        .create_room("Secret".to_string(), None, true)
        .await
        .unwrap();

    // when (操作): bob がサインインして初期化する
    let bob = backend.client_for("bob").await;

    // then (期待する結果): bob には見えず、carol には見える
    assert!(bob.state().select(|s| !s.rooms.contains_key(&private.id)));
    assert!(carol.state().select(|s| s.rooms.contains_key(&private.id)));
}

#[tokio::test]
async fn test_logout_resets_state_tree() {
    // テスト項目: ログアウトで状態ツリーが初期状態へ戻り、
    //             プロフィールがオフラインになる
    // given (前提条件):
    let backend = TestBackend::start().await;
    let mut alice = backend.client_for("alice").await;
    alice
        .create_room("Test".to_string(), None, false)
        .await
        .unwrap();

    // when (操作):
    alice.logout().await;

    // then (期待する結果):
    let snapshot = alice.state().snapshot();
    assert!(snapshot.current_user.is_none());
    assert!(snapshot.current_room.is_none());
    assert!(snapshot.rooms.is_empty());

    let alice_id = izakaya_client::domain::UserId::new("alice".to_string()).unwrap();
    let profile = backend.store.fetch_profile(&alice_id).await.unwrap();
    assert!(!profile.is_online);
}
