//! Per-client orchestrator.
//!
//! Wires the identity provider, the remote store gateway and the state
//! store together: initial fetch, fetch-then-subscribe on room
//! selection, the active-game feed, and the client operations the
//! interactive surface drives.
//!
//! Subscriptions are scoped resources. Each forwarder task is held as a
//! `JoinHandle` and aborted whenever the selection it serves changes or
//! the client is dropped, so stale-room events never land in the wrong
//! state slot and handles do not accumulate.

mod error;

pub use error::ClientError;

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::{
    ChangeEvent, Game, GameId, GameIdFactory, GameKind, GameStatus, IdentityProvider, Message,
    RemoteStore, Room, RoomId, StoreError, Subscription, User, UserId,
    tictactoe::{ClaimResult, Match},
};
use crate::state::{Action, StateStore};
use crate::usecase::{
    CreateRoomUseCase, EndGameUseCase, JoinGameUseCase, JoinRoomUseCase, LeaveRoomUseCase,
    PlayTurnUseCase, SendMessageUseCase, StartGameUseCase,
};

/// One connected client: state tree, gateway, and live subscriptions.
pub struct Client {
    store: Arc<dyn RemoteStore>,
    identity: Arc<dyn IdentityProvider>,
    state: Arc<StateStore>,
    message_task: Option<JoinHandle<()>>,
    game_task: Option<(GameId, JoinHandle<()>)>,
    roster_tasks: Vec<JoinHandle<()>>,
    board: Option<(GameId, Match)>,
}

impl Client {
    /// A client with an empty state tree. Call [`Client::initialize`]
    /// once a session exists.
    pub fn new(store: Arc<dyn RemoteStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            store,
            identity,
            state: Arc::new(StateStore::new()),
            message_task: None,
            game_task: None,
            roster_tasks: Vec::new(),
            board: None,
        }
    }

    /// The observable state store backing this client.
    pub fn state(&self) -> Arc<StateStore> {
        self.state.clone()
    }

    /// The local board of the active tic-tac-toe match, when one is set up.
    pub fn board(&self) -> Option<&Match> {
        self.board.as_ref().map(|(_, board)| board)
    }

    /// Resolve the session, load the profile, the user roster and the
    /// visible rooms, and attach the roster subscriptions.
    pub async fn initialize(&mut self) -> Result<(), ClientError> {
        let session = self
            .identity
            .session()
            .await
            .ok_or(ClientError::NotSignedIn)?;

        let profile = self.store.fetch_profile(&session.user_id).await?;
        self.state.dispatch(Action::UpsertUser(profile.clone()));
        self.state.dispatch(Action::SetCurrentUser(profile));

        let (users, rooms) = futures_util::try_join!(
            self.store.list_profiles(),
            self.store.list_rooms()
        )?;
        for user in users {
            self.state.dispatch(Action::UpsertUser(user));
        }

        let me = session.user_id.clone();
        for room in rooms {
            if room_visible(&room, &me) {
                self.state.dispatch(Action::AddRoom(room));
            }
        }

        self.attach_roster_feeds(me).await?;
        Ok(())
    }

    /// Keep the room listing and the presence flags current.
    async fn attach_roster_feeds(&mut self, me: UserId) -> Result<(), ClientError> {
        let rooms = self.store.subscribe_rooms().await?;
        let state = self.state.clone();
        self.roster_tasks.push(tokio::spawn(forward_rooms(rooms, state, me)));

        let profiles = self.store.subscribe_profiles().await?;
        let state = self.state.clone();
        self.roster_tasks.push(tokio::spawn(async move {
            let mut profiles = profiles;
            while let Some(event) = profiles.recv().await {
                match event {
                    ChangeEvent::Insert(user) | ChangeEvent::Update { new: user, .. } => {
                        // 受信した更新はレコード全体を正として上書きする
                        state.dispatch(Action::UpsertUser(user));
                    }
                    ChangeEvent::Delete { .. } => {}
                }
            }
        }));
        Ok(())
    }

    /// Switch the active room: release the previous room's feeds, load
    /// the full history, then go live on the room's message feed.
    pub async fn select_room(&mut self, room_id: &RoomId) -> Result<(), ClientError> {
        if let Some(task) = self.message_task.take() {
            task.abort();
        }
        self.release_game_feed();

        let room = self.store.fetch_room(room_id).await?;
        self.state.dispatch(Action::AddRoom(room.clone()));
        self.state.dispatch(Action::SetCurrentRoom(room.clone()));

        let history = self.store.list_messages(room_id).await?;
        self.state.dispatch(Action::SetMessages {
            room_id: room_id.clone(),
            messages: history,
        });

        let subscription = self.store.subscribe_messages(room_id).await?;
        let state = self.state.clone();
        self.message_task = Some(tokio::spawn(forward_messages(subscription, state)));

        self.sync_game().await?;
        Ok(())
    }

    /// Reconcile the game feed and the local board with the selected
    /// room's active-game reference.
    ///
    /// Drivers call this after observing a state change; it is also
    /// called internally after every operation that can move the
    /// reference. Idempotent.
    pub async fn sync_game(&mut self) -> Result<(), ClientError> {
        let active = self
            .state
            .select(|s| s.current_room.as_ref().and_then(|r| r.active_game.clone()));

        let Some(game_id) = active else {
            self.release_game_feed();
            return Ok(());
        };

        let watched = self.game_task.as_ref().map(|(id, _)| id.clone());
        if watched.as_ref() != Some(&game_id) {
            self.release_game_feed();

            match self.store.fetch_game(&game_id).await {
                Ok(game) => self.state.dispatch(Action::AddGame(game)),
                Err(StoreError::NotFound { .. }) => {
                    // ぶら下がった参照は描画側でプレースホルダーになる。
                    // 購読は張っておき、後から現れたレコードを拾う。
                    tracing::warn!(game_id = %game_id, "room references a game that is not loaded");
                }
                Err(error) => return Err(error.into()),
            }

            let subscription = self.store.subscribe_game(&game_id).await?;
            let state = self.state.clone();
            self.game_task = Some((game_id.clone(), tokio::spawn(forward_game(subscription, state))));
        }

        self.sync_board(&game_id);
        Ok(())
    }

    /// Derive the local board from the shared game record.
    fn sync_board(&mut self, game_id: &GameId) {
        let game = self.state.select(|s| s.games.get(game_id).cloned());
        let Some(game) = game else {
            return;
        };
        if game.kind() != Some(GameKind::TicTacToe) || game.players.len() < 2 {
            return;
        }

        match &mut self.board {
            Some((id, board)) if id == game_id => {
                // リモート側の play again で active に戻ったら盤面を張り直す
                if game.status == GameStatus::Active && board.outcome().is_some() {
                    board.reset();
                }
            }
            _ => {
                if let Ok(board) = Match::from_game(&game) {
                    self.board = Some((game_id.clone(), board));
                }
            }
        }
    }

    fn release_game_feed(&mut self) {
        if let Some((_, task)) = self.game_task.take() {
            task.abort();
        }
        self.board = None;
    }

    fn current_user(&self) -> Result<User, ClientError> {
        self.state
            .select(|s| s.current_user.clone())
            .ok_or(ClientError::NotSignedIn)
    }

    fn current_room(&self) -> Result<Room, ClientError> {
        self.state
            .select(|s| s.current_room.clone())
            .ok_or(ClientError::NoRoomSelected)
    }

    /// Create a room and switch to it.
    pub async fn create_room(
        &mut self,
        name: String,
        description: Option<String>,
        is_private: bool,
    ) -> Result<Room, ClientError> {
        let user = self.current_user()?;
        let room = CreateRoomUseCase::new(self.store.clone())
            .execute(&user, name, description, is_private)
            .await?;
        self.state.dispatch(Action::AddRoom(room.clone()));
        self.select_room(&room.id).await?;
        Ok(room)
    }

    /// Join a room (remote round-trip first, then the local transition).
    pub async fn join_room(&self, room_id: &RoomId) -> Result<(), ClientError> {
        let user = self.current_user()?;
        JoinRoomUseCase::new(self.store.clone())
            .execute(room_id, &user.id)
            .await?;
        self.state.dispatch(Action::JoinRoom {
            room_id: room_id.clone(),
            user_id: user.id,
        });
        Ok(())
    }

    /// Leave a room (remote round-trip first, then the local transition).
    pub async fn leave_room(&self, room_id: &RoomId) -> Result<(), ClientError> {
        let user = self.current_user()?;
        LeaveRoomUseCase::new(self.store.clone())
            .execute(room_id, &user.id)
            .await?;
        self.state.dispatch(Action::LeaveRoom {
            room_id: room_id.clone(),
            user_id: user.id,
        });
        Ok(())
    }

    /// Send a chat message to the selected room.
    ///
    /// The write goes to the remote store; the optimistic local append
    /// is safe because the reducer drops the subscription echo by id.
    pub async fn send_message(&self, content: String) -> Result<Message, ClientError> {
        let user = self.current_user()?;
        let room = self.current_room()?;
        let message = SendMessageUseCase::new(self.store.clone())
            .execute(&user, &room.id, content)
            .await?;
        self.state.dispatch(Action::AddMessage(message.clone()));
        Ok(message)
    }

    /// Start a game of the given kind in the selected room.
    pub async fn start_game(&mut self, kind: GameKind) -> Result<Game, ClientError> {
        let user = self.current_user()?;
        let room = self.current_room()?;
        let game_id = GameIdFactory::generate()?;
        let game = StartGameUseCase::new(self.store.clone())
            .execute(&room.id, &user, kind, game_id)
            .await?;
        self.state.dispatch(Action::AddGame(game.clone()));
        self.refresh_current_room().await?;
        Ok(game)
    }

    /// Join the selected room's active game.
    pub async fn join_game(&mut self) -> Result<Game, ClientError> {
        let user = self.current_user()?;
        let room = self.current_room()?;
        let game = JoinGameUseCase::new(self.store.clone())
            .execute(&room.id, &user)
            .await?;
        self.state.dispatch(Action::UpdateGame(game.clone()));
        self.sync_game().await?;
        Ok(game)
    }

    /// Explicitly end the selected room's active game.
    pub async fn end_game(&mut self) -> Result<Game, ClientError> {
        let user = self.current_user()?;
        let room = self.current_room()?;
        let game = EndGameUseCase::new(self.store.clone())
            .execute(&room.id, &user)
            .await?;
        self.state.dispatch(Action::UpdateGame(game.clone()));
        self.refresh_current_room().await?;
        Ok(game)
    }

    /// Claim a cell in the active tic-tac-toe match.
    pub async fn play(&mut self, row: usize, col: usize) -> Result<ClaimResult, ClientError> {
        let user = self.current_user()?;
        let room = self.current_room()?;
        self.sync_game().await?;

        let game_id = room.active_game.clone().ok_or(ClientError::NoActiveGame)?;
        let game = self
            .state
            .select(|s| s.games.get(&game_id).cloned())
            .ok_or(ClientError::NoActiveGame)?;
        if game.kind() != Some(GameKind::TicTacToe) {
            return Err(ClientError::UnsupportedGame(game.name.clone()));
        }

        let Some((_, board)) = self
            .board
            .as_mut()
            .filter(|(id, _)| *id == game_id)
        else {
            return Err(ClientError::BoardNotReady);
        };

        let result = PlayTurnUseCase::new(self.store.clone())
            .execute(&room, &game, board, &user, row, col)
            .await?;
        Ok(result)
    }

    /// Reset a finished match and put the shared record back to active.
    pub async fn play_again(&mut self) -> Result<Game, ClientError> {
        let room = self.current_room()?;
        let game_id = room.active_game.clone().ok_or(ClientError::NoActiveGame)?;
        let game = self
            .state
            .select(|s| s.games.get(&game_id).cloned())
            .ok_or(ClientError::NoActiveGame)?;

        let Some((_, board)) = self
            .board
            .as_mut()
            .filter(|(id, _)| *id == game_id)
        else {
            return Err(ClientError::BoardNotReady);
        };

        let restarted = PlayTurnUseCase::new(self.store.clone())
            .play_again(&game, board)
            .await?;
        self.state.dispatch(Action::UpdateGame(restarted.clone()));
        Ok(restarted)
    }

    /// Sign out: flip the profile offline, release every feed, reset the
    /// tree to its initial shape.
    pub async fn logout(&mut self) {
        if let Ok(user) = self.current_user()
            && let Err(error) = self.store.set_profile_online(&user.id, false).await
        {
            tracing::warn!(%error, "failed to flip profile offline on logout");
        }

        if let Some(task) = self.message_task.take() {
            task.abort();
        }
        self.release_game_feed();
        for task in self.roster_tasks.drain(..) {
            task.abort();
        }
        self.state.dispatch(Action::Logout);
    }

    /// Re-read the selected room so the active-game reference is fresh,
    /// then reconcile the game feed.
    async fn refresh_current_room(&mut self) -> Result<(), ClientError> {
        let room = self.current_room()?;
        match self.store.fetch_room(&room.id).await {
            Ok(fresh) => self.state.dispatch(Action::UpdateRoom(fresh)),
            Err(StoreError::NotFound { .. }) => {}
            Err(error) => return Err(error.into()),
        }
        self.sync_game().await
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if let Some(task) = self.message_task.take() {
            task.abort();
        }
        if let Some((_, task)) = self.game_task.take() {
            task.abort();
        }
        for task in self.roster_tasks.drain(..) {
            task.abort();
        }
    }
}

/// Private rooms are hidden from non-members.
fn room_visible(room: &Room, user_id: &UserId) -> bool {
    !room.is_private || room.is_member(user_id)
}

async fn forward_messages(mut subscription: Subscription<Message>, state: Arc<StateStore>) {
    while let Some(event) = subscription.recv().await {
        // メッセージは append-only なので INSERT だけを反映する
        if let ChangeEvent::Insert(message) = event {
            state.dispatch(Action::AddMessage(message));
        }
    }
}

async fn forward_game(mut subscription: Subscription<Game>, state: Arc<StateStore>) {
    while let Some(event) = subscription.recv().await {
        match event {
            ChangeEvent::Insert(game) => state.dispatch(Action::AddGame(game)),
            ChangeEvent::Update { new, .. } => state.dispatch(Action::UpdateGame(new)),
            ChangeEvent::Delete { .. } => {}
        }
    }
}

async fn forward_rooms(mut subscription: Subscription<Room>, state: Arc<StateStore>, me: UserId) {
    while let Some(event) = subscription.recv().await {
        match event {
            ChangeEvent::Insert(room) if room_visible(&room, &me) => {
                state.dispatch(Action::AddRoom(room));
            }
            ChangeEvent::Update { new, .. } if room_visible(&new, &me) => {
                state.dispatch(Action::UpdateRoom(new));
            }
            _ => {}
        }
    }
}
