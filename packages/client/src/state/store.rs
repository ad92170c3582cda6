//! Observable wrapper around the pure reducer.

use std::sync::RwLock;

use tokio::sync::watch;

use super::reducer::{Action, AppState, reduce};

/// Serialized dispatch over the state tree plus an observer channel.
///
/// Dispatch runs the reducer under a write lock, so no two transitions
/// of the same client ever run concurrently; observers are notified
/// through a watch channel carrying a monotonically increasing version.
pub struct StateStore {
    state: RwLock<AppState>,
    version: watch::Sender<u64>,
}

impl StateStore {
    /// A store holding the empty initial tree.
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            state: RwLock::new(AppState::default()),
            version,
        }
    }

    /// Apply one transition and notify observers.
    pub fn dispatch(&self, action: Action) {
        tracing::debug!(?action, "dispatch");
        {
            let mut state = self
                .state
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let next = reduce(std::mem::take(&mut *state), action);
            *state = next;
        }
        self.version.send_modify(|v| *v += 1);
    }

    /// A full copy of the current tree.
    pub fn snapshot(&self) -> AppState {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Read a projection of the current tree without cloning all of it.
    pub fn select<T>(&self, f: impl FnOnce(&AppState) -> T) -> T {
        let state = self
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&state)
    }

    /// Observe state changes. Receivers see the version bump after every
    /// dispatch and read the tree through `snapshot`/`select`.
    pub fn observe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Timestamp, User, UserId};

    #[tokio::test]
    async fn test_dispatch_notifies_observers() {
        // テスト項目: dispatch のたびに観測側へバージョン更新が届く
        // given (前提条件):
        let store = StateStore::new();
        let mut observer = store.observe();
        let user = User::new(
            UserId::new("u1".to_string()).unwrap(),
            "alice".to_string(),
            Timestamp::new(0),
        );

        // when (操作):
        store.dispatch(Action::SetCurrentUser(user));

        // then (期待する結果):
        observer.changed().await.unwrap();
        assert_eq!(*observer.borrow(), 1);
        assert_eq!(
            store.select(|state| state.current_user.as_ref().map(|u| u.username.clone())),
            Some("alice".to_string())
        );
    }
}
