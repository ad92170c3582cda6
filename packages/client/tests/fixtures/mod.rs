//! Shared fixtures for the integration scenarios.
//!
//! All clients of a test share one `InMemoryStore`, which reproduces the
//! external store's broadcast behavior: every committed write reaches
//! every other subscribed client.

use std::sync::Arc;
use std::time::Duration;

use izakaya_client::Client;
use izakaya_client::domain::{Timestamp, User, UserId};
use izakaya_client::infrastructure::{InMemoryStore, StaticIdentity};
use izakaya_client::state::{AppState, StateStore};

/// A shared backend plus the demo users alice, bob and carol.
pub struct TestBackend {
    pub store: Arc<InMemoryStore>,
}

impl TestBackend {
    pub async fn start() -> Self {
        let store = Arc::new(InMemoryStore::new());
        for (id, joined_at) in [("alice", 1000), ("bob", 2000), ("carol", 3000)] {
            let user = User::new(
                UserId::new(id.to_string()).expect("fixture user id"),
                id.to_string(),
                Timestamp::new(joined_at),
            );
            store.seed_profile(&user).await;
        }
        Self { store }
    }

    /// A signed-in, initialized client for one of the fixture users.
    pub async fn client_for(&self, username: &str) -> Client {
        let user_id = UserId::new(username.to_string()).expect("fixture user id");
        let identity = Arc::new(StaticIdentity::signed_in(user_id));
        let mut client = Client::new(self.store.clone(), identity);
        client
            .initialize()
            .await
            .expect("fixture client initialization");
        client
    }
}

/// Wait until the client's state satisfies the predicate, or panic after
/// a bounded wait. Used to observe asynchronous subscription delivery.
pub async fn wait_until<F>(state: &Arc<StateStore>, description: &str, predicate: F)
where
    F: Fn(&AppState) -> bool,
{
    let mut observer = state.observe();
    let reached = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if state.select(|s| predicate(s)) {
                return;
            }
            if observer.changed().await.is_err() {
                return;
            }
        }
    })
    .await;
    assert!(reached.is_ok(), "timed out waiting for: {description}");
    assert!(
        state.select(|s| predicate(s)),
        "condition lost after wakeup: {description}"
    );
}
