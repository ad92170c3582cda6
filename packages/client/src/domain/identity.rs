//! Identity provider port.
//!
//! Authentication and session management are delegated entirely to an
//! external identity provider; this trait is the thin seam the client
//! consumes once at top level to gate the chat surface.

use async_trait::async_trait;
use tokio::sync::watch;

use super::value_object::UserId;

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
}

/// External identity provider seam.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The current session, or `None` when signed out.
    async fn session(&self) -> Option<Session>;

    /// A watch channel that fires on login/logout. The current value is
    /// the session state as of subscription time.
    fn auth_events(&self) -> watch::Receiver<Option<Session>>;
}
