//! IdentityProvider implementations.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::{IdentityProvider, Session, UserId};

/// An identity provider with a locally controlled session.
///
/// Stands in for the external provider during local runs and tests:
/// `sign_in`/`sign_out` flip the session and fire the auth-change
/// channel the way the real provider does on login/logout.
pub struct StaticIdentity {
    session: watch::Sender<Option<Session>>,
}

impl StaticIdentity {
    /// Start signed out.
    pub fn signed_out() -> Self {
        let (session, _) = watch::channel(None);
        Self { session }
    }

    /// Start with an established session for the given user.
    pub fn signed_in(user_id: UserId) -> Self {
        let (session, _) = watch::channel(Some(Session { user_id }));
        Self { session }
    }

    /// Establish a session, notifying auth-change subscribers.
    pub fn sign_in(&self, user_id: UserId) {
        let _ = self.session.send(Some(Session { user_id }));
    }

    /// Clear the session, notifying auth-change subscribers.
    pub fn sign_out(&self) {
        let _ = self.session.send(None);
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    fn auth_events(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }
}
