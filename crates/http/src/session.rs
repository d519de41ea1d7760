//! Authenticated session state

use crate::client::error::ClientError;
use crate::client::observer::SessionObserver;
use crate::client::{VetoClient, VetoClientBuilder};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;
use vetogest_core::LoginCredentials;

struct SessionState {
    authenticated: watch::Sender<bool>,
}

impl SessionObserver for SessionState {
    fn session_invalidated(&self) {
        warn!("Session invalidated, switching to logged-out state");
        self.authenticated.send_replace(false);
    }
}

/// Authenticated flag plus login/logout, kept in sync with the client
///
/// The session registers itself as the client's [`SessionObserver`], so a
/// rejected token refresh flips it to unauthenticated. Any observer already
/// set on the builder is replaced.
#[derive(Clone)]
pub struct AuthSession {
    client: VetoClient,
    state: Arc<SessionState>,
}

impl AuthSession {
    /// Build the client and derive the initial state from the stored tokens
    pub fn new(builder: VetoClientBuilder) -> Result<Self, ClientError> {
        let (authenticated, _) = watch::channel(false);
        let state = Arc::new(SessionState { authenticated });
        let client = builder.session_observer(state.clone()).build()?;
        state.authenticated.send_replace(client.is_authenticated());
        Ok(Self { client, state })
    }

    pub fn client(&self) -> &VetoClient {
        &self.client
    }

    pub fn is_authenticated(&self) -> bool {
        *self.state.authenticated.borrow()
    }

    /// Receiver that observes every change of the authenticated flag
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.authenticated.subscribe()
    }

    pub async fn login(&self, credentials: &LoginCredentials) -> Result<(), ClientError> {
        self.client.login(credentials).await?;
        self.state.authenticated.send_replace(true);
        Ok(())
    }

    /// Clear the tokens; the session is logged out even if storage fails
    pub fn logout(&self) -> Result<(), ClientError> {
        let result = self.client.logout();
        self.state.authenticated.send_replace(false);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::TokenStore;
    use vetogest_core::TokenPair;

    #[test]
    fn test_initial_state_follows_stored_access_token() {
        let tokens = TokenStore::in_memory();
        let builder = VetoClient::builder()
            .base_url("http://localhost:8000/api")
            .token_store(tokens.clone());
        assert!(!AuthSession::new(builder).unwrap().is_authenticated());

        tokens
            .set_tokens(&TokenPair {
                access: "A1".into(),
                refresh: "R1".into(),
            })
            .unwrap();
        let builder = VetoClient::builder()
            .base_url("http://localhost:8000/api")
            .token_store(tokens);
        assert!(AuthSession::new(builder).unwrap().is_authenticated());
    }

    #[test]
    fn test_logout_clears_tokens_and_notifies() {
        let tokens = TokenStore::in_memory();
        tokens
            .set_tokens(&TokenPair {
                access: "A1".into(),
                refresh: "R1".into(),
            })
            .unwrap();
        let session = AuthSession::new(
            VetoClient::builder()
                .base_url("http://localhost:8000/api")
                .token_store(tokens.clone()),
        )
        .unwrap();
        let mut receiver = session.subscribe();

        session.logout().unwrap();

        assert!(!session.is_authenticated());
        assert!(receiver.has_changed().unwrap());
        assert!(!*receiver.borrow_and_update());
        assert_eq!(tokens.access_token(), None);
        assert_eq!(tokens.refresh_token(), None);
    }
}
