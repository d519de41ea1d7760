//! Authentication API client methods

use super::refresh::post_refresh;
use super::request::RequestDescriptor;
use super::{ClientError, VetoClient};
use tracing::info;
use vetogest_core::{LoginCredentials, TokenPair};

/// Login endpoint
pub const LOGIN_PATH: &str = "/token/";
/// Refresh endpoint
pub const REFRESH_PATH: &str = "/token/refresh/";

impl VetoClient {
    /// Exchange credentials for a token pair and store both tokens
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<TokenPair, ClientError> {
        let descriptor = RequestDescriptor::post(LOGIN_PATH).json(credentials)?;
        let tokens: TokenPair = self.execute(&descriptor).await?;
        self.tokens().set_tokens(&tokens)?;
        info!(email = %credentials.email, "Logged in");
        Ok(tokens)
    }

    /// Exchange a refresh token for a new access token
    ///
    /// Plain call: nothing is stored and a failure does not invalidate the
    /// session.
    pub async fn refresh_access_token(&self, refresh: &str) -> Result<String, ClientError> {
        post_refresh(self.http(), self.base_url(), refresh).await
    }

    /// Forget both stored tokens
    pub fn logout(&self) -> Result<(), ClientError> {
        self.tokens().clear()?;
        info!("Logged out");
        Ok(())
    }

    /// An access token is stored
    pub fn is_authenticated(&self) -> bool {
        self.tokens().access_token().is_some()
    }
}
