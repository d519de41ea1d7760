//! VetoGest HTTP client

pub mod auth;
pub mod config;
pub mod customers;
pub mod error;
pub mod observer;
pub mod request;

mod refresh;

use crate::storage::TokenStore;
use self::config::ApiConfig;
use error::ClientError;
use observer::SessionObserver;
use refresh::{RefreshContext, RefreshCoordinator};
use request::{ApiResponse, Attempt, RequestDescriptor};
use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

struct ClientInner {
    refresh_ctx: RefreshContext,
    refresh: RefreshCoordinator,
}

/// VetoGest API client
///
/// Cheap to clone; clones share the token store and the in-flight refresh.
#[derive(Clone)]
pub struct VetoClient {
    inner: Arc<ClientInner>,
}

impl VetoClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> VetoClientBuilder {
        VetoClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.inner.refresh_ctx.base_url
    }

    /// Token storage used for bearer credentials
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.refresh_ctx.tokens
    }

    fn http(&self) -> &Client {
        &self.inner.refresh_ctx.http
    }

    /// Send a request with bearer credentials, refreshing the access token
    /// once on a 401
    ///
    /// The replayed request's outcome is returned as-is. When the refresh is
    /// rejected the session is invalidated and the refresh error is returned
    /// wrapped in [`ClientError::RefreshFailed`].
    pub async fn request(&self, descriptor: &RequestDescriptor) -> Result<ApiResponse, ClientError> {
        let result = self.send_with_refresh(descriptor).await;
        if let Err(error) = &result {
            error.log(descriptor.method(), descriptor.path());
        }
        result
    }

    async fn send_with_refresh(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<ApiResponse, ClientError> {
        let mut outgoing = match self.tokens().access_token() {
            Some(token) => descriptor.with_bearer(&token),
            None => descriptor.clone(),
        };
        let mut attempt = Attempt::Original;

        loop {
            match self.send(&outgoing).await {
                Err(error) if error.is_unauthorized() && attempt.may_refresh() => {
                    attempt = Attempt::Retried;

                    let Some(refresh_token) = self.tokens().refresh_token() else {
                        debug!(path = descriptor.path(), "No refresh token stored, skipping refresh");
                        return Err(error);
                    };

                    let access = self
                        .inner
                        .refresh
                        .refresh(&self.inner.refresh_ctx, refresh_token)
                        .await
                        .map_err(ClientError::RefreshFailed)?;

                    debug!(path = descriptor.path(), "Replaying request with refreshed token");
                    outgoing = descriptor.with_bearer(&access);
                }
                result => return result,
            }
        }
    }

    /// One round trip, no refresh handling
    async fn send(&self, descriptor: &RequestDescriptor) -> Result<ApiResponse, ClientError> {
        let url = format!("{}{}", self.base_url(), descriptor.path());
        let mut request = self.http().request(descriptor.method().clone(), url);

        for (name, value) in descriptor.headers() {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = descriptor.body() {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(ApiResponse { status, body })
        } else {
            Err(ClientError::from_status(status, body))
        }
    }

    /// Send a request and decode its JSON body
    pub async fn execute<T: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<T, ClientError> {
        self.request(descriptor).await?.json()
    }
}

/// Builder for VetoClient
#[derive(Default)]
pub struct VetoClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    tokens: Option<TokenStore>,
    observer: Option<Arc<dyn SessionObserver>>,
}

impl VetoClientBuilder {
    /// Start from an API configuration (base URL and timeout)
    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientError> {
        let mut builder = Self::default().base_url(config.base_url()?);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(builder)
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the token storage (defaults to an in-memory store)
    pub fn token_store(mut self, tokens: TokenStore) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Set the callback fired when a failed refresh invalidates the session
    pub fn session_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<VetoClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url '{base_url}': {e}")))?;

        let mut client_builder = ClientBuilder::new();

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| concat!("vetogest-client/", env!("CARGO_PKG_VERSION")).to_string());
        client_builder = client_builder.user_agent(user_agent);

        let http = client_builder.build()?;
        let observer: Arc<dyn SessionObserver> = match self.observer {
            Some(observer) => observer,
            None => Arc::new(|| {}),
        };

        Ok(VetoClient {
            inner: Arc::new(ClientInner {
                refresh_ctx: RefreshContext {
                    http,
                    base_url,
                    tokens: self.tokens.unwrap_or_else(TokenStore::in_memory),
                    observer,
                },
                refresh: RefreshCoordinator::default(),
            }),
        })
    }
}
