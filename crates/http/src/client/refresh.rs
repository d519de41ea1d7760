//! Single-flight access token refresh

use super::auth::REFRESH_PATH;
use super::error::ClientError;
use super::observer::SessionObserver;
use crate::storage::{StorageError, TokenStore};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tracing::{debug, error, info, warn};
use vetogest_core::{AccessTokenResponse, RefreshRequest};

pub(crate) type RefreshResult = Result<String, Arc<ClientError>>;
type SharedRefresh = Shared<BoxFuture<'static, RefreshResult>>;
type Slot = Mutex<Option<InFlight>>;

/// Everything a refresh needs, owned so the future can outlive the caller
#[derive(Clone)]
pub(crate) struct RefreshContext {
    pub http: reqwest::Client,
    pub base_url: String,
    pub tokens: TokenStore,
    pub observer: Arc<dyn SessionObserver>,
}

struct InFlight {
    id: u64,
    refresh_token: String,
    refresh: SharedRefresh,
}

/// Deduplicates concurrent refreshes
///
/// The first caller starts the refresh; callers arriving with the same
/// refresh token while it is running await the same shared future. The
/// refresh clears its own slot when it settles, so a later 401 starts a new
/// one even if every waiter was dropped.
#[derive(Default)]
pub(crate) struct RefreshCoordinator {
    in_flight: Arc<Slot>,
    next_id: AtomicU64,
}

impl RefreshCoordinator {
    pub(crate) async fn refresh(
        &self,
        ctx: &RefreshContext,
        refresh_token: String,
    ) -> RefreshResult {
        let refresh = {
            let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(in_flight) if in_flight.refresh_token == refresh_token => {
                    debug!("Joining in-flight token refresh");
                    in_flight.refresh.clone()
                }
                _ => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let refresh = settle(
                        Arc::downgrade(&self.in_flight),
                        id,
                        run_refresh(ctx.clone(), refresh_token.clone()),
                    )
                    .boxed()
                    .shared();
                    *slot = Some(InFlight {
                        id,
                        refresh_token,
                        refresh: refresh.clone(),
                    });
                    refresh
                }
            }
        };

        refresh.await
    }
}

/// Drive a refresh to completion, then free the slot it occupies
async fn settle<F>(slot: Weak<Slot>, id: u64, refresh: F) -> RefreshResult
where
    F: Future<Output = RefreshResult>,
{
    let result = refresh.await;

    if let Some(slot) = slot.upgrade() {
        let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|in_flight| in_flight.id == id) {
            *slot = None;
        }
    }
    result
}

/// Exchange the refresh token, then store the new access token or
/// invalidate the session
async fn run_refresh(ctx: RefreshContext, refresh_token: String) -> RefreshResult {
    match post_refresh(&ctx.http, &ctx.base_url, &refresh_token).await {
        Ok(access) => {
            let stored = access.clone();
            store_blocking(&ctx.tokens, move |tokens| tokens.set_access_token(&stored))
                .await
                .map_err(|e| Arc::new(ClientError::from(e)))?;
            info!("Access token refreshed");
            Ok(access)
        }
        Err(refresh_error) => {
            warn!(error = %refresh_error, "Token refresh failed, invalidating session");
            if let Err(e) = store_blocking(&ctx.tokens, TokenStore::clear).await {
                error!(error = %e, "Failed to clear stored tokens");
            }
            ctx.observer.session_invalidated();
            Err(Arc::new(refresh_error))
        }
    }
}

/// Run a token store write on the blocking pool
async fn store_blocking<F>(tokens: &TokenStore, write: F) -> Result<(), StorageError>
where
    F: FnOnce(&TokenStore) -> Result<(), StorageError> + Send + 'static,
{
    let tokens = tokens.clone();
    tokio::task::spawn_blocking(move || write(&tokens))
        .await
        .unwrap_or_else(|e| Err(StorageError::Task(e.to_string())))
}

/// Plain POST to the refresh endpoint, bypassing bearer attachment and
/// refresh handling
pub(crate) async fn post_refresh(
    http: &reqwest::Client,
    base_url: &str,
    refresh_token: &str,
) -> Result<String, ClientError> {
    let url = format!("{base_url}{REFRESH_PATH}");
    let response = http
        .post(url)
        .json(&RefreshRequest {
            refresh: refresh_token.to_string(),
        })
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ClientError::from_status(status, body));
    }

    let parsed: AccessTokenResponse = serde_json::from_str(&body)?;
    Ok(parsed.access)
}
