// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Single-flight access token refresh.
//!
//! Every caller that needs a new token goes through [`RefreshCoordinator::refresh`].
//! The first caller starts the relay call on its own task and parks a shared
//! future in the pending slot; callers arriving while it runs await that same
//! future and observe the same token or the same failure.

use crate::error::ClientError;
use crate::session::relay::RefreshRelay;
use crate::session::token::{AccessToken, TokenHolder};
use crate::session::SessionHooks;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type RefreshFuture = Shared<BoxFuture<'static, Result<AccessToken, ClientError>>>;

struct InFlight {
    generation: u64,
    future: RefreshFuture,
}

struct Inner {
    relay: Arc<dyn RefreshRelay>,
    tokens: TokenHolder,
    session: Arc<dyn SessionHooks>,
    /// Never held across an `.await`.
    pending: Mutex<Option<InFlight>>,
    next_generation: AtomicU64,
}

impl Inner {
    fn pending(&self) -> MutexGuard<'_, Option<InFlight>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn clear(&self, generation: u64) {
        let mut slot = self.pending();
        if slot
            .as_ref()
            .is_some_and(|in_flight| in_flight.generation == generation)
        {
            *slot = None;
        }
    }
}

/// Empties the pending slot when the refresh task ends, including by panic.
///
/// This runs before waiters are polled with the result. Waiters already hold
/// the shared future; a caller arriving after the clear starts a new refresh.
struct ClearOnDrop {
    inner: Arc<Inner>,
    generation: u64,
}

impl Drop for ClearOnDrop {
    fn drop(&mut self) {
        self.inner.clear(self.generation);
    }
}

/// Collapses concurrent refresh requests into one relay call.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

impl RefreshCoordinator {
    pub fn new(
        relay: Arc<dyn RefreshRelay>,
        tokens: TokenHolder,
        session: Arc<dyn SessionHooks>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                relay,
                tokens,
                session,
                pending: Mutex::new(None),
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    /// Obtain a fresh access token, joining the in-flight refresh if any.
    ///
    /// On success the token is already stored in the `TokenHolder`. On
    /// failure the session has been logged out and every waiter gets
    /// `ClientError::SessionExpired`. If the held token was replaced while
    /// the refresh ran, waiters get the replacement instead.
    pub async fn refresh(&self) -> Result<AccessToken, ClientError> {
        let future = {
            let mut slot = self.inner.pending();
            match slot.as_ref() {
                Some(in_flight) => {
                    tracing::debug!(
                        generation = in_flight.generation,
                        "Joining in-flight refresh"
                    );
                    in_flight.future.clone()
                }
                None => {
                    let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
                    let future = self.start(generation);
                    *slot = Some(InFlight {
                        generation,
                        future: future.clone(),
                    });
                    future
                }
            }
        };

        future.await
    }

    /// True while a refresh is running.
    pub fn is_pending(&self) -> bool {
        self.inner.pending().is_some()
    }

    fn start(&self, generation: u64) -> RefreshFuture {
        let started_with = self.inner.tokens.get();
        let task = tokio::spawn(run_refresh(self.inner.clone(), generation, started_with));
        let inner = self.inner.clone();

        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(error = %e, generation, "Refresh task aborted");
                    inner.session.logout();
                    Err(ClientError::SessionExpired)
                }
            }
        }
        .boxed()
        .shared()
    }
}

/// Run one relay call. The outcome only applies to the token the refresh
/// started from: if a login or logout replaced it meanwhile, that wins.
async fn run_refresh(
    inner: Arc<Inner>,
    generation: u64,
    started_with: Option<AccessToken>,
) -> Result<AccessToken, ClientError> {
    let _clear = ClearOnDrop {
        inner: inner.clone(),
        generation,
    };

    tracing::info!(generation, "Refreshing access token");

    match inner.relay.refresh().await {
        Ok(token) => {
            if inner.tokens.set_if(&started_with, Some(token.clone())) {
                tracing::info!(generation, "Access token refreshed");
                return Ok(token);
            }
            tracing::debug!(generation, "Token replaced during refresh, discarding result");
            inner.tokens.get().ok_or(ClientError::SessionExpired)
        }
        Err(e) => {
            let replaced = inner
                .tokens
                .get()
                .filter(|current| Some(current) != started_with.as_ref());
            if let Some(current) = replaced {
                tracing::debug!(error = %e, generation, "Refresh failed after token was replaced");
                return Ok(current);
            }
            tracing::warn!(error = %e, generation, "Refresh failed, ending session");
            inner.session.logout();
            Err(ClientError::SessionExpired)
        }
    }
}
