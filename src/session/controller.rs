// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session state machine.
//!
//! ```text
//! Authenticating --startup refresh + identity--> LoggedIn
//! Authenticating --any startup failure---------> LoggedOut
//! LoggedOut      --login(token, identity)------> LoggedIn
//! LoggedIn       --logout / refresh failure----> LoggedOut
//! ```
//!
//! `Authenticating` only exists between construction and the end of the
//! one startup attempt.

use crate::config::Config;
use crate::error::ClientError;
use crate::models::Identity;
use crate::services::BackendService;
use crate::session::coordinator::RefreshCoordinator;
use crate::session::gateway::RequestGateway;
use crate::session::relay::{HttpRefreshRelay, RefreshRelay};
use crate::session::token::{AccessToken, ReplaceHook, TokenHolder};
use crate::session::SessionHooks;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Whether protected UI may be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    Authenticating,
    LoggedIn {
        identity: Identity,
        token: AccessToken,
    },
}

impl SessionState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, SessionState::LoggedIn { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Authenticating)
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::LoggedIn { identity, .. } => Some(identity),
            _ => None,
        }
    }
}

/// The state cell plus the token holder it keeps in step with.
struct SessionStore {
    state: Arc<watch::Sender<SessionState>>,
    tokens: TokenHolder,
}

impl SessionStore {
    fn new() -> Self {
        let (state, _) = watch::channel(SessionState::Authenticating);
        let state = Arc::new(state);

        // A refreshed token replaces the one carried by `LoggedIn`.
        let hook_state = state.clone();
        let hook: ReplaceHook = Arc::new(move |token: Option<&AccessToken>| {
            if let Some(token) = token {
                hook_state.send_if_modified(|current| match current {
                    SessionState::LoggedIn { token: held, .. } if held != token => {
                        *held = token.clone();
                        true
                    }
                    _ => false,
                });
            }
        });

        Self {
            state,
            tokens: TokenHolder::with_hook(hook),
        }
    }

    fn login(&self, token: AccessToken, identity: Identity) {
        tracing::info!(user_id = %identity.id, "Session logged in");
        self.tokens.set(Some(token.clone()));
        self.state
            .send_replace(SessionState::LoggedIn { identity, token });
    }
}

impl SessionHooks for SessionStore {
    fn logout(&self) {
        self.tokens.set(None);
        let previous = self.state.send_replace(SessionState::LoggedOut);
        if previous != SessionState::LoggedOut {
            tracing::info!("Session logged out");
        }
    }
}

/// Owns the session state and the request layer wired to it.
pub struct SessionController {
    store: Arc<SessionStore>,
    gateway: RequestGateway,
    coordinator: RefreshCoordinator,
    started: AtomicBool,
}

impl SessionController {
    /// Wire the token holder, coordinator and gateway together.
    ///
    /// The controller starts in `Authenticating`; call [`start`](Self::start)
    /// or [`authenticate`](Self::authenticate) to run the startup attempt.
    pub fn new(
        http: reqwest::Client,
        backend_url: impl Into<String>,
        relay: Arc<dyn RefreshRelay>,
    ) -> Self {
        let store = Arc::new(SessionStore::new());
        let coordinator = RefreshCoordinator::new(relay, store.tokens.clone(), store.clone());
        let gateway = RequestGateway::new(
            http,
            backend_url,
            store.tokens.clone(),
            coordinator.clone(),
            store.clone(),
        );

        Self {
            store,
            gateway,
            coordinator,
            started: AtomicBool::new(false),
        }
    }

    /// Build a controller talking to the configured backend and relay.
    ///
    /// `cookies` is the jar holding the `refresh_token` cookie; the relay's
    /// `Set-Cookie` rotates it in place.
    pub fn from_config(
        config: &Config,
        cookies: Arc<reqwest::cookie::Jar>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_provider(cookies)
            .build()
            .map_err(|e| ClientError::Transport(format!("HTTP client init failed: {}", e)))?;

        let relay = Arc::new(HttpRefreshRelay::new(http.clone(), config.relay_url.clone()));
        Ok(Self::new(http, config.backend_url.clone(), relay))
    }

    /// Spawn the startup attempt.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move { controller.authenticate().await })
    }

    /// Run the one-time silent refresh: relay → identity → `LoggedIn`.
    ///
    /// Never fails; every error ends in `LoggedOut`. Later calls are no-ops.
    /// The refresh goes through the shared coordinator, so a protected call
    /// rejected during startup joins it instead of starting another.
    pub async fn authenticate(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::debug!("Startup authentication already ran");
            return;
        }

        match self.silent_login().await {
            Ok(Some((token, identity))) => {
                let user_id = identity.id.clone();
                let applied = self.store.state.send_if_modified(|state| {
                    if state.is_loading() {
                        *state = SessionState::LoggedIn { identity, token };
                        true
                    } else {
                        false
                    }
                });
                if applied {
                    tracing::info!(user_id = %user_id, "Session restored");
                } else {
                    tracing::debug!("Session changed during startup, discarding restored session");
                }
            }
            Ok(None) => {
                tracing::debug!("Session changed during startup, discarding refreshed token");
            }
            Err(e) => {
                tracing::info!(error = %e, "No active session");
                if self.is_loading() {
                    self.store.logout();
                }
            }
        }
    }

    /// `Ok(None)` when an explicit login or logout overtook the startup attempt.
    async fn silent_login(&self) -> Result<Option<(AccessToken, Identity)>, ClientError> {
        let token = self.coordinator.refresh().await?;
        if !self.is_loading() {
            // An explicit logout keeps no startup token.
            if !self.is_logged_in() {
                self.store.tokens.set_if(&Some(token), None);
            }
            return Ok(None);
        }

        let identity = self.backend().me().await?;

        // The identity call may itself have refreshed the token.
        let token = self.store.tokens.get().unwrap_or(token);
        Ok(Some((token, identity)))
    }

    /// Explicit login, e.g. from an external auth callback.
    pub fn login(&self, token: AccessToken, identity: Identity) {
        self.store.login(token, identity);
    }

    /// Explicit logout. Unconditional.
    pub fn logout(&self) {
        self.store.logout();
    }

    pub fn state(&self) -> SessionState {
        self.store.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.store.state.subscribe()
    }

    /// True only during the startup `Authenticating` phase.
    pub fn is_loading(&self) -> bool {
        self.store.state.borrow().is_loading()
    }

    pub fn is_logged_in(&self) -> bool {
        self.store.state.borrow().is_logged_in()
    }

    pub fn access_token(&self) -> Option<AccessToken> {
        self.store.tokens.get()
    }

    pub fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    /// Typed backend API routed through this session's gateway.
    pub fn backend(&self) -> BackendService {
        BackendService::new(self.gateway.clone())
    }
}
