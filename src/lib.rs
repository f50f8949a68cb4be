// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rideshare client: authenticated request layer and refresh relay.
//!
//! The `session` module is the client core: it attaches the access token to
//! backend calls, refreshes it once when the backend answers 401 (however
//! many calls fail at the same time), retries each failed call once, and
//! publishes the session state. The `routes` module is the refresh relay
//! that turns the browser's `refresh_token` cookie into a new access token.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;

use config::Config;

/// Shared refresh relay state.
pub struct AppState {
    pub config: Config,
    /// Client for backend calls; no cookie store, cookies are forwarded by hand.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}
