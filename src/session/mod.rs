// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated request layer: token storage, single-flight refresh,
//! retry-once gateway and the observable session state.

pub mod controller;
pub mod coordinator;
pub mod gateway;
pub mod relay;
pub mod token;

pub use controller::{SessionController, SessionState};
pub use coordinator::RefreshCoordinator;
pub use gateway::{ApiRequest, RequestGateway};
pub use relay::{HttpRefreshRelay, RefreshRelay};
pub use token::{AccessToken, TokenHolder};

/// Capability the session layer hands to the request layer at construction.
pub trait SessionHooks: Send + Sync {
    /// End the session: drop the access token and identity, go `LoggedOut`.
    /// Must not start a refresh.
    fn logout(&self);
}
