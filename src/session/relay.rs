// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client side of the refresh relay.
//!
//! The refresh token never passes through this code: it rides in the HTTP
//! client's cookie jar, and the relay's `Set-Cookie` rotates it there.

use crate::error::ClientError;
use crate::session::token::AccessToken;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

/// Exchanges the browser-held refresh credential for a new access token.
#[async_trait]
pub trait RefreshRelay: Send + Sync {
    /// Returns `ClientError::Unauthorized` when the relay refuses, and
    /// `Transport`/`Relay` for everything else that went wrong.
    async fn refresh(&self) -> Result<AccessToken, ClientError>;
}

/// Successful relay response body.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
}

/// `RefreshRelay` over HTTP: `POST` to the relay route with no body.
#[derive(Clone)]
pub struct HttpRefreshRelay {
    http: reqwest::Client,
    url: String,
}

impl HttpRefreshRelay {
    /// `http` must carry the cookie jar that holds `refresh_token`.
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl RefreshRelay for HttpRefreshRelay {
    async fn refresh(&self) -> Result<AccessToken, ClientError> {
        let response = self
            .http
            .post(&self.url)
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("Refresh request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Relay(format!("HTTP {}: {}", status, body)));
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Relay(format!("JSON parse error: {}", e)))?;

        if body.access_token.is_empty() {
            return Err(ClientError::Relay("empty access_token".to_string()));
        }

        Ok(AccessToken::new(body.access_token))
    }
}
