// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chokepoint for calls to protected backend endpoints.
//!
//! Attaches the current access token, and on a 401 refreshes through the
//! [`RefreshCoordinator`] and reissues the original request once.

use crate::error::ClientError;
use crate::session::coordinator::RefreshCoordinator;
use crate::session::token::{AccessToken, TokenHolder};
use crate::session::SessionHooks;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use std::sync::Arc;

/// A replayable description of one backend call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Attach a JSON body. Serialized once so every attempt sends the same bytes.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, ClientError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ClientError::InvalidRequest(format!("JSON encode error: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Issues protected calls with the 401 → refresh → retry-once policy.
#[derive(Clone)]
pub struct RequestGateway {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenHolder,
    coordinator: RefreshCoordinator,
    session: Arc<dyn SessionHooks>,
}

impl RequestGateway {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        tokens: TokenHolder,
        coordinator: RefreshCoordinator,
        session: Arc<dyn SessionHooks>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
            coordinator,
            session,
        }
    }

    /// Send `request` and return the backend response unmodified.
    ///
    /// A 401 triggers one shared refresh and one retry. Fails with
    /// `Unauthorized` when the refresh fails or the retry is rejected too,
    /// and with `Transport` when no response arrives (never refreshed).
    pub async fn call(&self, request: &ApiRequest) -> Result<reqwest::Response, ClientError> {
        let sent = self.tokens.get();
        let response = self.send(request, sent.as_ref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            had_token = sent.is_some(),
            "Backend returned 401"
        );

        let token = match self.tokens.get() {
            // Someone else already replaced the token this request used.
            Some(current) if sent.as_ref() != Some(&current) => current,
            _ => {
                let refreshed = self
                    .coordinator
                    .refresh()
                    .await
                    .map_err(|_| ClientError::Unauthorized)?;
                self.tokens.get().unwrap_or(refreshed)
            }
        };

        let retried = self.send(request, Some(&token)).await?;

        if retried.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(
                method = %request.method,
                path = %request.path,
                "Refreshed token rejected, ending session"
            );
            self.session.logout();
            return Err(ClientError::Unauthorized);
        }

        Ok(retried)
    }

    async fn send(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<reqwest::Response, ClientError> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self.http.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token.expose());
        }

        builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, path = %request.path, "Backend request failed");
            ClientError::Transport(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder_keeps_query_and_body() {
        let request = ApiRequest::get("/drivers/available")
            .query("lat", 34.05)
            .query("lon", -118.25);
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.path(), "/drivers/available");
        assert_eq!(
            request.query,
            vec![
                ("lat".to_string(), "34.05".to_string()),
                ("lon".to_string(), "-118.25".to_string())
            ]
        );

        let request = ApiRequest::post("/trips")
            .json(&serde_json::json!({ "rider_id": "r1" }))
            .unwrap();
        assert_eq!(request.body, Some(serde_json::json!({ "rider_id": "r1" })));
    }
}
