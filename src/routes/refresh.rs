// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Refresh relay route.
//!
//! Exchanges the browser's `refresh_token` cookie for a new access token at
//! the backend, and hands the backend's rotated cookie back to the browser.

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::AppState;

/// Name of the long-lived credential cookie.
pub const REFRESH_COOKIE: &str = "refresh_token";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/auth/refresh-proxy", post(refresh_proxy))
}

/// Forward the refresh cookie to the backend and relay its answer.
async fn refresh_proxy(State(state): State<Arc<AppState>>, jar: CookieJar) -> Result<Response> {
    let Some(cookie) = jar.get(REFRESH_COOKIE) else {
        tracing::debug!("Refresh requested without a refresh cookie");
        return Err(AppError::MissingRefreshToken);
    };

    let backend_response = state
        .http
        .post(state.config.backend_refresh_url())
        .header(
            header::COOKIE,
            format!("{}={}", REFRESH_COOKIE, cookie.value()),
        )
        .send()
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Backend refresh request failed: {}", e)))?;

    let status = backend_response.status();
    let set_cookies: Vec<HeaderValue> = backend_response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .cloned()
        .collect();

    let body: serde_json::Value = backend_response
        .json()
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Malformed backend response: {}", e)))?;

    if !status.is_success() {
        return Err(AppError::Upstream { status, body });
    }

    let mut response = Json(body).into_response();
    for value in set_cookies {
        response.headers_mut().append(header::SET_COOKIE, value);
    }

    tracing::info!("Access token refreshed via relay");
    Ok(response)
}
