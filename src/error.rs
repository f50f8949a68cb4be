// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types for the client session layer and the refresh relay.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Errors surfaced by the authenticated request layer.
///
/// `Clone` so that one refresh outcome can be handed to every caller
/// waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Credential rejected even after a refresh, or the refresh failed.
    #[error("Unauthorized")]
    Unauthorized,

    /// The refresh operation itself was rejected.
    #[error("Session expired")]
    SessionExpired,

    /// No response was received.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Malformed or unexpected response from the refresh relay.
    #[error("Relay error: {0}")]
    Relay(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// A success response whose body did not match the expected shape.
    #[error("Response decode error: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// True for failures that ended (or will end) the session.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ClientError::Unauthorized | ClientError::SessionExpired)
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        ClientError::InvalidRequest(err.to_string())
    }
}

/// Refresh relay error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized: No refresh token found.")]
    MissingRefreshToken,

    /// Backend refused the refresh; status and body are relayed verbatim.
    #[error("Backend returned {status}")]
    Upstream {
        status: StatusCode,
        body: serde_json::Value,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::MissingRefreshToken => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: AppError::MissingRefreshToken.to_string(),
                }),
            )
                .into_response(),
            AppError::Upstream { status, body } => {
                tracing::info!(status = %status, "Backend rejected refresh");
                (status, Json(body)).into_response()
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Refresh relay failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Internal Server Error".to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
