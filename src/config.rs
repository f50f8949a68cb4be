// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The same `Config` serves both halves of the crate: the refresh relay
//! binary reads `BACKEND_URL`, `FRONTEND_URL` and `PORT`, while the client
//! session layer reads `BACKEND_URL` and `RELAY_URL`.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend gateway base URL (protected endpoints and `/auth/refresh`)
    pub backend_url: String,
    /// Frontend origin allowed by CORS on the relay
    pub frontend_url: String,
    /// Full URL of the refresh relay route, as seen by the client
    pub relay_url: String,
    /// Relay server port
    pub port: u16,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8080".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            relay_url: "http://localhost:3000/api/auth/refresh-proxy".to_string(),
            port: 3000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable has a local-development default; URLs that are set
    /// must use the `http` or `https` scheme.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let config = Self {
            backend_url: env::var("BACKEND_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            relay_url: env::var("RELAY_URL").unwrap_or_else(|_| {
                "http://localhost:3000/api/auth/refresh-proxy".to_string()
            }),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        };

        check_http_url("BACKEND_URL", &config.backend_url)?;
        check_http_url("FRONTEND_URL", &config.frontend_url)?;
        check_http_url("RELAY_URL", &config.relay_url)?;

        Ok(config)
    }

    /// Backend endpoint that exchanges the refresh cookie for a new access token.
    pub fn backend_refresh_url(&self) -> String {
        format!("{}/auth/refresh", self.backend_url.trim_end_matches('/'))
    }
}

fn check_http_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::Invalid(name, value.to_string()))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
