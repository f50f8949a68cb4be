// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Driver models for registration and discovery.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Driver record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_available: bool,
    pub lat: f64,
    pub lon: f64,
}

/// Body of `POST /drivers`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct DriverRegistration {
    #[validate(length(min = 1, message = "driver name is required"))]
    pub name: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
}
