// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trip booking models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /trips`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct TripRequest {
    #[validate(length(min = 1, message = "rider id is required"))]
    pub rider_id: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub start_lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub start_lon: f64,
    #[validate(range(min = -90.0, max = 90.0))]
    pub end_lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub end_lon: f64,
}

/// Trip record as returned by the backend.
///
/// Pricing and driver matching are owned by the backend; the client only
/// displays what it gets back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub rider_id: String,
    /// Empty until a driver is matched
    #[serde(default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub start_lat: f64,
    #[serde(default)]
    pub start_lon: f64,
    #[serde(default)]
    pub end_lat: f64,
    #[serde(default)]
    pub end_lon: f64,
    /// "requested", "in_progress", "completed", ...
    pub status: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub request_time: Option<DateTime<Utc>>,
}

impl Trip {
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }
}
