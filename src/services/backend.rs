// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed wrappers for the protected backend endpoints.
//!
//! Everything goes through the [`RequestGateway`], so each call gets the
//! session's token and the refresh/retry policy. Payloads are only
//! interpreted here, never in the gateway.

use crate::error::ClientError;
use crate::models::{Driver, DriverRegistration, Identity, Trip, TripRequest};
use crate::session::{ApiRequest, RequestGateway};
use serde::Deserialize;
use validator::Validate;

/// Ride-booking backend API.
#[derive(Clone)]
pub struct BackendService {
    gateway: RequestGateway,
}

impl BackendService {
    pub fn new(gateway: RequestGateway) -> Self {
        Self { gateway }
    }

    /// Profile of the signed-in user.
    pub async fn me(&self) -> Result<Identity, ClientError> {
        self.call_json(&ApiRequest::get("/me")).await
    }

    /// Register the current user as a driver at the given position.
    pub async fn register_driver(
        &self,
        registration: &DriverRegistration,
    ) -> Result<Driver, ClientError> {
        registration.validate()?;
        let request = ApiRequest::post("/drivers").json(registration)?;
        let driver: Driver = self.call_json(&request).await?;
        tracing::info!(driver_id = %driver.id, "Driver registered");
        Ok(driver)
    }

    /// Drivers currently available near a point.
    pub async fn available_drivers(&self, lat: f64, lon: f64) -> Result<Vec<Driver>, ClientError> {
        let request = ApiRequest::get("/drivers/available")
            .query("lat", lat)
            .query("lon", lon);
        // The backend encodes an empty result as `null`.
        let drivers: Option<Vec<Driver>> = self.call_json(&request).await?;
        Ok(drivers.unwrap_or_default())
    }

    /// Book a trip; price and driver are assigned by the backend.
    pub async fn book_trip(&self, trip: &TripRequest) -> Result<Trip, ClientError> {
        trip.validate()?;
        let request = ApiRequest::post("/trips").json(trip)?;
        let trip: Trip = self.call_json(&request).await?;
        tracing::info!(trip_id = %trip.id, status = %trip.status, "Trip booked");
        Ok(trip)
    }

    /// Mark a trip as completed.
    pub async fn complete_trip(&self, trip_id: &str) -> Result<Trip, ClientError> {
        if trip_id.is_empty() {
            return Err(ClientError::InvalidRequest("trip id is required".to_string()));
        }
        let request = ApiRequest::patch(format!("/trips/{}/complete", trip_id));
        self.call_json(&request).await
    }

    /// Send through the gateway and parse a JSON success body.
    async fn call_json<T: for<'de> Deserialize<'de>>(
        &self,
        request: &ApiRequest,
    ) -> Result<T, ClientError> {
        let response = self.gateway.call(request).await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = %status,
                path = %request.path(),
                "Backend request unsuccessful"
            );
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}
