// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models exchanged with the backend.

pub mod driver;
pub mod trip;
pub mod user;

pub use driver::{Driver, DriverRegistration};
pub use trip::{Trip, TripRequest};
pub use user::Identity;
