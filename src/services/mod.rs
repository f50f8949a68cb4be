// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - typed access to the ride-booking backend.

pub mod backend;

pub use backend::BackendService;
