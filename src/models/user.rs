//! Identity model returned by the backend after authentication.

use serde::{Deserialize, Serialize};

/// Profile of the signed-in user, fetched from `GET /me`.
///
/// Immutable for the lifetime of a session; a re-login replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Backend user ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
}
