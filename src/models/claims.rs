use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The identity carried inside a bearer token.
///
/// The auth middleware inserts this into the request extensions once the
/// token verifies; handlers trust it for the rest of the request without
/// going back to the user table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The user's ID.
    pub id: Uuid,
    /// The user's email at issuance.
    pub email: String,
    /// The user's display name at issuance.
    pub name: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}
