//! Credential pair handed to the client after sign-in or refresh.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A freshly minted access token and refresh secret.
///
/// Exists only in memory and in the response body; only the refresh
/// secret's hash is persisted.
#[derive(Clone, Serialize)]
pub struct TokenPair {
    /// Signed, self-contained access token.
    pub access_token: String,
    /// Opaque single-use refresh secret.
    pub refresh_token: String,
    /// When the access token stops being accepted.
    pub access_expires_at: DateTime<Utc>,
    /// When the refresh secret stops being accepted.
    pub refresh_expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_expires_at", &self.access_expires_at)
            .field("refresh_expires_at", &self.refresh_expires_at)
            .finish_non_exhaustive()
    }
}
