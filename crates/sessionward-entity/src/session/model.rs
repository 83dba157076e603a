//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One link in a refresh-token lineage.
///
/// A session is created by sign-in or by a successful rotation. Its `used`
/// flag goes from `false` to `true` exactly once and is never reset; expiry
/// is evaluated lazily against `expires_at`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier, embedded in the access token as `sid`.
    pub id: Uuid,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// Argon2id PHC string of the refresh secret.
    #[serde(skip_serializing)]
    pub refresh_token_hash: String,
    /// When the refresh secret stops being accepted.
    pub expires_at: DateTime<Utc>,
    /// Whether the refresh secret has been spent (rotated or revoked).
    pub used: bool,
    /// The session this one was rotated from, if any.
    pub previous_session_id: Option<Uuid>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Check whether the session has expired as of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
