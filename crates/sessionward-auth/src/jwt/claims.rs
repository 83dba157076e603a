//! Claims carried by every access token.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload binding a user, a session, and the client IP that
/// obtained the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the user ID.
    pub sub: Uuid,
    /// Session this token was minted for.
    pub sid: Uuid,
    /// Client IP at issuance.
    pub ip: IpAddr,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
    /// Unique token ID.
    pub jti: Uuid,
}

impl AccessClaims {
    /// Returns the user ID from the subject claim.
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the session ID.
    pub fn session_id(&self) -> Uuid {
        self.sid
    }

    /// Returns the IP the token was issued to.
    pub fn client_ip(&self) -> IpAddr {
        self.ip
    }
}
