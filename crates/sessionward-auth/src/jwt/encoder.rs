//! HS512 access-token issuance.

use std::net::IpAddr;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use sessionward_core::config::AuthConfig;
use sessionward_core::error::AppError;

use super::SIGNING_ALGORITHM;
use super::claims::AccessClaims;
use crate::error::AuthError;

/// Signs access tokens with the service's symmetric key.
#[derive(Clone)]
pub struct JwtEncoder {
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("algorithm", &SIGNING_ALGORITHM)
            .finish_non_exhaustive()
    }
}

impl JwtEncoder {
    /// Creates an encoder from auth configuration.
    ///
    /// Fails with [`AuthError::SigningKeyMissing`] when `jwt_secret` is empty.
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        if config.jwt_secret.is_empty() {
            return Err(AuthError::SigningKeyMissing);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        })
    }

    /// Issues a token for `session_id` owned by `user_id`, bound to
    /// `client_ip`, valid for `ttl`. Returns the token and its expiry.
    pub fn issue_access_token(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        client_ip: IpAddr,
        ttl: Duration,
    ) -> Result<(String, DateTime<Utc>), AuthError> {
        let now = Utc::now();
        let expires_at = now + ttl;

        let claims = AccessClaims {
            sub: user_id,
            sid: session_id,
            ip: client_ip,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| {
                AuthError::Internal(AppError::internal(format!(
                    "Failed to sign access token: {e}"
                )))
            })?;

        Ok((token, expires_at))
    }
}
