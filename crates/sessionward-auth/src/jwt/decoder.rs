//! Access-token validation.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{DecodingKey, Validation, decode};

use sessionward_core::config::AuthConfig;

use super::SIGNING_ALGORITHM;
use super::claims::AccessClaims;
use crate::error::AuthError;

/// Clock-skew allowance applied to `exp`.
const LEEWAY_SECONDS: u64 = 5;

/// Verifies access tokens signed by [`JwtEncoder`](super::JwtEncoder).
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

impl JwtDecoder {
    /// Creates a decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        if config.jwt_secret.is_empty() {
            return Err(AuthError::SigningKeyMissing);
        }

        // Only HS512 is accepted; `none` and every other algorithm fail.
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = LEEWAY_SECONDS;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        })
    }

    /// Verifies signature, algorithm and expiry, then returns the claims.
    pub fn parse_access_token(&self, token: &str) -> Result<AccessClaims, AuthError> {
        decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let reason = match e.kind() {
                    JwtErrorKind::ExpiredSignature => "token has expired".to_string(),
                    JwtErrorKind::InvalidSignature => "bad signature".to_string(),
                    JwtErrorKind::InvalidAlgorithm => "unexpected signing algorithm".to_string(),
                    JwtErrorKind::InvalidToken => "malformed token".to_string(),
                    _ => e.to_string(),
                };
                AuthError::TokenInvalid(reason)
            })
    }
}
