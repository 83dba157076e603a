//! Argon2id digests of refresh secrets.

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::password_hash::rand_core::OsRng;
use argon2::Argon2;

use sessionward_core::config::HashingConfig;
use sessionward_core::error::AppError;

use crate::error::AuthError;
use crate::password::hasher::argon2_for;

/// Hashes refresh secrets for storage and verifies presented ones.
#[derive(Debug, Clone)]
pub struct RefreshTokenHasher {
    argon2: Argon2<'static>,
}

impl RefreshTokenHasher {
    /// Builds a hasher with the configured work factor.
    pub fn new(config: &HashingConfig) -> Result<Self, AuthError> {
        Ok(Self {
            argon2: argon2_for(config)?,
        })
    }

    /// One-way digest of `secret` with a fresh random salt (PHC string).
    pub fn hash(&self, secret: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                AuthError::Internal(AppError::internal(format!(
                    "Refresh secret hashing failed: {e}"
                )))
            })
    }

    /// Constant-time check of `candidate` against a stored digest.
    ///
    /// A digest that does not parse is treated as a mismatch.
    pub fn verify(&self, digest: &str, candidate: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => self
                .argon2
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!(error = %e, "Stored refresh digest is malformed");
                false
            }
        }
    }
}
