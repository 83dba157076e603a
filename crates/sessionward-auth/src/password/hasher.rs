//! Argon2id password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use sessionward_core::config::HashingConfig;
use sessionward_core::error::AppError;

use crate::error::AuthError;

/// Builds an Argon2id instance with the configured cost.
pub(crate) fn argon2_for(config: &HashingConfig) -> Result<Argon2<'static>, AuthError> {
    let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
        .map_err(|e| {
            AuthError::Internal(AppError::configuration(format!(
                "Invalid Argon2 parameters: {e}"
            )))
        })?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Handles password hashing and verification using Argon2id with a
/// per-user random salt.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Digest verified against when the account does not exist, so both
    /// sign-in failures cost the same.
    decoy_hash: String,
}

impl PasswordHasher {
    /// Creates a hasher with the configured work factor.
    pub fn new(config: &HashingConfig) -> Result<Self, AuthError> {
        let argon2 = argon2_for(config)?;
        let salt = SaltString::generate(&mut OsRng);
        let decoy_hash = argon2
            .hash_password(b"sessionward-decoy-password", &salt)
            .map_err(|e| {
                AuthError::Internal(AppError::internal(format!(
                    "Decoy hash generation failed: {e}"
                )))
            })?
            .to_string();

        Ok(Self { argon2, decoy_hash })
    }

    /// Hashes a plaintext password with a random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                AuthError::Internal(AppError::internal(format!("Password hashing failed: {e}")))
            })?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored hash.
    ///
    /// Returns `Ok(true)` if the password matches, `Ok(false)` if not.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            AuthError::Internal(AppError::internal(format!(
                "Invalid password hash format: {e}"
            )))
        })?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Internal(AppError::internal(format!(
                "Password verification failed: {e}"
            )))),
        }
    }

    /// Spends one verification against the decoy digest. Used when the
    /// account does not exist.
    pub fn verify_decoy(&self, password: &str) {
        let _ = self.verify_password(password, &self.decoy_hash);
    }
}
