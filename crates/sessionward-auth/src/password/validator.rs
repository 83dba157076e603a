//! Sign-up input policy.

use sessionward_core::config::AuthConfig;
use validator::ValidateEmail;

use crate::error::AuthError;

/// Maximum accepted e-mail length, in characters.
pub const MAX_EMAIL_LENGTH: usize = 64;

/// Checks e-mail format and password length before an account is created.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
    max_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            max_length: config.password_max_length,
        }
    }

    /// Validates a password against the configured length bounds
    /// (counted in characters, inclusive).
    pub fn validate(&self, password: &str) -> Result<(), AuthError> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(AuthError::InvalidCredentials(format!(
                "password must be at least {} characters long",
                self.min_length
            )));
        }
        if length > self.max_length {
            return Err(AuthError::InvalidCredentials(format!(
                "password must be at most {} characters long",
                self.max_length
            )));
        }
        Ok(())
    }

    /// Validates e-mail syntax and length.
    pub fn validate_email(&self, email: &str) -> Result<(), AuthError> {
        if email.chars().count() > MAX_EMAIL_LENGTH {
            return Err(AuthError::InvalidCredentials(format!(
                "email must be at most {MAX_EMAIL_LENGTH} characters long"
            )));
        }
        if !email.validate_email() {
            return Err(AuthError::InvalidCredentials(
                "email is not a valid address".to_string(),
            ));
        }
        Ok(())
    }
}
