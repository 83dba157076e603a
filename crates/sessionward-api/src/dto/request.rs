//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use sessionward_core::error::AppError;

use crate::error::ApiError;

/// Sign-up request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignUpRequest {
    /// E-mail address.
    #[validate(email(message = "Email is not valid"), length(max = 64))]
    pub email: String,
    /// Password.
    #[validate(length(min = 6, max = 64, message = "Password must be 6 to 64 characters"))]
    pub password: String,
}

/// Sign-in request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignInRequest {
    /// E-mail address.
    #[validate(email(message = "Email is not valid"), length(max = 64))]
    pub email: String,
    /// Password.
    #[validate(length(min = 6, max = 64, message = "Password must be 6 to 64 characters"))]
    pub password: String,
}

/// Token refresh request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshRequest {
    /// Access token issued alongside the refresh token.
    #[validate(length(min = 1, message = "Access token is required"))]
    pub access_token: String,
    /// Refresh token.
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Sign-out request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignOutRequest {
    /// Access token of the session to end.
    #[validate(length(min = 1, message = "Access token is required"))]
    pub access_token: String,
}

/// Runs `validator` rules, mapping failures to a 400.
pub fn validate_body<T: Validate>(body: &T) -> Result<(), ApiError> {
    body.validate()
        .map_err(|e| ApiError(AppError::validation(e.to_string())))
}
