//! Session engine error taxonomy.

use sessionward_core::error::{AppError, ErrorKind};
use thiserror::Error;

/// Outcomes of engine operations that callers must be able to tell apart.
///
/// Everything except [`AuthError::Internal`] and [`AuthError::Notification`]
/// is an expected, user-facing result.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Sign-up with an e-mail that is already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Unknown e-mail or wrong password. The two are
    /// indistinguishable.
    #[error("user not found")]
    UserNotFound,

    /// The access token names a session that does not exist.
    #[error("session not found")]
    SessionNotFound,

    /// The access token is unusable for rotation, or the refresh secret
    /// does not match the session.
    #[error("invalid refresh token")]
    InvalidRefreshToken,

    /// The refresh secret was already spent. Treated as a replay.
    #[error("refresh token already used")]
    RefreshTokenAlreadyUsed,

    /// The session is past its expiry.
    #[error("refresh token is expired")]
    RefreshTokenExpired,

    /// The access token failed signature, algorithm, or expiry checks.
    #[error("invalid access token: {0}")]
    TokenInvalid(String),

    /// The configured signing key is empty.
    #[error("signing key is empty")]
    SigningKeyMissing,

    /// A token lifetime setting is zero or too large to represent.
    #[error("invalid token lifetime: {0}")]
    InvalidLifetime(&'static str),

    /// E-mail or password rejected by input policy.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The security alert could not be delivered.
    #[error("security notification failed: {0}")]
    Notification(AppError),

    /// Persistence, hashing, or signing failure.
    #[error(transparent)]
    Internal(AppError),
}

impl AuthError {
    /// The [`ErrorKind`] this error surfaces as.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UserAlreadyExists | Self::RefreshTokenAlreadyUsed => ErrorKind::Conflict,
            Self::UserNotFound | Self::SessionNotFound => ErrorKind::NotFound,
            Self::InvalidRefreshToken | Self::InvalidCredentials(_) => ErrorKind::Validation,
            Self::RefreshTokenExpired => ErrorKind::Expired,
            Self::TokenInvalid(_) => ErrorKind::Authentication,
            Self::SigningKeyMissing | Self::InvalidLifetime(_) => ErrorKind::Configuration,
            Self::Notification(_) => ErrorKind::ExternalService,
            Self::Internal(e) => e.kind,
        }
    }

    /// Whether a caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Internal(e) | Self::Notification(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        Self::Internal(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let kind = err.kind();
        match err {
            AuthError::Internal(inner) => inner,
            AuthError::Notification(inner) => {
                AppError::with_source(kind, "Security notification failed", inner)
            }
            other => AppError::new(kind, other.to_string()),
        }
    }
}
