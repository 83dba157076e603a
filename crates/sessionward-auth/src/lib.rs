//! # sessionward-auth
//!
//! Credential handling and the session lifecycle engine for SessionWard.
//!
//! ## Modules
//!
//! - `jwt`: HS512 access-token issuance and validation
//! - `refresh`: opaque refresh secrets and their Argon2id digests
//! - `password`: Argon2id password hashing and policy enforcement
//! - `session`: the [`SessionManager`] engine (sign-up, sign-in, rotation, sign-out)
//! - `error`: the [`AuthError`] taxonomy

pub mod error;
pub mod jwt;
pub mod password;
pub mod refresh;
pub mod session;

pub use error::AuthError;
pub use jwt::{AccessClaims, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordValidator};
pub use refresh::{RefreshSecret, RefreshTokenHasher};
pub use session::SessionManager;
