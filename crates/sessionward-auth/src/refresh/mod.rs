//! Opaque refresh secrets and their stored digests.

pub mod hasher;
pub mod secret;

pub use hasher::RefreshTokenHasher;
pub use secret::RefreshSecret;
