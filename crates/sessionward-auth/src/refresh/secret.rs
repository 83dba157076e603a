//! Refresh-secret generation.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Entropy per secret, in bytes.
pub const SECRET_BYTES: usize = 32;

/// A freshly minted refresh secret, handed to the client exactly once.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshSecret(String);

impl RefreshSecret {
    /// Draws [`SECRET_BYTES`] from the OS CSPRNG and encodes them as
    /// unpadded base64url.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SECRET_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// The encoded secret.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper, returning the encoded secret.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for RefreshSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RefreshSecret(<redacted>)")
    }
}
