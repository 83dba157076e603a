//! Access-token encoding and validation.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::AccessClaims;
pub use decoder::JwtDecoder;
pub use encoder::JwtEncoder;

use jsonwebtoken::Algorithm;

/// The only algorithm tokens are signed with or accepted under.
pub(crate) const SIGNING_ALGORITHM: Algorithm = Algorithm::HS512;
