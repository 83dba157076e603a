//! # sessionward-core
//!
//! Core crate for SessionWard. Contains the unified error system,
//! configuration schemas, and the port traits implemented by the
//! infrastructure crates.
//!
//! This crate has **no** internal dependencies on other SessionWard crates.

pub mod config;
pub mod error;
pub mod result;
pub mod timeout;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
