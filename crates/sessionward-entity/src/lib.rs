//! # sessionward-entity
//!
//! Domain entity models for SessionWard. Persisted entities derive
//! `sqlx::FromRow`; [`session::TokenPair`] is a transient value that is
//! never stored.

pub mod session;
pub mod user;

pub use session::{Session, TokenPair};
pub use user::User;
