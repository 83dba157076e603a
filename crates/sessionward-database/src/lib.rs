//! # sessionward-database
//!
//! Persistence ports for users and sessions, the PostgreSQL implementations
//! used in production, and in-memory implementations for single-node runs
//! and tests.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{
    MemorySessionRepository, MemoryUserRepository, SessionRepository, SessionStore, Succession,
    UserRepository, UserStore,
};
