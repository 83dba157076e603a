//! Store ports and their implementations.
//!
//! The session engine depends only on [`UserStore`] and [`SessionStore`].
//! [`UserRepository`] and [`SessionRepository`] back them with PostgreSQL;
//! the `Memory*` variants keep everything in process.

pub mod memory;
pub mod session;
pub mod user;

use async_trait::async_trait;
use uuid::Uuid;

use sessionward_core::result::AppResult;
use sessionward_entity::session::Session;
use sessionward_entity::user::User;

pub use memory::{MemorySessionRepository, MemoryUserRepository};
pub use session::SessionRepository;
pub use user::UserRepository;

/// Identity lookup and creation.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new user.
    ///
    /// Fails with [`ErrorKind::Conflict`] when the e-mail is already taken.
    ///
    /// [`ErrorKind::Conflict`]: sessionward_core::error::ErrorKind::Conflict
    async fn create(&self, user: &User) -> AppResult<()>;

    /// Find a user by e-mail (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find a user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
}

/// Outcome of [`SessionStore::insert_and_mark_prior_used`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Succession {
    /// The prior session was flipped to used and the successor inserted.
    Committed,
    /// The prior session was already used; nothing was written.
    PriorAlreadyUsed,
    /// The prior session does not exist; nothing was written.
    PriorMissing,
}

/// Session persistence with no business logic of its own.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a brand-new session.
    async fn insert(&self, session: &Session) -> AppResult<()>;

    /// Find a session by primary key.
    async fn find_by_id(&self, session_id: Uuid) -> AppResult<Option<Session>>;

    /// Set `used = true` on a session. Fails with not-found when absent.
    async fn mark_used(&self, session_id: Uuid) -> AppResult<()>;

    /// Atomically mark `prior_session_id` used and insert `successor`.
    ///
    /// The flip is conditional on the prior row still being unused, so of
    /// several concurrent callers naming the same prior session at most one
    /// observes [`Succession::Committed`].
    async fn insert_and_mark_prior_used(
        &self,
        successor: &Session,
        prior_session_id: Uuid,
    ) -> AppResult<Succession>;
}
