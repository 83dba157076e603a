//! In-memory stores using a Tokio mutex for single-node deployments and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use sessionward_core::error::AppError;
use sessionward_core::result::AppResult;
use sessionward_entity::session::Session;
use sessionward_entity::user::User;

use super::{SessionStore, Succession, UserStore};

/// In-memory [`UserStore`] enforcing case-insensitive e-mail uniqueness.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserRepository {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
}

impl MemoryUserRepository {
    /// Creates an empty user store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }

    /// Whether the store holds no users.
    pub async fn is_empty(&self) -> bool {
        self.users.lock().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserRepository {
    async fn create(&self, user: &User) -> AppResult<()> {
        let mut users = self.users.lock().await;

        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AppError::conflict("User e-mail already registered"));
        }
        if users.contains_key(&user.id) {
            return Err(AppError::conflict(format!("User {} already exists", user.id)));
        }

        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().await.get(&id).cloned())
    }
}

/// In-memory [`SessionStore`]. One lock guards the whole map, which makes
/// the compound rotation write trivially atomic.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionRepository {
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl MemorySessionRepository {
    /// Creates an empty session store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored session.
    pub async fn snapshot(&self) -> Vec<Session> {
        self.sessions.lock().await.values().cloned().collect()
    }

    /// Sessions rotated directly from `prior_session_id`.
    pub async fn successors_of(&self, prior_session_id: Uuid) -> Vec<Session> {
        self.sessions
            .lock()
            .await
            .values()
            .filter(|s| s.previous_session_id == Some(prior_session_id))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SessionStore for MemorySessionRepository {
    async fn insert(&self, session: &Session) -> AppResult<()> {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&session.id) {
            return Err(AppError::conflict(format!(
                "Session {} already exists",
                session.id
            )));
        }
        sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn find_by_id(&self, session_id: Uuid) -> AppResult<Option<Session>> {
        Ok(self.sessions.lock().await.get(&session_id).cloned())
    }

    async fn mark_used(&self, session_id: Uuid) -> AppResult<()> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get_mut(&session_id) {
            Some(session) => {
                session.used = true;
                Ok(())
            }
            None => Err(AppError::not_found(format!("Session {session_id} not found"))),
        }
    }

    async fn insert_and_mark_prior_used(
        &self,
        successor: &Session,
        prior_session_id: Uuid,
    ) -> AppResult<Succession> {
        let mut sessions = self.sessions.lock().await;

        if sessions.contains_key(&successor.id) {
            return Err(AppError::conflict(format!(
                "Session {} already exists",
                successor.id
            )));
        }

        match sessions.get_mut(&prior_session_id) {
            None => return Ok(Succession::PriorMissing),
            Some(prior) if prior.used => return Ok(Succession::PriorAlreadyUsed),
            Some(prior) => prior.used = true,
        }

        sessions.insert(successor.id, successor.clone());
        Ok(Succession::Committed)
    }
}
