//! Session repository implementation.

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use tracing::debug;
use uuid::Uuid;

use sessionward_core::error::{AppError, ErrorKind};
use sessionward_core::result::AppResult;
use sessionward_entity::session::Session;

use super::{SessionStore, Succession};

const INSERT_SESSION: &str = "INSERT INTO sessions \
     (id, user_id, refresh_token_hash, expires_at, used, previous_session_id, created_at) \
     VALUES ($1, $2, $3, $4, $5, $6, $7)";

/// PostgreSQL-backed [`SessionStore`].
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_with<'e, E>(executor: E, session: &Session) -> AppResult<()>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(INSERT_SESSION)
            .bind(session.id)
            .bind(session.user_id)
            .bind(&session.refresh_token_hash)
            .bind(session.expires_at)
            .bind(session.used)
            .bind(session.previous_session_id)
            .bind(session.created_at)
            .execute(executor)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert session", e))?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn insert(&self, session: &Session) -> AppResult<()> {
        Self::insert_with(&self.pool, session).await
    }

    async fn find_by_id(&self, session_id: Uuid) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>(
            "SELECT id, user_id, refresh_token_hash, expires_at, used, previous_session_id, created_at \
             FROM sessions WHERE id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find session", e))
    }

    async fn mark_used(&self, session_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("UPDATE sessions SET used = TRUE WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to mark session used", e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Session {session_id} not found")));
        }
        Ok(())
    }

    async fn insert_and_mark_prior_used(
        &self,
        successor: &Session,
        prior_session_id: Uuid,
    ) -> AppResult<Succession> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin rotation transaction", e)
        })?;

        // The row lock taken by this UPDATE serializes concurrent rotations;
        // losers re-evaluate `used = FALSE` after the winner commits.
        let flipped = sqlx::query("UPDATE sessions SET used = TRUE WHERE id = $1 AND used = FALSE")
            .bind(prior_session_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to mark prior session used", e)
            })?;

        if flipped.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM sessions WHERE id = $1)")
                    .bind(prior_session_id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| {
                        AppError::with_source(ErrorKind::Database, "Failed to look up prior session", e)
                    })?;

            // Dropping `tx` rolls back.
            debug!(prior_session_id = %prior_session_id, exists, "Rotation lost: prior session not flippable");
            return Ok(if exists {
                Succession::PriorAlreadyUsed
            } else {
                Succession::PriorMissing
            });
        }

        Self::insert_with(&mut *tx, successor).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit rotation transaction", e)
        })?;

        Ok(Succession::Committed)
    }
}
