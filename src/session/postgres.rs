use async_trait::async_trait;
use sqlx::PgPool;

use super::{SessionStore, generate_session_id, hash_session_id};
use crate::error::AppError;

/// Session store backed by the `sessions` table. Only the SHA-256 of a
/// session id is persisted.
pub struct PgSessionStore {
    pool: PgPool,
    ttl_seconds: i64,
}

impl PgSessionStore {
    pub fn new(pool: PgPool, ttl_seconds: i64) -> Self {
        Self { pool, ttl_seconds }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, token: String) -> Result<String, AppError> {
        sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to purge expired sessions: {:?}", e);
                AppError::from(e)
            })?;

        let session_id = generate_session_id();

        sqlx::query(
            r#"
            INSERT INTO sessions (session_hash, token, expires_at)
            VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
            "#,
        )
        .bind(hash_session_id(&session_id))
        .bind(token)
        .bind(self.ttl_seconds)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create session: {:?}", e);
            AppError::from(e)
        })?;

        Ok(session_id)
    }

    async fn load(&self, session_id: &str) -> Result<Option<String>, AppError> {
        let token = sqlx::query_scalar::<_, String>(
            "SELECT token FROM sessions WHERE session_hash = $1 AND expires_at > NOW()",
        )
        .bind(hash_session_id(session_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load session: {:?}", e);
            AppError::from(e)
        })?;

        Ok(token)
    }

    async fn destroy(&self, session_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE session_hash = $1")
            .bind(hash_session_id(session_id))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to destroy session: {:?}", e);
                AppError::from(e)
            })?;

        Ok(())
    }
}
