//! PostgreSQL-backed user directory.

use async_trait::async_trait;
use sqlx::PgPool;

use pricora_application::UserDirectory;
use pricora_core::{AppError, AppResult, UserId};
use pricora_domain::UserType;

/// PostgreSQL implementation of the user directory port.
#[derive(Clone)]
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn user_type(&self, user_id: UserId) -> AppResult<UserType> {
        let stored = sqlx::query_scalar::<_, String>(
            r#"
            SELECT user_type
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve user type: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))?;

        UserType::parse(stored.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "invalid stored user type for user '{user_id}': {error}"
            ))
        })
    }
}
