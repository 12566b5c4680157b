//! PostgreSQL-backed user-role relation repository.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use pricora_application::UserRoleRepository;
use pricora_core::{AppError, AppResult, CompanyId, UserId};
use pricora_domain::{RoleId, UserRole};

/// PostgreSQL implementation of the user-role relation port.
///
/// The `rbac_user_roles` table carries a unique index over the full
/// (user, role, company) triple; duplicate inserts surface as conflicts.
#[derive(Clone)]
pub struct PostgresUserRoleRepository {
    pool: PgPool,
}

impl PostgresUserRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRoleRow {
    user_id: uuid::Uuid,
    role_id: uuid::Uuid,
    company_id: Option<uuid::Uuid>,
    assigned_by: Option<uuid::Uuid>,
}

impl From<UserRoleRow> for UserRole {
    fn from(row: UserRoleRow) -> Self {
        Self {
            user_id: UserId::from_uuid(row.user_id),
            role_id: RoleId::from_uuid(row.role_id),
            company_id: row.company_id.map(CompanyId::from_uuid),
            assigned_by: row.assigned_by.map(UserId::from_uuid),
        }
    }
}

#[async_trait]
impl UserRoleRepository for PostgresUserRoleRepository {
    async fn list_for_user(
        &self,
        user_id: UserId,
        company_id: CompanyId,
    ) -> AppResult<Vec<UserRole>> {
        let rows = sqlx::query_as::<_, UserRoleRow>(
            r#"
            SELECT user_id, role_id, company_id, assigned_by
            FROM rbac_user_roles
            WHERE user_id = $1 AND company_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(company_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list user roles: {error}")))?;

        Ok(rows.into_iter().map(UserRole::from).collect())
    }

    async fn list_for_role(
        &self,
        role_id: RoleId,
        company_id: CompanyId,
    ) -> AppResult<Vec<UserRole>> {
        let rows = sqlx::query_as::<_, UserRoleRow>(
            r#"
            SELECT user_id, role_id, company_id, assigned_by
            FROM rbac_user_roles
            WHERE role_id = $1 AND company_id = $2
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(company_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list role holders: {error}")))?;

        Ok(rows.into_iter().map(UserRole::from).collect())
    }

    async fn find_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
        company_id: Option<CompanyId>,
    ) -> AppResult<Option<UserRole>> {
        let row = sqlx::query_as::<_, UserRoleRow>(
            r#"
            SELECT user_id, role_id, company_id, assigned_by
            FROM rbac_user_roles
            WHERE user_id = $1
                AND role_id = $2
                AND company_id IS NOT DISTINCT FROM $3
            LIMIT 1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_id.as_uuid())
        .bind(company_id.map(|value| value.as_uuid()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve assignment: {error}")))?;

        Ok(row.map(UserRole::from))
    }

    async fn insert(&self, user_role: UserRole) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rbac_user_roles (user_id, role_id, company_id, assigned_by)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_role.user_id.as_uuid())
        .bind(user_role.role_id.as_uuid())
        .bind(user_role.company_id.map(|value| value.as_uuid()))
        .bind(user_role.assigned_by.map(|value| value.as_uuid()))
        .execute(&self.pool)
        .await
        .map_err(map_assignment_conflict)?;

        Ok(())
    }

    async fn remove(
        &self,
        user_id: UserId,
        role_id: RoleId,
        company_id: Option<CompanyId>,
    ) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM rbac_user_roles
            WHERE user_id = $1
                AND role_id = $2
                AND company_id IS NOT DISTINCT FROM $3
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_id.as_uuid())
        .bind(company_id.map(|value| value.as_uuid()))
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove assignment: {error}")))?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn remove_all_for_user(&self, user_id: UserId, company_id: CompanyId) -> AppResult<u64> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM rbac_user_roles
            WHERE user_id = $1 AND company_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(company_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove assignments: {error}")))?
        .rows_affected();

        Ok(rows_affected)
    }

    async fn find_platform_assignment(&self, user_id: UserId) -> AppResult<Option<UserRole>> {
        let row = sqlx::query_as::<_, UserRoleRow>(
            r#"
            SELECT user_id, role_id, company_id, assigned_by
            FROM rbac_user_roles
            WHERE user_id = $1 AND company_id IS NULL
            LIMIT 1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to resolve platform assignment: {error}"))
        })?;

        Ok(row.map(UserRole::from))
    }

    async fn remove_platform_assignment(&self, user_id: UserId) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM rbac_user_roles
            WHERE user_id = $1 AND company_id IS NULL
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to remove platform assignment: {error}"))
        })?
        .rows_affected();

        Ok(rows_affected > 0)
    }
}

fn map_assignment_conflict(error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict("user role assignment already exists".to_owned());
    }

    AppError::Internal(format!("failed to insert assignment: {error}"))
}
