//! PostgreSQL-backed role repository.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use pricora_application::RoleRepository;
use pricora_core::{AppError, AppResult, CompanyId};
use pricora_domain::{CompanyAccessLevel, Permission, PermissionSet, Role, RoleId, RoleType};

/// PostgreSQL implementation of the role repository port.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ROLE_SELECT: &str = r#"
    SELECT
        roles.id AS role_id,
        roles.company_id,
        roles.name AS role_name,
        roles.role_type,
        roles.company_access_level,
        roles.is_default,
        grants.permission
    FROM rbac_roles AS roles
    LEFT JOIN rbac_role_grants AS grants
        ON grants.role_id = roles.id
"#;

#[derive(Debug, FromRow)]
struct RoleRow {
    role_id: uuid::Uuid,
    company_id: Option<uuid::Uuid>,
    role_name: String,
    role_type: String,
    company_access_level: Option<String>,
    is_default: bool,
    permission: Option<String>,
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn find_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(&format!("{ROLE_SELECT} WHERE roles.id = $1"))
            .bind(role_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to load role: {error}")))?;

        Ok(aggregate_roles(rows)?.into_iter().next())
    }

    async fn find_by_name(
        &self,
        name: &str,
        company_id: Option<CompanyId>,
    ) -> AppResult<Option<Role>> {
        let rows = match company_id {
            Some(company_id) => {
                sqlx::query_as::<_, RoleRow>(&format!(
                    "{ROLE_SELECT} WHERE roles.name = $1 AND roles.company_id = $2"
                ))
                .bind(name)
                .bind(company_id.as_uuid())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, RoleRow>(&format!(
                    "{ROLE_SELECT} WHERE roles.name = $1 AND roles.company_id IS NULL AND roles.role_type = 'system'"
                ))
                .bind(name)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|error| AppError::Internal(format!("failed to resolve role by name: {error}")))?;

        Ok(aggregate_roles(rows)?.into_iter().next())
    }

    async fn list_visible_to_company(&self, company_id: CompanyId) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(&format!(
            r#"
            {ROLE_SELECT}
            WHERE roles.company_id = $1
                OR (roles.company_id IS NULL AND roles.role_type = 'system')
            ORDER BY roles.name, grants.permission
            "#
        ))
        .bind(company_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        aggregate_roles(rows)
    }

    async fn list_default_roles(&self, company_id: CompanyId) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(&format!(
            r#"
            {ROLE_SELECT}
            WHERE roles.is_default
                AND (roles.company_id = $1
                    OR (roles.company_id IS NULL AND roles.role_type = 'system'))
            ORDER BY roles.name, grants.permission
            "#
        ))
        .bind(company_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list default roles: {error}")))?;

        aggregate_roles(rows)
    }
}

fn aggregate_roles(rows: Vec<RoleRow>) -> AppResult<Vec<Role>> {
    struct PartialRole {
        row: RoleRow,
        permissions: PermissionSet,
    }

    let mut order: Vec<uuid::Uuid> = Vec::new();
    let mut by_id: HashMap<uuid::Uuid, PartialRole> = HashMap::new();

    for row in rows {
        let permission = row.permission.clone();
        let partial = by_id.entry(row.role_id).or_insert_with_key(|role_id| {
            order.push(*role_id);
            PartialRole {
                row,
                permissions: PermissionSet::new(),
            }
        });

        if let Some(value) = permission {
            partial.permissions.insert(Permission::new(value));
        }
    }

    let mut roles = Vec::with_capacity(order.len());
    for role_id in order {
        let Some(partial) = by_id.remove(&role_id) else {
            continue;
        };
        roles.push(restore_role(partial.row, partial.permissions)?);
    }

    roles.sort_by(|left, right| left.name().cmp(right.name()));
    Ok(roles)
}

fn restore_role(row: RoleRow, permissions: PermissionSet) -> AppResult<Role> {
    let role_type = RoleType::parse(row.role_type.as_str()).map_err(|error| {
        AppError::Internal(format!(
            "invalid stored role type for role '{}': {error}",
            row.role_name
        ))
    })?;

    let company_access_level = row
        .company_access_level
        .as_deref()
        .map(CompanyAccessLevel::parse)
        .transpose()
        .map_err(|error| {
            AppError::Internal(format!(
                "invalid stored access level for role '{}': {error}",
                row.role_name
            ))
        })?;

    Role::from_parts(
        RoleId::from_uuid(row.role_id),
        row.role_name.clone(),
        role_type,
        row.company_id.map(CompanyId::from_uuid),
        permissions,
        row.is_default,
        company_access_level,
    )
    .map_err(|error| {
        AppError::Internal(format!("invalid stored role '{}': {error}", row.role_name))
    })
}
