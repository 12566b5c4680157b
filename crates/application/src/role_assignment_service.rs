//! Role assignment lifecycle for company users.

use std::sync::Arc;

use tracing::warn;

use pricora_core::{AppError, AppResult, CompanyId, UserId};
use pricora_domain::{AuditAction, Role, RoleId, UserRole};

use crate::authorization_service::AuthorizationService;
use crate::security_ports::{AuditEvent, AuditRepository, RoleRepository, UserRoleRepository};


/// Application service mutating the user-role-company relation.
///
/// Every successful mutation invalidates the affected cache entry through
/// the authorization service after the relation write, so a reader never
/// keeps serving a resolution computed from superseded assignments.
#[derive(Clone)]
pub struct RoleAssignmentService {
    authorization_service: AuthorizationService,
    role_repository: Arc<dyn RoleRepository>,
    user_role_repository: Arc<dyn UserRoleRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl RoleAssignmentService {
    /// Creates a service from the resolution service and its ports.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        role_repository: Arc<dyn RoleRepository>,
        user_role_repository: Arc<dyn UserRoleRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            role_repository,
            user_role_repository,
            audit_repository,
        }
    }

    /// Assigns a role to a user within a company.
    ///
    /// Re-assigning an identical (user, role, company) triple is a conflict
    /// and mutates nothing.
    pub async fn assign_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        company_id: CompanyId,
        assigned_by: Option<UserId>,
    ) -> AppResult<UserRole> {
        if self
            .user_role_repository
            .find_assignment(user_id, role_id, Some(company_id))
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "role is already assigned to this user".to_owned(),
            ));
        }

        let role = self
            .role_repository
            .find_by_id(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;

        let user_role = UserRole {
            user_id,
            role_id,
            company_id: Some(company_id),
            assigned_by,
        };
        self.user_role_repository.insert(user_role.clone()).await?;
        self.invalidate_permissions(user_id, company_id).await;

        self.audit_repository
            .append_event(AuditEvent {
                company_id: Some(company_id),
                actor: assigned_by,
                action: AuditAction::RoleAssigned,
                resource_type: "rbac_user_role".to_owned(),
                resource_id: format!("{user_id}:{role_id}"),
                detail: Some(format!("assigned role '{}' to '{user_id}'", role.name())),
            })
            .await?;

        Ok(user_role)
    }

    /// Revokes one role assignment.
    ///
    /// Returns `false` without error when no matching assignment exists.
    pub async fn revoke_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        company_id: CompanyId,
    ) -> AppResult<bool> {
        let removed = self
            .user_role_repository
            .remove(user_id, role_id, Some(company_id))
            .await?;
        if !removed {
            return Ok(false);
        }

        self.invalidate_permissions(user_id, company_id).await;

        self.audit_repository
            .append_event(AuditEvent {
                company_id: Some(company_id),
                actor: None,
                action: AuditAction::RoleRevoked,
                resource_type: "rbac_user_role".to_owned(),
                resource_id: format!("{user_id}:{role_id}"),
                detail: Some(format!("revoked role '{role_id}' from '{user_id}'")),
            })
            .await?;

        Ok(true)
    }

    /// Revokes every role the user holds in the company.
    ///
    /// Returns the number of removed assignments; the cache is invalidated
    /// once, not per row.
    pub async fn revoke_all_roles(&self, user_id: UserId, company_id: CompanyId) -> AppResult<u64> {
        let removed = self
            .user_role_repository
            .remove_all_for_user(user_id, company_id)
            .await?;
        if removed == 0 {
            return Ok(0);
        }

        self.invalidate_permissions(user_id, company_id).await;

        self.audit_repository
            .append_event(AuditEvent {
                company_id: Some(company_id),
                actor: None,
                action: AuditAction::AllRolesRevoked,
                resource_type: "rbac_user_role".to_owned(),
                resource_id: user_id.to_string(),
                detail: Some(format!("revoked {removed} roles from '{user_id}'")),
            })
            .await?;

        Ok(removed)
    }

    /// Returns the roles assigned to the user in the company.
    pub async fn user_roles(&self, user_id: UserId, company_id: CompanyId) -> AppResult<Vec<Role>> {
        let assignments = self
            .user_role_repository
            .list_for_user(user_id, company_id)
            .await?;

        let mut roles = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            if let Some(role) = self.role_repository.find_by_id(assignment.role_id).await? {
                roles.push(role);
            }
        }

        Ok(roles)
    }

    /// Returns the assignments carrying one role in the company.
    pub async fn users_with_role(
        &self,
        role_id: RoleId,
        company_id: CompanyId,
    ) -> AppResult<Vec<UserRole>> {
        self.user_role_repository
            .list_for_role(role_id, company_id)
            .await
    }

    /// Returns the system roles plus the roles scoped to the company.
    pub async fn available_roles(&self, company_id: CompanyId) -> AppResult<Vec<Role>> {
        self.role_repository.list_visible_to_company(company_id).await
    }

    /// Finds a role by name.
    ///
    /// Prefers a company-scoped role over a system role of the same name
    /// when a company is given; falls back to the system role.
    pub async fn role_by_name(
        &self,
        name: &str,
        company_id: Option<CompanyId>,
    ) -> AppResult<Option<Role>> {
        if let Some(company_id) = company_id
            && let Some(role) = self
                .role_repository
                .find_by_name(name, Some(company_id))
                .await?
        {
            return Ok(Some(role));
        }

        self.role_repository.find_by_name(name, None).await
    }

    /// Assigns every default role visible to the company to a user.
    ///
    /// Already-held defaults are skipped. The cache is invalidated once at
    /// the end, only when at least one assignment was created; returns the
    /// created rows.
    pub async fn assign_default_roles(
        &self,
        user_id: UserId,
        company_id: CompanyId,
    ) -> AppResult<Vec<UserRole>> {
        let defaults = self.role_repository.list_default_roles(company_id).await?;

        let mut created = Vec::new();
        for role in defaults {
            if self
                .user_role_repository
                .find_assignment(user_id, role.id(), Some(company_id))
                .await?
                .is_some()
            {
                continue;
            }

            let user_role = UserRole {
                user_id,
                role_id: role.id(),
                company_id: Some(company_id),
                assigned_by: None,
            };
            self.user_role_repository.insert(user_role.clone()).await?;
            created.push(user_role);
        }

        if created.is_empty() {
            return Ok(created);
        }

        self.invalidate_permissions(user_id, company_id).await;

        self.audit_repository
            .append_event(AuditEvent {
                company_id: Some(company_id),
                actor: None,
                action: AuditAction::DefaultRolesAssigned,
                resource_type: "rbac_user_role".to_owned(),
                resource_id: user_id.to_string(),
                detail: Some(format!(
                    "assigned {} default roles to '{user_id}'",
                    created.len()
                )),
            })
            .await?;

        Ok(created)
    }

    /// Drops the pair's cached resolution after a committed relation change.
    ///
    /// A failed drop never fails the mutation: the relation store is
    /// authoritative and a stale entry self-heals at TTL expiry.
    async fn invalidate_permissions(&self, user_id: UserId, company_id: CompanyId) {
        if let Err(error) = self
            .authorization_service
            .invalidate_cache(user_id, company_id)
            .await
        {
            warn!(%user_id, %company_id, "permission cache invalidation failed: {error}");
        }
    }
}
