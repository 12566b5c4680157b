use pricora_core::AppError;
use pricora_domain::{AuditAction, CompanyAccessLevel, Role, RoleId, RoleType, UserRole};

use crate::security_ports::AuditEvent;

use super::*;

impl AuthorizationService {
    /// Returns whether the user is internal platform staff.
    pub async fn is_internal_user(&self, user_id: UserId) -> AppResult<bool> {
        Ok(self.user_directory.user_type(user_id).await? == UserType::Internal)
    }

    /// Returns the single platform role assigned to an internal user.
    pub async fn internal_platform_role(&self, user_id: UserId) -> AppResult<Option<Role>> {
        let Some(assignment) = self
            .user_role_repository
            .find_platform_assignment(user_id)
            .await?
        else {
            return Ok(None);
        };

        self.role_repository.find_by_id(assignment.role_id).await
    }

    /// Returns the user's platform-level permissions.
    ///
    /// Only the platform role's entries in the reserved `platform`
    /// namespace qualify.
    pub async fn internal_platform_permissions(&self, user_id: UserId) -> AppResult<PermissionSet> {
        Ok(self
            .internal_platform_role(user_id)
            .await?
            .map(|role| role.permissions().platform_scoped())
            .unwrap_or_default())
    }

    /// Returns the company-context permissions of an internal user.
    ///
    /// The result is identical in every company the user switches into:
    /// internal access derives from the platform role's access level, never
    /// from the company. The company parameter exists for interface symmetry
    /// with the company-user path.
    pub async fn internal_company_permissions(
        &self,
        user_id: UserId,
        _company_id: CompanyId,
    ) -> AppResult<PermissionSet> {
        let Some(role) = self.internal_platform_role(user_id).await? else {
            return Ok(PermissionSet::new());
        };

        let permissions = match role.company_access_level() {
            Some(CompanyAccessLevel::Full) => PermissionSet::global_wildcard(),
            Some(CompanyAccessLevel::ReadOnly) => self.access_policy.read_only_permissions().clone(),
            Some(CompanyAccessLevel::Custom) => role.permissions().without_platform_scoped(),
            // Unreachable for a validated platform role.
            None => PermissionSet::new(),
        };

        Ok(permissions)
    }

    /// Universal permission check covering both user types.
    ///
    /// The user-type branch happens exactly once, here. Platform-prefixed
    /// requirements are answered from the platform permission set;
    /// everything else from the (cached) company-context resolution.
    pub async fn check_permission(
        &self,
        user_id: UserId,
        permission: &Permission,
        company_id: CompanyId,
    ) -> AppResult<bool> {
        match self.user_directory.user_type(user_id).await? {
            UserType::Company => self.has_permission(user_id, permission, company_id).await,
            UserType::Internal if permission.is_platform_scoped() => Ok(self
                .internal_platform_permissions(user_id)
                .await?
                .grants(permission)),
            UserType::Internal => Ok(self
                .user_permissions(user_id, company_id)
                .await?
                .grants(permission)),
        }
    }

    /// Assigns a platform role to an internal user.
    ///
    /// An internal user holds at most one platform role; assigning a new one
    /// replaces the previous assignment. Re-assigning the currently held
    /// role is a conflict and mutates nothing.
    pub async fn assign_platform_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        assigned_by: Option<UserId>,
    ) -> AppResult<UserRole> {
        if !self.is_internal_user(user_id).await? {
            return Err(AppError::Validation(format!(
                "platform roles can only be assigned to internal users, user '{user_id}' is a company user"
            )));
        }

        let role = self
            .role_repository
            .find_by_id(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))?;

        if role.role_type() != RoleType::Platform {
            return Err(AppError::Validation(format!(
                "role '{}' is not a platform role",
                role.name()
            )));
        }

        if let Some(existing) = self
            .user_role_repository
            .find_platform_assignment(user_id)
            .await?
        {
            if existing.role_id == role_id {
                return Err(AppError::Conflict(
                    "role is already assigned to this user".to_owned(),
                ));
            }
            self.user_role_repository
                .remove_platform_assignment(user_id)
                .await?;
        }

        let user_role = UserRole {
            user_id,
            role_id,
            company_id: None,
            assigned_by,
        };
        self.user_role_repository.insert(user_role.clone()).await?;

        // A platform role change affects the user's resolution in every
        // company; the cache is keyed per company, so drop everything.
        if let Err(error) = self.invalidate_all_cache().await {
            warn!(%user_id, "permission cache invalidation failed: {error}");
        }

        self.audit_repository
            .append_event(AuditEvent {
                company_id: None,
                actor: assigned_by,
                action: AuditAction::PlatformRoleAssigned,
                resource_type: "rbac_user_role".to_owned(),
                resource_id: format!("{user_id}:{role_id}"),
                detail: Some(format!(
                    "assigned platform role '{}' to '{user_id}'",
                    role.name()
                )),
            })
            .await?;

        Ok(user_role)
    }
}
