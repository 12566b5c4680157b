//! Permission resolution for company and internal users.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use pricora_core::{AppResult, CompanyId, UserId};
use pricora_domain::{Permission, PermissionSet, UserType};

use crate::access_policy::AccessPolicy;
use crate::security_ports::{
    AuditRepository, PermissionCache, PermissionCacheKey, RoleRepository, UserDirectory,
    UserRoleRepository,
};

mod internal;


/// Time-to-live for cached permission resolutions.
const PERMISSION_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Application service resolving effective permissions per (user, company).
///
/// Company users resolve to the union of their role grants in the active
/// company. Internal users resolve through their single platform role; see
/// the internal-user methods.
#[derive(Clone)]
pub struct AuthorizationService {
    role_repository: Arc<dyn RoleRepository>,
    user_role_repository: Arc<dyn UserRoleRepository>,
    user_directory: Arc<dyn UserDirectory>,
    permission_cache: Arc<dyn PermissionCache>,
    audit_repository: Arc<dyn AuditRepository>,
    access_policy: AccessPolicy,
}

impl AuthorizationService {
    /// Creates a service from its ports and policy configuration.
    #[must_use]
    pub fn new(
        role_repository: Arc<dyn RoleRepository>,
        user_role_repository: Arc<dyn UserRoleRepository>,
        user_directory: Arc<dyn UserDirectory>,
        permission_cache: Arc<dyn PermissionCache>,
        audit_repository: Arc<dyn AuditRepository>,
        access_policy: AccessPolicy,
    ) -> Self {
        Self {
            role_repository,
            user_role_repository,
            user_directory,
            permission_cache,
            audit_repository,
            access_policy,
        }
    }

    /// Returns the effective permission set for a user in a company context.
    ///
    /// Resolutions are cached per (user, company) for five minutes. A user
    /// with zero assignments resolves to the empty set, never an error.
    pub async fn user_permissions(
        &self,
        user_id: UserId,
        company_id: CompanyId,
    ) -> AppResult<PermissionSet> {
        let key = PermissionCacheKey {
            user_id,
            company_id,
        };

        match self.permission_cache.get(key).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            // A failing cache read degrades to recomputation.
            Err(error) => {
                warn!(%user_id, %company_id, "permission cache read failed: {error}");
            }
        }

        let resolved = match self.user_directory.user_type(user_id).await? {
            UserType::Company => self.company_user_permissions(user_id, company_id).await?,
            // Internal users hold no company-scoped assignments; their
            // company-context set derives from the platform role alone.
            UserType::Internal => {
                self.internal_company_permissions(user_id, company_id)
                    .await?
            }
        };

        if let Err(error) = self
            .permission_cache
            .put(key, resolved.clone(), PERMISSION_CACHE_TTL)
            .await
        {
            warn!(%user_id, %company_id, "permission cache write failed: {error}");
        }

        Ok(resolved)
    }

    /// Returns whether the user holds the permission in the company context.
    pub async fn has_permission(
        &self,
        user_id: UserId,
        permission: &Permission,
        company_id: CompanyId,
    ) -> AppResult<bool> {
        Ok(self
            .user_permissions(user_id, company_id)
            .await?
            .grants(permission))
    }

    /// Returns whether the user holds every listed permission.
    pub async fn has_all_permissions(
        &self,
        user_id: UserId,
        required: &[Permission],
        company_id: CompanyId,
    ) -> AppResult<bool> {
        Ok(self
            .user_permissions(user_id, company_id)
            .await?
            .grants_all(required))
    }

    /// Returns whether the user holds at least one listed permission.
    pub async fn has_any_permission(
        &self,
        user_id: UserId,
        required: &[Permission],
        company_id: CompanyId,
    ) -> AppResult<bool> {
        Ok(self
            .user_permissions(user_id, company_id)
            .await?
            .grants_any(required))
    }

    /// Drops the cached resolution for one (user, company) pair.
    ///
    /// A no-op when nothing is cached.
    pub async fn invalidate_cache(&self, user_id: UserId, company_id: CompanyId) -> AppResult<()> {
        self.permission_cache
            .invalidate(PermissionCacheKey {
                user_id,
                company_id,
            })
            .await
    }

    /// Drops every cached resolution; used after bulk role changes.
    pub async fn invalidate_all_cache(&self) -> AppResult<()> {
        self.permission_cache.invalidate_all().await
    }

    async fn company_user_permissions(
        &self,
        user_id: UserId,
        company_id: CompanyId,
    ) -> AppResult<PermissionSet> {
        let assignments = self
            .user_role_repository
            .list_for_user(user_id, company_id)
            .await?;

        let mut permissions = PermissionSet::new();
        for assignment in assignments {
            // A dangling assignment row contributes nothing.
            let Some(role) = self.role_repository.find_by_id(assignment.role_id).await? else {
                continue;
            };
            permissions.extend(role.permissions().iter().cloned());
        }

        Ok(permissions)
    }
}
