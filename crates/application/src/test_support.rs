//! In-memory fakes shared by the service test modules.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use pricora_core::{AppError, AppResult, CompanyId, UserId};
use pricora_domain::{
    CompanyAccessLevel, Permission, PermissionSet, Role, RoleId, RoleType, UserRole, UserType,
};

use crate::access_policy::AccessPolicy;
use crate::authorization_service::AuthorizationService;
use crate::security_ports::{
    AuditEvent, AuditRepository, PermissionCache, PermissionCacheKey, RoleRepository,
    UserDirectory, UserRoleRepository,
};

#[derive(Default)]
pub(crate) struct FakeRoleStore {
    pub(crate) roles: Mutex<Vec<Role>>,
    pub(crate) assignments: Mutex<Vec<UserRole>>,
    pub(crate) users: Mutex<HashMap<UserId, UserType>>,
}

impl FakeRoleStore {
    pub(crate) async fn add_role(&self, role: Role) {
        self.roles.lock().await.push(role);
    }

    pub(crate) async fn add_assignment(&self, user_role: UserRole) {
        self.assignments.lock().await.push(user_role);
    }

    pub(crate) async fn register_user(&self, user_id: UserId, user_type: UserType) {
        self.users.lock().await.insert(user_id, user_type);
    }

    pub(crate) async fn remove_assignment_directly(&self, user_id: UserId, role_id: RoleId) {
        self.assignments
            .lock()
            .await
            .retain(|assignment| !(assignment.user_id == user_id && assignment.role_id == role_id));
    }

    pub(crate) async fn assignment_count(&self) -> usize {
        self.assignments.lock().await.len()
    }
}

#[async_trait]
impl RoleRepository for FakeRoleStore {
    async fn find_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .find(|role| role.id() == role_id)
            .cloned())
    }

    async fn find_by_name(
        &self,
        name: &str,
        company_id: Option<CompanyId>,
    ) -> AppResult<Option<Role>> {
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .find(|role| {
                role.name() == name
                    && role.company_id() == company_id
                    && (company_id.is_some() || role.role_type() == RoleType::System)
            })
            .cloned())
    }

    async fn list_visible_to_company(&self, company_id: CompanyId) -> AppResult<Vec<Role>> {
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .filter(|role| {
                role.company_id() == Some(company_id)
                    || (role.company_id().is_none() && role.role_type() == RoleType::System)
            })
            .cloned()
            .collect())
    }

    async fn list_default_roles(&self, company_id: CompanyId) -> AppResult<Vec<Role>> {
        Ok(self
            .list_visible_to_company(company_id)
            .await?
            .into_iter()
            .filter(Role::is_default)
            .collect())
    }
}

#[async_trait]
impl UserRoleRepository for FakeRoleStore {
    async fn list_for_user(
        &self,
        user_id: UserId,
        company_id: CompanyId,
    ) -> AppResult<Vec<UserRole>> {
        Ok(self
            .assignments
            .lock()
            .await
            .iter()
            .filter(|assignment| {
                assignment.user_id == user_id && assignment.company_id == Some(company_id)
            })
            .cloned()
            .collect())
    }

    async fn list_for_role(
        &self,
        role_id: RoleId,
        company_id: CompanyId,
    ) -> AppResult<Vec<UserRole>> {
        Ok(self
            .assignments
            .lock()
            .await
            .iter()
            .filter(|assignment| {
                assignment.role_id == role_id && assignment.company_id == Some(company_id)
            })
            .cloned()
            .collect())
    }

    async fn find_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
        company_id: Option<CompanyId>,
    ) -> AppResult<Option<UserRole>> {
        Ok(self
            .assignments
            .lock()
            .await
            .iter()
            .find(|assignment| {
                assignment.user_id == user_id
                    && assignment.role_id == role_id
                    && assignment.company_id == company_id
            })
            .cloned())
    }

    async fn insert(&self, user_role: UserRole) -> AppResult<()> {
        let mut assignments = self.assignments.lock().await;
        if assignments.iter().any(|assignment| {
            assignment.user_id == user_role.user_id
                && assignment.role_id == user_role.role_id
                && assignment.company_id == user_role.company_id
        }) {
            return Err(AppError::Conflict(
                "user role assignment already exists".to_owned(),
            ));
        }

        assignments.push(user_role);
        Ok(())
    }

    async fn remove(
        &self,
        user_id: UserId,
        role_id: RoleId,
        company_id: Option<CompanyId>,
    ) -> AppResult<bool> {
        let mut assignments = self.assignments.lock().await;
        let before = assignments.len();
        assignments.retain(|assignment| {
            !(assignment.user_id == user_id
                && assignment.role_id == role_id
                && assignment.company_id == company_id)
        });
        Ok(assignments.len() != before)
    }

    async fn remove_all_for_user(&self, user_id: UserId, company_id: CompanyId) -> AppResult<u64> {
        let mut assignments = self.assignments.lock().await;
        let before = assignments.len();
        assignments.retain(|assignment| {
            !(assignment.user_id == user_id && assignment.company_id == Some(company_id))
        });
        Ok((before - assignments.len()) as u64)
    }

    async fn find_platform_assignment(&self, user_id: UserId) -> AppResult<Option<UserRole>> {
        Ok(self
            .assignments
            .lock()
            .await
            .iter()
            .find(|assignment| assignment.user_id == user_id && assignment.company_id.is_none())
            .cloned())
    }

    async fn remove_platform_assignment(&self, user_id: UserId) -> AppResult<bool> {
        let mut assignments = self.assignments.lock().await;
        let before = assignments.len();
        assignments
            .retain(|assignment| !(assignment.user_id == user_id && assignment.company_id.is_none()));
        Ok(assignments.len() != before)
    }
}

#[async_trait]
impl UserDirectory for FakeRoleStore {
    async fn user_type(&self, user_id: UserId) -> AppResult<UserType> {
        self.users
            .lock()
            .await
            .get(&user_id)
            .copied()
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))
    }
}

#[derive(Default)]
pub(crate) struct FakePermissionCache {
    pub(crate) entries: Mutex<HashMap<PermissionCacheKey, PermissionSet>>,
}

#[async_trait]
impl PermissionCache for FakePermissionCache {
    async fn get(&self, key: PermissionCacheKey) -> AppResult<Option<PermissionSet>> {
        Ok(self.entries.lock().await.get(&key).cloned())
    }

    async fn put(
        &self,
        key: PermissionCacheKey,
        permissions: PermissionSet,
        _ttl: Duration,
    ) -> AppResult<()> {
        self.entries.lock().await.insert(key, permissions);
        Ok(())
    }

    async fn invalidate(&self, key: PermissionCacheKey) -> AppResult<()> {
        self.entries.lock().await.remove(&key);
        Ok(())
    }

    async fn invalidate_all(&self) -> AppResult<()> {
        self.entries.lock().await.clear();
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeAuditRepository {
    pub(crate) events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

pub(crate) fn permissions(values: &[&str]) -> PermissionSet {
    values.iter().map(|value| Permission::new(*value)).collect()
}

pub(crate) fn company_role(name: &str, company_id: CompanyId, grants: &[&str]) -> Role {
    Role::company(name, company_id, permissions(grants), false).unwrap_or_else(|_| unreachable!())
}

pub(crate) fn system_role(name: &str, grants: &[&str], is_default: bool) -> Role {
    Role::system(name, permissions(grants), is_default).unwrap_or_else(|_| unreachable!())
}

pub(crate) fn default_company_role(name: &str, company_id: CompanyId, grants: &[&str]) -> Role {
    Role::company(name, company_id, permissions(grants), true).unwrap_or_else(|_| unreachable!())
}

pub(crate) fn platform_role(name: &str, level: CompanyAccessLevel, grants: &[&str]) -> Role {
    Role::platform(name, level, permissions(grants)).unwrap_or_else(|_| unreachable!())
}

pub(crate) fn authorization_service_over(
    store: &Arc<FakeRoleStore>,
    cache: &Arc<FakePermissionCache>,
    audit: &Arc<FakeAuditRepository>,
    policy: AccessPolicy,
) -> AuthorizationService {
    AuthorizationService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        cache.clone(),
        audit.clone(),
        policy,
    )
}
