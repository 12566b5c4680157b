//! In-memory role store for tests and development.

use std::collections::HashMap;

use async_trait::async_trait;
use pricora_application::{RoleRepository, UserDirectory, UserRoleRepository};
use pricora_core::{AppError, AppResult, CompanyId, UserId};
use pricora_domain::{Role, RoleId, RoleType, UserRole, UserType};
use tokio::sync::RwLock;

/// In-memory adapter implementing the role, assignment, and directory ports.
#[derive(Default)]
pub struct InMemoryRoleStore {
    roles: RwLock<Vec<Role>>,
    assignments: RwLock<Vec<UserRole>>,
    users: RwLock<HashMap<UserId, UserType>>,
}

impl InMemoryRoleStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one role definition.
    pub async fn insert_role(&self, role: Role) {
        self.roles.write().await.push(role);
    }

    /// Registers one user with its classification.
    pub async fn register_user(&self, user_id: UserId, user_type: UserType) {
        self.users.write().await.insert(user_id, user_type);
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleStore {
    async fn find_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self
            .roles
            .read()
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
            .read()
            .await
            .iter()
            .find(|role| {
                role.name() == name
                    && role.company_id() == company_id
                    // A scope-less lookup targets system roles, never the
                    // equally company-less platform roles.
                    && (company_id.is_some() || role.role_type() == RoleType::System)
            })
            .cloned())
    }

    async fn list_visible_to_company(&self, company_id: CompanyId) -> AppResult<Vec<Role>> {
        Ok(self
            .roles
            .read()
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
impl UserRoleRepository for InMemoryRoleStore {
    async fn list_for_user(
        &self,
        user_id: UserId,
        company_id: CompanyId,
    ) -> AppResult<Vec<UserRole>> {
        Ok(self
            .assignments
            .read()
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
            .read()
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
            .read()
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
        let mut assignments = self.assignments.write().await;
        // Mirrors the relational unique constraint on the full triple.
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
        let mut assignments = self.assignments.write().await;
        let before = assignments.len();
        assignments.retain(|assignment| {
            !(assignment.user_id == user_id
                && assignment.role_id == role_id
                && assignment.company_id == company_id)
        });
        Ok(assignments.len() != before)
    }

    async fn remove_all_for_user(&self, user_id: UserId, company_id: CompanyId) -> AppResult<u64> {
        let mut assignments = self.assignments.write().await;
        let before = assignments.len();
        assignments.retain(|assignment| {
            !(assignment.user_id == user_id && assignment.company_id == Some(company_id))
        });
        Ok((before - assignments.len()) as u64)
    }

    async fn find_platform_assignment(&self, user_id: UserId) -> AppResult<Option<UserRole>> {
        Ok(self
            .assignments
            .read()
            .await
            .iter()
            .find(|assignment| assignment.user_id == user_id && assignment.company_id.is_none())
            .cloned())
    }

    async fn remove_platform_assignment(&self, user_id: UserId) -> AppResult<bool> {
        let mut assignments = self.assignments.write().await;
        let before = assignments.len();
        assignments
            .retain(|assignment| !(assignment.user_id == user_id && assignment.company_id.is_none()));
        Ok(assignments.len() != before)
    }
}

#[async_trait]
impl UserDirectory for InMemoryRoleStore {
    async fn user_type(&self, user_id: UserId) -> AppResult<UserType> {
        self.users
            .read()
            .await
            .get(&user_id)
            .copied()
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))
    }
}

#[cfg(test)]
mod tests {
    use pricora_application::{RoleRepository, UserDirectory, UserRoleRepository};
    use pricora_core::{AppError, CompanyId, UserId};
    use pricora_domain::{
        CompanyAccessLevel, Permission, PermissionSet, Role, UserRole, UserType,
    };

    use super::InMemoryRoleStore;

    fn grants(values: &[&str]) -> PermissionSet {
        values.iter().map(|value| Permission::new(*value)).collect()
    }

    #[tokio::test]
    async fn duplicate_assignment_insert_conflicts() {
        let store = InMemoryRoleStore::new();
        let user_id = UserId::new();
        let company_id = CompanyId::new();
        let role = Role::company("sales", company_id, grants(&["customer:read"]), false);
        assert!(role.is_ok());
        let role = role.unwrap_or_else(|_| unreachable!());
        store.insert_role(role.clone()).await;

        let assignment = UserRole {
            user_id,
            role_id: role.id(),
            company_id: Some(company_id),
            assigned_by: None,
        };

        let first = store.insert(assignment.clone()).await;
        assert!(first.is_ok());

        let second = store.insert(assignment).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn assignments_do_not_leak_across_companies() {
        let store = InMemoryRoleStore::new();
        let user_id = UserId::new();
        let company_a = CompanyId::new();
        let company_b = CompanyId::new();
        let role = Role::company("sales", company_a, grants(&["customer:read"]), false)
            .unwrap_or_else(|_| unreachable!());
        store.insert_role(role.clone()).await;

        let inserted = store
            .insert(UserRole {
                user_id,
                role_id: role.id(),
                company_id: Some(company_a),
                assigned_by: None,
            })
            .await;
        assert!(inserted.is_ok());

        let in_a = store.list_for_user(user_id, company_a).await;
        assert!(in_a.is_ok());
        assert_eq!(in_a.unwrap_or_default().len(), 1);

        let in_b = store.list_for_user(user_id, company_b).await;
        assert!(in_b.is_ok());
        assert!(in_b.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn scope_less_name_lookup_ignores_platform_roles() {
        let store = InMemoryRoleStore::new();
        let platform = Role::platform("support", CompanyAccessLevel::Full, grants(&[]))
            .unwrap_or_else(|_| unreachable!());
        let system = Role::system("support", grants(&["customer:read"]), false)
            .unwrap_or_else(|_| unreachable!());
        store.insert_role(platform).await;
        store.insert_role(system.clone()).await;

        let found = store.find_by_name("support", None).await;
        assert!(found.is_ok());
        assert_eq!(
            found.unwrap_or_default().map(|role| role.id()),
            Some(system.id())
        );
    }

    #[tokio::test]
    async fn visible_roles_exclude_foreign_companies_and_platform_roles() {
        let store = InMemoryRoleStore::new();
        let company_id = CompanyId::new();
        let system = Role::system("member", grants(&["customer:read"]), true)
            .unwrap_or_else(|_| unreachable!());
        let local = Role::company("sales", company_id, grants(&["customer:*"]), false)
            .unwrap_or_else(|_| unreachable!());
        let foreign = Role::company("other", CompanyId::new(), grants(&["user:read"]), false)
            .unwrap_or_else(|_| unreachable!());
        let platform = Role::platform("support", CompanyAccessLevel::ReadOnly, grants(&[]))
            .unwrap_or_else(|_| unreachable!());
        for role in [&system, &local, &foreign, &platform] {
            store.insert_role(role.clone()).await;
        }

        let visible = store.list_visible_to_company(company_id).await;
        assert!(visible.is_ok());
        let ids: Vec<_> = visible
            .unwrap_or_default()
            .iter()
            .map(|role| role.id())
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&system.id()));
        assert!(ids.contains(&local.id()));
    }

    #[tokio::test]
    async fn platform_assignment_roundtrip() {
        let store = InMemoryRoleStore::new();
        let user_id = UserId::new();
        let role = Role::platform("support", CompanyAccessLevel::Full, grants(&[]))
            .unwrap_or_else(|_| unreachable!());
        store.insert_role(role.clone()).await;

        let inserted = store
            .insert(UserRole {
                user_id,
                role_id: role.id(),
                company_id: None,
                assigned_by: None,
            })
            .await;
        assert!(inserted.is_ok());

        let found = store.find_platform_assignment(user_id).await;
        assert!(found.is_ok());
        assert!(found.unwrap_or_default().is_some());

        let removed = store.remove_platform_assignment(user_id).await;
        assert!(removed.is_ok());
        assert!(removed.unwrap_or(false));

        let gone = store.find_platform_assignment(user_id).await;
        assert!(gone.is_ok());
        assert!(gone.unwrap_or_default().is_none());
    }

    #[tokio::test]
    async fn remove_all_reports_the_removed_count() {
        let store = InMemoryRoleStore::new();
        let user_id = UserId::new();
        let company_id = CompanyId::new();

        for name in ["sales", "staff"] {
            let role = Role::company(name, company_id, grants(&["customer:read"]), false)
                .unwrap_or_else(|_| unreachable!());
            store.insert_role(role.clone()).await;
            let inserted = store
                .insert(UserRole {
                    user_id,
                    role_id: role.id(),
                    company_id: Some(company_id),
                    assigned_by: None,
                })
                .await;
            assert!(inserted.is_ok());
        }

        let removed = store.remove_all_for_user(user_id, company_id).await;
        assert!(removed.is_ok());
        assert_eq!(removed.unwrap_or(0), 2);

        let repeated = store.remove_all_for_user(user_id, company_id).await;
        assert!(repeated.is_ok());
        assert_eq!(repeated.unwrap_or(1), 0);
    }

    #[tokio::test]
    async fn unknown_users_are_not_found() {
        let store = InMemoryRoleStore::new();
        store.register_user(UserId::new(), UserType::Company).await;

        let missing = store.user_type(UserId::new()).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
