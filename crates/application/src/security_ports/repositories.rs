use async_trait::async_trait;
use pricora_core::{AppResult, CompanyId, UserId};
use pricora_domain::{Role, RoleId, UserRole, UserType};

/// Repository port for role definitions.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Finds one role by id.
    async fn find_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Finds one role by name in an exact scope.
    ///
    /// `Some(company)` matches roles scoped to that company; `None` matches
    /// system roles only.
    async fn find_by_name(
        &self,
        name: &str,
        company_id: Option<CompanyId>,
    ) -> AppResult<Option<Role>>;

    /// Lists the system roles plus the roles scoped to one company.
    async fn list_visible_to_company(&self, company_id: CompanyId) -> AppResult<Vec<Role>>;

    /// Lists the default roles visible to one company.
    async fn list_default_roles(&self, company_id: CompanyId) -> AppResult<Vec<Role>>;
}

/// Repository port for the user-role-company relation.
#[async_trait]
pub trait UserRoleRepository: Send + Sync {
    /// Lists the assignments a user holds in one company.
    async fn list_for_user(
        &self,
        user_id: UserId,
        company_id: CompanyId,
    ) -> AppResult<Vec<UserRole>>;

    /// Lists the assignments carrying one role in one company.
    async fn list_for_role(
        &self,
        role_id: RoleId,
        company_id: CompanyId,
    ) -> AppResult<Vec<UserRole>>;

    /// Finds the exact (user, role, company) assignment, if present.
    async fn find_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
        company_id: Option<CompanyId>,
    ) -> AppResult<Option<UserRole>>;

    /// Inserts one assignment row.
    ///
    /// Fails with a conflict when the exact triple already exists.
    async fn insert(&self, user_role: UserRole) -> AppResult<()>;

    /// Removes one assignment row; returns whether a row was removed.
    async fn remove(
        &self,
        user_id: UserId,
        role_id: RoleId,
        company_id: Option<CompanyId>,
    ) -> AppResult<bool>;

    /// Removes every assignment of a user in one company; returns the count.
    async fn remove_all_for_user(
        &self,
        user_id: UserId,
        company_id: CompanyId,
    ) -> AppResult<u64>;

    /// Finds the company-less platform assignment of a user, if present.
    async fn find_platform_assignment(&self, user_id: UserId) -> AppResult<Option<UserRole>>;

    /// Removes the platform assignment of a user; returns whether one existed.
    async fn remove_platform_assignment(&self, user_id: UserId) -> AppResult<bool>;
}

/// Port resolving a user id to its classification.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns whether the user is a company member or internal staff.
    async fn user_type(&self, user_id: UserId) -> AppResult<UserType>;
}
