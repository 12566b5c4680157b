//! Role entities and the user-role-company relation.

use std::fmt::{Display, Formatter};

use pricora_core::{AppError, AppResult, CompanyId, NonEmptyString, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permission::PermissionSet;

/// Unique identifier for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(Uuid);

impl RoleId {
    /// Creates a random role identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a role identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Distinguishes global, company-scoped, and platform roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    /// Global role visible to every company.
    System,
    /// Role scoped to exactly one company.
    Company,
    /// Role assignable only to internal users; carries a company access level.
    Platform,
}

impl RoleType {
    /// Returns a stable storage value for this role type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Company => "company",
            Self::Platform => "platform",
        }
    }

    /// Parses a storage value into a role type.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "system" => Ok(Self::System),
            "company" => Ok(Self::Company),
            "platform" => Ok(Self::Platform),
            _ => Err(AppError::Validation(format!("unknown role type '{value}'"))),
        }
    }
}

/// Company-context access granted by a platform role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyAccessLevel {
    /// Superuser in every company.
    Full,
    /// Read access to every resource in every company.
    ReadOnly,
    /// Exactly the role's own non-platform permissions, in every company.
    Custom,
}

impl CompanyAccessLevel {
    /// Returns a stable storage value for this access level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::ReadOnly => "read_only",
            Self::Custom => "custom",
        }
    }

    /// Parses a storage value into an access level.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "full" => Ok(Self::Full),
            "read_only" => Ok(Self::ReadOnly),
            "custom" => Ok(Self::Custom),
            _ => Err(AppError::Validation(format!(
                "unknown company access level '{value}'"
            ))),
        }
    }
}

/// A named set of permission grants.
///
/// Scope invariants are enforced at construction: company roles belong to
/// exactly one company, system and platform roles to none, and only
/// platform roles carry a company access level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    id: RoleId,
    name: String,
    role_type: RoleType,
    company_id: Option<CompanyId>,
    permissions: PermissionSet,
    is_default: bool,
    company_access_level: Option<CompanyAccessLevel>,
}

impl Role {
    /// Restores a role from stored parts, enforcing scope invariants.
    pub fn from_parts(
        id: RoleId,
        name: impl Into<String>,
        role_type: RoleType,
        company_id: Option<CompanyId>,
        permissions: PermissionSet,
        is_default: bool,
        company_access_level: Option<CompanyAccessLevel>,
    ) -> AppResult<Self> {
        let name = NonEmptyString::new(name)?;

        match role_type {
            RoleType::Company => {
                if company_id.is_none() {
                    return Err(AppError::Validation(format!(
                        "company role '{}' must be scoped to a company",
                        name.as_str()
                    )));
                }
            }
            RoleType::System | RoleType::Platform => {
                if company_id.is_some() {
                    return Err(AppError::Validation(format!(
                        "{} role '{}' must not be scoped to a company",
                        role_type.as_str(),
                        name.as_str()
                    )));
                }
            }
        }

        if role_type == RoleType::Platform && company_access_level.is_none() {
            return Err(AppError::Validation(format!(
                "platform role '{}' requires a company access level",
                name.as_str()
            )));
        }

        if role_type != RoleType::Platform && company_access_level.is_some() {
            return Err(AppError::Validation(format!(
                "{} role '{}' must not carry a company access level",
                role_type.as_str(),
                name.as_str()
            )));
        }

        Ok(Self {
            id,
            name: name.into(),
            role_type,
            company_id,
            permissions,
            is_default,
            company_access_level,
        })
    }

    /// Creates a global system role.
    pub fn system(
        name: impl Into<String>,
        permissions: PermissionSet,
        is_default: bool,
    ) -> AppResult<Self> {
        Self::from_parts(
            RoleId::new(),
            name,
            RoleType::System,
            None,
            permissions,
            is_default,
            None,
        )
    }

    /// Creates a role scoped to one company.
    pub fn company(
        name: impl Into<String>,
        company_id: CompanyId,
        permissions: PermissionSet,
        is_default: bool,
    ) -> AppResult<Self> {
        Self::from_parts(
            RoleId::new(),
            name,
            RoleType::Company,
            Some(company_id),
            permissions,
            is_default,
            None,
        )
    }

    /// Creates a platform role for internal users.
    pub fn platform(
        name: impl Into<String>,
        company_access_level: CompanyAccessLevel,
        permissions: PermissionSet,
    ) -> AppResult<Self> {
        Self::from_parts(
            RoleId::new(),
            name,
            RoleType::Platform,
            None,
            permissions,
            false,
            Some(company_access_level),
        )
    }

    /// Returns the stable role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the role type.
    #[must_use]
    pub fn role_type(&self) -> RoleType {
        self.role_type
    }

    /// Returns the owning company for company-scoped roles.
    #[must_use]
    pub fn company_id(&self) -> Option<CompanyId> {
        self.company_id
    }

    /// Returns the permission grants attached to the role.
    #[must_use]
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Returns whether the role is auto-assigned to new company users.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Returns the company access level for platform roles.
    #[must_use]
    pub fn company_access_level(&self) -> Option<CompanyAccessLevel> {
        self.company_access_level
    }
}

/// Relation row joining a user to a role, optionally within one company.
///
/// `company_id` is `None` only for platform-role assignments held by
/// internal users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRole {
    /// User holding the role.
    pub user_id: UserId,
    /// Role held.
    pub role_id: RoleId,
    /// Company scope of the assignment.
    pub company_id: Option<CompanyId>,
    /// User that created the assignment, when known.
    pub assigned_by: Option<UserId>,
}
