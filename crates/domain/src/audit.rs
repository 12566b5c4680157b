//! Stable audit actions emitted by the security services.

use serde::{Deserialize, Serialize};

/// Stable audit actions for role-relation mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role is assigned to a user.
    RoleAssigned,
    /// Emitted when a role assignment is revoked.
    RoleRevoked,
    /// Emitted when every assignment of a user in a company is revoked.
    AllRolesRevoked,
    /// Emitted when default roles are bootstrapped for a new user.
    DefaultRolesAssigned,
    /// Emitted when a platform role is assigned to an internal user.
    PlatformRoleAssigned,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleAssigned => "security.role.assigned",
            Self::RoleRevoked => "security.role.revoked",
            Self::AllRolesRevoked => "security.role.revoked_all",
            Self::DefaultRolesAssigned => "security.role.defaults_assigned",
            Self::PlatformRoleAssigned => "security.platform_role.assigned",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AuditAction;

    #[test]
    fn storage_values_are_distinct() {
        let values = [
            AuditAction::RoleAssigned.as_str(),
            AuditAction::RoleRevoked.as_str(),
            AuditAction::AllRolesRevoked.as_str(),
            AuditAction::DefaultRolesAssigned.as_str(),
            AuditAction::PlatformRoleAssigned.as_str(),
        ];
        let unique: std::collections::BTreeSet<&str> = values.iter().copied().collect();
        assert_eq!(unique.len(), values.len());
    }
}
