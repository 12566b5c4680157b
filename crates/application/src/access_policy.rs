//! Static access-policy configuration.

use pricora_domain::{Permission, PermissionSet};

/// Precomputed permission registry supplied by deployment configuration.
///
/// The `ReadOnly` platform access level resolves to the `:read` permission
/// of every resource the deployment knows about. That resource list is
/// supplied here, once, by the host application; the engine never derives
/// it at runtime.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    read_only_permissions: PermissionSet,
}

impl AccessPolicy {
    /// Builds the policy from the deployment's resource list.
    #[must_use]
    pub fn from_resources<'a, I>(resources: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            read_only_permissions: resources.into_iter().map(Permission::read).collect(),
        }
    }

    /// Returns the all-resources read set granted to `ReadOnly` platform
    /// roles.
    #[must_use]
    pub fn read_only_permissions(&self) -> &PermissionSet {
        &self.read_only_permissions
    }
}

#[cfg(test)]
mod tests {
    use pricora_domain::Permission;

    use super::AccessPolicy;

    #[test]
    fn builds_one_read_permission_per_resource() {
        let policy = AccessPolicy::from_resources(["company", "office", "user"]);
        let read_set = policy.read_only_permissions();

        assert_eq!(read_set.len(), 3);
        assert!(read_set.contains(&Permission::new("office:read")));
        assert!(!read_set.contains(&Permission::new("office:create")));
    }

    #[test]
    fn default_policy_grants_nothing() {
        assert!(AccessPolicy::default().read_only_permissions().is_empty());
    }
}
