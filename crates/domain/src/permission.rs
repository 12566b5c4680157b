//! Permission grammar and wildcard matching.
//!
//! Permissions are opaque `resource:action` tokens. The matcher understands
//! exactly two wildcard forms: the universal `*` and the per-resource
//! `resource:*`. Resource names match by exact string equality before the
//! colon, never by prefix.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Reserved resource namespace for platform-level permissions.
pub const PLATFORM_RESOURCE: &str = "platform";

const GLOBAL_WILDCARD: &str = "*";

/// An opaque permission token.
///
/// Takes the form `resource:action` (for example `user:read`), the resource
/// wildcard `resource:*`, or the universal wildcard `*`. The engine never
/// validates resource names; an unknown resource simply never matches a real
/// requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    /// Creates a permission from its string form.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the universal wildcard permission.
    #[must_use]
    pub fn global_wildcard() -> Self {
        Self(GLOBAL_WILDCARD.to_owned())
    }

    /// Builds the `resource:*` wildcard for one resource.
    #[must_use]
    pub fn resource_wildcard(resource: &str) -> Self {
        Self(format!("{resource}:{GLOBAL_WILDCARD}"))
    }

    /// Builds the `resource:read` permission for one resource.
    #[must_use]
    pub fn read(resource: &str) -> Self {
        Self(format!("{resource}:read"))
    }

    /// Returns the underlying string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether this is the universal wildcard `*`.
    #[must_use]
    pub fn is_global_wildcard(&self) -> bool {
        self.0 == GLOBAL_WILDCARD
    }

    /// Returns the resource component, the text before the first `:`.
    #[must_use]
    pub fn resource(&self) -> Option<&str> {
        self.0.split_once(':').map(|(resource, _)| resource)
    }

    /// Returns the action component, the text after the first `:`.
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.0.split_once(':').map(|(_, action)| action)
    }

    /// Returns whether this permission lives in the reserved `platform`
    /// namespace.
    #[must_use]
    pub fn is_platform_scoped(&self) -> bool {
        self.resource() == Some(PLATFORM_RESOURCE)
    }
}

impl Display for Permission {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// De-duplicated, order-irrelevant set of held permissions.
///
/// Carries the matching rules deciding whether a held set satisfies a
/// required permission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a set holding only the universal wildcard.
    #[must_use]
    pub fn global_wildcard() -> Self {
        Self(BTreeSet::from([Permission::global_wildcard()]))
    }

    /// Inserts one permission; returns whether the set changed.
    pub fn insert(&mut self, permission: Permission) -> bool {
        self.0.insert(permission)
    }

    /// Returns whether the exact string is present, without wildcard rules.
    #[must_use]
    pub fn contains(&self, permission: &Permission) -> bool {
        self.0.contains(permission)
    }

    /// Iterates the held permissions in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.0.iter()
    }

    /// Returns the number of distinct permissions held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no permission is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decides whether the held set satisfies one required permission.
    ///
    /// Evaluated in precedence order: the universal wildcard grants
    /// everything; an empty requirement is satisfied by nothing else; the
    /// exact `resource:*` entry grants every action on that resource
    /// (`use:*` never satisfies `user:read`); finally the literal string
    /// itself.
    #[must_use]
    pub fn grants(&self, required: &Permission) -> bool {
        if self.0.contains(&Permission::global_wildcard()) {
            return true;
        }

        if required.as_str().is_empty() {
            return false;
        }

        if let Some(resource) = required.resource()
            && self.0.contains(&Permission::resource_wildcard(resource))
        {
            return true;
        }

        self.0.contains(required)
    }

    /// Returns whether every listed requirement is satisfied.
    #[must_use]
    pub fn grants_all(&self, required: &[Permission]) -> bool {
        required.iter().all(|permission| self.grants(permission))
    }

    /// Returns whether at least one listed requirement is satisfied.
    #[must_use]
    pub fn grants_any(&self, required: &[Permission]) -> bool {
        required.iter().any(|permission| self.grants(permission))
    }

    /// Returns the subset living in the reserved `platform` namespace.
    #[must_use]
    pub fn platform_scoped(&self) -> Self {
        self.0
            .iter()
            .filter(|permission| permission.is_platform_scoped())
            .cloned()
            .collect()
    }

    /// Returns the set with every `platform:`-prefixed entry removed.
    #[must_use]
    pub fn without_platform_scoped(&self) -> Self {
        self.0
            .iter()
            .filter(|permission| !permission.is_platform_scoped())
            .cloned()
            .collect()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Permission> for PermissionSet {
    fn extend<I: IntoIterator<Item = Permission>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}
