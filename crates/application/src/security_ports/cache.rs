use std::time::Duration;

use async_trait::async_trait;
use pricora_core::{AppResult, CompanyId, UserId};
use pricora_domain::PermissionSet;

/// Composite key for cached permission resolutions.
///
/// Keying by both ids is what keeps company contexts isolated: two
/// resolutions for the same user in different companies never share an
/// entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PermissionCacheKey {
    /// User the resolution belongs to.
    pub user_id: UserId,
    /// Company context of the resolution.
    pub company_id: CompanyId,
}

/// Cache port for resolved permission sets.
///
/// Entries hold no authoritative state; dropping one at any time costs at
/// most one extra resolution.
#[async_trait]
pub trait PermissionCache: Send + Sync {
    /// Returns the cached set for one key, if present and unexpired.
    async fn get(&self, key: PermissionCacheKey) -> AppResult<Option<PermissionSet>>;

    /// Stores a resolved set with an absolute expiry of `ttl` from now.
    async fn put(
        &self,
        key: PermissionCacheKey,
        permissions: PermissionSet,
        ttl: Duration,
    ) -> AppResult<()>;

    /// Removes exactly one entry; succeeds when no entry exists.
    async fn invalidate(&self, key: PermissionCacheKey) -> AppResult<()>;

    /// Clears every entry; used after bulk role changes.
    async fn invalidate_all(&self) -> AppResult<()>;
}
