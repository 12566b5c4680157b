//! In-memory permission cache with lazy TTL expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pricora_application::{PermissionCache, PermissionCacheKey};
use pricora_core::AppResult;
use pricora_domain::PermissionSet;
use tokio::sync::RwLock;

/// Time source for cache expiry decisions.
///
/// Injected so test suites can control time deterministically instead of
/// waiting out real TTLs.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Wall-clock time source used outside of tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    permissions: PermissionSet,
    expires_at: Instant,
}

/// In-memory adapter for the permission cache port.
///
/// Expiry is checked lazily on read; there is no background sweeper.
pub struct InMemoryPermissionCache {
    entries: RwLock<HashMap<PermissionCacheKey, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryPermissionCache {
    /// Creates an empty cache reading wall-clock time.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty cache with an injected time source.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }
}

impl Default for InMemoryPermissionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PermissionCache for InMemoryPermissionCache {
    async fn get(&self, key: PermissionCacheKey) -> AppResult<Option<PermissionSet>> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(&key) {
                if entry.expires_at > self.clock.now() {
                    return Ok(Some(entry.permissions.clone()));
                }
            } else {
                return Ok(None);
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(&key)
            .is_some_and(|entry| entry.expires_at <= self.clock.now())
        {
            entries.remove(&key);
        }

        Ok(None)
    }

    async fn put(
        &self,
        key: PermissionCacheKey,
        permissions: PermissionSet,
        ttl: Duration,
    ) -> AppResult<()> {
        if ttl.is_zero() {
            return Ok(());
        }

        let now = self.clock.now();
        let expires_at = now.checked_add(ttl).unwrap_or(now);

        self.entries.write().await.insert(
            key,
            CacheEntry {
                permissions,
                expires_at,
            },
        );

        Ok(())
    }

    async fn invalidate(&self, key: PermissionCacheKey) -> AppResult<()> {
        self.entries.write().await.remove(&key);
        Ok(())
    }

    async fn invalidate_all(&self) -> AppResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}
