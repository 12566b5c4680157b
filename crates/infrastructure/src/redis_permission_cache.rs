//! Redis-backed permission cache.

use std::time::Duration;

use async_trait::async_trait;
use pricora_application::{PermissionCache, PermissionCacheKey};
use pricora_core::{AppError, AppResult};
use pricora_domain::PermissionSet;
use redis::AsyncCommands;

/// Redis implementation of the permission cache port.
///
/// Expiry is delegated to Redis key TTLs, so entries disappear on their own
/// without a lazy read-side check.
#[derive(Clone)]
pub struct RedisPermissionCache {
    client: redis::Client,
    key_prefix: String,
}

impl RedisPermissionCache {
    /// Creates a cache adapter with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, key: PermissionCacheKey) -> String {
        format!(
            "{}:company={}:user={}",
            self.key_prefix, key.company_id, key.user_id
        )
    }

    fn encode_permissions(permissions: &PermissionSet) -> AppResult<String> {
        serde_json::to_string(permissions).map_err(|error| {
            AppError::Internal(format!("failed to encode permission cache entry: {error}"))
        })
    }

    fn decode_permissions(value: &str) -> AppResult<PermissionSet> {
        serde_json::from_str(value).map_err(|error| {
            AppError::Internal(format!(
                "invalid permission cache value '{value}': {error}"
            ))
        })
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl PermissionCache for RedisPermissionCache {
    async fn get(&self, key: PermissionCacheKey) -> AppResult<Option<PermissionSet>> {
        let mut connection = self.connection().await?;

        let encoded: Option<String> = connection.get(self.key_for(key)).await.map_err(|error| {
            AppError::Internal(format!("failed to read permission cache entry: {error}"))
        })?;

        encoded.as_deref().map(Self::decode_permissions).transpose()
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

        let value = Self::encode_permissions(&permissions)?;
        let mut connection = self.connection().await?;

        connection
            .set_ex(self.key_for(key), value, ttl.as_secs())
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to write permission cache entry: {error}"))
            })
    }

    async fn invalidate(&self, key: PermissionCacheKey) -> AppResult<()> {
        let mut connection = self.connection().await?;

        let _: () = connection.del(self.key_for(key)).await.map_err(|error| {
            AppError::Internal(format!("failed to delete permission cache entry: {error}"))
        })?;

        Ok(())
    }

    async fn invalidate_all(&self) -> AppResult<()> {
        let mut connection = self.connection().await?;
        let pattern = format!("{}:*", self.key_prefix);

        let mut keys: Vec<String> = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern.as_str())
                .arg("COUNT")
                .arg(100)
                .query_async(&mut connection)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to scan permission cache keys: {error}"))
                })?;

            keys.extend(batch);
            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        if keys.is_empty() {
            return Ok(());
        }

        let _: () = connection.del(keys).await.map_err(|error| {
            AppError::Internal(format!("failed to clear permission cache entries: {error}"))
        })?;

        Ok(())
    }
}
