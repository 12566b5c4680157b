//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_permission_cache;
mod in_memory_role_store;
mod postgres_audit_repository;
mod postgres_role_repository;
mod postgres_user_directory;
mod postgres_user_role_repository;
mod redis_permission_cache;

pub use in_memory_permission_cache::{Clock, InMemoryPermissionCache, SystemClock};
pub use in_memory_role_store::InMemoryRoleStore;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_role_repository::PostgresRoleRepository;
pub use postgres_user_directory::PostgresUserDirectory;
pub use postgres_user_role_repository::PostgresUserRoleRepository;
pub use redis_permission_cache::RedisPermissionCache;
