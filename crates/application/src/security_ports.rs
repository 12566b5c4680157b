//! Ports required by the security services.

mod audit;
mod cache;
mod repositories;

pub use audit::{AuditEvent, AuditRepository};
pub use cache::{PermissionCache, PermissionCacheKey};
pub use repositories::{RoleRepository, UserDirectory, UserRoleRepository};
