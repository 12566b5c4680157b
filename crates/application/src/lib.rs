//! Application services and ports for the Pricora security core.

#![forbid(unsafe_code)]

mod access_policy;
mod authorization_service;
mod role_assignment_service;
mod security_ports;

#[cfg(test)]
mod test_support;

pub use access_policy::AccessPolicy;
pub use authorization_service::AuthorizationService;
pub use role_assignment_service::RoleAssignmentService;
pub use security_ports::{
    AuditEvent, AuditRepository, PermissionCache, PermissionCacheKey, RoleRepository,
    UserDirectory, UserRoleRepository,
};
