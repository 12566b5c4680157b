use async_trait::async_trait;
use pricora_core::{AppResult, CompanyId, UserId};
use pricora_domain::AuditAction;

/// Immutable audit event payload emitted by the security services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Company scope of the event; `None` for platform-level events.
    pub company_id: Option<CompanyId>,
    /// User that performed the action, when known.
    pub actor: Option<UserId>,
    /// Stable audit action identifier.
    pub action: AuditAction,
    /// Resource type label.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: String,
    /// Optional audit detail payload.
    pub detail: Option<String>,
}

/// Port for persisting append-only audit events.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Persists one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}
