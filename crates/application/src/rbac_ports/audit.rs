use async_trait::async_trait;
use labrix_core::{AppResult, TenantId};
use labrix_domain::AuditAction;

/// One append-only audit record.
///
/// Administrative mutations and tenant provisioning emit these instead of
/// writing actor columns onto the mutated records. Timestamps and sequence
/// numbers are storage-assigned on append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Tenant the mutated resource belongs to.
    pub tenant_id: TenantId,
    /// Acting principal id, or `"system"` for provisioning runs that have no
    /// actor.
    pub subject: String,
    /// Namespaced audit action, stored through its stable string form.
    pub action: AuditAction,
    /// Kind of resource the event refers to, e.g. `"rbac_role"`.
    pub resource_type: String,
    /// Identifier of the mutated resource.
    pub resource_id: String,
    /// Optional free-text detail.
    pub detail: Option<String>,
}

/// Port for appending audit events to durable storage.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Persists one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}
