use serde::{Deserialize, Serialize};

/// Kinds of administrative and provisioning writes recorded in the audit
/// trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role is created.
    RoleCreated,
    /// Emitted when a role is updated.
    RoleUpdated,
    /// Emitted when a role is deleted.
    RoleDeleted,
    /// Emitted when a permission record is created.
    PermissionCreated,
    /// Emitted when a permission record is updated.
    PermissionUpdated,
    /// Emitted when a permission record is deleted.
    PermissionDeleted,
    /// Emitted when a tenant is provisioned with defaults and an admin role.
    TenantProvisioned,
}

impl AuditAction {
    /// Namespaced storage value, e.g. `"rbac.role.created"`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleCreated => "rbac.role.created",
            Self::RoleUpdated => "rbac.role.updated",
            Self::RoleDeleted => "rbac.role.deleted",
            Self::PermissionCreated => "rbac.permission.created",
            Self::PermissionUpdated => "rbac.permission.updated",
            Self::PermissionDeleted => "rbac.permission.deleted",
            Self::TenantProvisioned => "rbac.tenant.provisioned",
        }
    }
}
