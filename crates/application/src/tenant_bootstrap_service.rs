use std::sync::Arc;

use crate::rbac_ports::{
    AuditRepository, PermissionRepository, PrincipalRepository, RoleRepository,
};

const SYSTEM_ADMIN_ROLE_NAME: &str = "Admin";
const SYSTEM_ADMIN_ROLE_DESCRIPTION: &str = "System administrator with full access";

/// Audit subject recorded for writes that happen without an acting principal.
const SYSTEM_SUBJECT: &str = "system";

/// Provisions the permission catalog and the per-tenant system role.
///
/// Provisioning is an explicit step invoked at tenant creation (and safe to
/// re-run), never a side effect of evaluation. Every operation is idempotent:
/// re-running against an already provisioned store performs no writes.
#[derive(Clone)]
pub struct TenantBootstrapService {
    principal_repository: Arc<dyn PrincipalRepository>,
    role_repository: Arc<dyn RoleRepository>,
    permission_repository: Arc<dyn PermissionRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl TenantBootstrapService {
    /// Creates a new bootstrap service from required dependencies.
    #[must_use]
    pub fn new(
        principal_repository: Arc<dyn PrincipalRepository>,
        role_repository: Arc<dyn RoleRepository>,
        permission_repository: Arc<dyn PermissionRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            principal_repository,
            role_repository,
            permission_repository,
            audit_repository,
        }
    }
}

mod admin_role;
mod defaults;
mod provision;
