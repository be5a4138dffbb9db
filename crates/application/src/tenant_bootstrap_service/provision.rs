use labrix_core::{AppResult, TenantId};
use labrix_domain::{AuditAction, PrincipalId, Role};

use crate::rbac_ports::AuditEvent;

use super::{SYSTEM_SUBJECT, TenantBootstrapService};

impl TenantBootstrapService {
    /// Provisions a tenant: default permissions, the "Admin" role, and an
    /// optional founding principal holding it.
    ///
    /// The attachment is idempotent, so re-running provisioning for a tenant
    /// whose founding principal already holds the role changes nothing. Every
    /// run appends a provisioning audit event under the `system` subject.
    pub async fn provision_tenant(
        &self,
        tenant_id: TenantId,
        initial_admin: Option<PrincipalId>,
    ) -> AppResult<Role> {
        self.ensure_default_permissions().await?;
        let admin_role = self.ensure_system_admin_role(tenant_id).await?;

        if let Some(principal_id) = initial_admin {
            self.principal_repository
                .attach_role_to_principal(principal_id, admin_role.id)
                .await?;
        }

        self.audit_repository
            .append_event(AuditEvent {
                tenant_id,
                subject: SYSTEM_SUBJECT.to_owned(),
                action: AuditAction::TenantProvisioned,
                resource_type: "tenant".to_owned(),
                resource_id: tenant_id.to_string(),
                detail: Some(format!(
                    "provisioned default permissions and role '{}'",
                    admin_role.name.as_str()
                )),
            })
            .await?;

        Ok(admin_role)
    }
}
