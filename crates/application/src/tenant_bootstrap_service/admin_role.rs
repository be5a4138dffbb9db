use std::collections::HashSet;

use labrix_core::{AppError, AppResult, TenantId};
use labrix_domain::{Permission, PermissionId, Role, RoleGrant};

use crate::rbac_ports::PermissionFilter;

use super::{SYSTEM_ADMIN_ROLE_DESCRIPTION, SYSTEM_ADMIN_ROLE_NAME, TenantBootstrapService};

impl TenantBootstrapService {
    /// Ensures the tenant has its protected "Admin" role covering the catalog.
    ///
    /// The role grants every active permission at its full available actions.
    /// An existing role is rewritten only when its granted permission-id set
    /// differs from the active catalog's id set; a consistent role produces
    /// no write. Permissions deactivated since the last run fall out of the
    /// role, newly added modules fall in.
    pub async fn ensure_system_admin_role(&self, tenant_id: TenantId) -> AppResult<Role> {
        let active_permissions = self
            .permission_repository
            .list_permissions(PermissionFilter {
                is_active: Some(true),
            })
            .await?;

        if let Some(role) = self
            .role_repository
            .find_role_by_name(tenant_id, SYSTEM_ADMIN_ROLE_NAME)
            .await?
        {
            return self.reconcile_admin_grants(role, &active_permissions).await;
        }

        let role = Role::new_system(
            tenant_id,
            SYSTEM_ADMIN_ROLE_NAME,
            Some(SYSTEM_ADMIN_ROLE_DESCRIPTION.to_owned()),
            full_grants(&active_permissions),
        )?;

        match self.role_repository.insert_role(role.clone()).await {
            Ok(()) => Ok(role),
            // Another provisioner created the role between lookup and insert.
            Err(AppError::DuplicateRole { .. }) => {
                let role = self
                    .role_repository
                    .find_role_by_name(tenant_id, SYSTEM_ADMIN_ROLE_NAME)
                    .await?
                    .ok_or_else(|| {
                        AppError::Internal(format!(
                            "admin role for tenant '{tenant_id}' vanished after a duplicate insert"
                        ))
                    })?;
                self.reconcile_admin_grants(role, &active_permissions).await
            }
            Err(error) => Err(error),
        }
    }

    async fn reconcile_admin_grants(
        &self,
        mut role: Role,
        active_permissions: &[Permission],
    ) -> AppResult<Role> {
        let granted: HashSet<PermissionId> = role.granted_permission_ids().into_iter().collect();
        let expected: HashSet<PermissionId> = active_permissions
            .iter()
            .map(|permission| permission.id)
            .collect();
        if granted == expected {
            return Ok(role);
        }

        role.grants = full_grants(active_permissions);
        self.role_repository.update_role(role.clone()).await?;
        Ok(role)
    }
}

fn full_grants(permissions: &[Permission]) -> Vec<RoleGrant> {
    permissions
        .iter()
        .map(|permission| RoleGrant {
            permission_id: permission.id,
            allowed_actions: permission.available_actions.clone(),
        })
        .collect()
}
