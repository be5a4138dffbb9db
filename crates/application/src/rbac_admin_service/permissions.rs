use super::*;

use labrix_domain::{Permission, PermissionId, normalize_description};

use crate::rbac_ports::{CreatePermissionInput, PermissionFilter, UpdatePermissionInput};

impl RbacAdminService {
    /// Returns catalog permission records.
    pub async fn list_permissions(
        &self,
        actor: PrincipalId,
        filter: PermissionFilter,
    ) -> AppResult<Vec<Permission>> {
        self.authorization_service
            .authorize(actor, ModuleName::Permissions, &[Action::Read])
            .await?;

        self.permission_repository.list_permissions(filter).await
    }

    /// Returns one catalog permission record.
    pub async fn get_permission(
        &self,
        actor: PrincipalId,
        permission_id: PermissionId,
    ) -> AppResult<Permission> {
        self.authorization_service
            .authorize(actor, ModuleName::Permissions, &[Action::Read])
            .await?;

        self.permission_repository
            .find_permission(permission_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{permission_id}' not found"))
            })
    }

    /// Creates a catalog permission record and emits an audit event.
    ///
    /// Exactly one record may exist per module; absent available actions
    /// fall back to the catalog default set.
    pub async fn create_permission(
        &self,
        actor: PrincipalId,
        input: CreatePermissionInput,
    ) -> AppResult<Permission> {
        let tenant_id = self
            .require_admin_access(actor, ModuleName::Permissions, Action::Write)
            .await?;

        if self
            .permission_repository
            .find_permission_by_module(input.module)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "permission for module '{}' already exists",
                input.module
            )));
        }

        let available_actions = ActionSet::new(
            input
                .available_actions
                .unwrap_or_else(|| ModuleName::default_actions().to_vec()),
        )?;
        let permission = Permission::new(
            input.module,
            available_actions,
            input.description,
            input.is_active,
        );
        self.permission_repository
            .insert_permission(permission.clone())
            .await?;

        self.append_audit(
            tenant_id,
            actor,
            AuditAction::PermissionCreated,
            "rbac_permission",
            permission.id.to_string(),
            format!("created permission for module '{}'", permission.module),
        )
        .await?;

        Ok(permission)
    }

    /// Updates a catalog permission record and emits an audit event.
    ///
    /// The module is immutable. Narrowing available actions does not
    /// retroactively shrink existing role grants.
    pub async fn update_permission(
        &self,
        actor: PrincipalId,
        permission_id: PermissionId,
        input: UpdatePermissionInput,
    ) -> AppResult<Permission> {
        let tenant_id = self
            .require_admin_access(actor, ModuleName::Permissions, Action::Update)
            .await?;

        let mut permission = self
            .permission_repository
            .find_permission(permission_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{permission_id}' not found"))
            })?;

        if let Some(available_actions) = input.available_actions {
            permission.available_actions = ActionSet::new(available_actions)?;
        }

        if let Some(description) = input.description {
            permission.description = normalize_description(Some(description));
        }

        if let Some(is_active) = input.is_active {
            permission.is_active = is_active;
        }

        self.permission_repository
            .update_permission(permission.clone())
            .await?;

        self.append_audit(
            tenant_id,
            actor,
            AuditAction::PermissionUpdated,
            "rbac_permission",
            permission.id.to_string(),
            format!("updated permission for module '{}'", permission.module),
        )
        .await?;

        Ok(permission)
    }

    /// Deletes a catalog permission record and emits an audit event.
    ///
    /// Deletion is refused while any role still holds a grant on the
    /// record.
    pub async fn delete_permission(
        &self,
        actor: PrincipalId,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        let tenant_id = self
            .require_admin_access(actor, ModuleName::Permissions, Action::Delete)
            .await?;

        let permission = self
            .permission_repository
            .find_permission(permission_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{permission_id}' not found"))
            })?;

        let referencing = self
            .permission_repository
            .count_roles_referencing(permission.id)
            .await?;
        if referencing > 0 {
            return Err(AppError::Conflict(format!(
                "permission for module '{}' is referenced by {referencing} role(s)",
                permission.module
            )));
        }

        self.permission_repository
            .delete_permission(permission.id)
            .await?;

        self.append_audit(
            tenant_id,
            actor,
            AuditAction::PermissionDeleted,
            "rbac_permission",
            permission.id.to_string(),
            format!("deleted permission for module '{}'", permission.module),
        )
        .await
    }
}
