use super::*;

use labrix_core::NonEmptyString;
use labrix_domain::normalize_description;

use crate::rbac_ports::{CreateRoleInput, RoleFilter, UpdateRoleInput};

impl RbacAdminService {
    /// Returns the actor's tenant roles.
    pub async fn list_roles(
        &self,
        actor: PrincipalId,
        filter: RoleFilter,
    ) -> AppResult<Vec<Role>> {
        let tenant_id = self
            .require_admin_access(actor, ModuleName::Roles, Action::Read)
            .await?;

        self.role_repository.list_roles(tenant_id, filter).await
    }

    /// Returns one role of the actor's tenant.
    pub async fn get_role(&self, actor: PrincipalId, role_id: RoleId) -> AppResult<Role> {
        let tenant_id = self
            .require_admin_access(actor, ModuleName::Roles, Action::Read)
            .await?;

        self.find_tenant_role(tenant_id, role_id).await
    }

    /// Returns the principals currently holding a role of the actor's
    /// tenant.
    pub async fn role_members(
        &self,
        actor: PrincipalId,
        role_id: RoleId,
    ) -> AppResult<Vec<PrincipalId>> {
        let tenant_id = self
            .require_admin_access(actor, ModuleName::Roles, Action::Read)
            .await?;

        let role = self.find_tenant_role(tenant_id, role_id).await?;
        self.principal_repository
            .principal_ids_with_role(role.id)
            .await
    }

    /// Creates a role in the actor's tenant and emits an audit event.
    ///
    /// Never creates system roles; those exist only through provisioning.
    pub async fn create_role(
        &self,
        actor: PrincipalId,
        input: CreateRoleInput,
    ) -> AppResult<Role> {
        let tenant_id = self
            .require_admin_access(actor, ModuleName::Roles, Action::Write)
            .await?;

        let name = NonEmptyString::new(input.name.trim().to_owned())?;
        if self
            .role_repository
            .find_role_by_name(tenant_id, name.as_str())
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateRole {
                name: name.as_str().to_owned(),
            });
        }

        let grants = self.validate_grants(&input.grants).await?;
        let role = Role::new(tenant_id, name, input.description, grants, input.is_active)?;
        self.role_repository.insert_role(role.clone()).await?;

        self.append_audit(
            tenant_id,
            actor,
            AuditAction::RoleCreated,
            "rbac_role",
            role.id.to_string(),
            format!("created role '{}'", role.name.as_str()),
        )
        .await?;

        Ok(role)
    }

    /// Updates a role of the actor's tenant and emits an audit event.
    ///
    /// System roles refuse renames and deactivation; their description and
    /// grants stay editable.
    pub async fn update_role(
        &self,
        actor: PrincipalId,
        role_id: RoleId,
        input: UpdateRoleInput,
    ) -> AppResult<Role> {
        let tenant_id = self
            .require_admin_access(actor, ModuleName::Roles, Action::Update)
            .await?;

        let mut role = self.find_tenant_role(tenant_id, role_id).await?;

        if let Some(new_name) = input.name {
            let new_name = NonEmptyString::new(new_name.trim().to_owned())?;
            if new_name.as_str() != role.name.as_str() {
                if role.is_system {
                    return Err(AppError::ProtectedRole {
                        name: role.name.as_str().to_owned(),
                        reason: "system roles cannot be renamed".to_owned(),
                    });
                }

                let collides = self
                    .role_repository
                    .find_role_by_name(tenant_id, new_name.as_str())
                    .await?
                    .is_some_and(|existing| existing.id != role.id);
                if collides {
                    return Err(AppError::DuplicateRole {
                        name: new_name.as_str().to_owned(),
                    });
                }

                role.name = new_name;
            }
        }

        if let Some(is_active) = input.is_active {
            if role.is_system && !is_active {
                return Err(AppError::ProtectedRole {
                    name: role.name.as_str().to_owned(),
                    reason: "system roles cannot be deactivated".to_owned(),
                });
            }
            role.is_active = is_active;
        }

        if let Some(description) = input.description {
            role.description = normalize_description(Some(description));
        }

        if let Some(grants) = input.grants {
            role.grants = self.validate_grants(&grants).await?;
        }

        self.role_repository.update_role(role.clone()).await?;

        self.append_audit(
            tenant_id,
            actor,
            AuditAction::RoleUpdated,
            "rbac_role",
            role.id.to_string(),
            format!("updated role '{}'", role.name.as_str()),
        )
        .await?;

        Ok(role)
    }

    /// Deletes a role of the actor's tenant and emits an audit event.
    ///
    /// System roles are refused before any reference counting; regular
    /// roles are refused while principals still hold them.
    pub async fn delete_role(&self, actor: PrincipalId, role_id: RoleId) -> AppResult<()> {
        let tenant_id = self
            .require_admin_access(actor, ModuleName::Roles, Action::Delete)
            .await?;

        let role = self.find_tenant_role(tenant_id, role_id).await?;

        if role.is_system {
            return Err(AppError::ProtectedRole {
                name: role.name.as_str().to_owned(),
                reason: "system roles cannot be deleted".to_owned(),
            });
        }

        let member_ids = self
            .principal_repository
            .principal_ids_with_role(role.id)
            .await?;
        if !member_ids.is_empty() {
            return Err(AppError::RoleInUse {
                name: role.name.as_str().to_owned(),
                principal_count: member_ids.len(),
            });
        }

        self.role_repository.delete_role(role.id).await?;

        self.append_audit(
            tenant_id,
            actor,
            AuditAction::RoleDeleted,
            "rbac_role",
            role.id.to_string(),
            format!("deleted role '{}'", role.name.as_str()),
        )
        .await
    }
}
