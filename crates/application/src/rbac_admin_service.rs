use std::sync::Arc;

use labrix_core::{AppError, AppResult, TenantId};
use labrix_domain::{
    Action, ActionSet, AuditAction, ModuleName, PrincipalId, Role, RoleGrant, RoleId,
};

use crate::AuthorizationService;
use crate::rbac_ports::{
    AuditEvent, AuditRepository, GrantInput, PermissionRepository, PrincipalRepository,
    RoleRepository,
};

mod permissions;
mod roles;

/// Application service for role and permission administration.
///
/// Every operation authorizes the acting principal through the same engine
/// it administers: role operations gate on the "Roles" module, permission
/// operations on the "Permissions" module, with the action matching the
/// operation. Tenant-scoped operations derive their tenant from the actor,
/// never from the input.
#[derive(Clone)]
pub struct RbacAdminService {
    authorization_service: AuthorizationService,
    principal_repository: Arc<dyn PrincipalRepository>,
    role_repository: Arc<dyn RoleRepository>,
    permission_repository: Arc<dyn PermissionRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl RbacAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        principal_repository: Arc<dyn PrincipalRepository>,
        role_repository: Arc<dyn RoleRepository>,
        permission_repository: Arc<dyn PermissionRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            principal_repository,
            role_repository,
            permission_repository,
            audit_repository,
        }
    }

    /// Authorizes the actor for an administrative operation and returns the
    /// actor's tenant.
    async fn require_admin_access(
        &self,
        actor: PrincipalId,
        module: ModuleName,
        action: Action,
    ) -> AppResult<TenantId> {
        self.authorization_service
            .authorize(actor, module, &[action])
            .await?;

        let principal = self.authorization_service.resolve_principal(actor).await?;
        principal.tenant_id.ok_or_else(|| {
            AppError::NoTenantContext(format!("principal '{actor}' has no tenant"))
        })
    }

    /// Finds a role in the actor's tenant. Roles of other tenants are
    /// reported as missing, never as foreign.
    async fn find_tenant_role(&self, tenant_id: TenantId, role_id: RoleId) -> AppResult<Role> {
        self.role_repository
            .find_role(role_id)
            .await?
            .filter(|role| role.tenant_id == tenant_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' not found")))
    }

    /// Validates requested grants against the catalog.
    ///
    /// Each grant must reference an existing, active permission and request
    /// a non-empty subset of the permission's available actions.
    async fn validate_grants(&self, grants: &[GrantInput]) -> AppResult<Vec<RoleGrant>> {
        let mut validated = Vec::with_capacity(grants.len());
        for input in grants {
            let permission = self
                .permission_repository
                .find_permission(input.permission_id)
                .await?
                .ok_or_else(|| AppError::InvalidGrant {
                    module: input.permission_id.to_string(),
                    reason: "permission does not exist".to_owned(),
                })?;

            if !permission.is_active {
                return Err(AppError::InvalidGrant {
                    module: permission.module.to_string(),
                    reason: "permission is inactive".to_owned(),
                });
            }

            let allowed_actions =
                ActionSet::new(input.actions.clone()).map_err(|_| AppError::InvalidGrant {
                    module: permission.module.to_string(),
                    reason: "grant must allow at least one action".to_owned(),
                })?;

            if !allowed_actions.is_subset_of(&permission.available_actions) {
                let invalid: Vec<&str> = allowed_actions
                    .iter()
                    .filter(|action| !permission.available_actions.contains(**action))
                    .map(|action| action.as_str())
                    .collect();

                return Err(AppError::InvalidGrant {
                    module: permission.module.to_string(),
                    reason: format!("actions not available: {}", invalid.join(", ")),
                });
            }

            validated.push(RoleGrant {
                permission_id: permission.id,
                allowed_actions,
            });
        }

        Ok(validated)
    }

    async fn append_audit(
        &self,
        tenant_id: TenantId,
        actor: PrincipalId,
        action: AuditAction,
        resource_type: &str,
        resource_id: String,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                tenant_id,
                subject: actor.to_string(),
                action,
                resource_type: resource_type.to_owned(),
                resource_id,
                detail: Some(detail),
            })
            .await
    }
}
