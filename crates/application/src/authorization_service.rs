use std::collections::HashMap;
use std::sync::Arc;

use labrix_core::{AppError, AppResult};
use labrix_domain::{
    Action, ModuleName, Permission, PermissionId, Principal, PrincipalId, Role, describe_actions,
};

use crate::rbac_ports::{PermissionRepository, PrincipalRepository, RoleRepository};

mod effective;
mod role_checks;
#[cfg(test)]
mod tests;

pub use effective::{EffectivePermissions, ModuleAccess};

/// One module/action requirement inside an any-of authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessCheck {
    /// Requested module.
    pub module: ModuleName,
    /// Actions required on the module. An empty list accepts any grant on
    /// the module.
    pub actions: Vec<Action>,
}

/// Application service for tenant-scoped authorization decisions.
///
/// Every decision is a pure function of the principal, its roles, and the
/// permission catalog at evaluation time; nothing is cached between calls.
#[derive(Clone)]
pub struct AuthorizationService {
    principal_repository: Arc<dyn PrincipalRepository>,
    role_repository: Arc<dyn RoleRepository>,
    permission_repository: Arc<dyn PermissionRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from repository implementations.
    #[must_use]
    pub fn new(
        principal_repository: Arc<dyn PrincipalRepository>,
        role_repository: Arc<dyn RoleRepository>,
        permission_repository: Arc<dyn PermissionRepository>,
    ) -> Self {
        Self {
            principal_repository,
            role_repository,
            permission_repository,
        }
    }

    /// Ensures the principal may perform every required action on the
    /// module.
    ///
    /// A single role must cover the full requirement; actions never combine
    /// across roles. An empty requirement accepts any grant on the module.
    pub async fn authorize(
        &self,
        principal_id: PrincipalId,
        module: ModuleName,
        required_actions: &[Action],
    ) -> AppResult<()> {
        let roles = self.load_usable_roles(principal_id).await?;
        if has_system_role(&roles) {
            return Ok(());
        }

        if !roles.is_empty() {
            let permissions_by_id = self.load_granted_permissions(&roles).await?;
            let covered = roles
                .iter()
                .any(|role| role_covers(role, &permissions_by_id, module, required_actions));
            if covered {
                return Ok(());
            }
        }

        Err(AppError::Forbidden(format!(
            "access denied: module '{module}' requires actions [{}]",
            describe_actions(required_actions)
        )))
    }

    /// Ensures the principal satisfies at least one of the checks.
    ///
    /// Checks are evaluated in order with the same single-role rule as
    /// [`authorize`](Self::authorize); an empty check list always denies.
    pub async fn authorize_any(
        &self,
        principal_id: PrincipalId,
        checks: &[AccessCheck],
    ) -> AppResult<()> {
        let roles = self.load_usable_roles(principal_id).await?;
        if has_system_role(&roles) {
            return Ok(());
        }

        if !roles.is_empty() && !checks.is_empty() {
            let permissions_by_id = self.load_granted_permissions(&roles).await?;
            for check in checks {
                let covered = roles.iter().any(|role| {
                    role_covers(role, &permissions_by_id, check.module, &check.actions)
                });
                if covered {
                    return Ok(());
                }
            }
        }

        Err(AppError::Forbidden(format!(
            "access denied: no grant satisfies any of [{}]",
            describe_checks(checks)
        )))
    }

    /// Returns whether the principal may perform every required action on
    /// the module. Denials fold to `false`; every other failure propagates.
    pub async fn is_authorized(
        &self,
        principal_id: PrincipalId,
        module: ModuleName,
        required_actions: &[Action],
    ) -> AppResult<bool> {
        match self.authorize(principal_id, module, required_actions).await {
            Ok(()) => Ok(true),
            Err(AppError::Forbidden(_)) => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Resolves a principal to its tenant and role references.
    ///
    /// This is a thin read; role references are not validated here and must
    /// never be trusted before the tenant-scoped role load.
    pub async fn resolve_principal(&self, principal_id: PrincipalId) -> AppResult<Principal> {
        self.principal_repository
            .find_principal(principal_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("principal '{principal_id}' not found")))
    }

    /// Resolves the principal and loads the roles usable for a decision:
    /// active, deduplicated, and re-checked against the principal's tenant
    /// after loading.
    async fn load_usable_roles(&self, principal_id: PrincipalId) -> AppResult<Vec<Role>> {
        let principal = self
            .principal_repository
            .find_principal(principal_id)
            .await?
            .ok_or_else(|| {
                AppError::Unauthenticated(format!("unknown principal '{principal_id}'"))
            })?;

        let tenant_id = principal.tenant_id.ok_or_else(|| {
            AppError::NoTenantContext(format!("principal '{principal_id}' has no tenant"))
        })?;

        let role_ids = principal.distinct_role_ids();
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .role_repository
            .find_active_roles(tenant_id, &role_ids)
            .await?
            .into_iter()
            .filter(|role| role.tenant_id == tenant_id && role.is_active)
            .collect())
    }

    /// Resolves the distinct permissions granted by the roles in one lookup.
    async fn load_granted_permissions(
        &self,
        roles: &[Role],
    ) -> AppResult<HashMap<PermissionId, Permission>> {
        let mut permission_ids: Vec<PermissionId> = Vec::new();
        for role in roles {
            for permission_id in role.granted_permission_ids() {
                if !permission_ids.contains(&permission_id) {
                    permission_ids.push(permission_id);
                }
            }
        }

        if permission_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let permissions = self
            .permission_repository
            .find_permissions_by_ids(&permission_ids)
            .await?;

        Ok(permissions
            .into_iter()
            .map(|permission| (permission.id, permission))
            .collect())
    }
}

fn has_system_role(roles: &[Role]) -> bool {
    roles.iter().any(|role| role.is_system)
}

/// Returns whether one role covers every required action on the module.
///
/// Actions union across the role's grants for the module; grants whose
/// permission did not resolve are skipped.
fn role_covers(
    role: &Role,
    permissions_by_id: &HashMap<PermissionId, Permission>,
    module: ModuleName,
    required_actions: &[Action],
) -> bool {
    let mut allowed: Vec<Action> = Vec::new();
    let mut has_module_grant = false;

    for grant in &role.grants {
        let Some(permission) = permissions_by_id.get(&grant.permission_id) else {
            continue;
        };
        if permission.module != module {
            continue;
        }

        has_module_grant = true;
        grant.allowed_actions.union_into(&mut allowed);
    }

    has_module_grant && required_actions.iter().all(|action| allowed.contains(action))
}

fn describe_checks(checks: &[AccessCheck]) -> String {
    checks
        .iter()
        .map(|check| format!("{}: {}", check.module, describe_actions(&check.actions)))
        .collect::<Vec<_>>()
        .join("; ")
}
