use std::collections::HashMap;

use labrix_core::AppResult;
use labrix_domain::{Action, ActionSet, ModuleName, PrincipalId};

use super::AuthorizationService;

/// Access granted to one module, aggregated across roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleAccess {
    /// Granted module.
    pub module: ModuleName,
    /// Actions the module's permission record makes available.
    pub available_actions: ActionSet,
    /// Union of the actions allowed across all matching grants.
    pub allowed_actions: ActionSet,
}

/// Read-only aggregation of everything a principal is granted.
///
/// This view never gates anything; gating decisions use the single-role
/// rule instead of the union reported here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectivePermissions {
    /// Principal the view was computed for.
    pub principal_id: PrincipalId,
    /// Whether any loaded role bypasses permission checks.
    pub has_system_role: bool,
    /// Per-module access in catalog order. Modules without grants are
    /// omitted.
    pub modules: Vec<ModuleAccess>,
}

impl AuthorizationService {
    /// Computes the aggregated permission view for a principal.
    ///
    /// Role loading follows the same tenant and activation rules as the
    /// gating decisions; `allowed_actions` unions across every matching
    /// grant of every loaded role.
    pub async fn effective_permissions(
        &self,
        principal_id: PrincipalId,
    ) -> AppResult<EffectivePermissions> {
        let roles = self.load_usable_roles(principal_id).await?;
        let has_system_role = super::has_system_role(&roles);
        let permissions_by_id = self.load_granted_permissions(&roles).await?;

        let mut allowed_by_module: HashMap<ModuleName, Vec<Action>> = HashMap::new();
        for role in &roles {
            for grant in &role.grants {
                let Some(permission) = permissions_by_id.get(&grant.permission_id) else {
                    continue;
                };

                grant
                    .allowed_actions
                    .union_into(allowed_by_module.entry(permission.module).or_default());
            }
        }

        let mut modules = Vec::with_capacity(allowed_by_module.len());
        for module in ModuleName::all() {
            let Some(allowed) = allowed_by_module.remove(module) else {
                continue;
            };
            let Some(permission) = permissions_by_id
                .values()
                .find(|permission| permission.module == *module)
            else {
                continue;
            };

            modules.push(ModuleAccess {
                module: *module,
                available_actions: permission.available_actions.clone(),
                allowed_actions: ActionSet::new(allowed)?,
            });
        }

        Ok(EffectivePermissions {
            principal_id,
            has_system_role,
            modules,
        })
    }
}
