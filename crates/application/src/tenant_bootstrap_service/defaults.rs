use std::collections::{HashMap, HashSet};

use labrix_core::{AppError, AppResult};
use labrix_domain::{ActionSet, ModuleName, Permission};

use crate::rbac_ports::PermissionFilter;

use super::TenantBootstrapService;

impl TenantBootstrapService {
    /// Ensures every catalog module has a permission record.
    ///
    /// Missing modules are inserted with the catalog's default actions and
    /// marked active; existing records are left untouched, including records
    /// an administrator has narrowed or deactivated. Returns the full record
    /// set in catalog order.
    pub async fn ensure_default_permissions(&self) -> AppResult<Vec<Permission>> {
        let existing = self
            .permission_repository
            .list_permissions(PermissionFilter::default())
            .await?;
        let existing_modules: HashSet<ModuleName> =
            existing.iter().map(|permission| permission.module).collect();

        for module in ModuleName::all() {
            if existing_modules.contains(module) {
                continue;
            }

            let available_actions = ActionSet::new(ModuleName::default_actions().to_vec())?;
            let permission = Permission::new(
                *module,
                available_actions,
                Some(format!("Default permissions for {module}")),
                true,
            );

            match self.permission_repository.insert_permission(permission).await {
                Ok(()) => {}
                // Another provisioner inserted the module between list and insert.
                Err(AppError::Conflict(_)) => {}
                Err(error) => return Err(error),
            }
        }

        let mut by_module: HashMap<ModuleName, Permission> = self
            .permission_repository
            .list_permissions(PermissionFilter::default())
            .await?
            .into_iter()
            .map(|permission| (permission.module, permission))
            .collect();

        Ok(ModuleName::all()
            .iter()
            .filter_map(|module| by_module.remove(module))
            .collect())
    }
}
