use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use labrix_application::{
    PermissionFilter, PermissionRepository, PrincipalRepository, RoleFilter, RoleRepository,
};
use labrix_core::{AppError, AppResult, TenantId};
use labrix_domain::{
    ModuleName, Permission, PermissionId, Principal, PrincipalId, Role, RoleId,
    normalize_role_name,
};

/// In-memory implementation of the RBAC repository ports.
///
/// Backs tests and embedded deployments. Role name uniqueness follows the
/// same normalized comparison as the PostgreSQL schema, and deleting a role
/// detaches it from every principal the way the foreign keys cascade there.
#[derive(Debug, Default)]
pub struct InMemoryRbacRepository {
    principals: RwLock<HashMap<PrincipalId, Principal>>,
    roles: RwLock<HashMap<RoleId, Role>>,
    permissions: RwLock<HashMap<PermissionId, Permission>>,
}

impl InMemoryRbacRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            principals: RwLock::new(HashMap::new()),
            roles: RwLock::new(HashMap::new()),
            permissions: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts or replaces a principal.
    ///
    /// Principals are provisioned outside the RBAC ports, so embedders seed
    /// them through this helper before wiring roles.
    pub async fn upsert_principal(&self, principal: Principal) {
        self.principals
            .write()
            .await
            .insert(principal.id, principal);
    }
}

fn catalog_position(module: ModuleName) -> usize {
    ModuleName::all()
        .iter()
        .position(|candidate| *candidate == module)
        .unwrap_or(usize::MAX)
}

#[async_trait]
impl PrincipalRepository for InMemoryRbacRepository {
    async fn find_principal(&self, principal_id: PrincipalId) -> AppResult<Option<Principal>> {
        Ok(self.principals.read().await.get(&principal_id).cloned())
    }

    async fn principal_ids_with_role(&self, role_id: RoleId) -> AppResult<Vec<PrincipalId>> {
        let principals = self.principals.read().await;
        let mut holders: Vec<PrincipalId> = principals
            .values()
            .filter(|principal| principal.role_ids.contains(&role_id))
            .map(|principal| principal.id)
            .collect();
        holders.sort_by_key(PrincipalId::as_uuid);

        Ok(holders)
    }

    async fn attach_role_to_principal(
        &self,
        principal_id: PrincipalId,
        role_id: RoleId,
    ) -> AppResult<()> {
        let mut principals = self.principals.write().await;
        let principal = principals.get_mut(&principal_id).ok_or_else(|| {
            AppError::NotFound(format!("principal '{principal_id}' does not exist"))
        })?;

        if !principal.role_ids.contains(&role_id) {
            principal.role_ids.push(role_id);
        }

        Ok(())
    }
}

#[async_trait]
impl RoleRepository for InMemoryRbacRepository {
    async fn find_active_roles(
        &self,
        tenant_id: TenantId,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<Role>> {
        let roles = self.roles.read().await;
        let mut listed: Vec<Role> = role_ids
            .iter()
            .filter_map(|role_id| roles.get(role_id))
            .filter(|role| role.tenant_id == tenant_id && role.is_active)
            .cloned()
            .collect();
        listed.sort_by(|left, right| left.normalized_name().cmp(&right.normalized_name()));

        Ok(listed)
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.roles.read().await.get(&role_id).cloned())
    }

    async fn find_role_by_name(
        &self,
        tenant_id: TenantId,
        name: &str,
    ) -> AppResult<Option<Role>> {
        let normalized = normalize_role_name(name);
        Ok(self
            .roles
            .read()
            .await
            .values()
            .find(|role| role.tenant_id == tenant_id && role.normalized_name() == normalized)
            .cloned())
    }

    async fn list_roles(&self, tenant_id: TenantId, filter: RoleFilter) -> AppResult<Vec<Role>> {
        let roles = self.roles.read().await;
        let mut listed: Vec<Role> = roles
            .values()
            .filter(|role| {
                role.tenant_id == tenant_id
                    && filter
                        .is_active
                        .is_none_or(|is_active| role.is_active == is_active)
            })
            .cloned()
            .collect();
        listed.sort_by(|left, right| left.normalized_name().cmp(&right.normalized_name()));

        Ok(listed)
    }

    async fn insert_role(&self, role: Role) -> AppResult<()> {
        let mut roles = self.roles.write().await;

        let normalized = role.normalized_name();
        let taken = roles.values().any(|existing| {
            existing.tenant_id == role.tenant_id && existing.normalized_name() == normalized
        });
        if taken {
            return Err(AppError::DuplicateRole {
                name: role.name.as_str().to_owned(),
            });
        }

        roles.insert(role.id, role);
        Ok(())
    }

    async fn update_role(&self, role: Role) -> AppResult<()> {
        let mut roles = self.roles.write().await;

        if !roles.contains_key(&role.id) {
            return Err(AppError::NotFound(format!("role '{}' does not exist", role.id)));
        }

        let normalized = role.normalized_name();
        let taken = roles.values().any(|existing| {
            existing.id != role.id
                && existing.tenant_id == role.tenant_id
                && existing.normalized_name() == normalized
        });
        if taken {
            return Err(AppError::DuplicateRole {
                name: role.name.as_str().to_owned(),
            });
        }

        roles.insert(role.id, role);
        Ok(())
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        if self.roles.write().await.remove(&role_id).is_none() {
            return Ok(());
        }

        let mut principals = self.principals.write().await;
        for principal in principals.values_mut() {
            principal.role_ids.retain(|held| *held != role_id);
        }

        Ok(())
    }
}

#[async_trait]
impl PermissionRepository for InMemoryRbacRepository {
    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        Ok(self.permissions.read().await.get(&permission_id).cloned())
    }

    async fn find_permissions_by_ids(
        &self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>> {
        let permissions = self.permissions.read().await;
        Ok(permission_ids
            .iter()
            .filter_map(|permission_id| permissions.get(permission_id))
            .cloned()
            .collect())
    }

    async fn find_permission_by_module(
        &self,
        module: ModuleName,
    ) -> AppResult<Option<Permission>> {
        Ok(self
            .permissions
            .read()
            .await
            .values()
            .find(|permission| permission.module == module)
            .cloned())
    }

    async fn list_permissions(&self, filter: PermissionFilter) -> AppResult<Vec<Permission>> {
        let permissions = self.permissions.read().await;
        let mut listed: Vec<Permission> = permissions
            .values()
            .filter(|permission| {
                filter
                    .is_active
                    .is_none_or(|is_active| permission.is_active == is_active)
            })
            .cloned()
            .collect();
        listed.sort_by_key(|permission| catalog_position(permission.module));

        Ok(listed)
    }

    async fn insert_permission(&self, permission: Permission) -> AppResult<()> {
        let mut permissions = self.permissions.write().await;

        let taken = permissions
            .values()
            .any(|existing| existing.module == permission.module);
        if taken {
            return Err(AppError::Conflict(format!(
                "permission for module '{}' already exists",
                permission.module
            )));
        }

        permissions.insert(permission.id, permission);
        Ok(())
    }

    async fn update_permission(&self, permission: Permission) -> AppResult<()> {
        let mut permissions = self.permissions.write().await;

        if !permissions.contains_key(&permission.id) {
            return Err(AppError::NotFound(format!(
                "permission '{}' does not exist",
                permission.id
            )));
        }

        permissions.insert(permission.id, permission);
        Ok(())
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        self.permissions.write().await.remove(&permission_id);
        Ok(())
    }

    async fn count_roles_referencing(&self, permission_id: PermissionId) -> AppResult<usize> {
        Ok(self
            .roles
            .read()
            .await
            .values()
            .filter(|role| role.grant_for(permission_id).is_some())
            .count())
    }
}
