use async_trait::async_trait;
use labrix_core::{AppResult, TenantId};
use labrix_domain::{ModuleName, Permission, PermissionId, Principal, PrincipalId, Role, RoleId};

use super::inputs::{PermissionFilter, RoleFilter};

/// Repository port for principal lookups and role wiring.
#[async_trait]
pub trait PrincipalRepository: Send + Sync {
    /// Finds a principal by id.
    async fn find_principal(&self, principal_id: PrincipalId) -> AppResult<Option<Principal>>;

    /// Lists the ids of principals currently holding the role.
    async fn principal_ids_with_role(&self, role_id: RoleId) -> AppResult<Vec<PrincipalId>>;

    /// Attaches a role to a principal. Attaching an already-held role is a
    /// no-op.
    async fn attach_role_to_principal(
        &self,
        principal_id: PrincipalId,
        role_id: RoleId,
    ) -> AppResult<()>;
}

/// Repository port for tenant-scoped role storage.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Loads the active roles among `role_ids` that belong to the tenant.
    ///
    /// Adapters apply both filters; callers re-check the tenant on every
    /// returned role and never trust a grant before that match.
    async fn find_active_roles(
        &self,
        tenant_id: TenantId,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<Role>>;

    /// Finds a role by id, regardless of tenant.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Finds a tenant's role by name under normalized comparison.
    async fn find_role_by_name(&self, tenant_id: TenantId, name: &str)
    -> AppResult<Option<Role>>;

    /// Lists a tenant's roles.
    async fn list_roles(&self, tenant_id: TenantId, filter: RoleFilter) -> AppResult<Vec<Role>>;

    /// Inserts a role. Fails with the duplicate-role error when the
    /// normalized name is already taken in the tenant.
    async fn insert_role(&self, role: Role) -> AppResult<()>;

    /// Replaces a stored role.
    async fn update_role(&self, role: Role) -> AppResult<()>;

    /// Deletes a role by id.
    async fn delete_role(&self, role_id: RoleId) -> AppResult<()>;
}

/// Repository port for catalog permission storage.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Finds a permission record by id.
    async fn find_permission(&self, permission_id: PermissionId)
    -> AppResult<Option<Permission>>;

    /// Loads the permission records among `permission_ids`. Unknown ids are
    /// omitted from the result.
    async fn find_permissions_by_ids(
        &self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>>;

    /// Finds the permission record governing a module.
    async fn find_permission_by_module(
        &self,
        module: ModuleName,
    ) -> AppResult<Option<Permission>>;

    /// Lists permission records in catalog order.
    async fn list_permissions(&self, filter: PermissionFilter) -> AppResult<Vec<Permission>>;

    /// Inserts a permission record. Fails with a conflict when the module
    /// already has one.
    async fn insert_permission(&self, permission: Permission) -> AppResult<()>;

    /// Replaces a stored permission record.
    async fn update_permission(&self, permission: Permission) -> AppResult<()>;

    /// Deletes a permission record by id.
    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()>;

    /// Counts the roles holding at least one grant on the permission.
    async fn count_roles_referencing(&self, permission_id: PermissionId) -> AppResult<usize>;
}
