use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use labrix_core::{AppError, AppResult, TenantId};
use labrix_domain::{
    Action, ActionSet, ModuleName, Permission, PermissionId, Principal, PrincipalId, Role,
    RoleGrant, RoleId, normalize_role_name,
};
use tokio::sync::Mutex;

use crate::rbac_ports::{
    PermissionFilter, PermissionRepository, PrincipalRepository, RoleFilter, RoleRepository,
};

use super::{AccessCheck, AuthorizationService};

struct FakePrincipalRepository {
    principals: HashMap<PrincipalId, Principal>,
}

impl FakePrincipalRepository {
    fn new(principals: Vec<Principal>) -> Self {
        Self {
            principals: principals
                .into_iter()
                .map(|principal| (principal.id, principal))
                .collect(),
        }
    }
}

#[async_trait]
impl PrincipalRepository for FakePrincipalRepository {
    async fn find_principal(&self, principal_id: PrincipalId) -> AppResult<Option<Principal>> {
        Ok(self.principals.get(&principal_id).cloned())
    }

    async fn principal_ids_with_role(&self, role_id: RoleId) -> AppResult<Vec<PrincipalId>> {
        Ok(self
            .principals
            .values()
            .filter(|principal| principal.role_ids.contains(&role_id))
            .map(|principal| principal.id)
            .collect())
    }

    async fn attach_role_to_principal(
        &self,
        _principal_id: PrincipalId,
        _role_id: RoleId,
    ) -> AppResult<()> {
        Ok(())
    }
}

struct FakeRoleRepository {
    roles: Vec<Role>,
    queried_role_ids: Mutex<Vec<Vec<RoleId>>>,
    return_unfiltered: bool,
}

impl FakeRoleRepository {
    fn new(roles: Vec<Role>) -> Self {
        Self {
            roles,
            queried_role_ids: Mutex::new(Vec::new()),
            return_unfiltered: false,
        }
    }

    /// A misbehaving variant that ignores the tenant and activation filters.
    fn leaky(roles: Vec<Role>) -> Self {
        Self {
            return_unfiltered: true,
            ..Self::new(roles)
        }
    }
}

#[async_trait]
impl RoleRepository for FakeRoleRepository {
    async fn find_active_roles(
        &self,
        tenant_id: TenantId,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<Role>> {
        self.queried_role_ids.lock().await.push(role_ids.to_vec());
        Ok(self
            .roles
            .iter()
            .filter(|role| {
                role_ids.contains(&role.id)
                    && (self.return_unfiltered
                        || (role.tenant_id == tenant_id && role.is_active))
            })
            .cloned()
            .collect())
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.roles.iter().find(|role| role.id == role_id).cloned())
    }

    async fn find_role_by_name(
        &self,
        tenant_id: TenantId,
        name: &str,
    ) -> AppResult<Option<Role>> {
        let normalized = normalize_role_name(name);
        Ok(self
            .roles
            .iter()
            .find(|role| role.tenant_id == tenant_id && role.normalized_name() == normalized)
            .cloned())
    }

    async fn list_roles(&self, tenant_id: TenantId, filter: RoleFilter) -> AppResult<Vec<Role>> {
        Ok(self
            .roles
            .iter()
            .filter(|role| {
                role.tenant_id == tenant_id
                    && filter
                        .is_active
                        .is_none_or(|is_active| role.is_active == is_active)
            })
            .cloned()
            .collect())
    }

    async fn insert_role(&self, _role: Role) -> AppResult<()> {
        Ok(())
    }

    async fn update_role(&self, _role: Role) -> AppResult<()> {
        Ok(())
    }

    async fn delete_role(&self, _role_id: RoleId) -> AppResult<()> {
        Ok(())
    }
}

struct FakePermissionRepository {
    permissions: Vec<Permission>,
    batch_lookups: Mutex<usize>,
}

impl FakePermissionRepository {
    fn new(permissions: Vec<Permission>) -> Self {
        Self {
            permissions,
            batch_lookups: Mutex::new(0),
        }
    }
}

#[async_trait]
impl PermissionRepository for FakePermissionRepository {
    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        Ok(self
            .permissions
            .iter()
            .find(|permission| permission.id == permission_id)
            .cloned())
    }

    async fn find_permissions_by_ids(
        &self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>> {
        *self.batch_lookups.lock().await += 1;
        Ok(self
            .permissions
            .iter()
            .filter(|permission| permission_ids.contains(&permission.id))
            .cloned()
            .collect())
    }

    async fn find_permission_by_module(
        &self,
        module: ModuleName,
    ) -> AppResult<Option<Permission>> {
        Ok(self
            .permissions
            .iter()
            .find(|permission| permission.module == module)
            .cloned())
    }

    async fn list_permissions(&self, filter: PermissionFilter) -> AppResult<Vec<Permission>> {
        Ok(self
            .permissions
            .iter()
            .filter(|permission| {
                filter
                    .is_active
                    .is_none_or(|is_active| permission.is_active == is_active)
            })
            .cloned()
            .collect())
    }

    async fn insert_permission(&self, _permission: Permission) -> AppResult<()> {
        Ok(())
    }

    async fn update_permission(&self, _permission: Permission) -> AppResult<()> {
        Ok(())
    }

    async fn delete_permission(&self, _permission_id: PermissionId) -> AppResult<()> {
        Ok(())
    }

    async fn count_roles_referencing(&self, _permission_id: PermissionId) -> AppResult<usize> {
        Ok(0)
    }
}

fn action_set(actions: &[Action]) -> ActionSet {
    ActionSet::new(actions.to_vec()).unwrap_or_else(|_| unreachable!())
}

fn permission(module: ModuleName, available: &[Action]) -> Permission {
    Permission::new(module, action_set(available), None, true)
}

fn grant(permission: &Permission, actions: &[Action]) -> RoleGrant {
    RoleGrant {
        permission_id: permission.id,
        allowed_actions: action_set(actions),
    }
}

fn active_role(tenant_id: TenantId, name: &str, grants: Vec<RoleGrant>) -> Role {
    Role::new(tenant_id, name, None, grants, true).unwrap_or_else(|_| unreachable!())
}

fn service(
    principals: Arc<FakePrincipalRepository>,
    roles: Arc<FakeRoleRepository>,
    permissions: Arc<FakePermissionRepository>,
) -> AuthorizationService {
    AuthorizationService::new(principals, roles, permissions)
}

#[tokio::test]
async fn authorize_allows_role_covering_all_required_actions() {
    let tenant_id = TenantId::new();
    let samples = permission(ModuleName::Samples, &[Action::Read, Action::Write]);
    let role = active_role(
        tenant_id,
        "Lab Tech",
        vec![grant(&samples, &[Action::Read, Action::Write])],
    );
    let principal = Principal::new(PrincipalId::new(), tenant_id, vec![role.id]);
    let service = service(
        Arc::new(FakePrincipalRepository::new(vec![principal.clone()])),
        Arc::new(FakeRoleRepository::new(vec![role])),
        Arc::new(FakePermissionRepository::new(vec![samples])),
    );

    let result = service
        .authorize(principal.id, ModuleName::Samples, &[Action::Read, Action::Write])
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn authorize_rejects_unknown_principal() {
    let service = service(
        Arc::new(FakePrincipalRepository::new(Vec::new())),
        Arc::new(FakeRoleRepository::new(Vec::new())),
        Arc::new(FakePermissionRepository::new(Vec::new())),
    );

    let result = service
        .authorize(PrincipalId::new(), ModuleName::Dashboard, &[Action::Read])
        .await;
    assert!(matches!(result, Err(AppError::Unauthenticated(_))));
}

#[tokio::test]
async fn authorize_requires_tenant_context() {
    let principal = Principal {
        id: PrincipalId::new(),
        tenant_id: None,
        role_ids: vec![RoleId::new()],
    };
    let service = service(
        Arc::new(FakePrincipalRepository::new(vec![principal.clone()])),
        Arc::new(FakeRoleRepository::new(Vec::new())),
        Arc::new(FakePermissionRepository::new(Vec::new())),
    );

    let result = service
        .authorize(principal.id, ModuleName::Dashboard, &[Action::Read])
        .await;
    assert!(matches!(result, Err(AppError::NoTenantContext(_))));
}

#[tokio::test]
async fn denial_names_module_and_required_actions() {
    let tenant_id = TenantId::new();
    let principal = Principal::new(PrincipalId::new(), tenant_id, Vec::new());
    let service = service(
        Arc::new(FakePrincipalRepository::new(vec![principal.clone()])),
        Arc::new(FakeRoleRepository::new(Vec::new())),
        Arc::new(FakePermissionRepository::new(Vec::new())),
    );

    let result = service
        .authorize(principal.id, ModuleName::Samples, &[Action::Read, Action::Delete])
        .await;
    match result {
        Err(AppError::Forbidden(message)) => {
            assert!(message.contains("Samples"));
            assert!(message.contains("read, delete"));
        }
        other => panic!("expected forbidden, got {other:?}"),
    }
}

#[tokio::test]
async fn cross_tenant_roles_are_excluded_even_when_repository_leaks_them() {
    let tenant_id = TenantId::new();
    let foreign_tenant_id = TenantId::new();
    let samples = permission(ModuleName::Samples, &[Action::Read, Action::Write]);
    let foreign_role = active_role(
        foreign_tenant_id,
        "Lab Tech",
        vec![grant(&samples, &[Action::Read, Action::Write])],
    );
    let principal = Principal::new(PrincipalId::new(), tenant_id, vec![foreign_role.id]);
    let service = service(
        Arc::new(FakePrincipalRepository::new(vec![principal.clone()])),
        Arc::new(FakeRoleRepository::leaky(vec![foreign_role])),
        Arc::new(FakePermissionRepository::new(vec![samples])),
    );

    let result = service
        .authorize(principal.id, ModuleName::Samples, &[Action::Read])
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn inactive_roles_are_excluded_even_when_repository_leaks_them() {
    let tenant_id = TenantId::new();
    let samples = permission(ModuleName::Samples, &[Action::Read, Action::Write]);
    let mut role = active_role(tenant_id, "Lab Tech", vec![grant(&samples, &[Action::Read])]);
    role.is_active = false;
    let principal = Principal::new(PrincipalId::new(), tenant_id, vec![role.id]);
    let service = service(
        Arc::new(FakePrincipalRepository::new(vec![principal.clone()])),
        Arc::new(FakeRoleRepository::leaky(vec![role])),
        Arc::new(FakePermissionRepository::new(vec![samples])),
    );

    let result = service
        .authorize(principal.id, ModuleName::Samples, &[Action::Read])
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn system_role_bypasses_without_permission_lookups() {
    let tenant_id = TenantId::new();
    let admin_role = Role::new_system(tenant_id, "Admin", None, Vec::new())
        .unwrap_or_else(|_| unreachable!());
    let principal = Principal::new(PrincipalId::new(), tenant_id, vec![admin_role.id]);
    let permission_repository = Arc::new(FakePermissionRepository::new(Vec::new()));
    let service = service(
        Arc::new(FakePrincipalRepository::new(vec![principal.clone()])),
        Arc::new(FakeRoleRepository::new(vec![admin_role])),
        permission_repository.clone(),
    );

    let result = service
        .authorize(principal.id, ModuleName::Warehouse, &[Action::Delete, Action::Export])
        .await;
    assert!(result.is_ok());
    assert_eq!(*permission_repository.batch_lookups.lock().await, 0);
}

#[tokio::test]
async fn duplicate_role_references_collapse_to_one_lookup() {
    let tenant_id = TenantId::new();
    let samples = permission(ModuleName::Samples, &[Action::Read, Action::Write]);
    let role = active_role(tenant_id, "Lab Tech", vec![grant(&samples, &[Action::Read])]);
    let role_id = role.id;
    let principal = Principal::new(
        PrincipalId::new(),
        tenant_id,
        vec![role_id, role_id, role_id],
    );
    let role_repository = Arc::new(FakeRoleRepository::new(vec![role]));
    let service = service(
        Arc::new(FakePrincipalRepository::new(vec![principal.clone()])),
        role_repository.clone(),
        Arc::new(FakePermissionRepository::new(vec![samples])),
    );

    let result = service
        .authorize(principal.id, ModuleName::Samples, &[Action::Read])
        .await;
    assert!(result.is_ok());

    let queries = role_repository.queried_role_ids.lock().await;
    assert_eq!(queries.as_slice(), &[vec![role_id]]);
}

#[tokio::test]
async fn empty_requirement_accepts_any_grant_on_module() {
    let tenant_id = TenantId::new();
    let reports = permission(ModuleName::Reports, &[Action::Read, Action::Export]);
    let role = active_role(tenant_id, "Analyst", vec![grant(&reports, &[Action::Read])]);
    let principal = Principal::new(PrincipalId::new(), tenant_id, vec![role.id]);
    let service = service(
        Arc::new(FakePrincipalRepository::new(vec![principal.clone()])),
        Arc::new(FakeRoleRepository::new(vec![role])),
        Arc::new(FakePermissionRepository::new(vec![reports])),
    );

    let result = service.authorize(principal.id, ModuleName::Reports, &[]).await;
    assert!(result.is_ok());

    let denied = service.authorize(principal.id, ModuleName::Shipping, &[]).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn actions_union_across_grants_within_one_role() {
    let tenant_id = TenantId::new();
    let samples = permission(ModuleName::Samples, &[Action::Read, Action::Write]);
    let role = active_role(
        tenant_id,
        "Lab Tech",
        vec![
            grant(&samples, &[Action::Read]),
            grant(&samples, &[Action::Write]),
        ],
    );
    let principal = Principal::new(PrincipalId::new(), tenant_id, vec![role.id]);
    let service = service(
        Arc::new(FakePrincipalRepository::new(vec![principal.clone()])),
        Arc::new(FakeRoleRepository::new(vec![role])),
        Arc::new(FakePermissionRepository::new(vec![samples])),
    );

    let result = service
        .authorize(principal.id, ModuleName::Samples, &[Action::Read, Action::Write])
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn actions_never_union_across_roles() {
    let tenant_id = TenantId::new();
    let samples = permission(ModuleName::Samples, &[Action::Read, Action::Write]);
    let reader = active_role(tenant_id, "Reader", vec![grant(&samples, &[Action::Read])]);
    let writer = active_role(tenant_id, "Writer", vec![grant(&samples, &[Action::Write])]);
    let principal = Principal::new(
        PrincipalId::new(),
        tenant_id,
        vec![reader.id, writer.id],
    );
    let service = service(
        Arc::new(FakePrincipalRepository::new(vec![principal.clone()])),
        Arc::new(FakeRoleRepository::new(vec![reader, writer])),
        Arc::new(FakePermissionRepository::new(vec![samples])),
    );

    let result = service
        .authorize(principal.id, ModuleName::Samples, &[Action::Read, Action::Write])
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let view = service.effective_permissions(principal.id).await;
    assert!(view.is_ok());
    let view = view.unwrap_or_else(|_| unreachable!());
    assert_eq!(view.modules.len(), 1);
    assert_eq!(
        view.modules[0].allowed_actions.as_slice(),
        &[Action::Read, Action::Write]
    );
}

#[tokio::test]
async fn authorize_any_allows_first_satisfied_check() {
    let tenant_id = TenantId::new();
    let reports = permission(ModuleName::Reports, &[Action::Read, Action::Export]);
    let role = active_role(tenant_id, "Analyst", vec![grant(&reports, &[Action::Export])]);
    let principal = Principal::new(PrincipalId::new(), tenant_id, vec![role.id]);
    let service = service(
        Arc::new(FakePrincipalRepository::new(vec![principal.clone()])),
        Arc::new(FakeRoleRepository::new(vec![role])),
        Arc::new(FakePermissionRepository::new(vec![reports])),
    );

    let result = service
        .authorize_any(
            principal.id,
            &[
                AccessCheck {
                    module: ModuleName::Samples,
                    actions: vec![Action::Read],
                },
                AccessCheck {
                    module: ModuleName::Reports,
                    actions: vec![Action::Export],
                },
            ],
        )
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn authorize_any_denies_when_no_check_is_satisfied() {
    let tenant_id = TenantId::new();
    let reports = permission(ModuleName::Reports, &[Action::Read, Action::Export]);
    let role = active_role(tenant_id, "Analyst", vec![grant(&reports, &[Action::Read])]);
    let principal = Principal::new(PrincipalId::new(), tenant_id, vec![role.id]);
    let service = service(
        Arc::new(FakePrincipalRepository::new(vec![principal.clone()])),
        Arc::new(FakeRoleRepository::new(vec![role])),
        Arc::new(FakePermissionRepository::new(vec![reports])),
    );

    let result = service
        .authorize_any(
            principal.id,
            &[AccessCheck {
                module: ModuleName::Reports,
                actions: vec![Action::Export],
            }],
        )
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let empty = service.authorize_any(principal.id, &[]).await;
    assert!(matches!(empty, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn is_authorized_folds_denial_to_false() {
    let tenant_id = TenantId::new();
    let samples = permission(ModuleName::Samples, &[Action::Read, Action::Write]);
    let role = active_role(tenant_id, "Lab Tech", vec![grant(&samples, &[Action::Read])]);
    let principal = Principal::new(PrincipalId::new(), tenant_id, vec![role.id]);
    let service = service(
        Arc::new(FakePrincipalRepository::new(vec![principal.clone()])),
        Arc::new(FakeRoleRepository::new(vec![role])),
        Arc::new(FakePermissionRepository::new(vec![samples])),
    );

    let allowed = service
        .is_authorized(principal.id, ModuleName::Samples, &[Action::Read])
        .await;
    assert!(matches!(allowed, Ok(true)));

    let denied = service
        .is_authorized(principal.id, ModuleName::Samples, &[Action::Delete])
        .await;
    assert!(matches!(denied, Ok(false)));

    let unknown = service
        .is_authorized(PrincipalId::new(), ModuleName::Samples, &[Action::Read])
        .await;
    assert!(matches!(unknown, Err(AppError::Unauthenticated(_))));
}

#[tokio::test]
async fn role_name_check_matches_trimmed_case_insensitive() {
    let tenant_id = TenantId::new();
    let role = active_role(tenant_id, "Lab Manager", Vec::new());
    let principal = Principal::new(PrincipalId::new(), tenant_id, vec![role.id]);
    let service = service(
        Arc::new(FakePrincipalRepository::new(vec![principal.clone()])),
        Arc::new(FakeRoleRepository::new(vec![role])),
        Arc::new(FakePermissionRepository::new(Vec::new())),
    );

    let result = service
        .authorize_any_role(principal.id, &["  LAB MANAGER "])
        .await;
    assert!(result.is_ok());

    let denied = service.authorize_any_role(principal.id, &["admin"]).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn all_roles_check_reports_missing_names() {
    let tenant_id = TenantId::new();
    let role = active_role(tenant_id, "Lab Manager", Vec::new());
    let principal = Principal::new(PrincipalId::new(), tenant_id, vec![role.id]);
    let service = service(
        Arc::new(FakePrincipalRepository::new(vec![principal.clone()])),
        Arc::new(FakeRoleRepository::new(vec![role])),
        Arc::new(FakePermissionRepository::new(Vec::new())),
    );

    let result = service
        .authorize_all_roles(principal.id, &["Lab Manager", "Auditor"])
        .await;
    match result {
        Err(AppError::Forbidden(message)) => {
            assert!(message.contains("auditor"));
            assert!(!message.contains("lab manager"));
        }
        other => panic!("expected forbidden, got {other:?}"),
    }

    let vacuous = service.authorize_all_roles(principal.id, &[]).await;
    assert!(vacuous.is_ok());
}

#[tokio::test]
async fn effective_permissions_union_per_module_in_catalog_order() {
    let tenant_id = TenantId::new();
    let samples = permission(ModuleName::Samples, &[Action::Read, Action::Write, Action::Update]);
    let dashboard = permission(ModuleName::Dashboard, &[Action::Read]);
    let tech = active_role(
        tenant_id,
        "Lab Tech",
        vec![
            grant(&samples, &[Action::Read]),
            grant(&dashboard, &[Action::Read]),
        ],
    );
    let editor = active_role(tenant_id, "Editor", vec![grant(&samples, &[Action::Write])]);
    let principal = Principal::new(PrincipalId::new(), tenant_id, vec![tech.id, editor.id]);
    let service = service(
        Arc::new(FakePrincipalRepository::new(vec![principal.clone()])),
        Arc::new(FakeRoleRepository::new(vec![tech, editor])),
        Arc::new(FakePermissionRepository::new(vec![samples, dashboard])),
    );

    let view = service.effective_permissions(principal.id).await;
    assert!(view.is_ok());
    let view = view.unwrap_or_else(|_| unreachable!());
    assert!(!view.has_system_role);
    assert_eq!(view.modules.len(), 2);
    assert_eq!(view.modules[0].module, ModuleName::Dashboard);
    assert_eq!(view.modules[1].module, ModuleName::Samples);
    assert_eq!(
        view.modules[1].allowed_actions.as_slice(),
        &[Action::Read, Action::Write]
    );
    assert_eq!(
        view.modules[1].available_actions.as_slice(),
        &[Action::Read, Action::Write, Action::Update]
    );
}

#[tokio::test]
async fn effective_permissions_excludes_foreign_tenant_roles() {
    let tenant_id = TenantId::new();
    let foreign_tenant_id = TenantId::new();
    let samples = permission(ModuleName::Samples, &[Action::Read, Action::Write]);
    let own_role = active_role(tenant_id, "Lab Tech", vec![grant(&samples, &[Action::Read])]);
    let foreign_role = active_role(
        foreign_tenant_id,
        "Foreign",
        vec![grant(&samples, &[Action::Write])],
    );
    let principal = Principal::new(
        PrincipalId::new(),
        tenant_id,
        vec![own_role.id, foreign_role.id],
    );
    let service = service(
        Arc::new(FakePrincipalRepository::new(vec![principal.clone()])),
        Arc::new(FakeRoleRepository::leaky(vec![own_role, foreign_role])),
        Arc::new(FakePermissionRepository::new(vec![samples])),
    );

    let view = service.effective_permissions(principal.id).await;
    assert!(view.is_ok());
    let view = view.unwrap_or_else(|_| unreachable!());
    assert_eq!(view.modules.len(), 1);
    assert_eq!(view.modules[0].allowed_actions.as_slice(), &[Action::Read]);
}

#[tokio::test]
async fn effective_permissions_reports_system_flag_with_grant_modules_only() {
    let tenant_id = TenantId::new();
    let roles_permission = permission(ModuleName::Roles, &[Action::Read, Action::Write]);
    let admin_role = Role::new_system(
        tenant_id,
        "Admin",
        None,
        vec![RoleGrant {
            permission_id: roles_permission.id,
            allowed_actions: action_set(&[Action::Read]),
        }],
    )
    .unwrap_or_else(|_| unreachable!());
    let principal = Principal::new(PrincipalId::new(), tenant_id, vec![admin_role.id]);
    let service = service(
        Arc::new(FakePrincipalRepository::new(vec![principal.clone()])),
        Arc::new(FakeRoleRepository::new(vec![admin_role])),
        Arc::new(FakePermissionRepository::new(vec![roles_permission])),
    );

    let view = service.effective_permissions(principal.id).await;
    assert!(view.is_ok());
    let view = view.unwrap_or_else(|_| unreachable!());
    assert!(view.has_system_role);
    assert_eq!(view.modules.len(), 1);
    assert_eq!(view.modules[0].module, ModuleName::Roles);
}
