//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_service;
mod rbac_admin_service;
mod rbac_ports;
mod tenant_bootstrap_service;

pub use authorization_service::{
    AccessCheck, AuthorizationService, EffectivePermissions, ModuleAccess,
};
pub use rbac_admin_service::RbacAdminService;
pub use rbac_ports::{
    AuditEvent, AuditRepository, CreatePermissionInput, CreateRoleInput, GrantInput,
    PermissionFilter, PermissionRepository, PrincipalRepository, RoleFilter, RoleRepository,
    UpdatePermissionInput, UpdateRoleInput,
};
pub use tenant_bootstrap_service::TenantBootstrapService;
