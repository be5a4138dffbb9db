//! Outbound ports shared by the RBAC application services.

mod audit;
mod inputs;
mod repositories;

pub use audit::{AuditEvent, AuditRepository};
pub use inputs::{
    CreatePermissionInput, CreateRoleInput, GrantInput, PermissionFilter, RoleFilter,
    UpdatePermissionInput, UpdateRoleInput,
};
pub use repositories::{PermissionRepository, PrincipalRepository, RoleRepository};
