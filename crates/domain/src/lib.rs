//! Domain entities and invariants for the authorization core.

#![forbid(unsafe_code)]

mod action;
mod audit;
mod catalog;
mod permission;
mod principal;
mod role;

pub use action::{Action, ActionSet, describe_actions};
pub use audit::AuditAction;
pub use catalog::ModuleName;
pub use permission::{Permission, PermissionId, normalize_description};
pub use principal::{Principal, PrincipalId};
pub use role::{Role, RoleGrant, RoleId, normalize_role_name};
