use labrix_domain::{Action, ModuleName, PermissionId};

/// One requested permission grant inside a role write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantInput {
    /// Referenced catalog permission.
    pub permission_id: PermissionId,
    /// Actions the role should allow for the permission's module.
    pub actions: Vec<Action>,
}

/// Input payload for creating roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Role name, unique per tenant under normalized comparison.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Grants to attach to the role.
    pub grants: Vec<GrantInput>,
    /// Whether the role participates in authorization decisions.
    pub is_active: bool,
}

/// Input payload for updating roles. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// New role name.
    pub name: Option<String>,
    /// New description. A blank value clears the stored description.
    pub description: Option<String>,
    /// Full replacement grant list.
    pub grants: Option<Vec<GrantInput>>,
    /// New activation flag.
    pub is_active: Option<bool>,
}

/// Input payload for creating catalog permission records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePermissionInput {
    /// Catalog module the record governs.
    pub module: ModuleName,
    /// Actions roles may allow for the module. Defaults to the catalog's
    /// default action set when absent.
    pub available_actions: Option<Vec<Action>>,
    /// Optional description.
    pub description: Option<String>,
    /// Whether the record may be referenced by new grants.
    pub is_active: bool,
}

/// Input payload for updating catalog permission records. The module is
/// immutable; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePermissionInput {
    /// New available action set.
    pub available_actions: Option<Vec<Action>>,
    /// New description. A blank value clears the stored description.
    pub description: Option<String>,
    /// New activation flag.
    pub is_active: Option<bool>,
}

/// Activation filter for role listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleFilter {
    /// When set, only roles with a matching activation flag are returned.
    pub is_active: Option<bool>,
}

/// Activation filter for permission listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PermissionFilter {
    /// When set, only records with a matching activation flag are returned.
    pub is_active: Option<bool>,
}
