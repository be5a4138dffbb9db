use std::fmt::{Display, Formatter};

use labrix_core::{AppResult, NonEmptyString, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::ActionSet;
use crate::permission::PermissionId;

/// Unique identifier for a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleId(Uuid);

impl RoleId {
    /// Creates a new random role identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the raw UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// One permission attached to a role with the actions the role allows.
///
/// `allowed_actions` must stay a subset of the referenced permission's
/// available actions; the registry enforces this on every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    /// Referenced catalog permission.
    pub permission_id: PermissionId,
    /// Actions the role allows for the permission's module.
    pub allowed_actions: ActionSet,
}

/// A tenant-scoped bundle of permission grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Stable role identifier.
    pub id: RoleId,
    /// Owning tenant. Roles never cross tenant boundaries.
    pub tenant_id: TenantId,
    /// Role name, unique per tenant under normalized comparison. The stored
    /// value keeps its original casing.
    pub name: NonEmptyString,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Permission grants carried by the role.
    pub grants: Vec<RoleGrant>,
    /// Inactive roles are ignored by authorization decisions.
    pub is_active: bool,
    /// System roles bypass permission checks and resist rename,
    /// deactivation, and deletion.
    pub is_system: bool,
}

impl Role {
    /// Creates a regular (non-system) role with a fresh identifier.
    pub fn new(
        tenant_id: TenantId,
        name: impl Into<String>,
        description: Option<String>,
        grants: Vec<RoleGrant>,
        is_active: bool,
    ) -> AppResult<Self> {
        Ok(Self {
            id: RoleId::new(),
            tenant_id,
            name: NonEmptyString::new(name)?,
            description: crate::permission::normalize_description(description),
            grants,
            is_active,
            is_system: false,
        })
    }

    /// Creates an active system role with a fresh identifier.
    pub fn new_system(
        tenant_id: TenantId,
        name: impl Into<String>,
        description: Option<String>,
        grants: Vec<RoleGrant>,
    ) -> AppResult<Self> {
        Ok(Self {
            id: RoleId::new(),
            tenant_id,
            name: NonEmptyString::new(name)?,
            description: crate::permission::normalize_description(description),
            grants,
            is_active: true,
            is_system: true,
        })
    }

    /// Returns the role name under normalized comparison form.
    #[must_use]
    pub fn normalized_name(&self) -> String {
        normalize_role_name(self.name.as_str())
    }

    /// Returns the grant referencing the permission, when present.
    #[must_use]
    pub fn grant_for(&self, permission_id: PermissionId) -> Option<&RoleGrant> {
        self.grants
            .iter()
            .find(|grant| grant.permission_id == permission_id)
    }

    /// Returns the distinct permission ids referenced by this role's grants.
    #[must_use]
    pub fn granted_permission_ids(&self) -> Vec<PermissionId> {
        let mut ids: Vec<PermissionId> = Vec::with_capacity(self.grants.len());
        for grant in &self.grants {
            if !ids.contains(&grant.permission_id) {
                ids.push(grant.permission_id);
            }
        }

        ids
    }
}

/// Normalizes a role name for uniqueness and lookup comparisons.
///
/// Comparison is trimmed and case-insensitive everywhere a role name is
/// matched; stored names keep their submitted casing.
#[must_use]
pub fn normalize_role_name(name: &str) -> String {
    name.trim().to_lowercase()
}
