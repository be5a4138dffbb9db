use std::fmt::{Display, Formatter};

use labrix_core::TenantId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::RoleId;

/// Unique identifier for an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(Uuid);

impl PrincipalId {
    /// Creates a new random principal identifier.
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

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for PrincipalId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// The authorization view of an authenticated caller.
///
/// A principal without a tenant cannot be authorized for anything; the
/// engine treats the absent tenant as a fatal condition rather than falling
/// back to a global scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable principal identifier.
    pub id: PrincipalId,
    /// Tenant the principal belongs to, when any.
    pub tenant_id: Option<TenantId>,
    /// Roles held by the principal. Duplicate references are tolerated and
    /// deduplicated before role loading.
    pub role_ids: Vec<RoleId>,
}

impl Principal {
    /// Creates a tenant-scoped principal.
    #[must_use]
    pub fn new(id: PrincipalId, tenant_id: TenantId, role_ids: Vec<RoleId>) -> Self {
        Self {
            id,
            tenant_id: Some(tenant_id),
            role_ids,
        }
    }

    /// Returns the distinct role ids in first-seen order.
    #[must_use]
    pub fn distinct_role_ids(&self) -> Vec<RoleId> {
        let mut ids: Vec<RoleId> = Vec::with_capacity(self.role_ids.len());
        for role_id in &self.role_ids {
            if !ids.contains(role_id) {
                ids.push(*role_id);
            }
        }

        ids
    }
}
