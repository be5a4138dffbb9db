use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::ActionSet;
use crate::catalog::ModuleName;

/// Unique identifier for a permission record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionId(Uuid);

impl PermissionId {
    /// Creates a new random permission identifier.
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

impl Default for PermissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for PermissionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A catalog permission record.
///
/// Permission records are catalog-wide: one record per module, shared by
/// every tenant. Roles reference them by id and may only allow actions the
/// record makes available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Stable permission identifier.
    pub id: PermissionId,
    /// Catalog module this record governs. Exactly one record may exist per
    /// module.
    pub module: ModuleName,
    /// Actions roles may allow for the module.
    pub available_actions: ActionSet,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Inactive records stay attached to existing grants but are excluded
    /// from new ones.
    pub is_active: bool,
}

impl Permission {
    /// Creates a permission record with a fresh identifier.
    #[must_use]
    pub fn new(
        module: ModuleName,
        available_actions: ActionSet,
        description: Option<String>,
        is_active: bool,
    ) -> Self {
        Self {
            id: PermissionId::new(),
            module,
            available_actions,
            description: normalize_description(description),
            is_active,
        }
    }
}

/// Trims a free-text description and collapses blank values to `None`.
#[must_use]
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{Permission, normalize_description};
    use crate::action::{Action, ActionSet};
    use crate::catalog::ModuleName;

    #[test]
    fn blank_description_collapses_to_none() {
        assert_eq!(normalize_description(Some("   ".to_owned())), None);
        assert_eq!(
            normalize_description(Some(" granted ".to_owned())),
            Some("granted".to_owned())
        );
    }

    #[test]
    fn new_permission_is_keyed_by_module() {
        let actions = ActionSet::new([Action::Read]).unwrap_or_else(|_| unreachable!());
        let permission = Permission::new(ModuleName::Samples, actions, None, true);
        assert_eq!(permission.module, ModuleName::Samples);
        assert!(permission.is_active);
    }
}
