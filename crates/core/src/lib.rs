//! Shared primitives for all Rust crates in Labrix.

#![forbid(unsafe_code)]

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Result type used across Labrix crates.
pub type AppResult<T> = Result<T, AppError>;

/// Owned string guaranteed to hold at least one non-whitespace character.
///
/// The original value is stored verbatim; trimming happens only for the
/// emptiness check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Wraps the value after checking it is not blank.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Borrows the wrapped value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Tenant identifier used as the partition key for every tenant-scoped
/// RBAC resource (roles, role assignments, principals).
///
/// The permission catalog is the one deliberate exception: permission
/// records are catalog-wide and carry no tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(Uuid);

impl TenantId {
    /// Generates a fresh random identifier.
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

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for TenantId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Error taxonomy shared by every Labrix crate.
///
/// Every variant is a deterministic, non-retryable decision. Transient
/// failures belong to the persistence adapters, which surface them as
/// [`AppError::Internal`] and are passed through without interpretation.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input failed validation or would break a domain invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Lookup target does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A write collided with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// No resolvable principal behind the request.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Principal exists but carries no tenant; fatal to any authorization.
    #[error("no tenant context: {0}")]
    NoTenantContext(String),

    /// Principal is authenticated and tenant-scoped, but its grants are
    /// insufficient. The message names the module and required actions (or
    /// required role names) and nothing else.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Administrative role write rejected: a grant references an unknown or
    /// inactive permission, or requests actions outside the permission's
    /// available set.
    #[error("invalid grant for module '{module}': {reason}")]
    InvalidGrant {
        /// Module of the offending grant, or the raw permission id when the
        /// permission could not be resolved at all.
        module: String,
        /// Why the grant was rejected.
        reason: String,
    },

    /// Attempted mutation of a system role's protected fields, or deletion
    /// of a system role.
    #[error("role '{name}' is protected: {reason}")]
    ProtectedRole {
        /// Name of the system role.
        name: String,
        /// Which protection blocked the operation.
        reason: String,
    },

    /// Role deletion blocked while principals still reference the role.
    #[error("role '{name}' is assigned to {principal_count} principal(s)")]
    RoleInUse {
        /// Name of the referenced role.
        name: String,
        /// Number of principals currently holding the role.
        principal_count: usize,
    },

    /// Role name collision within a tenant.
    #[error("role '{name}' already exists in this tenant")]
    DuplicateRole {
        /// The conflicting role name as submitted.
        name: String,
    },

    /// Unexpected failure inside an adapter or the runtime.
    #[error("internal error: {0}")]
    Internal(String),
}
