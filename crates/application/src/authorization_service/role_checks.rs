use labrix_core::{AppError, AppResult};
use labrix_domain::{PrincipalId, Role, normalize_role_name};

use super::AuthorizationService;

impl AuthorizationService {
    /// Ensures the principal holds at least one of the named roles.
    ///
    /// Names match trimmed and case-insensitively against the principal's
    /// active, tenant-matching roles. An empty requirement always denies.
    pub async fn authorize_any_role(
        &self,
        principal_id: PrincipalId,
        role_names: &[&str],
    ) -> AppResult<()> {
        let required = normalize_names(role_names);
        let roles = self.load_usable_roles(principal_id).await?;
        let held = held_names(&roles);

        if required.iter().any(|name| held.contains(name)) {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "access denied: requires one of roles [{}]",
            required.join(", ")
        )))
    }

    /// Ensures the principal holds every named role.
    ///
    /// Denials name the specific missing roles. An empty requirement is
    /// vacuously satisfied.
    pub async fn authorize_all_roles(
        &self,
        principal_id: PrincipalId,
        role_names: &[&str],
    ) -> AppResult<()> {
        let required = normalize_names(role_names);
        let roles = self.load_usable_roles(principal_id).await?;
        let held = held_names(&roles);

        let missing: Vec<String> = required
            .into_iter()
            .filter(|name| !held.contains(name))
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "access denied: missing required roles [{}]",
            missing.join(", ")
        )))
    }
}

fn normalize_names(role_names: &[&str]) -> Vec<String> {
    role_names
        .iter()
        .map(|name| normalize_role_name(name))
        .collect()
}

fn held_names(roles: &[Role]) -> Vec<String> {
    roles.iter().map(Role::normalized_name).collect()
}
