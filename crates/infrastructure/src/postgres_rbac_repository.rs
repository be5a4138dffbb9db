use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use labrix_application::{
    PermissionFilter, PermissionRepository, PrincipalRepository, RoleFilter, RoleRepository,
};
use labrix_core::{AppError, AppResult, NonEmptyString, TenantId};
use labrix_domain::{
    ActionSet, ModuleName, Permission, PermissionId, Principal, PrincipalId, Role, RoleGrant,
    RoleId, normalize_role_name,
};

/// PostgreSQL-backed implementation of the RBAC repository ports.
///
/// Role name uniqueness is enforced by a unique index over
/// `(tenant_id, lower(btrim(name)))`, so normalized duplicates surface as
/// the duplicate-role error no matter which writer loses the race.
#[derive(Clone)]
pub struct PostgresRbacRepository {
    pool: PgPool,
}

impl PostgresRbacRepository {
    /// Creates the adapter over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: Uuid,
    module: String,
    available_actions: Vec<String>,
    description: Option<String>,
    is_active: bool,
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: Uuid,
    tenant_id: Uuid,
    name: String,
    description: Option<String>,
    is_active: bool,
    is_system: bool,
    permission_id: Option<Uuid>,
    allowed_actions: Option<Vec<String>>,
}

fn decode_permission(row: PermissionRow) -> AppResult<Permission> {
    let module = ModuleName::from_str(row.module.as_str())
        .map_err(|_| AppError::Internal(format!("invalid stored module '{}'", row.module)))?;
    let available_actions = ActionSet::from_transport(&row.available_actions).map_err(|error| {
        AppError::Internal(format!(
            "invalid stored actions for module '{}': {error}",
            row.module
        ))
    })?;

    Ok(Permission {
        id: PermissionId::from_uuid(row.id),
        module,
        available_actions,
        description: row.description,
        is_active: row.is_active,
    })
}

fn aggregate_roles(rows: Vec<RoleRow>) -> AppResult<Vec<Role>> {
    let mut by_id: HashMap<Uuid, Role> = HashMap::new();

    for row in rows {
        if !by_id.contains_key(&row.id) {
            let name = NonEmptyString::new(row.name.clone()).map_err(|_| {
                AppError::Internal(format!("invalid stored name for role '{}'", row.id))
            })?;

            by_id.insert(
                row.id,
                Role {
                    id: RoleId::from_uuid(row.id),
                    tenant_id: TenantId::from_uuid(row.tenant_id),
                    name,
                    description: row.description.clone(),
                    grants: Vec::new(),
                    is_active: row.is_active,
                    is_system: row.is_system,
                },
            );
        }

        if let (Some(permission_id), Some(stored_actions)) =
            (row.permission_id, row.allowed_actions.as_ref())
        {
            let allowed_actions = ActionSet::from_transport(stored_actions).map_err(|error| {
                AppError::Internal(format!(
                    "invalid stored grant actions for role '{}': {error}",
                    row.id
                ))
            })?;

            if let Some(role) = by_id.get_mut(&row.id) {
                role.grants.push(RoleGrant {
                    permission_id: PermissionId::from_uuid(permission_id),
                    allowed_actions,
                });
            }
        }
    }

    let mut roles: Vec<Role> = by_id.into_values().collect();
    roles.sort_by(|left, right| left.normalized_name().cmp(&right.normalized_name()));
    Ok(roles)
}

fn catalog_position(module: ModuleName) -> usize {
    ModuleName::all()
        .iter()
        .position(|candidate| *candidate == module)
        .unwrap_or(usize::MAX)
}

fn map_duplicate_role(error: sqlx::Error, name: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::DuplicateRole {
            name: name.to_owned(),
        };
    }

    AppError::Internal(format!("failed to persist role: {error}"))
}

fn map_duplicate_permission(error: sqlx::Error, module: ModuleName) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!("permission for module '{module}' already exists"));
    }

    AppError::Internal(format!("failed to persist permission: {error}"))
}

async fn replace_grants(
    transaction: &mut Transaction<'_, Postgres>,
    role_id: RoleId,
    grants: &[RoleGrant],
) -> AppResult<()> {
    sqlx::query(
        r#"
        DELETE FROM rbac_role_grants
        WHERE role_id = $1
        "#,
    )
    .bind(role_id.as_uuid())
    .execute(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to clear role grants: {error}")))?;

    for grant in grants {
        sqlx::query(
            r#"
            INSERT INTO rbac_role_grants (role_id, permission_id, allowed_actions)
            VALUES ($1, $2, $3)
            ON CONFLICT (role_id, permission_id) DO NOTHING
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(grant.permission_id.as_uuid())
        .bind(grant.allowed_actions.to_storage())
        .execute(&mut **transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist role grants: {error}")))?;
    }

    Ok(())
}

mod permissions;
mod principals;
mod roles;
