use super::*;

#[derive(Debug, FromRow)]
struct PrincipalRow {
    id: Uuid,
    tenant_id: Option<Uuid>,
    role_id: Option<Uuid>,
}

#[async_trait]
impl PrincipalRepository for PostgresRbacRepository {
    async fn find_principal(&self, principal_id: PrincipalId) -> AppResult<Option<Principal>> {
        let rows = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT
                principals.id,
                principals.tenant_id,
                principal_roles.role_id
            FROM principals
            LEFT JOIN principal_roles
                ON principal_roles.principal_id = principals.id
            WHERE principals.id = $1
            ORDER BY principal_roles.assigned_at
            "#,
        )
        .bind(principal_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load principal: {error}")))?;

        let Some(first) = rows.first() else {
            return Ok(None);
        };

        Ok(Some(Principal {
            id: PrincipalId::from_uuid(first.id),
            tenant_id: first.tenant_id.map(TenantId::from_uuid),
            role_ids: rows
                .iter()
                .filter_map(|row| row.role_id)
                .map(RoleId::from_uuid)
                .collect(),
        }))
    }

    async fn principal_ids_with_role(&self, role_id: RoleId) -> AppResult<Vec<PrincipalId>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT principal_id
            FROM principal_roles
            WHERE role_id = $1
            ORDER BY principal_id
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list role holders: {error}")))?;

        Ok(ids.into_iter().map(PrincipalId::from_uuid).collect())
    }

    async fn attach_role_to_principal(
        &self,
        principal_id: PrincipalId,
        role_id: RoleId,
    ) -> AppResult<()> {
        let principal_count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM principals
            WHERE id = $1
            "#,
        )
        .bind(principal_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve principal: {error}")))?;

        if principal_count == 0 {
            return Err(AppError::NotFound(format!(
                "principal '{principal_id}' does not exist"
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO principal_roles (principal_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (principal_id, role_id) DO NOTHING
            "#,
        )
        .bind(principal_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to attach role: {error}")))?;

        Ok(())
    }
}
