use super::*;

#[async_trait]
impl RoleRepository for PostgresRbacRepository {
    async fn find_active_roles(
        &self,
        tenant_id: TenantId,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<Role>> {
        let ids: Vec<Uuid> = role_ids.iter().map(RoleId::as_uuid).collect();
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                rbac_roles.id,
                rbac_roles.tenant_id,
                rbac_roles.name,
                rbac_roles.description,
                rbac_roles.is_active,
                rbac_roles.is_system,
                rbac_role_grants.permission_id,
                rbac_role_grants.allowed_actions
            FROM rbac_roles
            LEFT JOIN rbac_role_grants
                ON rbac_role_grants.role_id = rbac_roles.id
            WHERE rbac_roles.tenant_id = $1
              AND rbac_roles.is_active
              AND rbac_roles.id = ANY($2)
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load roles: {error}")))?;

        aggregate_roles(rows)
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                rbac_roles.id,
                rbac_roles.tenant_id,
                rbac_roles.name,
                rbac_roles.description,
                rbac_roles.is_active,
                rbac_roles.is_system,
                rbac_role_grants.permission_id,
                rbac_role_grants.allowed_actions
            FROM rbac_roles
            LEFT JOIN rbac_role_grants
                ON rbac_role_grants.role_id = rbac_roles.id
            WHERE rbac_roles.id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role: {error}")))?;

        Ok(aggregate_roles(rows)?.pop())
    }

    async fn find_role_by_name(&self, tenant_id: TenantId, name: &str) -> AppResult<Option<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                rbac_roles.id,
                rbac_roles.tenant_id,
                rbac_roles.name,
                rbac_roles.description,
                rbac_roles.is_active,
                rbac_roles.is_system,
                rbac_role_grants.permission_id,
                rbac_role_grants.allowed_actions
            FROM rbac_roles
            LEFT JOIN rbac_role_grants
                ON rbac_role_grants.role_id = rbac_roles.id
            WHERE rbac_roles.tenant_id = $1
              AND lower(btrim(rbac_roles.name)) = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(normalize_role_name(name))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role by name: {error}")))?;

        Ok(aggregate_roles(rows)?.pop())
    }

    async fn list_roles(&self, tenant_id: TenantId, filter: RoleFilter) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                rbac_roles.id,
                rbac_roles.tenant_id,
                rbac_roles.name,
                rbac_roles.description,
                rbac_roles.is_active,
                rbac_roles.is_system,
                rbac_role_grants.permission_id,
                rbac_role_grants.allowed_actions
            FROM rbac_roles
            LEFT JOIN rbac_role_grants
                ON rbac_role_grants.role_id = rbac_roles.id
            WHERE rbac_roles.tenant_id = $1
              AND ($2::BOOLEAN IS NULL OR rbac_roles.is_active = $2)
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(filter.is_active)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        aggregate_roles(rows)
    }

    async fn insert_role(&self, role: Role) -> AppResult<()> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))?;

        sqlx::query(
            r#"
            INSERT INTO rbac_roles (id, tenant_id, name, description, is_active, is_system)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(role.id.as_uuid())
        .bind(role.tenant_id.as_uuid())
        .bind(role.name.as_str())
        .bind(role.description.as_deref())
        .bind(role.is_active)
        .bind(role.is_system)
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_duplicate_role(error, role.name.as_str()))?;

        replace_grants(&mut transaction, role.id, &role.grants).await?;

        transaction
            .commit()
            .await
            .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))
    }

    async fn update_role(&self, role: Role) -> AppResult<()> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))?;

        let updated = sqlx::query(
            r#"
            UPDATE rbac_roles
            SET name = $2,
                description = $3,
                is_active = $4,
                is_system = $5,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(role.id.as_uuid())
        .bind(role.name.as_str())
        .bind(role.description.as_deref())
        .bind(role.is_active)
        .bind(role.is_system)
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_duplicate_role(error, role.name.as_str()))?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist",
                role.id
            )));
        }

        replace_grants(&mut transaction, role.id, &role.grants).await?;

        transaction
            .commit()
            .await
            .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM rbac_roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?;

        Ok(())
    }
}
