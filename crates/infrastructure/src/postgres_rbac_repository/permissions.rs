use super::*;

#[async_trait]
impl PermissionRepository for PostgresRbacRepository {
    async fn find_permission(&self, permission_id: PermissionId) -> AppResult<Option<Permission>> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, module, available_actions, description, is_active
            FROM rbac_permissions
            WHERE id = $1
            "#,
        )
        .bind(permission_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load permission: {error}")))?;

        row.map(decode_permission).transpose()
    }

    async fn find_permissions_by_ids(
        &self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>> {
        let ids: Vec<Uuid> = permission_ids.iter().map(PermissionId::as_uuid).collect();
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, module, available_actions, description, is_active
            FROM rbac_permissions
            WHERE id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load permissions: {error}")))?;

        rows.into_iter().map(decode_permission).collect()
    }

    async fn find_permission_by_module(
        &self,
        module: ModuleName,
    ) -> AppResult<Option<Permission>> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, module, available_actions, description, is_active
            FROM rbac_permissions
            WHERE module = $1
            "#,
        )
        .bind(module.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load permission: {error}")))?;

        row.map(decode_permission).transpose()
    }

    async fn list_permissions(&self, filter: PermissionFilter) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, module, available_actions, description, is_active
            FROM rbac_permissions
            WHERE ($1::BOOLEAN IS NULL OR is_active = $1)
            "#,
        )
        .bind(filter.is_active)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        let mut permissions = rows
            .into_iter()
            .map(decode_permission)
            .collect::<AppResult<Vec<Permission>>>()?;
        permissions.sort_by_key(|permission| catalog_position(permission.module));
        Ok(permissions)
    }

    async fn insert_permission(&self, permission: Permission) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rbac_permissions (id, module, available_actions, description, is_active)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(permission.id.as_uuid())
        .bind(permission.module.as_str())
        .bind(permission.available_actions.to_storage())
        .bind(permission.description.as_deref())
        .bind(permission.is_active)
        .execute(&self.pool)
        .await
        .map_err(|error| map_duplicate_permission(error, permission.module))?;

        Ok(())
    }

    async fn update_permission(&self, permission: Permission) -> AppResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE rbac_permissions
            SET module = $2,
                available_actions = $3,
                description = $4,
                is_active = $5,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(permission.id.as_uuid())
        .bind(permission.module.as_str())
        .bind(permission.available_actions.to_storage())
        .bind(permission.description.as_deref())
        .bind(permission.is_active)
        .execute(&self.pool)
        .await
        .map_err(|error| map_duplicate_permission(error, permission.module))?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "permission '{}' does not exist",
                permission.id
            )));
        }

        Ok(())
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM rbac_permissions
            WHERE id = $1
            "#,
        )
        .bind(permission_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete permission: {error}")))?;

        Ok(())
    }

    async fn count_roles_referencing(&self, permission_id: PermissionId) -> AppResult<usize> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(DISTINCT role_id)
            FROM rbac_role_grants
            WHERE permission_id = $1
            "#,
        )
        .bind(permission_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to count referencing roles: {error}"))
        })?;

        Ok(usize::try_from(count).unwrap_or(0))
    }
}
