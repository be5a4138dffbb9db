use async_trait::async_trait;
use sqlx::PgPool;

use labrix_application::{AuditEvent, AuditRepository};
use labrix_core::{AppError, AppResult};

/// Postgres sink for the append-only audit trail.
///
/// Events land in `rbac_audit_events` with a storage-assigned sequence and
/// timestamp; nothing in this crate updates or deletes them.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Builds the sink on top of an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        let AuditEvent {
            tenant_id,
            subject,
            action,
            resource_type,
            resource_id,
            detail,
        } = event;

        sqlx::query(
            r#"
            INSERT INTO rbac_audit_events
                (tenant_id, subject, action, resource_type, resource_id, detail)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(subject)
        .bind(action.as_str())
        .bind(resource_type)
        .bind(resource_id)
        .bind(detail)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to record audit event: {error}")))?;

        Ok(())
    }
}
