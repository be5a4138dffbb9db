//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod database;
mod in_memory_audit_repository;
mod in_memory_rbac_repository;
mod postgres_audit_repository;
mod postgres_rbac_repository;

pub use database::{DatabaseConfig, connect_and_migrate};
pub use in_memory_audit_repository::InMemoryAuditRepository;
pub use in_memory_rbac_repository::InMemoryRbacRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_rbac_repository::PostgresRbacRepository;
