//! Tenant registry and tenant database ports

use async_trait::async_trait;

use crate::domain::Tenant;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Tenant>, DomainError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Tenant>, DomainError>;
    async fn list(&self) -> Result<Vec<Tenant>, DomainError>;
    async fn list_active(&self) -> Result<Vec<Tenant>, DomainError>;
    async fn create(&self, name: &str, db_name: &str, owner_id: Option<i64>) -> Result<Tenant, DomainError>;
    async fn set_active(&self, id: i64, is_active: bool) -> Result<Tenant, DomainError>;
    async fn rename(&self, id: i64, name: &str) -> Result<Tenant, DomainError>;
    async fn delete(&self, id: i64) -> Result<(), DomainError>;
}

/// Physical tenant databases and the per-alias connection pools
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenantDatabases: Send + Sync {
    /// `CREATE DATABASE`; fails when it already exists
    async fn create_database(&self, db_name: &str) -> Result<(), DomainError>;
    /// `DROP DATABASE IF EXISTS ... WITH (FORCE)`
    async fn drop_database(&self, db_name: &str) -> Result<(), DomainError>;
    /// Open a pool for the alias unless one is already registered
    async fn register(&self, db_alias: &str) -> Result<(), DomainError>;
    /// Remove and close the alias pool, if any
    async fn deregister(&self, db_alias: &str);
    /// Bring the tenant schema up to date
    async fn migrate(&self, db_alias: &str) -> Result<(), DomainError>;
    fn is_registered(&self, db_alias: &str) -> bool;
}
