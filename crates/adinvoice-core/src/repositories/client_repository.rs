//! Client company repository trait (port, tenant database)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{ClientCompany, TenantContext};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn list(&self, ctx: &TenantContext) -> Result<Vec<ClientCompany>, DomainError>;
    async fn find(&self, ctx: &TenantContext, id: Uuid) -> Result<Option<ClientCompany>, DomainError>;
    /// Case-insensitive name lookup, ignoring `exclude`
    async fn name_taken(&self, ctx: &TenantContext, name: &str, exclude: Option<Uuid>) -> Result<bool, DomainError>;
    async fn create(&self, ctx: &TenantContext, client: &ClientCompany) -> Result<(), DomainError>;
    async fn update(&self, ctx: &TenantContext, client: &ClientCompany) -> Result<(), DomainError>;
    async fn delete(&self, ctx: &TenantContext, id: Uuid) -> Result<bool, DomainError>;
    async fn count(&self, ctx: &TenantContext) -> Result<i64, DomainError>;
}
