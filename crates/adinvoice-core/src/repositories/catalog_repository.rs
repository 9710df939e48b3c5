//! Catalog repository trait (port, tenant database)

use async_trait::async_trait;

use crate::domain::{Category, NewCategory, NewProduct, ProductService, TenantContext};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_categories(&self, ctx: &TenantContext) -> Result<Vec<Category>, DomainError>;
    async fn category_exists(&self, ctx: &TenantContext, id: i64) -> Result<bool, DomainError>;
    async fn find_category_by_name(&self, ctx: &TenantContext, name: &str) -> Result<Option<Category>, DomainError>;
    async fn create_category(&self, ctx: &TenantContext, category: &NewCategory) -> Result<Category, DomainError>;

    async fn list_products(&self, ctx: &TenantContext) -> Result<Vec<ProductService>, DomainError>;
    async fn find_product(&self, ctx: &TenantContext, id: i64) -> Result<Option<ProductService>, DomainError>;
    async fn create_product(&self, ctx: &TenantContext, product: &NewProduct) -> Result<ProductService, DomainError>;
    async fn update_product(&self, ctx: &TenantContext, product: &ProductService) -> Result<ProductService, DomainError>;
    async fn delete_product(&self, ctx: &TenantContext, id: i64) -> Result<bool, DomainError>;
    async fn count_products(&self, ctx: &TenantContext) -> Result<i64, DomainError>;
}
