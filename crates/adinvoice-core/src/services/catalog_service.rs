//! Product/service catalog and categories

use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::domain::{Category, NewCategory, NewProduct, ProductInput, ProductService, TenantContext};
use crate::error::DomainError;
use crate::repositories::CatalogRepository;

pub struct CatalogService {
    catalog: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog }
    }

    pub async fn list_categories(&self, ctx: &TenantContext) -> Result<Vec<Category>, DomainError> {
        self.catalog.list_categories(ctx).await
    }

    pub async fn create_category(
        &self,
        ctx: &TenantContext,
        mut input: NewCategory,
    ) -> Result<Category, DomainError> {
        input.name = input.name.trim().to_string();
        input.validate()?;

        if self.catalog.find_category_by_name(ctx, &input.name).await?.is_some() {
            return Err(DomainError::AlreadyExists(
                "Category with this name already exists".to_string(),
            ));
        }

        self.catalog.create_category(ctx, &input).await
    }

    pub async fn list_products(&self, ctx: &TenantContext) -> Result<Vec<ProductService>, DomainError> {
        self.catalog.list_products(ctx).await
    }

    pub async fn create_product(
        &self,
        ctx: &TenantContext,
        input: ProductInput,
    ) -> Result<ProductService, DomainError> {
        input.validate()?;
        self.ensure_category(ctx, input.category_id).await?;

        let product = NewProduct::from_input(input).ok_or_else(|| {
            DomainError::ValidationError("Type and name are required".to_string())
        })?;
        let product = self.catalog.create_product(ctx, &product).await?;
        info!("Product {} created in tenant {}", product.id, ctx.tenant_id);
        Ok(product)
    }

    pub async fn update_product(
        &self,
        ctx: &TenantContext,
        id: i64,
        input: ProductInput,
    ) -> Result<ProductService, DomainError> {
        input.validate()?;
        let mut product = self
            .catalog
            .find_product(ctx, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Product/Service", id))?;
        self.ensure_category(ctx, input.category_id).await?;

        product.apply(input);
        self.catalog.update_product(ctx, &product).await
    }

    pub async fn delete_product(&self, ctx: &TenantContext, id: i64) -> Result<(), DomainError> {
        if !self.catalog.delete_product(ctx, id).await? {
            return Err(DomainError::not_found("Product/Service", id));
        }
        Ok(())
    }

    async fn ensure_category(
        &self,
        ctx: &TenantContext,
        category_id: Option<i64>,
    ) -> Result<(), DomainError> {
        match category_id {
            Some(id) if !self.catalog.category_exists(ctx, id).await? => Err(
                DomainError::ValidationError(format!("Category {} does not exist", id)),
            ),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductKind;
    use crate::repositories::MockCatalogRepository;
    use crate::services::testing::ctx;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn widget_input() -> ProductInput {
        ProductInput {
            kind: Some(ProductKind::Product),
            name: Some("Widget".to_string()),
            price: Some(dec!(250.00)),
            category_id: Some(3),
            ..Default::default()
        }
    }

    fn stored(product: &NewProduct) -> ProductService {
        ProductService {
            id: 11,
            kind: product.kind,
            category_id: product.category_id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            is_active: product.is_active,
            hsn_code: product.hsn_code.clone(),
            stock_quantity: product.stock_quantity,
            delivery_available: product.delivery_available,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_product() {
        let mut catalog = MockCatalogRepository::new();
        catalog.expect_category_exists().returning(|_, _| Ok(true));
        catalog.expect_create_product().times(1).returning(|_, p| Ok(stored(p)));

        let service = CatalogService::new(Arc::new(catalog));
        let product = service.create_product(&ctx(), widget_input()).await.unwrap();
        assert_eq!(product.price, Some(dec!(250.00)));
        assert_eq!(product.category_id, Some(3));
    }

    #[tokio::test]
    async fn test_create_product_unknown_category() {
        let mut catalog = MockCatalogRepository::new();
        catalog.expect_category_exists().returning(|_, _| Ok(false));
        catalog.expect_create_product().never();

        let service = CatalogService::new(Arc::new(catalog));
        let err = service.create_product(&ctx(), widget_input()).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_negative_price_rejected_before_lookup() {
        let service = CatalogService::new(Arc::new(MockCatalogRepository::new()));
        let input = ProductInput { price: Some(dec!(-5)), ..widget_input() };
        assert!(service.create_product(&ctx(), input).await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_category() {
        let mut catalog = MockCatalogRepository::new();
        catalog.expect_find_category_by_name().returning(|_, name| {
            Ok(Some(Category { id: 1, name: name.to_string(), description: None }))
        });
        catalog.expect_create_category().never();

        let service = CatalogService::new(Arc::new(catalog));
        let input = NewCategory { name: "Hardware".to_string(), description: None };
        let err = service.create_category(&ctx(), input).await.unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_update_unknown_product() {
        let mut catalog = MockCatalogRepository::new();
        catalog.expect_find_product().returning(|_, _| Ok(None));

        let service = CatalogService::new(Arc::new(catalog));
        let err = service.update_product(&ctx(), 5, ProductInput::default()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
