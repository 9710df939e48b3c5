// ============================================================================
// AdInvoice Infrastructure - PostgreSQL Catalog Repository
// File: crates/adinvoice-infrastructure/src/database/postgres/catalog_repo_impl.rs
// Description: Categories and products/services of a tenant
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use adinvoice_core::domain::{
    Category, NewCategory, NewProduct, ProductKind, ProductService, TenantContext,
};
use adinvoice_core::error::DomainError;
use adinvoice_core::repositories::CatalogRepository;

use crate::database::{db_error, decode, is_unique_violation, PgTenantDatabases};

pub struct PgCatalogRepository {
    databases: Arc<PgTenantDatabases>,
}

impl PgCatalogRepository {
    pub fn new(databases: Arc<PgTenantDatabases>) -> Self {
        Self { databases }
    }
}

#[derive(Debug, FromRow)]
struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category { id: row.id, name: row.name, description: row.description }
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    pub id: i64,
    pub kind: String,
    pub category_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub is_active: bool,
    pub hsn_code: Option<String>,
    pub stock_quantity: Option<i32>,
    pub delivery_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for ProductService {
    type Error = DomainError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(ProductService {
            id: row.id,
            kind: decode(&row.kind, ProductKind::parse, "products_services.kind")?,
            category_id: row.category_id,
            name: row.name,
            description: row.description,
            price: row.price,
            is_active: row.is_active,
            hsn_code: row.hsn_code,
            stock_quantity: row.stock_quantity,
            delivery_available: row.delivery_available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const PRODUCT_COLUMNS: &str = "id, kind, category_id, name, description, price, is_active, \
    hsn_code, stock_quantity, delivery_available, created_at, updated_at";

fn duplicate_hsn(e: sqlx::Error) -> DomainError {
    if is_unique_violation(&e) {
        return DomainError::AlreadyExists("Product with this HSN code already exists".to_string());
    }
    db_error("saving product")(e)
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn list_categories(&self, ctx: &TenantContext) -> Result<Vec<Category>, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let rows: Vec<CategoryRow> =
            sqlx::query_as("SELECT id, name, description FROM categories ORDER BY name")
                .fetch_all(&pool)
                .await
                .map_err(db_error("listing categories"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn category_exists(&self, ctx: &TenantContext, id: i64) -> Result<bool, DomainError> {
        let pool = self.databases.pool(ctx)?;
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
            .bind(id)
            .fetch_one(&pool)
            .await
            .map_err(db_error("checking category"))
    }

    async fn find_category_by_name(
        &self,
        ctx: &TenantContext,
        name: &str,
    ) -> Result<Option<Category>, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let row: Option<CategoryRow> = sqlx::query_as(
            "SELECT id, name, description FROM categories WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name)
        .fetch_optional(&pool)
        .await
        .map_err(db_error("finding category by name"))?;

        Ok(row.map(Into::into))
    }

    async fn create_category(
        &self,
        ctx: &TenantContext,
        category: &NewCategory,
    ) -> Result<Category, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let row: CategoryRow = sqlx::query_as(
            "INSERT INTO categories (name, description) VALUES ($1, $2) \
             RETURNING id, name, description",
        )
        .bind(&category.name)
        .bind(&category.description)
        .fetch_one(&pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::AlreadyExists("Category with this name already exists".to_string())
            } else {
                db_error("creating category")(e)
            }
        })?;

        Ok(row.into())
    }

    async fn list_products(&self, ctx: &TenantContext) -> Result<Vec<ProductService>, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products_services ORDER BY created_at DESC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&pool)
        .await
        .map_err(db_error("listing products"))?;

        rows.into_iter().map(ProductService::try_from).collect()
    }

    async fn find_product(
        &self,
        ctx: &TenantContext,
        id: i64,
    ) -> Result<Option<ProductService>, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products_services WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&pool)
        .await
        .map_err(db_error("finding product"))?;

        row.map(ProductService::try_from).transpose()
    }

    async fn create_product(
        &self,
        ctx: &TenantContext,
        product: &NewProduct,
    ) -> Result<ProductService, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let row: ProductRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO products_services
                (kind, category_id, name, description, price, is_active,
                 hsn_code, stock_quantity, delivery_available)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(product.kind.as_str())
        .bind(product.category_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.is_active)
        .bind(&product.hsn_code)
        .bind(product.stock_quantity)
        .bind(product.delivery_available)
        .fetch_one(&pool)
        .await
        .map_err(duplicate_hsn)?;

        row.try_into()
    }

    async fn update_product(
        &self,
        ctx: &TenantContext,
        product: &ProductService,
    ) -> Result<ProductService, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            r#"
            UPDATE products_services SET
                kind = $2, category_id = $3, name = $4, description = $5, price = $6,
                is_active = $7, hsn_code = $8, stock_quantity = $9, delivery_available = $10,
                updated_at = $11
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(product.id)
        .bind(product.kind.as_str())
        .bind(product.category_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.is_active)
        .bind(&product.hsn_code)
        .bind(product.stock_quantity)
        .bind(product.delivery_available)
        .bind(product.updated_at)
        .fetch_optional(&pool)
        .await
        .map_err(duplicate_hsn)?;

        row.ok_or_else(|| DomainError::not_found("Product", product.id))?
            .try_into()
    }

    async fn delete_product(&self, ctx: &TenantContext, id: i64) -> Result<bool, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let result = sqlx::query("DELETE FROM products_services WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await
            .map_err(db_error("deleting product"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_products(&self, ctx: &TenantContext) -> Result<i64, DomainError> {
        let pool = self.databases.pool(ctx)?;
        sqlx::query_scalar("SELECT COUNT(*) FROM products_services")
            .fetch_one(&pool)
            .await
            .map_err(db_error("counting products"))
    }
}
