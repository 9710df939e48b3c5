// ============================================================================
// AdInvoice Infrastructure - PostgreSQL Tenant Repository
// File: crates/adinvoice-infrastructure/src/database/postgres/tenant_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info};

use adinvoice_core::domain::Tenant;
use adinvoice_core::error::DomainError;
use adinvoice_core::repositories::TenantRepository;

use crate::database::{db_error, is_unique_violation};

pub struct PgTenantRepository {
    pool: PgPool,
}

impl PgTenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct TenantRow {
    pub id: i64,
    pub name: String,
    pub db_name: String,
    pub owner_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TenantRow> for Tenant {
    fn from(row: TenantRow) -> Self {
        Tenant {
            id: row.id,
            name: row.name,
            db_name: row.db_name,
            owner_id: row.owner_id,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const TENANT_COLUMNS: &str = "id, name, db_name, owner_id, is_active, created_at, updated_at";

#[async_trait]
impl TenantRepository for PgTenantRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Tenant>, DomainError> {
        let row: Option<TenantRow> =
            sqlx::query_as(&format!("SELECT {} FROM tenants WHERE id = $1", TENANT_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("finding tenant by id"))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tenant>, DomainError> {
        let row: Option<TenantRow> = sqlx::query_as(&format!(
            "SELECT {} FROM tenants WHERE LOWER(name) = LOWER($1)",
            TENANT_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding tenant by name"))?;

        Ok(row.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Tenant>, DomainError> {
        let rows: Vec<TenantRow> =
            sqlx::query_as(&format!("SELECT {} FROM tenants ORDER BY id", TENANT_COLUMNS))
                .fetch_all(&self.pool)
                .await
                .map_err(db_error("listing tenants"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_active(&self) -> Result<Vec<Tenant>, DomainError> {
        let rows: Vec<TenantRow> = sqlx::query_as(&format!(
            "SELECT {} FROM tenants WHERE is_active ORDER BY id",
            TENANT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing active tenants"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(
        &self,
        name: &str,
        db_name: &str,
        owner_id: Option<i64>,
    ) -> Result<Tenant, DomainError> {
        info!("Creating tenant: {}", name);

        let row: TenantRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO tenants (name, db_name, owner_id, is_active)
            VALUES ($1, $2, $3, TRUE)
            RETURNING {}
            "#,
            TENANT_COLUMNS
        ))
        .bind(name)
        .bind(db_name)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error creating tenant: {}", e);
            if is_unique_violation(&e) {
                DomainError::TenantNameAlreadyExists(name.to_string())
            } else {
                DomainError::DatabaseError(e.to_string())
            }
        })?;

        Ok(row.into())
    }

    async fn set_active(&self, id: i64, is_active: bool) -> Result<Tenant, DomainError> {
        let row: Option<TenantRow> = sqlx::query_as(&format!(
            "UPDATE tenants SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            TENANT_COLUMNS
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("updating tenant status"))?;

        row.map(Into::into).ok_or(DomainError::TenantNotFound)
    }

    async fn rename(&self, id: i64, name: &str) -> Result<Tenant, DomainError> {
        let row: Option<TenantRow> = sqlx::query_as(&format!(
            "UPDATE tenants SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            TENANT_COLUMNS
        ))
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error renaming tenant: {}", e);
            if is_unique_violation(&e) {
                DomainError::TenantNameAlreadyExists(name.to_string())
            } else {
                DomainError::DatabaseError(e.to_string())
            }
        })?;

        row.map(Into::into).ok_or(DomainError::TenantNotFound)
    }

    async fn delete(&self, id: i64) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("deleting tenant"))?;
        Ok(())
    }
}
