// ============================================================================
// AdInvoice Infrastructure - PostgreSQL Client Company Repository
// File: crates/adinvoice-infrastructure/src/database/postgres/client_repo_impl.rs
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use adinvoice_core::domain::{ClientCompany, TenantContext};
use adinvoice_core::error::DomainError;
use adinvoice_core::repositories::ClientRepository;

use crate::database::{db_error, is_unique_violation, PgTenantDatabases};

pub struct PgClientRepository {
    databases: Arc<PgTenantDatabases>,
}

impl PgClientRepository {
    pub fn new(databases: Arc<PgTenantDatabases>) -> Self {
        Self { databases }
    }
}

#[derive(Debug, FromRow)]
struct ClientRow {
    pub id: Uuid,
    pub name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub registration_number: Option<String>,
    pub tax_id: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub support_email: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ClientRow> for ClientCompany {
    fn from(row: ClientRow) -> Self {
        ClientCompany {
            id: row.id,
            name: row.name,
            industry: row.industry,
            website: row.website,
            registration_number: row.registration_number,
            tax_id: row.tax_id,
            address_line1: row.address_line1,
            address_line2: row.address_line2,
            city: row.city,
            state: row.state,
            country: row.country,
            postal_code: row.postal_code,
            phone: row.phone,
            email: row.email,
            support_email: row.support_email,
            notes: row.notes,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const CLIENT_COLUMNS: &str = "id, name, industry, website, registration_number, tax_id, \
    address_line1, address_line2, city, state, country, postal_code, phone, email, \
    support_email, notes, is_active, created_at, updated_at";

fn duplicate_name(e: sqlx::Error) -> DomainError {
    if is_unique_violation(&e) {
        return DomainError::AlreadyExists(
            "Client company with this name already exists".to_string(),
        );
    }
    db_error("saving client company")(e)
}

#[async_trait]
impl ClientRepository for PgClientRepository {
    async fn list(&self, ctx: &TenantContext) -> Result<Vec<ClientCompany>, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let rows: Vec<ClientRow> = sqlx::query_as(&format!(
            "SELECT {} FROM client_companies ORDER BY created_at DESC",
            CLIENT_COLUMNS
        ))
        .fetch_all(&pool)
        .await
        .map_err(db_error("listing client companies"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find(&self, ctx: &TenantContext, id: Uuid) -> Result<Option<ClientCompany>, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let row: Option<ClientRow> = sqlx::query_as(&format!(
            "SELECT {} FROM client_companies WHERE id = $1",
            CLIENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&pool)
        .await
        .map_err(db_error("finding client company"))?;

        Ok(row.map(Into::into))
    }

    async fn name_taken(
        &self,
        ctx: &TenantContext,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, DomainError> {
        let pool = self.databases.pool(ctx)?;
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM client_companies
                WHERE LOWER(name) = LOWER($1) AND ($2::UUID IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(name)
        .bind(exclude)
        .fetch_one(&pool)
        .await
        .map_err(db_error("checking client company name"))
    }

    async fn create(&self, ctx: &TenantContext, client: &ClientCompany) -> Result<(), DomainError> {
        let pool = self.databases.pool(ctx)?;
        sqlx::query(&format!(
            r#"
            INSERT INTO client_companies ({})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
            CLIENT_COLUMNS
        ))
        .bind(client.id)
        .bind(&client.name)
        .bind(&client.industry)
        .bind(&client.website)
        .bind(&client.registration_number)
        .bind(&client.tax_id)
        .bind(&client.address_line1)
        .bind(&client.address_line2)
        .bind(&client.city)
        .bind(&client.state)
        .bind(&client.country)
        .bind(&client.postal_code)
        .bind(&client.phone)
        .bind(&client.email)
        .bind(&client.support_email)
        .bind(&client.notes)
        .bind(client.is_active)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&pool)
        .await
        .map_err(duplicate_name)?;
        Ok(())
    }

    async fn update(&self, ctx: &TenantContext, client: &ClientCompany) -> Result<(), DomainError> {
        let pool = self.databases.pool(ctx)?;
        sqlx::query(
            r#"
            UPDATE client_companies SET
                name = $2, industry = $3, website = $4, registration_number = $5, tax_id = $6,
                address_line1 = $7, address_line2 = $8, city = $9, state = $10, country = $11,
                postal_code = $12, phone = $13, email = $14, support_email = $15, notes = $16,
                is_active = $17, updated_at = $18
            WHERE id = $1
            "#,
        )
        .bind(client.id)
        .bind(&client.name)
        .bind(&client.industry)
        .bind(&client.website)
        .bind(&client.registration_number)
        .bind(&client.tax_id)
        .bind(&client.address_line1)
        .bind(&client.address_line2)
        .bind(&client.city)
        .bind(&client.state)
        .bind(&client.country)
        .bind(&client.postal_code)
        .bind(&client.phone)
        .bind(&client.email)
        .bind(&client.support_email)
        .bind(&client.notes)
        .bind(client.is_active)
        .bind(client.updated_at)
        .execute(&pool)
        .await
        .map_err(duplicate_name)?;
        Ok(())
    }

    async fn delete(&self, ctx: &TenantContext, id: Uuid) -> Result<bool, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let result = sqlx::query("DELETE FROM client_companies WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await
            .map_err(db_error("deleting client company"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, ctx: &TenantContext) -> Result<i64, DomainError> {
        let pool = self.databases.pool(ctx)?;
        sqlx::query_scalar("SELECT COUNT(*) FROM client_companies")
            .fetch_one(&pool)
            .await
            .map_err(db_error("counting client companies"))
    }
}
