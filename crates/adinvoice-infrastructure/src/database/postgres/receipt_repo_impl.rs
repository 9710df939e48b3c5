// ============================================================================
// AdInvoice Infrastructure - PostgreSQL Receipt Repository
// File: crates/adinvoice-infrastructure/src/database/postgres/receipt_repo_impl.rs
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use adinvoice_core::domain::{
    Receipt, ReceiptStats, ReceiptStatus, TenantContext, TrashKind, TrashedItem,
};
use adinvoice_core::error::DomainError;
use adinvoice_core::repositories::ReceiptRepository;

use crate::database::{db_error, decode, PgTenantDatabases};

pub struct PgReceiptRepository {
    databases: Arc<PgTenantDatabases>,
}

impl PgReceiptRepository {
    pub fn new(databases: Arc<PgTenantDatabases>) -> Self {
        Self { databases }
    }
}

#[derive(Debug, FromRow)]
struct ReceiptRow {
    pub id: Uuid,
    pub receipt_number: String,
    pub invoice_id: Option<Uuid>,
    pub date: NaiveDate,
    pub client_name: String,
    pub client_email: Option<String>,
    pub description: Option<String>,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub balance_amount: Decimal,
    pub due_date: Option<NaiveDate>,
    pub next_payment: Option<NaiveDate>,
    pub status: String,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub invoice_number: Option<String>,
}

impl TryFrom<ReceiptRow> for Receipt {
    type Error = DomainError;

    fn try_from(row: ReceiptRow) -> Result<Self, Self::Error> {
        Ok(Receipt {
            id: row.id,
            receipt_number: row.receipt_number,
            invoice_id: row.invoice_id,
            date: row.date,
            client_name: row.client_name,
            client_email: row.client_email,
            description: row.description,
            total_amount: row.total_amount,
            paid_amount: row.paid_amount,
            balance_amount: row.balance_amount,
            due_date: row.due_date,
            next_payment: row.next_payment,
            status: decode(&row.status, ReceiptStatus::parse, "receipts.status")?,
            is_deleted: row.is_deleted,
            deleted_at: row.deleted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            invoice_number: row.invoice_number,
        })
    }
}

const RECEIPT_SELECT: &str = r#"
    SELECT r.id, r.receipt_number, r.invoice_id, r.date, r.client_name, r.client_email,
           r.description, r.total_amount, r.paid_amount, r.balance_amount, r.due_date,
           r.next_payment, r.status, r.is_deleted, r.deleted_at, r.created_at, r.updated_at,
           inv.invoice_number
    FROM receipts r
    LEFT JOIN invoices inv ON inv.id = r.invoice_id
"#;

#[async_trait]
impl ReceiptRepository for PgReceiptRepository {
    async fn list(&self, ctx: &TenantContext) -> Result<Vec<Receipt>, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let rows: Vec<ReceiptRow> = sqlx::query_as(&format!(
            "{} WHERE NOT r.is_deleted ORDER BY r.created_at DESC",
            RECEIPT_SELECT
        ))
        .fetch_all(&pool)
        .await
        .map_err(db_error("listing receipts"))?;

        rows.into_iter().map(Receipt::try_from).collect()
    }

    async fn find(&self, ctx: &TenantContext, id: Uuid) -> Result<Option<Receipt>, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let row: Option<ReceiptRow> = sqlx::query_as(&format!("{} WHERE r.id = $1", RECEIPT_SELECT))
            .bind(id)
            .fetch_optional(&pool)
            .await
            .map_err(db_error("finding receipt"))?;

        row.map(Receipt::try_from).transpose()
    }

    async fn create(&self, ctx: &TenantContext, receipt: &Receipt) -> Result<(), DomainError> {
        let pool = self.databases.pool(ctx)?;
        sqlx::query(
            r#"
            INSERT INTO receipts
                (id, receipt_number, invoice_id, date, client_name, client_email, description,
                 total_amount, paid_amount, balance_amount, due_date, next_payment, status,
                 is_deleted, deleted_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(receipt.id)
        .bind(&receipt.receipt_number)
        .bind(receipt.invoice_id)
        .bind(receipt.date)
        .bind(&receipt.client_name)
        .bind(&receipt.client_email)
        .bind(&receipt.description)
        .bind(receipt.total_amount)
        .bind(receipt.paid_amount)
        .bind(receipt.balance_amount)
        .bind(receipt.due_date)
        .bind(receipt.next_payment)
        .bind(receipt.status.as_str())
        .bind(receipt.is_deleted)
        .bind(receipt.deleted_at)
        .bind(receipt.created_at)
        .bind(receipt.updated_at)
        .execute(&pool)
        .await
        .map_err(db_error("creating receipt"))?;
        Ok(())
    }

    async fn update(&self, ctx: &TenantContext, receipt: &Receipt) -> Result<(), DomainError> {
        let pool = self.databases.pool(ctx)?;
        sqlx::query(
            r#"
            UPDATE receipts SET
                receipt_number = $2, invoice_id = $3, date = $4, client_name = $5,
                client_email = $6, description = $7, total_amount = $8, paid_amount = $9,
                balance_amount = $10, due_date = $11, next_payment = $12, status = $13,
                updated_at = $14
            WHERE id = $1
            "#,
        )
        .bind(receipt.id)
        .bind(&receipt.receipt_number)
        .bind(receipt.invoice_id)
        .bind(receipt.date)
        .bind(&receipt.client_name)
        .bind(&receipt.client_email)
        .bind(&receipt.description)
        .bind(receipt.total_amount)
        .bind(receipt.paid_amount)
        .bind(receipt.balance_amount)
        .bind(receipt.due_date)
        .bind(receipt.next_payment)
        .bind(receipt.status.as_str())
        .bind(receipt.updated_at)
        .execute(&pool)
        .await
        .map_err(db_error("updating receipt"))?;
        Ok(())
    }

    async fn set_trashed(&self, ctx: &TenantContext, id: Uuid, trashed: bool) -> Result<bool, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let result = sqlx::query(
            r#"
            UPDATE receipts
            SET is_deleted = $2,
                deleted_at = CASE WHEN $2 THEN NOW() ELSE NULL END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(trashed)
        .execute(&pool)
        .await
        .map_err(db_error("trashing receipt"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge(&self, ctx: &TenantContext, id: Uuid) -> Result<bool, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let result = sqlx::query("DELETE FROM receipts WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await
            .map_err(db_error("purging receipt"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_trashed(&self, ctx: &TenantContext) -> Result<Vec<TrashedItem>, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let rows: Vec<(Uuid, String, Option<DateTime<Utc>>)> = sqlx::query_as(
            "SELECT id, receipt_number, deleted_at FROM receipts WHERE is_deleted \
             ORDER BY deleted_at DESC",
        )
        .fetch_all(&pool)
        .await
        .map_err(db_error("listing trashed receipts"))?;

        Ok(rows
            .into_iter()
            .map(|(id, label, deleted_at)| TrashedItem {
                id,
                kind: TrashKind::Receipt,
                label,
                deleted_at,
            })
            .collect())
    }

    async fn stats(&self, ctx: &TenantContext) -> Result<ReceiptStats, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let counts: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM receipts WHERE NOT is_deleted GROUP BY status",
        )
        .fetch_all(&pool)
        .await
        .map_err(db_error("counting receipts by status"))?;

        let (total_amount, total_paid, total_balance): (Decimal, Decimal, Decimal) =
            sqlx::query_as(
                r#"
                SELECT COALESCE(SUM(total_amount), 0),
                       COALESCE(SUM(paid_amount), 0),
                       COALESCE(SUM(balance_amount), 0)
                FROM receipts
                WHERE NOT is_deleted
                "#,
            )
            .fetch_one(&pool)
            .await
            .map_err(db_error("summing receipts"))?;

        let mut stats = ReceiptStats { total_amount, total_paid, total_balance, ..Default::default() };
        for (status, n) in counts {
            stats.count(decode(&status, ReceiptStatus::parse, "receipts.status")?, n);
        }
        Ok(stats)
    }

    async fn count(&self, ctx: &TenantContext) -> Result<i64, DomainError> {
        let pool = self.databases.pool(ctx)?;
        sqlx::query_scalar("SELECT COUNT(*) FROM receipts WHERE NOT is_deleted")
            .fetch_one(&pool)
            .await
            .map_err(db_error("counting receipts"))
    }

    async fn sum_paid_for_invoice(&self, ctx: &TenantContext, invoice_id: Uuid) -> Result<Decimal, DomainError> {
        let pool = self.databases.pool(ctx)?;
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(paid_amount), 0) FROM receipts \
             WHERE invoice_id = $1 AND NOT is_deleted",
        )
        .bind(invoice_id)
        .fetch_one(&pool)
        .await
        .map_err(db_error("summing receipt payments"))
    }
}
