// ============================================================================
// AdInvoice Infrastructure - PostgreSQL Invoice Repository
// File: crates/adinvoice-infrastructure/src/database/postgres/invoice_repo_impl.rs
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use adinvoice_core::domain::{
    Invoice, InvoiceItem, InvoiceItemKind, InvoiceStats, InvoiceStatus, InvoiceSummary,
    InvoiceTotals, TenantContext, TrashKind, TrashedItem,
};
use adinvoice_core::error::DomainError;
use adinvoice_core::repositories::InvoiceRepository;

use crate::database::{db_error, decode, is_unique_violation, PgTenantDatabases};

pub struct PgInvoiceRepository {
    databases: Arc<PgTenantDatabases>,
}

impl PgInvoiceRepository {
    pub fn new(databases: Arc<PgTenantDatabases>) -> Self {
        Self { databases }
    }
}

#[derive(Debug, FromRow)]
struct InvoiceRow {
    pub id: Uuid,
    pub proposal_id: Option<Uuid>,
    pub invoice_number: String,
    pub client_name: String,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub client_address: Option<String>,
    pub client_gstin: Option<String>,
    pub company_name: Option<String>,
    pub company_email: Option<String>,
    pub company_phone: Option<String>,
    pub company_address: Option<String>,
    pub company_gstin: Option<String>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub subtotal: Decimal,
    pub total_gst: Decimal,
    pub grand_total: Decimal,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub status: String,
    pub template_used: String,
    pub amount_paid: Decimal,
    pub balance_due: Decimal,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub proposal_title: Option<String>,
    pub proposal_number: Option<String>,
}

impl InvoiceRow {
    fn into_invoice(self, items: Vec<InvoiceItem>) -> Result<Invoice, DomainError> {
        Ok(Invoice {
            id: self.id,
            proposal_id: self.proposal_id,
            invoice_number: self.invoice_number,
            client_name: self.client_name,
            client_email: self.client_email,
            client_phone: self.client_phone,
            client_address: self.client_address,
            client_gstin: self.client_gstin,
            company_name: self.company_name,
            company_email: self.company_email,
            company_phone: self.company_phone,
            company_address: self.company_address,
            company_gstin: self.company_gstin,
            issue_date: self.issue_date,
            due_date: self.due_date,
            subtotal: self.subtotal,
            total_gst: self.total_gst,
            grand_total: self.grand_total,
            notes: self.notes,
            terms: self.terms,
            status: decode(&self.status, InvoiceStatus::parse, "invoices.status")?,
            template_used: self.template_used,
            amount_paid: self.amount_paid,
            balance_due: self.balance_due,
            is_deleted: self.is_deleted,
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
            proposal_title: self.proposal_title,
            proposal_number: self.proposal_number,
        })
    }
}

#[derive(Debug, FromRow)]
struct InvoiceItemRow {
    pub id: Uuid,
    pub description: String,
    pub item_type: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub gst_rate: Decimal,
    pub total: Decimal,
    pub unit: String,
    pub hsn_sac: Option<String>,
    pub part_service_code: Option<String>,
    pub position: i32,
}

impl TryFrom<InvoiceItemRow> for InvoiceItem {
    type Error = DomainError;

    fn try_from(row: InvoiceItemRow) -> Result<Self, Self::Error> {
        Ok(InvoiceItem {
            id: row.id,
            description: row.description,
            item_type: decode(&row.item_type, InvoiceItemKind::parse, "invoice_items.item_type")?,
            quantity: row.quantity,
            price: row.price,
            gst_rate: row.gst_rate,
            total: row.total,
            unit: row.unit,
            hsn_sac: row.hsn_sac,
            part_service_code: row.part_service_code,
            position: row.position,
        })
    }
}

#[derive(Debug, FromRow)]
struct SummaryRow {
    pub id: Uuid,
    pub invoice_number: String,
    pub client_name: String,
    pub client_email: Option<String>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub grand_total: Decimal,
    pub amount_paid: Decimal,
    pub balance_due: Decimal,
    pub status: String,
    pub template_used: String,
    pub items_count: i64,
    pub proposal_title: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SummaryRow> for InvoiceSummary {
    type Error = DomainError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        Ok(InvoiceSummary {
            id: row.id,
            invoice_number: row.invoice_number,
            client_name: row.client_name,
            client_email: row.client_email,
            issue_date: row.issue_date,
            due_date: row.due_date,
            grand_total: row.grand_total,
            amount_paid: row.amount_paid,
            balance_due: row.balance_due,
            status: decode(&row.status, InvoiceStatus::parse, "invoices.status")?,
            template_used: row.template_used,
            items_count: row.items_count,
            proposal_title: row.proposal_title,
            created_at: row.created_at,
        })
    }
}

const INSERT_COLUMNS: &str = "id, proposal_id, invoice_number, client_name, client_email, \
    client_phone, client_address, client_gstin, company_name, company_email, company_phone, \
    company_address, company_gstin, issue_date, due_date, subtotal, total_gst, grand_total, \
    notes, terms, status, template_used, amount_paid, balance_due, is_deleted, deleted_at, \
    created_at, updated_at";

const INVOICE_SELECT: &str = r#"
    SELECT inv.id, inv.proposal_id, inv.invoice_number, inv.client_name, inv.client_email,
           inv.client_phone, inv.client_address, inv.client_gstin, inv.company_name,
           inv.company_email, inv.company_phone, inv.company_address, inv.company_gstin,
           inv.issue_date, inv.due_date, inv.subtotal, inv.total_gst, inv.grand_total,
           inv.notes, inv.terms, inv.status, inv.template_used, inv.amount_paid,
           inv.balance_due, inv.is_deleted, inv.deleted_at, inv.created_at, inv.updated_at,
           p.title AS proposal_title, p.proposal_number
    FROM invoices inv
    LEFT JOIN proposals p ON p.id = inv.proposal_id
"#;

async fn load_items(pool: &PgPool, invoice_id: Uuid) -> Result<Vec<InvoiceItem>, DomainError> {
    let rows: Vec<InvoiceItemRow> = sqlx::query_as(
        r#"
        SELECT id, description, item_type, quantity, price, gst_rate, total, unit,
               hsn_sac, part_service_code, position
        FROM invoice_items
        WHERE invoice_id = $1
        ORDER BY position, id
        "#,
    )
    .bind(invoice_id)
    .fetch_all(pool)
    .await
    .map_err(db_error("loading invoice items"))?;

    rows.into_iter().map(InvoiceItem::try_from).collect()
}

async fn insert_items(
    conn: &mut PgConnection,
    invoice_id: Uuid,
    items: &[InvoiceItem],
) -> Result<(), DomainError> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO invoice_items
                (id, invoice_id, description, item_type, quantity, price, gst_rate, total,
                 unit, hsn_sac, part_service_code, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(item.id)
        .bind(invoice_id)
        .bind(&item.description)
        .bind(item.item_type.as_str())
        .bind(item.quantity)
        .bind(item.price)
        .bind(item.gst_rate)
        .bind(item.total)
        .bind(&item.unit)
        .bind(&item.hsn_sac)
        .bind(&item.part_service_code)
        .bind(item.position)
        .execute(&mut *conn)
        .await
        .map_err(db_error("inserting invoice item"))?;
    }
    Ok(())
}

#[async_trait]
impl InvoiceRepository for PgInvoiceRepository {
    async fn list(&self, ctx: &TenantContext) -> Result<Vec<InvoiceSummary>, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let rows: Vec<SummaryRow> = sqlx::query_as(
            r#"
            SELECT inv.id, inv.invoice_number, inv.client_name, inv.client_email, inv.issue_date,
                   inv.due_date, inv.grand_total, inv.amount_paid, inv.balance_due, inv.status,
                   inv.template_used, inv.created_at, p.title AS proposal_title,
                   (SELECT COUNT(*) FROM invoice_items i WHERE i.invoice_id = inv.id) AS items_count
            FROM invoices inv
            LEFT JOIN proposals p ON p.id = inv.proposal_id
            WHERE NOT inv.is_deleted
            ORDER BY inv.created_at DESC
            "#,
        )
        .fetch_all(&pool)
        .await
        .map_err(db_error("listing invoices"))?;

        rows.into_iter().map(InvoiceSummary::try_from).collect()
    }

    async fn find(&self, ctx: &TenantContext, id: Uuid) -> Result<Option<Invoice>, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let row: Option<InvoiceRow> =
            sqlx::query_as(&format!("{} WHERE inv.id = $1", INVOICE_SELECT))
                .bind(id)
                .fetch_optional(&pool)
                .await
                .map_err(db_error("finding invoice"))?;

        match row {
            Some(row) => {
                let items = load_items(&pool, id).await?;
                row.into_invoice(items).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn number_exists(&self, ctx: &TenantContext, invoice_number: &str) -> Result<bool, DomainError> {
        let pool = self.databases.pool(ctx)?;
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM invoices WHERE invoice_number = $1)")
            .bind(invoice_number)
            .fetch_one(&pool)
            .await
            .map_err(db_error("checking invoice number"))
    }

    async fn create(&self, ctx: &TenantContext, invoice: &Invoice) -> Result<(), DomainError> {
        let pool = self.databases.pool(ctx)?;
        let mut tx = pool.begin().await.map_err(db_error("starting transaction"))?;

        sqlx::query(&format!(
            r#"
            INSERT INTO invoices ({})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28)
            "#,
            INSERT_COLUMNS
        ))
        .bind(invoice.id)
        .bind(invoice.proposal_id)
        .bind(&invoice.invoice_number)
        .bind(&invoice.client_name)
        .bind(&invoice.client_email)
        .bind(&invoice.client_phone)
        .bind(&invoice.client_address)
        .bind(&invoice.client_gstin)
        .bind(&invoice.company_name)
        .bind(&invoice.company_email)
        .bind(&invoice.company_phone)
        .bind(&invoice.company_address)
        .bind(&invoice.company_gstin)
        .bind(invoice.issue_date)
        .bind(invoice.due_date)
        .bind(invoice.subtotal)
        .bind(invoice.total_gst)
        .bind(invoice.grand_total)
        .bind(&invoice.notes)
        .bind(&invoice.terms)
        .bind(invoice.status.as_str())
        .bind(&invoice.template_used)
        .bind(invoice.amount_paid)
        .bind(invoice.balance_due)
        .bind(invoice.is_deleted)
        .bind(invoice.deleted_at)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::AlreadyExists(format!(
                    "Invoice number {} already exists",
                    invoice.invoice_number
                ))
            } else {
                db_error("creating invoice")(e)
            }
        })?;

        insert_items(&mut tx, invoice.id, &invoice.items).await?;

        tx.commit().await.map_err(db_error("committing invoice"))?;
        Ok(())
    }

    async fn update(
        &self,
        ctx: &TenantContext,
        invoice: &Invoice,
        replace_items: bool,
    ) -> Result<(), DomainError> {
        let pool = self.databases.pool(ctx)?;
        let mut tx = pool.begin().await.map_err(db_error("starting transaction"))?;

        sqlx::query(
            r#"
            UPDATE invoices SET
                proposal_id = $2, client_name = $3, client_email = $4, client_phone = $5,
                client_address = $6, client_gstin = $7, company_name = $8, company_email = $9,
                company_phone = $10, company_address = $11, company_gstin = $12,
                issue_date = $13, due_date = $14, subtotal = $15, total_gst = $16,
                grand_total = $17, notes = $18, terms = $19, status = $20, template_used = $21,
                amount_paid = $22, balance_due = $23, updated_at = $24
            WHERE id = $1
            "#,
        )
        .bind(invoice.id)
        .bind(invoice.proposal_id)
        .bind(&invoice.client_name)
        .bind(&invoice.client_email)
        .bind(&invoice.client_phone)
        .bind(&invoice.client_address)
        .bind(&invoice.client_gstin)
        .bind(&invoice.company_name)
        .bind(&invoice.company_email)
        .bind(&invoice.company_phone)
        .bind(&invoice.company_address)
        .bind(&invoice.company_gstin)
        .bind(invoice.issue_date)
        .bind(invoice.due_date)
        .bind(invoice.subtotal)
        .bind(invoice.total_gst)
        .bind(invoice.grand_total)
        .bind(&invoice.notes)
        .bind(&invoice.terms)
        .bind(invoice.status.as_str())
        .bind(&invoice.template_used)
        .bind(invoice.amount_paid)
        .bind(invoice.balance_due)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error("updating invoice"))?;

        if replace_items {
            sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
                .bind(invoice.id)
                .execute(&mut *tx)
                .await
                .map_err(db_error("clearing invoice items"))?;
            insert_items(&mut tx, invoice.id, &invoice.items).await?;
        }

        tx.commit().await.map_err(db_error("committing invoice"))?;
        Ok(())
    }

    async fn set_trashed(&self, ctx: &TenantContext, id: Uuid, trashed: bool) -> Result<bool, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let result = sqlx::query(
            r#"
            UPDATE invoices
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
        .map_err(db_error("trashing invoice"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge(&self, ctx: &TenantContext, id: Uuid) -> Result<bool, DomainError> {
        let pool = self.databases.pool(ctx)?;
        // Items and receipts cascade
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await
            .map_err(db_error("purging invoice"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_trashed(&self, ctx: &TenantContext) -> Result<Vec<TrashedItem>, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let rows: Vec<(Uuid, String, Option<DateTime<Utc>>)> = sqlx::query_as(
            "SELECT id, invoice_number, deleted_at FROM invoices WHERE is_deleted \
             ORDER BY deleted_at DESC",
        )
        .fetch_all(&pool)
        .await
        .map_err(db_error("listing trashed invoices"))?;

        Ok(rows
            .into_iter()
            .map(|(id, label, deleted_at)| TrashedItem {
                id,
                kind: TrashKind::Invoice,
                label,
                deleted_at,
            })
            .collect())
    }

    async fn stats(&self, ctx: &TenantContext) -> Result<InvoiceStats, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let counts: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM invoices WHERE NOT is_deleted GROUP BY status",
        )
        .fetch_all(&pool)
        .await
        .map_err(db_error("counting invoices by status"))?;

        let (billed, paid, outstanding): (Decimal, Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(grand_total), 0),
                   COALESCE(SUM(amount_paid), 0),
                   COALESCE(SUM(balance_due), 0)
            FROM invoices
            WHERE NOT is_deleted
            "#,
        )
        .fetch_one(&pool)
        .await
        .map_err(db_error("summing invoices"))?;

        let counts = counts
            .into_iter()
            .map(|(status, n)| Ok((decode(&status, InvoiceStatus::parse, "invoices.status")?, n)))
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(InvoiceStats::new(counts, InvoiceTotals { billed, paid, outstanding }))
    }

    async fn count(&self, ctx: &TenantContext) -> Result<i64, DomainError> {
        let pool = self.databases.pool(ctx)?;
        sqlx::query_scalar("SELECT COUNT(*) FROM invoices WHERE NOT is_deleted")
            .fetch_one(&pool)
            .await
            .map_err(db_error("counting invoices"))
    }
}
