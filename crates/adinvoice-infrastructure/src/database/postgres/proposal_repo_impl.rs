// ============================================================================
// AdInvoice Infrastructure - PostgreSQL Proposal Repository
// File: crates/adinvoice-infrastructure/src/database/postgres/proposal_repo_impl.rs
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use adinvoice_core::domain::{
    Proposal, ProposalItem, ProposalItemKind, ProposalStats, ProposalStatus, ProposalSummary,
    TenantContext, TrashKind, TrashedItem,
};
use adinvoice_core::error::DomainError;
use adinvoice_core::repositories::ProposalRepository;

use crate::database::{db_error, decode, PgTenantDatabases};

pub struct PgProposalRepository {
    databases: Arc<PgTenantDatabases>,
}

impl PgProposalRepository {
    pub fn new(databases: Arc<PgTenantDatabases>) -> Self {
        Self { databases }
    }
}

// Internal row types for SQLx mapping
#[derive(Debug, FromRow)]
struct ProposalRow {
    pub id: Uuid,
    pub title: String,
    pub proposal_number: String,
    pub client_name: String,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub client_address: Option<String>,
    pub company_name: String,
    pub company_email: Option<String>,
    pub company_phone: Option<String>,
    pub company_address: Option<String>,
    pub company_logo: Option<String>,
    pub date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub subtotal: Decimal,
    pub total_gst: Decimal,
    pub grand_total: Decimal,
    pub notes: Option<String>,
    pub status: String,
    pub template: i16,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProposalRow {
    fn into_proposal(self, items: Vec<ProposalItem>) -> Result<Proposal, DomainError> {
        Ok(Proposal {
            id: self.id,
            title: self.title,
            proposal_number: self.proposal_number,
            client_name: self.client_name,
            client_email: self.client_email,
            client_phone: self.client_phone,
            client_address: self.client_address,
            company_name: self.company_name,
            company_email: self.company_email,
            company_phone: self.company_phone,
            company_address: self.company_address,
            company_logo: self.company_logo,
            date: self.date,
            due_date: self.due_date,
            subtotal: self.subtotal,
            total_gst: self.total_gst,
            grand_total: self.grand_total,
            notes: self.notes,
            status: decode(&self.status, ProposalStatus::parse, "proposals.status")?,
            template: self.template,
            is_deleted: self.is_deleted,
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        })
    }
}

#[derive(Debug, FromRow)]
struct ProposalItemRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub item_type: String,
    pub quantity: i32,
    pub price: Decimal,
    pub gst_rate: Decimal,
    pub total: Decimal,
    pub position: i32,
}

impl TryFrom<ProposalItemRow> for ProposalItem {
    type Error = DomainError;

    fn try_from(row: ProposalItemRow) -> Result<Self, Self::Error> {
        Ok(ProposalItem {
            id: row.id,
            name: row.name,
            description: row.description,
            item_type: decode(&row.item_type, ProposalItemKind::parse, "proposal_items.item_type")?,
            quantity: row.quantity,
            price: row.price,
            gst_rate: row.gst_rate,
            total: row.total,
            position: row.position,
        })
    }
}

#[derive(Debug, FromRow)]
struct SummaryRow {
    pub id: Uuid,
    pub proposal_number: String,
    pub title: String,
    pub client_name: String,
    pub client_email: Option<String>,
    pub date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub grand_total: Decimal,
    pub status: String,
    pub items_count: i64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SummaryRow> for ProposalSummary {
    type Error = DomainError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        Ok(ProposalSummary {
            id: row.id,
            proposal_number: row.proposal_number,
            title: row.title,
            client_name: row.client_name,
            client_email: row.client_email,
            date: row.date,
            due_date: row.due_date,
            grand_total: row.grand_total,
            status: decode(&row.status, ProposalStatus::parse, "proposals.status")?,
            items_count: row.items_count,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
        })
    }
}

const PROPOSAL_COLUMNS: &str = "id, title, proposal_number, client_name, client_email, \
    client_phone, client_address, company_name, company_email, company_phone, company_address, \
    company_logo, date, due_date, subtotal, total_gst, grand_total, notes, status, template, \
    is_deleted, deleted_at, created_at, updated_at";

const SUMMARY_SELECT: &str = r#"
    SELECT p.id, p.proposal_number, p.title, p.client_name, p.client_email, p.date, p.due_date,
           p.grand_total, p.status, p.is_deleted, p.created_at,
           (SELECT COUNT(*) FROM proposal_items i WHERE i.proposal_id = p.id) AS items_count
    FROM proposals p
"#;

async fn load_items(pool: &PgPool, proposal_id: Uuid) -> Result<Vec<ProposalItem>, DomainError> {
    let rows: Vec<ProposalItemRow> = sqlx::query_as(
        r#"
        SELECT id, name, description, item_type, quantity, price, gst_rate, total, position
        FROM proposal_items
        WHERE proposal_id = $1
        ORDER BY position, id
        "#,
    )
    .bind(proposal_id)
    .fetch_all(pool)
    .await
    .map_err(db_error("loading proposal items"))?;

    rows.into_iter().map(ProposalItem::try_from).collect()
}

async fn insert_items(
    conn: &mut PgConnection,
    proposal_id: Uuid,
    items: &[ProposalItem],
) -> Result<(), DomainError> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO proposal_items
                (id, proposal_id, name, description, item_type, quantity, price, gst_rate, total, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(item.id)
        .bind(proposal_id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.item_type.as_str())
        .bind(item.quantity)
        .bind(item.price)
        .bind(item.gst_rate)
        .bind(item.total)
        .bind(item.position)
        .execute(&mut *conn)
        .await
        .map_err(db_error("inserting proposal item"))?;
    }
    Ok(())
}

#[async_trait]
impl ProposalRepository for PgProposalRepository {
    async fn list(&self, ctx: &TenantContext) -> Result<Vec<ProposalSummary>, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let rows: Vec<SummaryRow> = sqlx::query_as(&format!(
            "{} WHERE NOT p.is_deleted ORDER BY p.created_at DESC",
            SUMMARY_SELECT
        ))
        .fetch_all(&pool)
        .await
        .map_err(db_error("listing proposals"))?;

        rows.into_iter().map(ProposalSummary::try_from).collect()
    }

    async fn list_by_client_name(
        &self,
        ctx: &TenantContext,
        client_name: &str,
    ) -> Result<Vec<ProposalSummary>, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let rows: Vec<SummaryRow> = sqlx::query_as(&format!(
            "{} WHERE NOT p.is_deleted AND LOWER(p.client_name) = LOWER($1) ORDER BY p.created_at DESC",
            SUMMARY_SELECT
        ))
        .bind(client_name)
        .fetch_all(&pool)
        .await
        .map_err(db_error("listing proposals by client"))?;

        rows.into_iter().map(ProposalSummary::try_from).collect()
    }

    async fn find(&self, ctx: &TenantContext, id: Uuid) -> Result<Option<Proposal>, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let row: Option<ProposalRow> =
            sqlx::query_as(&format!("SELECT {} FROM proposals WHERE id = $1", PROPOSAL_COLUMNS))
                .bind(id)
                .fetch_optional(&pool)
                .await
                .map_err(db_error("finding proposal"))?;

        match row {
            Some(row) => {
                let items = load_items(&pool, id).await?;
                row.into_proposal(items).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn items(&self, ctx: &TenantContext, id: Uuid) -> Result<Vec<ProposalItem>, DomainError> {
        let pool = self.databases.pool(ctx)?;
        load_items(&pool, id).await
    }

    async fn create(&self, ctx: &TenantContext, proposal: &Proposal) -> Result<(), DomainError> {
        let pool = self.databases.pool(ctx)?;
        let mut tx = pool.begin().await.map_err(db_error("starting transaction"))?;

        sqlx::query(&format!(
            r#"
            INSERT INTO proposals ({})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23, $24)
            "#,
            PROPOSAL_COLUMNS
        ))
        .bind(proposal.id)
        .bind(&proposal.title)
        .bind(&proposal.proposal_number)
        .bind(&proposal.client_name)
        .bind(&proposal.client_email)
        .bind(&proposal.client_phone)
        .bind(&proposal.client_address)
        .bind(&proposal.company_name)
        .bind(&proposal.company_email)
        .bind(&proposal.company_phone)
        .bind(&proposal.company_address)
        .bind(&proposal.company_logo)
        .bind(proposal.date)
        .bind(proposal.due_date)
        .bind(proposal.subtotal)
        .bind(proposal.total_gst)
        .bind(proposal.grand_total)
        .bind(&proposal.notes)
        .bind(proposal.status.as_str())
        .bind(proposal.template)
        .bind(proposal.is_deleted)
        .bind(proposal.deleted_at)
        .bind(proposal.created_at)
        .bind(proposal.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error("creating proposal"))?;

        insert_items(&mut tx, proposal.id, &proposal.items).await?;

        tx.commit().await.map_err(db_error("committing proposal"))?;
        Ok(())
    }

    async fn update(
        &self,
        ctx: &TenantContext,
        proposal: &Proposal,
        replace_items: bool,
    ) -> Result<(), DomainError> {
        let pool = self.databases.pool(ctx)?;
        let mut tx = pool.begin().await.map_err(db_error("starting transaction"))?;

        sqlx::query(
            r#"
            UPDATE proposals SET
                title = $2, proposal_number = $3, client_name = $4, client_email = $5,
                client_phone = $6, client_address = $7, company_name = $8, company_email = $9,
                company_phone = $10, company_address = $11, company_logo = $12, date = $13,
                due_date = $14, subtotal = $15, total_gst = $16, grand_total = $17, notes = $18,
                status = $19, template = $20, updated_at = $21
            WHERE id = $1
            "#,
        )
        .bind(proposal.id)
        .bind(&proposal.title)
        .bind(&proposal.proposal_number)
        .bind(&proposal.client_name)
        .bind(&proposal.client_email)
        .bind(&proposal.client_phone)
        .bind(&proposal.client_address)
        .bind(&proposal.company_name)
        .bind(&proposal.company_email)
        .bind(&proposal.company_phone)
        .bind(&proposal.company_address)
        .bind(&proposal.company_logo)
        .bind(proposal.date)
        .bind(proposal.due_date)
        .bind(proposal.subtotal)
        .bind(proposal.total_gst)
        .bind(proposal.grand_total)
        .bind(&proposal.notes)
        .bind(proposal.status.as_str())
        .bind(proposal.template)
        .bind(proposal.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error("updating proposal"))?;

        if replace_items {
            sqlx::query("DELETE FROM proposal_items WHERE proposal_id = $1")
                .bind(proposal.id)
                .execute(&mut *tx)
                .await
                .map_err(db_error("clearing proposal items"))?;
            insert_items(&mut tx, proposal.id, &proposal.items).await?;
        }

        tx.commit().await.map_err(db_error("committing proposal"))?;
        Ok(())
    }

    async fn set_trashed(&self, ctx: &TenantContext, id: Uuid, trashed: bool) -> Result<bool, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let result = sqlx::query(
            r#"
            UPDATE proposals
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
        .map_err(db_error("trashing proposal"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge(&self, ctx: &TenantContext, id: Uuid) -> Result<bool, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let result = sqlx::query("DELETE FROM proposals WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await
            .map_err(db_error("purging proposal"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_trashed(&self, ctx: &TenantContext) -> Result<Vec<TrashedItem>, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let rows: Vec<(Uuid, String, Option<DateTime<Utc>>)> = sqlx::query_as(
            "SELECT id, title, deleted_at FROM proposals WHERE is_deleted ORDER BY deleted_at DESC",
        )
        .fetch_all(&pool)
        .await
        .map_err(db_error("listing trashed proposals"))?;

        Ok(rows
            .into_iter()
            .map(|(id, label, deleted_at)| TrashedItem {
                id,
                kind: TrashKind::Proposal,
                label,
                deleted_at,
            })
            .collect())
    }

    async fn stats(&self, ctx: &TenantContext) -> Result<ProposalStats, DomainError> {
        let pool = self.databases.pool(ctx)?;
        let counts: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM proposals WHERE NOT is_deleted GROUP BY status",
        )
        .fetch_all(&pool)
        .await
        .map_err(db_error("counting proposals by status"))?;

        let total_value: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(grand_total), 0) FROM proposals WHERE NOT is_deleted",
        )
        .fetch_one(&pool)
        .await
        .map_err(db_error("summing proposals"))?;

        let counts = counts
            .into_iter()
            .map(|(status, n)| Ok((decode(&status, ProposalStatus::parse, "proposals.status")?, n)))
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(ProposalStats::from_counts(counts, total_value))
    }

    async fn count(&self, ctx: &TenantContext) -> Result<i64, DomainError> {
        let pool = self.databases.pool(ctx)?;
        sqlx::query_scalar("SELECT COUNT(*) FROM proposals WHERE NOT is_deleted")
            .fetch_one(&pool)
            .await
            .map_err(db_error("counting proposals"))
    }
}
