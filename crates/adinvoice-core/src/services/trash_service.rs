//! Trash bin over proposals, invoices and receipts

use std::sync::Arc;

use chrono::Utc;
use futures::try_join;
use tracing::info;
use uuid::Uuid;

use crate::domain::{TenantContext, TrashKind, TrashedItem};
use crate::error::DomainError;
use crate::repositories::{InvoiceRepository, ProposalRepository, ReceiptRepository};
use crate::services::receipt_service::sync_invoice_payments;

pub struct TrashService {
    proposals: Arc<dyn ProposalRepository>,
    invoices: Arc<dyn InvoiceRepository>,
    receipts: Arc<dyn ReceiptRepository>,
}

impl TrashService {
    pub fn new(
        proposals: Arc<dyn ProposalRepository>,
        invoices: Arc<dyn InvoiceRepository>,
        receipts: Arc<dyn ReceiptRepository>,
    ) -> Self {
        Self { proposals, invoices, receipts }
    }

    /// Everything in the trash, most recently deleted first
    pub async fn list(&self, ctx: &TenantContext) -> Result<Vec<TrashedItem>, DomainError> {
        let (proposals, invoices, receipts) = try_join!(
            self.proposals.list_trashed(ctx),
            self.invoices.list_trashed(ctx),
            self.receipts.list_trashed(ctx),
        )?;

        let mut items: Vec<TrashedItem> =
            proposals.into_iter().chain(invoices).chain(receipts).collect();
        items.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
        Ok(items)
    }

    pub async fn restore(
        &self,
        ctx: &TenantContext,
        kind: &str,
        id: Uuid,
    ) -> Result<TrashKind, DomainError> {
        let kind = TrashKind::parse(kind)?;
        let found = match kind {
            TrashKind::Proposal => self.proposals.set_trashed(ctx, id, false).await?,
            TrashKind::Invoice => self.invoices.set_trashed(ctx, id, false).await?,
            TrashKind::Receipt => {
                let found = self.receipts.set_trashed(ctx, id, false).await?;
                if found {
                    self.resync_receipt_invoice(ctx, id).await?;
                }
                found
            }
        };

        if !found {
            return Err(DomainError::not_found(label(kind), id));
        }
        info!("Restored {} {} in tenant {}", kind.as_str(), id, ctx.tenant_id);
        Ok(kind)
    }

    /// Delete permanently. Receipts of a purged invoice go with it.
    pub async fn purge(
        &self,
        ctx: &TenantContext,
        kind: &str,
        id: Uuid,
    ) -> Result<TrashKind, DomainError> {
        let kind = TrashKind::parse(kind)?;
        let found = match kind {
            TrashKind::Proposal => self.proposals.purge(ctx, id).await?,
            TrashKind::Invoice => self.invoices.purge(ctx, id).await?,
            TrashKind::Receipt => {
                let invoice_id = self
                    .receipts
                    .find(ctx, id)
                    .await?
                    .and_then(|r| r.invoice_id);
                let found = self.receipts.purge(ctx, id).await?;
                if let Some(invoice_id) = invoice_id.filter(|_| found) {
                    self.sync(ctx, invoice_id).await?;
                }
                found
            }
        };

        if !found {
            return Err(DomainError::not_found(label(kind), id));
        }
        info!("Permanently deleted {} {} in tenant {}", kind.as_str(), id, ctx.tenant_id);
        Ok(kind)
    }

    async fn resync_receipt_invoice(&self, ctx: &TenantContext, receipt_id: Uuid) -> Result<(), DomainError> {
        let invoice_id = self
            .receipts
            .find(ctx, receipt_id)
            .await?
            .and_then(|r| r.invoice_id);
        match invoice_id {
            Some(invoice_id) => self.sync(ctx, invoice_id).await,
            None => Ok(()),
        }
    }

    async fn sync(&self, ctx: &TenantContext, invoice_id: Uuid) -> Result<(), DomainError> {
        sync_invoice_payments(
            self.invoices.as_ref(),
            self.receipts.as_ref(),
            ctx,
            invoice_id,
            Utc::now().date_naive(),
        )
        .await
    }
}

fn label(kind: TrashKind) -> &'static str {
    match kind {
        TrashKind::Proposal => "Proposal",
        TrashKind::Invoice => "Invoice",
        TrashKind::Receipt => "Receipt",
    }
}
