// ============================================================================
// AdInvoice Core - Receipt Service
// File: crates/adinvoice-core/src/services/receipt_service.rs
// ============================================================================
//! Payment receipts. Every change to a receipt linked to an invoice
//! re-derives that invoice's `amount_paid` from its live receipts.

use std::sync::Arc;

use adinvoice_shared::constants::RECEIPT_NUMBER_PREFIX;
use chrono::{NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{document_number, Receipt, ReceiptInput, ReceiptStats, TenantContext};
use crate::error::DomainError;
use crate::repositories::{InvoiceRepository, ReceiptRepository};

pub struct ReceiptService {
    receipts: Arc<dyn ReceiptRepository>,
    invoices: Arc<dyn InvoiceRepository>,
}

/// Recompute `amount_paid` (and the derived status) of an invoice from the
/// sum of its non-trashed receipts. A purged invoice is skipped.
pub(crate) async fn sync_invoice_payments(
    invoices: &dyn InvoiceRepository,
    receipts: &dyn ReceiptRepository,
    ctx: &TenantContext,
    invoice_id: Uuid,
    today: NaiveDate,
) -> Result<(), DomainError> {
    let Some(mut invoice) = invoices.find(ctx, invoice_id).await? else {
        return Ok(());
    };

    let paid = receipts.sum_paid_for_invoice(ctx, invoice_id).await?;
    invoice.record_payments(paid, today);
    invoices.update(ctx, &invoice, false).await?;
    debug!("Invoice {} amount_paid now {}", invoice_id, paid);
    Ok(())
}

impl ReceiptService {
    pub fn new(receipts: Arc<dyn ReceiptRepository>, invoices: Arc<dyn InvoiceRepository>) -> Self {
        Self { receipts, invoices }
    }

    pub async fn create(
        &self,
        ctx: &TenantContext,
        input: ReceiptInput,
    ) -> Result<Receipt, DomainError> {
        input.validate()?;
        let today = Utc::now().date_naive();

        let invoice_number = match input.invoice {
            Some(id) => Some(self.invoice_number(ctx, id).await?),
            None => None,
        };

        let date = input.date.unwrap_or(today);
        let mut receipt = Receipt::from_input(
            input,
            document_number(RECEIPT_NUMBER_PREFIX, date),
            today,
        )?;
        receipt.invoice_number = invoice_number;

        self.receipts.create(ctx, &receipt).await?;
        info!(
            "Receipt {} ({}) created in tenant {}",
            receipt.receipt_number, receipt.id, ctx.tenant_id
        );

        if let Some(invoice_id) = receipt.invoice_id {
            self.sync(ctx, invoice_id).await?;
        }
        Ok(receipt)
    }

    pub async fn list(&self, ctx: &TenantContext) -> Result<Vec<Receipt>, DomainError> {
        self.receipts.list(ctx).await
    }

    pub async fn get(&self, ctx: &TenantContext, id: Uuid) -> Result<Receipt, DomainError> {
        self.receipts
            .find(ctx, id)
            .await?
            .filter(|r| !r.is_deleted)
            .ok_or_else(|| DomainError::not_found("Receipt", id))
    }

    pub async fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: ReceiptInput,
    ) -> Result<Receipt, DomainError> {
        input.validate()?;
        let mut receipt = self.get(ctx, id).await?;
        let previous_invoice = receipt.invoice_id;

        if let Some(invoice_id) = input.invoice {
            if previous_invoice != Some(invoice_id) {
                receipt.invoice_number = Some(self.invoice_number(ctx, invoice_id).await?);
            }
        }

        receipt.apply(input);
        self.receipts.update(ctx, &receipt).await?;

        if let Some(old) = previous_invoice.filter(|old| receipt.invoice_id != Some(*old)) {
            self.sync(ctx, old).await?;
        }
        if let Some(invoice_id) = receipt.invoice_id {
            self.sync(ctx, invoice_id).await?;
        }
        Ok(receipt)
    }

    pub async fn trash(&self, ctx: &TenantContext, id: Uuid) -> Result<(), DomainError> {
        let receipt = self.get(ctx, id).await?;
        self.receipts.set_trashed(ctx, id, true).await?;
        info!("Receipt {} moved to trash", id);

        if let Some(invoice_id) = receipt.invoice_id {
            self.sync(ctx, invoice_id).await?;
        }
        Ok(())
    }

    pub async fn stats(&self, ctx: &TenantContext) -> Result<ReceiptStats, DomainError> {
        self.receipts.stats(ctx).await
    }

    async fn invoice_number(&self, ctx: &TenantContext, id: Uuid) -> Result<String, DomainError> {
        self.invoices
            .find(ctx, id)
            .await?
            .filter(|i| !i.is_deleted)
            .map(|i| i.invoice_number)
            .ok_or_else(|| DomainError::not_found("Invoice", id))
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
