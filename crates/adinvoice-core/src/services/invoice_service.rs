// ============================================================================
// AdInvoice Core - Invoice Service
// File: crates/adinvoice-core/src/services/invoice_service.rs
// Description: Invoices, proposal conversion and number allocation
// ============================================================================

use std::sync::Arc;

use adinvoice_shared::constants::{DOCUMENT_NUMBER_ATTEMPTS, INVOICE_NUMBER_PREFIX};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{
    document_number, Invoice, InvoiceInput, InvoiceItem, InvoiceStats, InvoiceStatus,
    InvoiceSummary, Proposal, TenantContext,
};
use crate::error::DomainError;
use crate::repositories::{InvoiceRepository, ProposalRepository};

const DUPLICATE_NUMBER: &str = "Invoice with this number already exists";

pub struct InvoiceService {
    invoices: Arc<dyn InvoiceRepository>,
    proposals: Arc<dyn ProposalRepository>,
}

impl InvoiceService {
    pub fn new(invoices: Arc<dyn InvoiceRepository>, proposals: Arc<dyn ProposalRepository>) -> Self {
        Self { invoices, proposals }
    }

    /// Create an invoice. Without items, the linked proposal's items are copied.
    pub async fn create(
        &self,
        ctx: &TenantContext,
        mut input: InvoiceInput,
    ) -> Result<Invoice, DomainError> {
        input.validate()?;
        let today = Utc::now().date_naive();

        let proposal = match input.proposal {
            Some(id) => Some(self.find_proposal(ctx, id).await?),
            None => None,
        };

        let items: Vec<InvoiceItem> = match input.items.take() {
            Some(items) if !items.is_empty() => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| item.into_item(i))
                .collect(),
            _ => proposal
                .as_ref()
                .map(|p| p.items.iter().map(InvoiceItem::from_proposal_item).collect())
                .unwrap_or_default(),
        };

        let requested_number = input.invoice_number.take();
        let mut invoice = Invoice::from_input(input, String::new(), items, today)?;
        if let Some(p) = &proposal {
            invoice.proposal_title = Some(p.title.clone());
            invoice.proposal_number = Some(p.proposal_number.clone());
        }

        match requested_number {
            Some(number) => {
                if self.invoices.number_exists(ctx, &number).await? {
                    return Err(DomainError::AlreadyExists(DUPLICATE_NUMBER.to_string()));
                }
                invoice.invoice_number = number;
                self.invoices.create(ctx, &invoice).await?;
            }
            None => self.create_with_generated_number(ctx, &mut invoice).await?,
        }

        info!(
            "Invoice {} ({}) created in tenant {}",
            invoice.invoice_number, invoice.id, ctx.tenant_id
        );
        Ok(invoice)
    }

    async fn create_with_generated_number(
        &self,
        ctx: &TenantContext,
        invoice: &mut Invoice,
    ) -> Result<(), DomainError> {
        for attempt in 1..=DOCUMENT_NUMBER_ATTEMPTS {
            let number = document_number(INVOICE_NUMBER_PREFIX, invoice.issue_date);
            if self.invoices.number_exists(ctx, &number).await? {
                warn!("Invoice number {} taken (attempt {})", number, attempt);
                continue;
            }

            invoice.invoice_number = number;
            match self.invoices.create(ctx, invoice).await {
                Ok(()) => return Ok(()),
                Err(DomainError::AlreadyExists(_)) => {
                    warn!("Invoice number {} collided on insert (attempt {})", invoice.invoice_number, attempt);
                }
                Err(e) => return Err(e),
            }
        }

        Err(DomainError::InternalError(
            "Could not allocate a unique invoice number".to_string(),
        ))
    }

    pub async fn list(&self, ctx: &TenantContext) -> Result<Vec<InvoiceSummary>, DomainError> {
        self.invoices.list(ctx).await
    }

    pub async fn get(&self, ctx: &TenantContext, id: Uuid) -> Result<Invoice, DomainError> {
        self.invoices
            .find(ctx, id)
            .await?
            .filter(|i| !i.is_deleted)
            .ok_or_else(|| DomainError::not_found("Invoice", id))
    }

    pub async fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: InvoiceInput,
    ) -> Result<Invoice, DomainError> {
        input.validate()?;
        let mut invoice = self.get(ctx, id).await?;

        if let Some(proposal_id) = input.proposal {
            if invoice.proposal_id != Some(proposal_id) {
                let proposal = self.find_proposal(ctx, proposal_id).await?;
                invoice.proposal_title = Some(proposal.title);
                invoice.proposal_number = Some(proposal.proposal_number);
            }
        }

        let replace_items = invoice.apply(input, Utc::now().date_naive());
        self.invoices.update(ctx, &invoice, replace_items).await?;
        Ok(invoice)
    }

    /// Set the requested status, then let payment rules override it
    pub async fn set_status(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        status: &str,
    ) -> Result<Invoice, DomainError> {
        let status = InvoiceStatus::parse_requested(status)?;
        let mut invoice = self.get(ctx, id).await?;
        invoice.status = status;
        invoice.apply_payment_rules(Utc::now().date_naive());
        invoice.updated_at = Utc::now();
        self.invoices.update(ctx, &invoice, false).await?;
        info!("Invoice {} marked {}", id, invoice.status.as_str());
        Ok(invoice)
    }

    pub async fn trash(&self, ctx: &TenantContext, id: Uuid) -> Result<(), DomainError> {
        self.get(ctx, id).await?;
        self.invoices.set_trashed(ctx, id, true).await?;
        info!("Invoice {} moved to trash", id);
        Ok(())
    }

    pub async fn stats(&self, ctx: &TenantContext) -> Result<InvoiceStats, DomainError> {
        self.invoices.stats(ctx).await
    }

    async fn find_proposal(&self, ctx: &TenantContext, id: Uuid) -> Result<Proposal, DomainError> {
        self.proposals
            .find(ctx, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Proposal", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::invoice::tests::{invoice_with, line};
    use crate::domain::proposal::tests::{input_with_items, item};
    use crate::repositories::{MockInvoiceRepository, MockProposalRepository};
    use crate::services::testing::ctx;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn far_future() -> NaiveDate {
        NaiveDate::from_ymd_opt(2099, 1, 1).unwrap()
    }

    fn input(items: Option<Vec<crate::domain::InvoiceItemInput>>) -> InvoiceInput {
        InvoiceInput {
            client_name: Some("Globex".to_string()),
            due_date: Some(far_future()),
            items,
            ..Default::default()
        }
    }

    fn service(invoices: MockInvoiceRepository, proposals: MockProposalRepository) -> InvoiceService {
        InvoiceService::new(Arc::new(invoices), Arc::new(proposals))
    }

    #[tokio::test]
    async fn test_create_computes_totals_and_number() {
        let mut invoices = MockInvoiceRepository::new();
        invoices.expect_number_exists().returning(|_, _| Ok(false));
        invoices.expect_create().times(1).returning(|_, _| Ok(()));

        let invoice = service(invoices, MockProposalRepository::new())
            .create(&ctx(), input(Some(vec![line(dec!(2), dec!(100))])))
            .await
            .unwrap();

        assert!(invoice.invoice_number.starts_with("INV-"));
        assert_eq!(invoice.subtotal, dec!(200.00));
        assert_eq!(invoice.total_gst, dec!(36.00));
        assert_eq!(invoice.grand_total, dec!(236.00));
        assert_eq!(invoice.balance_due, dec!(236.00));
    }

    #[tokio::test]
    async fn test_create_copies_proposal_items() {
        let proposal = Proposal::from_input(
            input_with_items(vec![item("Design", 2, dec!(50), dec!(18))]),
            "PROP-20250110-4321".to_string(),
        )
        .unwrap();
        let proposal_id = proposal.id;

        let mut proposals = MockProposalRepository::new();
        proposals.expect_find().returning(move |_, _| Ok(Some(proposal.clone())));
        let mut invoices = MockInvoiceRepository::new();
        invoices.expect_number_exists().returning(|_, _| Ok(false));
        invoices
            .expect_create()
            .withf(|_, invoice: &Invoice| invoice.items.len() == 1)
            .returning(|_, _| Ok(()));

        let mut payload = input(None);
        payload.proposal = Some(proposal_id);
        let invoice = service(invoices, proposals).create(&ctx(), payload).await.unwrap();

        assert_eq!(invoice.items[0].description, "Design");
        assert_eq!(invoice.grand_total, dec!(118.00));
        assert_eq!(invoice.proposal_number.as_deref(), Some("PROP-20250110-4321"));
    }

    #[tokio::test]
    async fn test_create_with_unknown_proposal() {
        let mut proposals = MockProposalRepository::new();
        proposals.expect_find().returning(|_, _| Ok(None));
        let mut invoices = MockInvoiceRepository::new();
        invoices.expect_create().never();

        let mut payload = input(None);
        payload.proposal = Some(Uuid::new_v4());
        let err = service(invoices, proposals).create(&ctx(), payload).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Proposal", .. }));
    }

    #[tokio::test]
    async fn test_number_collision_is_retried() {
        let mut invoices = MockInvoiceRepository::new();
        let mut taken = true;
        invoices.expect_number_exists().times(2).returning(move |_, _| {
            let result = taken;
            taken = false;
            Ok(result)
        });
        invoices.expect_create().times(1).returning(|_, _| Ok(()));

        let result = service(invoices, MockProposalRepository::new())
            .create(&ctx(), input(Some(vec![line(dec!(1), dec!(10))])))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_number_allocation_gives_up() {
        let mut invoices = MockInvoiceRepository::new();
        invoices.expect_number_exists().returning(|_, _| Ok(false));
        invoices
            .expect_create()
            .times(DOCUMENT_NUMBER_ATTEMPTS)
            .returning(|_, _| Err(DomainError::AlreadyExists(DUPLICATE_NUMBER.to_string())));

        let err = service(invoices, MockProposalRepository::new())
            .create(&ctx(), input(Some(vec![line(dec!(1), dec!(10))])))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InternalError(_)));
    }

    #[tokio::test]
    async fn test_supplied_number_must_be_unique() {
        let mut invoices = MockInvoiceRepository::new();
        invoices.expect_number_exists().returning(|_, _| Ok(true));
        invoices.expect_create().never();

        let mut payload = input(Some(vec![line(dec!(1), dec!(10))]));
        payload.invoice_number = Some("INV-CUSTOM-1".to_string());
        let err = service(invoices, MockProposalRepository::new())
            .create(&ctx(), payload)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_status_change_respects_payments() {
        let mut invoices = MockInvoiceRepository::new();
        invoices.expect_find().returning(|_, _| {
            let mut invoice = invoice_with(vec![line(dec!(1), dec!(100))], far_future());
            invoice.record_payments(dec!(118), far_future());
            Ok(Some(invoice))
        });
        invoices.expect_update().returning(|_, _, _| Ok(()));

        let invoice = service(invoices, MockProposalRepository::new())
            .set_status(&ctx(), Uuid::new_v4(), "sent")
            .await
            .unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Paid);
    }

    #[tokio::test]
    async fn test_invalid_status() {
        let err = service(MockInvoiceRepository::new(), MockProposalRepository::new())
            .set_status(&ctx(), Uuid::new_v4(), "lost")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }
}
