//! Invoice repository trait (port, tenant database)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Invoice, InvoiceStats, InvoiceSummary, TenantContext, TrashedItem};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Non-trashed invoices, newest first
    async fn list(&self, ctx: &TenantContext) -> Result<Vec<InvoiceSummary>, DomainError>;
    /// Invoice with items and proposal title/number, trashed or not
    async fn find(&self, ctx: &TenantContext, id: Uuid) -> Result<Option<Invoice>, DomainError>;
    async fn number_exists(&self, ctx: &TenantContext, invoice_number: &str) -> Result<bool, DomainError>;
    /// Fails with `AlreadyExists` on an invoice-number collision
    async fn create(&self, ctx: &TenantContext, invoice: &Invoice) -> Result<(), DomainError>;
    async fn update(&self, ctx: &TenantContext, invoice: &Invoice, replace_items: bool) -> Result<(), DomainError>;
    async fn set_trashed(&self, ctx: &TenantContext, id: Uuid, trashed: bool) -> Result<bool, DomainError>;
    async fn purge(&self, ctx: &TenantContext, id: Uuid) -> Result<bool, DomainError>;
    async fn list_trashed(&self, ctx: &TenantContext) -> Result<Vec<TrashedItem>, DomainError>;
    async fn stats(&self, ctx: &TenantContext) -> Result<InvoiceStats, DomainError>;
    async fn count(&self, ctx: &TenantContext) -> Result<i64, DomainError>;
}
