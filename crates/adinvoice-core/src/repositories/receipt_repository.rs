//! Receipt repository trait (port, tenant database)

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{Receipt, ReceiptStats, TenantContext, TrashedItem};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReceiptRepository: Send + Sync {
    /// Non-trashed receipts, latest date first
    async fn list(&self, ctx: &TenantContext) -> Result<Vec<Receipt>, DomainError>;
    async fn find(&self, ctx: &TenantContext, id: Uuid) -> Result<Option<Receipt>, DomainError>;
    async fn create(&self, ctx: &TenantContext, receipt: &Receipt) -> Result<(), DomainError>;
    async fn update(&self, ctx: &TenantContext, receipt: &Receipt) -> Result<(), DomainError>;
    async fn set_trashed(&self, ctx: &TenantContext, id: Uuid, trashed: bool) -> Result<bool, DomainError>;
    async fn purge(&self, ctx: &TenantContext, id: Uuid) -> Result<bool, DomainError>;
    async fn list_trashed(&self, ctx: &TenantContext) -> Result<Vec<TrashedItem>, DomainError>;
    async fn stats(&self, ctx: &TenantContext) -> Result<ReceiptStats, DomainError>;
    async fn count(&self, ctx: &TenantContext) -> Result<i64, DomainError>;
    /// Σ `paid_amount` over the invoice's non-trashed receipts
    async fn sum_paid_for_invoice(&self, ctx: &TenantContext, invoice_id: Uuid) -> Result<Decimal, DomainError>;
}
