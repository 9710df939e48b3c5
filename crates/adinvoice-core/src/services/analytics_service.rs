// ============================================================================
// AdInvoice Core - Analytics Service
// File: crates/adinvoice-core/src/services/analytics_service.rs
// Description: Dashboard counts per tenant and across the platform
// ============================================================================

use std::sync::Arc;

use adinvoice_shared::constants::LATEST_NOTIFICATIONS_ON_DASHBOARD;
use futures::future::join_all;
use futures::try_join;
use tracing::warn;

use crate::domain::{PlatformAnalytics, TenantAnalytics, TenantContext, TenantCounts};
use crate::error::DomainError;
use crate::repositories::{
    CatalogRepository, ClientRepository, EnquiryRepository, InvoiceRepository,
    NotificationRepository, ProposalRepository, ReceiptRepository, UserRepository,
};
use crate::services::TenantService;

/// Tenant-database repositories counted on the dashboards
#[derive(Clone)]
pub struct DocumentSources {
    pub proposals: Arc<dyn ProposalRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
    pub receipts: Arc<dyn ReceiptRepository>,
    pub clients: Arc<dyn ClientRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
}

pub struct AnalyticsService {
    tenancy: Arc<TenantService>,
    documents: DocumentSources,
    notifications: Arc<dyn NotificationRepository>,
    users: Arc<dyn UserRepository>,
    enquiries: Arc<dyn EnquiryRepository>,
}

impl AnalyticsService {
    pub fn new(
        tenancy: Arc<TenantService>,
        documents: DocumentSources,
        notifications: Arc<dyn NotificationRepository>,
        users: Arc<dyn UserRepository>,
        enquiries: Arc<dyn EnquiryRepository>,
    ) -> Self {
        Self { tenancy, documents, notifications, users, enquiries }
    }

    async fn counts(&self, ctx: &TenantContext) -> Result<TenantCounts, DomainError> {
        let d = &self.documents;
        let (proposals, invoices, receipts, clients, products_services) = try_join!(
            d.proposals.count(ctx),
            d.invoices.count(ctx),
            d.receipts.count(ctx),
            d.clients.count(ctx),
            d.catalog.count_products(ctx),
        )?;
        Ok(TenantCounts { proposals, invoices, receipts, clients, products_services })
    }

    /// Merchant dashboard
    pub async fn tenant(&self, ctx: &TenantContext) -> Result<TenantAnalytics, DomainError> {
        let (counts, latest_notifications) = try_join!(
            self.counts(ctx),
            self.notifications
                .latest_for_tenant(ctx.tenant_id, LATEST_NOTIFICATIONS_ON_DASHBOARD),
        )?;
        Ok(TenantAnalytics { tenant_id: ctx.tenant_id, counts, latest_notifications })
    }

    /// Operator dashboard: counts summed over every reachable active tenant
    /// database. A tenant whose database fails is logged and left out.
    pub async fn platform(&self) -> Result<PlatformAnalytics, DomainError> {
        let contexts = self.tenancy.active_contexts().await?;
        let per_tenant = join_all(contexts.iter().map(|ctx| self.counts(ctx))).await;

        let mut counts = TenantCounts::default();
        for (ctx, result) in contexts.iter().zip(per_tenant) {
            match result {
                Ok(c) => counts += c,
                Err(e) => warn!(
                    "Skipping tenant {} ({}) in platform analytics: {}",
                    ctx.tenant_id, ctx.db_alias, e
                ),
            }
        }

        let (tenants, (merchants, approved_merchants), enquiries, notifications) = try_join!(
            self.tenancy.count(),
            self.users.count_merchants(),
            self.enquiries.count(),
            self.notifications.list_all(),
        )?;

        Ok(PlatformAnalytics {
            counts,
            tenants,
            merchants,
            approved_merchants,
            enquiries,
            notifications,
        })
    }
}
