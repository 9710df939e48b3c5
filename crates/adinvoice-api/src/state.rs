// ============================================================================
// AdInvoice API - Application State
// File: crates/adinvoice-api/src/state.rs
// ============================================================================

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use adinvoice_core::domain::{Principal, TenantContext};
use adinvoice_core::services::{
    AccessService, AnalyticsService, AuthService, CatalogService, ClientService, DocumentSources,
    EnquiryService, InvoiceService, NotificationService, ProposalService, ReceiptService,
    SupportService, TenantService, TrashService,
};
use adinvoice_infrastructure::{
    PgAccessRepository, PgCatalogRepository, PgClientRepository, PgEnquiryRepository,
    PgInvoiceRepository, PgNotificationRepository, PgProposalRepository, PgReceiptRepository,
    PgSupportRepository, PgTenantDatabases, PgTenantRepository, PgUserRepository,
};
use adinvoice_security::JwtService;
use adinvoice_shared::config::AppConfig;

use crate::error::ApiError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: PgPool,
    pub databases: Arc<PgTenantDatabases>,
    pub jwt: Arc<JwtService>,
    pub tenants: Arc<TenantService>,
    pub auth: Arc<AuthService>,
    pub access: Arc<AccessService>,
    pub clients: Arc<ClientService>,
    pub catalog: Arc<CatalogService>,
    pub proposals: Arc<ProposalService>,
    pub invoices: Arc<InvoiceService>,
    pub receipts: Arc<ReceiptService>,
    pub trash: Arc<TrashService>,
    pub notifications: Arc<NotificationService>,
    pub support: Arc<SupportService>,
    pub enquiries: Arc<EnquiryService>,
    pub analytics: Arc<AnalyticsService>,
}

impl AppState {
    /// Wire the PostgreSQL repositories into the services
    pub fn new(config: AppConfig, db: PgPool, databases: Arc<PgTenantDatabases>) -> Self {
        let jwt = Arc::new(JwtService::new(
            config.jwt.secret.clone(),
            config.jwt.access_token_expiry,
        ));

        // Control database
        let users = Arc::new(PgUserRepository::new(db.clone()));
        let tenant_repo = Arc::new(PgTenantRepository::new(db.clone()));
        let access_repo = Arc::new(PgAccessRepository::new(db.clone()));
        let notification_repo = Arc::new(PgNotificationRepository::new(db.clone()));
        let support_repo = Arc::new(PgSupportRepository::new(db.clone()));
        let enquiry_repo = Arc::new(PgEnquiryRepository::new(db.clone()));

        // Tenant databases
        let client_repo = Arc::new(PgClientRepository::new(databases.clone()));
        let catalog_repo = Arc::new(PgCatalogRepository::new(databases.clone()));
        let proposal_repo = Arc::new(PgProposalRepository::new(databases.clone()));
        let invoice_repo = Arc::new(PgInvoiceRepository::new(databases.clone()));
        let receipt_repo = Arc::new(PgReceiptRepository::new(databases.clone()));

        let tenants = Arc::new(TenantService::new(tenant_repo, users.clone(), databases.clone()));

        let analytics = Arc::new(AnalyticsService::new(
            tenants.clone(),
            DocumentSources {
                proposals: proposal_repo.clone(),
                invoices: invoice_repo.clone(),
                receipts: receipt_repo.clone(),
                clients: client_repo.clone(),
                catalog: catalog_repo.clone(),
            },
            notification_repo.clone(),
            users.clone(),
            enquiry_repo.clone(),
        ));

        Self {
            config: Arc::new(config),
            db,
            databases,
            tenants,
            auth: Arc::new(AuthService::new(users.clone(), jwt.clone())),
            access: Arc::new(AccessService::new(access_repo, users)),
            clients: Arc::new(ClientService::new(client_repo.clone())),
            catalog: Arc::new(CatalogService::new(catalog_repo)),
            proposals: Arc::new(ProposalService::new(proposal_repo.clone(), client_repo)),
            invoices: Arc::new(InvoiceService::new(invoice_repo.clone(), proposal_repo.clone())),
            receipts: Arc::new(ReceiptService::new(receipt_repo.clone(), invoice_repo.clone())),
            trash: Arc::new(TrashService::new(proposal_repo, invoice_repo, receipt_repo)),
            notifications: Arc::new(NotificationService::new(notification_repo)),
            support: Arc::new(SupportService::new(support_repo)),
            enquiries: Arc::new(EnquiryService::new(enquiry_repo)),
            analytics,
            jwt,
        }
    }

    /// Resolve the tenant a request addresses, enforcing the tenant guard
    pub async fn tenant_context(
        &self,
        principal: &Principal,
        tenant: Option<i64>,
    ) -> Result<TenantContext, ApiError> {
        Ok(self.tenants.resolve_for(principal, tenant).await?)
    }
}

impl FromRef<AppState> for Arc<JwtService> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}
