//! # AdInvoice Infrastructure
//!
//! PostgreSQL adapters: the control-database repositories, the per-tenant
//! pool registry with database provisioning, and the tenant-database
//! repositories that route every query through it.

pub mod database;

pub use database::{
    create_pool, run_control_migrations, PgAccessRepository, PgCatalogRepository,
    PgClientRepository, PgEnquiryRepository, PgInvoiceRepository, PgNotificationRepository,
    PgProposalRepository, PgReceiptRepository, PgSupportRepository, PgTenantDatabases,
    PgTenantRepository, PgUserRepository,
};
