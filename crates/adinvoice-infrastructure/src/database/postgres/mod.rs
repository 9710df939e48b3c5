//! PostgreSQL repository implementations
//!
//! Control-plane repositories hold the control pool; tenant document
//! repositories resolve a pool per request through `PgTenantDatabases`.

pub mod user_repo_impl;
pub mod tenant_repo_impl;
pub mod access_repo_impl;
pub mod notification_repo_impl;
pub mod client_repo_impl;
pub mod catalog_repo_impl;
pub mod proposal_repo_impl;
pub mod invoice_repo_impl;
pub mod receipt_repo_impl;

pub use user_repo_impl::PgUserRepository;
pub use tenant_repo_impl::PgTenantRepository;
pub use access_repo_impl::PgAccessRepository;
pub use notification_repo_impl::{PgEnquiryRepository, PgNotificationRepository, PgSupportRepository};
pub use client_repo_impl::PgClientRepository;
pub use catalog_repo_impl::PgCatalogRepository;
pub use proposal_repo_impl::PgProposalRepository;
pub use invoice_repo_impl::PgInvoiceRepository;
pub use receipt_repo_impl::PgReceiptRepository;
