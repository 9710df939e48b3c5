//! Repository traits (ports)

pub mod tenant_repository;
pub mod user_repository;
pub mod access_repository;
pub mod client_repository;
pub mod catalog_repository;
pub mod proposal_repository;
pub mod invoice_repository;
pub mod receipt_repository;
pub mod notification_repository;

pub use tenant_repository::{TenantDatabases, TenantRepository};
pub use user_repository::UserRepository;
pub use access_repository::AccessRepository;
pub use client_repository::ClientRepository;
pub use catalog_repository::CatalogRepository;
pub use proposal_repository::ProposalRepository;
pub use invoice_repository::InvoiceRepository;
pub use receipt_repository::ReceiptRepository;
pub use notification_repository::{EnquiryRepository, NotificationRepository, SupportRepository};

#[cfg(test)]
pub use tenant_repository::{MockTenantDatabases, MockTenantRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
#[cfg(test)]
pub use access_repository::MockAccessRepository;
#[cfg(test)]
pub use client_repository::MockClientRepository;
#[cfg(test)]
pub use catalog_repository::MockCatalogRepository;
#[cfg(test)]
pub use proposal_repository::MockProposalRepository;
#[cfg(test)]
pub use invoice_repository::MockInvoiceRepository;
#[cfg(test)]
pub use receipt_repository::MockReceiptRepository;
#[cfg(test)]
pub use notification_repository::{MockEnquiryRepository, MockNotificationRepository, MockSupportRepository};
