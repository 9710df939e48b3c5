//! # AdInvoice Core - Services
//!
//! Application services orchestrating the repository ports.

pub mod tenant_service;
pub mod auth_service;
pub mod access_service;
pub mod client_service;
pub mod catalog_service;
pub mod proposal_service;
pub mod invoice_service;
pub mod receipt_service;
pub mod trash_service;
pub mod notification_service;
pub mod support_service;
pub mod enquiry_service;
pub mod analytics_service;

pub use tenant_service::TenantService;
pub use auth_service::{AuthService, SigninResult};
pub use access_service::AccessService;
pub use client_service::ClientService;
pub use catalog_service::CatalogService;
pub use proposal_service::ProposalService;
pub use invoice_service::InvoiceService;
pub use receipt_service::ReceiptService;
pub use trash_service::TrashService;
pub use notification_service::NotificationService;
pub use support_service::SupportService;
pub use enquiry_service::EnquiryService;
pub use analytics_service::{AnalyticsService, DocumentSources};
