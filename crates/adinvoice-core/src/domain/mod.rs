//! # AdInvoice Core - Domain Module
//! 
//! Domain entities for the AdInvoice backend.

pub mod money;
pub mod numbering;
pub mod tenant;
pub mod user;
pub mod access;
pub mod client;
pub mod catalog;
pub mod proposal;
pub mod invoice;
pub mod receipt;
pub mod trash;
pub mod notification;
pub mod support;
pub mod enquiry;
pub mod analytics;

// Re-export all entities and enums
pub use money::{round_money, DocumentTotals, LineAmounts};
pub use numbering::document_number;
pub use tenant::{
    generate_db_name, NewTenant, Tenant, TenantAction, TenantContext, TenantDetails,
    TenantOwner, TenantUpdate,
};
pub use user::{
    ApplicationStatus, ApprovalAction, ApprovalOutcome, CompanyDetails, CompanyDetailsUpdate,
    CompanyProfile, NewApplication, NewUser, Principal, User, UserRole, UserSummary,
};
pub use access::{Permission, PermissionInput, Role, RoleAssignment, RoleInput};
pub use client::{ClientCompany, ClientCompanyInput};
pub use catalog::{Category, NewCategory, NewProduct, ProductInput, ProductKind, ProductService};
pub use proposal::{
    Proposal, ProposalInput, ProposalItem, ProposalItemInput, ProposalItemKind, ProposalStats,
    ProposalStatus, ProposalSummary,
};
pub use invoice::{
    Invoice, InvoiceInput, InvoiceItem, InvoiceItemInput, InvoiceItemKind, InvoiceStats,
    InvoiceStatus, InvoiceSummary, InvoiceTotals,
};
pub use receipt::{Receipt, ReceiptInput, ReceiptStats, ReceiptStatus};
pub use trash::{TrashKind, TrashedItem};
pub use notification::{
    NewNotification, Notification, NotificationInput, NotificationType, NotificationView,
    SenderType,
};
pub use support::{NewSupportTicket, SupportTicket, SupportTicketInput, TicketStatus};
pub use enquiry::{Enquiry, EnquiryInput, EnquiryStatus, EnquiryStatusUpdate};
pub use analytics::{PlatformAnalytics, TenantAnalytics, TenantCounts};
