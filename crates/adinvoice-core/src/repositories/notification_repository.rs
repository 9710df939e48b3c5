//! Notification, support ticket and enquiry ports (control database)

use async_trait::async_trait;

use crate::domain::{
    Enquiry, EnquiryInput, EnquiryStatus, NewNotification, NewSupportTicket, Notification,
    NotificationView, SupportTicket, TicketStatus,
};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &NewNotification) -> Result<Notification, DomainError>;
    /// Global notifications plus those of `tenant_id`, newest first, with the user's read flag
    async fn list_for(&self, tenant_id: Option<i64>, user_id: i64) -> Result<Vec<NotificationView>, DomainError>;
    async fn latest_for_tenant(&self, tenant_id: i64, limit: i64) -> Result<Vec<Notification>, DomainError>;
    async fn list_all(&self) -> Result<Vec<Notification>, DomainError>;
    async fn exists(&self, id: i64) -> Result<bool, DomainError>;
    /// Idempotent
    async fn mark_read(&self, id: i64, user_id: i64) -> Result<(), DomainError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SupportRepository: Send + Sync {
    async fn create(&self, ticket: &NewSupportTicket) -> Result<SupportTicket, DomainError>;
    async fn list_all(&self) -> Result<Vec<SupportTicket>, DomainError>;
    async fn set_status(&self, id: i64, status: TicketStatus) -> Result<Option<SupportTicket>, DomainError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnquiryRepository: Send + Sync {
    async fn create(&self, enquiry: &EnquiryInput) -> Result<Enquiry, DomainError>;
    async fn list(&self) -> Result<Vec<Enquiry>, DomainError>;
    async fn set_status(&self, id: i64, status: EnquiryStatus) -> Result<Option<Enquiry>, DomainError>;
    async fn count(&self) -> Result<i64, DomainError>;
}
