// ============================================================================
// AdInvoice Infrastructure - Notifications, Support and Enquiries
// File: crates/adinvoice-infrastructure/src/database/postgres/notification_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use adinvoice_core::domain::{
    Enquiry, EnquiryInput, EnquiryStatus, NewNotification, NewSupportTicket, Notification,
    NotificationType, NotificationView, SenderType, SupportTicket, TicketStatus,
};
use adinvoice_core::error::DomainError;
use adinvoice_core::repositories::{EnquiryRepository, NotificationRepository, SupportRepository};

use crate::database::{db_error, decode};

// ----------------------------------------------------------------------------
// Notifications
// ----------------------------------------------------------------------------

pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct NotificationRow {
    pub id: i64,
    pub sender_type: String,
    pub notification_type: String,
    pub message: String,
    pub tenant_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = DomainError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Notification {
            id: row.id,
            sender_type: decode(&row.sender_type, SenderType::parse, "notifications.sender_type")?,
            notification_type: decode(
                &row.notification_type,
                NotificationType::parse,
                "notifications.notification_type",
            )?,
            message: row.message,
            tenant_id: row.tenant_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct NotificationViewRow {
    #[sqlx(flatten)]
    pub notification: NotificationRow,
    pub read: bool,
}

const NOTIFICATION_COLUMNS: &str =
    "n.id, n.sender_type, n.notification_type, n.message, n.tenant_id, n.created_at";

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create(&self, notification: &NewNotification) -> Result<Notification, DomainError> {
        let row: NotificationRow = sqlx::query_as(
            r#"
            INSERT INTO notifications (sender_type, notification_type, message, tenant_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, sender_type, notification_type, message, tenant_id, created_at
            "#,
        )
        .bind(notification.sender_type.as_str())
        .bind(notification.notification_type.as_str())
        .bind(&notification.message)
        .bind(notification.tenant_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("creating notification"))?;

        row.try_into()
    }

    async fn list_for(
        &self,
        tenant_id: Option<i64>,
        user_id: i64,
    ) -> Result<Vec<NotificationView>, DomainError> {
        let rows: Vec<NotificationViewRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}, (r.user_id IS NOT NULL) AS read
            FROM notifications n
            LEFT JOIN notification_reads r
                ON r.notification_id = n.id AND r.user_id = $2
            WHERE n.tenant_id IS NULL OR n.tenant_id = $1
            ORDER BY n.created_at DESC
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(tenant_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing notifications"))?;

        rows.into_iter()
            .map(|row| {
                Ok(NotificationView {
                    notification: row.notification.try_into()?,
                    read: row.read,
                })
            })
            .collect()
    }

    async fn latest_for_tenant(
        &self,
        tenant_id: i64,
        limit: i64,
    ) -> Result<Vec<Notification>, DomainError> {
        let rows: Vec<NotificationRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM notifications n
            WHERE n.tenant_id IS NULL OR n.tenant_id = $1
            ORDER BY n.created_at DESC
            LIMIT $2
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(tenant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing latest notifications"))?;

        rows.into_iter().map(Notification::try_from).collect()
    }

    async fn list_all(&self) -> Result<Vec<Notification>, DomainError> {
        let rows: Vec<NotificationRow> = sqlx::query_as(&format!(
            "SELECT {} FROM notifications n ORDER BY n.created_at DESC",
            NOTIFICATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing notifications"))?;

        rows.into_iter().map(Notification::try_from).collect()
    }

    async fn exists(&self, id: i64) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM notifications WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("checking notification"))
    }

    async fn mark_read(&self, id: i64, user_id: i64) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO notification_reads (notification_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (notification_id, user_id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("marking notification read"))?;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Support tickets
// ----------------------------------------------------------------------------

pub struct PgSupportRepository {
    pool: PgPool,
}

impl PgSupportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TicketRow {
    pub id: i64,
    pub tenant_id: i64,
    pub user_id: Option<i64>,
    pub subject: String,
    pub description: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TicketRow> for SupportTicket {
    type Error = DomainError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        Ok(SupportTicket {
            id: row.id,
            tenant_id: row.tenant_id,
            user_id: row.user_id,
            subject: row.subject,
            description: row.description,
            status: decode(&row.status, TicketStatus::parse, "support_tickets.status")?,
            created_at: row.created_at,
        })
    }
}

const TICKET_COLUMNS: &str = "id, tenant_id, user_id, subject, description, status, created_at";

#[async_trait]
impl SupportRepository for PgSupportRepository {
    async fn create(&self, ticket: &NewSupportTicket) -> Result<SupportTicket, DomainError> {
        let row: TicketRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO support_tickets (tenant_id, user_id, subject, description)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            TICKET_COLUMNS
        ))
        .bind(ticket.tenant_id)
        .bind(ticket.user_id)
        .bind(&ticket.subject)
        .bind(&ticket.description)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("creating support ticket"))?;

        row.try_into()
    }

    async fn list_all(&self) -> Result<Vec<SupportTicket>, DomainError> {
        let rows: Vec<TicketRow> = sqlx::query_as(&format!(
            "SELECT {} FROM support_tickets ORDER BY created_at DESC",
            TICKET_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing support tickets"))?;

        rows.into_iter().map(SupportTicket::try_from).collect()
    }

    async fn set_status(
        &self,
        id: i64,
        status: TicketStatus,
    ) -> Result<Option<SupportTicket>, DomainError> {
        let row: Option<TicketRow> = sqlx::query_as(&format!(
            "UPDATE support_tickets SET status = $2 WHERE id = $1 RETURNING {}",
            TICKET_COLUMNS
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("updating support ticket"))?;

        row.map(SupportTicket::try_from).transpose()
    }
}

// ----------------------------------------------------------------------------
// Enquiries
// ----------------------------------------------------------------------------

pub struct PgEnquiryRepository {
    pool: PgPool,
}

impl PgEnquiryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EnquiryRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub subject: String,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EnquiryRow> for Enquiry {
    type Error = DomainError;

    fn try_from(row: EnquiryRow) -> Result<Self, Self::Error> {
        Ok(Enquiry {
            id: row.id,
            name: row.name,
            email: row.email,
            mobile: row.mobile,
            subject: row.subject,
            message: row.message,
            status: decode(&row.status, EnquiryStatus::parse, "enquiries.status")?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const ENQUIRY_COLUMNS: &str =
    "id, name, email, mobile, subject, message, status, created_at, updated_at";

#[async_trait]
impl EnquiryRepository for PgEnquiryRepository {
    async fn create(&self, enquiry: &EnquiryInput) -> Result<Enquiry, DomainError> {
        let row: EnquiryRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO enquiries (name, email, mobile, subject, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            ENQUIRY_COLUMNS
        ))
        .bind(&enquiry.name)
        .bind(&enquiry.email)
        .bind(&enquiry.mobile)
        .bind(&enquiry.subject)
        .bind(&enquiry.message)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("creating enquiry"))?;

        row.try_into()
    }

    async fn list(&self) -> Result<Vec<Enquiry>, DomainError> {
        let rows: Vec<EnquiryRow> = sqlx::query_as(&format!(
            "SELECT {} FROM enquiries ORDER BY created_at DESC",
            ENQUIRY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing enquiries"))?;

        rows.into_iter().map(Enquiry::try_from).collect()
    }

    async fn set_status(
        &self,
        id: i64,
        status: EnquiryStatus,
    ) -> Result<Option<Enquiry>, DomainError> {
        let row: Option<EnquiryRow> = sqlx::query_as(&format!(
            "UPDATE enquiries SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            ENQUIRY_COLUMNS
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("updating enquiry"))?;

        row.map(Enquiry::try_from).transpose()
    }

    async fn count(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM enquiries")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("counting enquiries"))
    }
}
