//! Platform notifications (control database)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SenderType {
    SuperAdmin,
    ClientAdmin,
}

impl SenderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SenderType::SuperAdmin => "SUPER_ADMIN",
            SenderType::ClientAdmin => "CLIENT_ADMIN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SUPER_ADMIN" => Some(SenderType::SuperAdmin),
            "CLIENT_ADMIN" => Some(SenderType::ClientAdmin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    Update,
    Announcement,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Update => "UPDATE",
            NotificationType::Announcement => "ANNOUNCEMENT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "UPDATE" => Some(NotificationType::Update),
            "ANNOUNCEMENT" => Some(NotificationType::Announcement),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub sender_type: SenderType,
    pub notification_type: NotificationType,
    pub message: String,
    /// `None` for global notifications
    #[serde(rename = "tenant")]
    pub tenant_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NotificationInput {
    #[serde(default)]
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
    pub notification_type: Option<NotificationType>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub sender_type: SenderType,
    pub notification_type: NotificationType,
    pub message: String,
    pub tenant_id: Option<i64>,
}

/// Notification with the caller's read flag
#[derive(Debug, Clone, Serialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    pub read: bool,
}
