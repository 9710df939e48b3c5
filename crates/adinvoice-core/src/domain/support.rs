//! Merchant support tickets (control database)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    Pending,
    Resolved,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::Pending => "pending",
            TicketStatus::Resolved => "resolved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(TicketStatus::Open),
            "pending" => Some(TicketStatus::Pending),
            "resolved" => Some(TicketStatus::Resolved),
            _ => None,
        }
    }

    /// Only `pending` and `resolved` may be set by an operator
    pub fn parse_transition(s: &str) -> Result<Self, DomainError> {
        match Self::parse(s) {
            Some(status @ (TicketStatus::Pending | TicketStatus::Resolved)) => Ok(status),
            _ => Err(DomainError::ValidationError("Invalid status".to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SupportTicket {
    pub id: i64,
    #[serde(rename = "tenant")]
    pub tenant_id: i64,
    #[serde(rename = "user")]
    pub user_id: Option<i64>,
    pub subject: String,
    pub description: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SupportTicketInput {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Subject is required"))]
    pub subject: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewSupportTicket {
    pub tenant_id: i64,
    pub user_id: Option<i64>,
    pub subject: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_transitions() {
        assert_eq!(TicketStatus::parse_transition("resolved").unwrap(), TicketStatus::Resolved);
        assert!(TicketStatus::parse_transition("open").is_err());
        assert!(TicketStatus::parse_transition("closed").is_err());
    }
}
