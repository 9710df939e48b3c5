//! Public enquiries from the marketing site (control database)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnquiryStatus {
    Pending,
    Resolved,
}

impl EnquiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnquiryStatus::Pending => "pending",
            EnquiryStatus::Resolved => "resolved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(EnquiryStatus::Pending),
            "resolved" => Some(EnquiryStatus::Resolved),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Enquiry {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub subject: String,
    pub message: String,
    pub status: EnquiryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EnquiryInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 5, max = 15))]
    pub mobile: String,
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnquiryStatusUpdate {
    pub status: EnquiryStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enquiry_validation() {
        let input = EnquiryInput {
            name: "Meera".to_string(),
            email: "not-an-email".to_string(),
            mobile: "9876543210".to_string(),
            subject: "Pricing".to_string(),
            message: "Do you support GST invoices?".to_string(),
        };
        assert!(input.validate().is_err());

        let input = EnquiryInput { email: "meera@example.com".to_string(), ..input };
        assert!(input.validate().is_ok());
    }
}
