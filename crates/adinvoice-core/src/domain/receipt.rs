// ============================================================================
// AdInvoice Core - Receipt Entity
// File: crates/adinvoice-core/src/domain/receipt.rs
// Description: Payment receipts and their balance-driven status
// ============================================================================

use adinvoice_shared::constants::DEFAULT_RECEIPT_CLIENT_NAME;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::money::valid_amount;
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    Pending,
    #[serde(rename = "Partially Paid")]
    PartiallyPaid,
    Paid,
    Closed,
}

impl ReceiptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptStatus::Pending => "Pending",
            ReceiptStatus::PartiallyPaid => "Partially Paid",
            ReceiptStatus::Paid => "Paid",
            ReceiptStatus::Closed => "Closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(ReceiptStatus::Pending),
            "Partially Paid" => Some(ReceiptStatus::PartiallyPaid),
            "Paid" => Some(ReceiptStatus::Paid),
            "Closed" => Some(ReceiptStatus::Closed),
            _ => None,
        }
    }

    /// Status implied by the amounts of a receipt
    pub fn derive(total: Decimal, paid: Decimal) -> Self {
        let balance = total - paid;
        if balance.is_zero() {
            ReceiptStatus::Closed
        } else if paid.is_zero() {
            ReceiptStatus::Pending
        } else if paid > Decimal::ZERO && paid < total {
            ReceiptStatus::PartiallyPaid
        } else {
            ReceiptStatus::Paid
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub id: Uuid,
    pub receipt_number: String,
    #[serde(rename = "invoice")]
    pub invoice_id: Option<Uuid>,
    pub date: NaiveDate,
    pub client_name: String,
    pub client_email: Option<String>,
    pub description: Option<String>,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub balance_amount: Decimal,
    pub due_date: Option<NaiveDate>,
    pub next_payment: Option<NaiveDate>,
    pub status: ReceiptStatus,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Joined from the linked invoice
    pub invoice_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReceiptInput {
    #[serde(alias = "invoice_id")]
    pub invoice: Option<Uuid>,
    #[validate(length(min = 1, max = 50))]
    pub receipt_number: Option<String>,
    pub date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 255))]
    pub client_name: Option<String>,
    #[validate(email)]
    pub client_email: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "valid_amount"))]
    pub total_amount: Option<Decimal>,
    #[validate(custom(function = "valid_amount"))]
    pub paid_amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub next_payment: Option<NaiveDate>,
}

impl Receipt {
    pub fn from_input(
        input: ReceiptInput,
        receipt_number: String,
        today: NaiveDate,
    ) -> Result<Self, DomainError> {
        let total_amount = input
            .total_amount
            .ok_or_else(|| DomainError::ValidationError("total_amount is required".to_string()))?;

        let now = Utc::now();
        let mut receipt = Self {
            id: Uuid::new_v4(),
            receipt_number: input.receipt_number.unwrap_or(receipt_number),
            invoice_id: input.invoice,
            date: input.date.unwrap_or(today),
            client_name: input
                .client_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_RECEIPT_CLIENT_NAME.to_string()),
            client_email: input.client_email,
            description: input.description,
            total_amount,
            paid_amount: input.paid_amount.unwrap_or(Decimal::ZERO),
            balance_amount: Decimal::ZERO,
            due_date: input.due_date,
            next_payment: input.next_payment,
            status: ReceiptStatus::Pending,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
            invoice_number: None,
        };
        receipt.refresh_status();
        Ok(receipt)
    }

    pub fn apply(&mut self, input: ReceiptInput) {
        macro_rules! set {
            ($($field:ident),*) => {
                $( if let Some(v) = input.$field { self.$field = v; } )*
            };
        }
        macro_rules! set_opt {
            ($($field:ident),*) => {
                $( if input.$field.is_some() { self.$field = input.$field; } )*
            };
        }
        set!(receipt_number, date, client_name, total_amount, paid_amount);
        set_opt!(client_email, description, due_date, next_payment);
        if input.invoice.is_some() {
            self.invoice_id = input.invoice;
        }
        self.refresh_status();
        self.updated_at = Utc::now();
    }

    /// `balance = total - paid` and the derived status
    pub fn refresh_status(&mut self) {
        self.balance_amount = self.total_amount - self.paid_amount;
        self.status = ReceiptStatus::derive(self.total_amount, self.paid_amount);
    }
}

#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct ReceiptStatusCounts {
    pub pending: i64,
    pub partially_paid: i64,
    pub paid: i64,
    pub closed: i64,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ReceiptStats {
    pub total_receipts: i64,
    pub total_amount: Decimal,
    pub total_paid: Decimal,
    pub total_balance: Decimal,
    pub status_counts: ReceiptStatusCounts,
}

impl ReceiptStats {
    pub fn count(&mut self, status: ReceiptStatus, count: i64) {
        self.total_receipts += count;
        match status {
            ReceiptStatus::Pending => self.status_counts.pending += count,
            ReceiptStatus::PartiallyPaid => self.status_counts.partially_paid += count,
            ReceiptStatus::Paid => self.status_counts.paid += count,
            ReceiptStatus::Closed => self.status_counts.closed += count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_status_derivation() {
        assert_eq!(ReceiptStatus::derive(dec!(100), dec!(100)), ReceiptStatus::Closed);
        assert_eq!(ReceiptStatus::derive(dec!(100), dec!(0)), ReceiptStatus::Pending);
        assert_eq!(ReceiptStatus::derive(dec!(100), dec!(40)), ReceiptStatus::PartiallyPaid);
        assert_eq!(ReceiptStatus::derive(dec!(100), dec!(120)), ReceiptStatus::Paid);
        assert_eq!(ReceiptStatus::derive(dec!(0), dec!(0)), ReceiptStatus::Closed);
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&ReceiptStatus::PartiallyPaid).unwrap();
        assert_eq!(json, "\"Partially Paid\"");
    }

    #[test]
    fn test_new_receipt_defaults() {
        let input = ReceiptInput {
            total_amount: Some(dec!(500)),
            paid_amount: Some(dec!(200)),
            ..Default::default()
        };
        let receipt = Receipt::from_input(input, "R-20250615-1111".to_string(), today()).unwrap();
        assert_eq!(receipt.client_name, "Unknown Client");
        assert_eq!(receipt.balance_amount, dec!(300));
        assert_eq!(receipt.status, ReceiptStatus::PartiallyPaid);
        assert_eq!(receipt.date, today());
    }

    #[test]
    fn test_total_is_required() {
        let err = Receipt::from_input(ReceiptInput::default(), "R-1".to_string(), today()).unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[test]
    fn test_amounts_must_fit_columns() {
        let input = ReceiptInput {
            total_amount: Some(dec!(10000000000.00)),
            ..Default::default()
        };
        assert!(input.validate().is_err());
        let input = ReceiptInput {
            total_amount: Some(dec!(500)),
            paid_amount: Some(dec!(-1)),
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_update_recomputes_balance() {
        let mut receipt = Receipt::from_input(
            ReceiptInput { total_amount: Some(dec!(500)), ..Default::default() },
            "R-1".to_string(),
            today(),
        )
        .unwrap();
        assert_eq!(receipt.status, ReceiptStatus::Pending);

        receipt.apply(ReceiptInput { paid_amount: Some(dec!(500)), ..Default::default() });
        assert_eq!(receipt.balance_amount, dec!(0));
        assert_eq!(receipt.status, ReceiptStatus::Closed);
    }

    #[test]
    fn test_stats_counts() {
        let mut stats = ReceiptStats::default();
        stats.count(ReceiptStatus::Pending, 2);
        stats.count(ReceiptStatus::Closed, 1);
        assert_eq!(stats.total_receipts, 3);
        assert_eq!(stats.status_counts.pending, 2);
        assert_eq!(stats.status_counts.closed, 1);
    }
}
