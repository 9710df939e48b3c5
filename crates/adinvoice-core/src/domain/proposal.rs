// ============================================================================
// AdInvoice Core - Proposal Entity
// File: crates/adinvoice-core/src/domain/proposal.rs
// Description: Proposals (quotes) with line items and server-computed totals
// ============================================================================

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::domain::money::{
    checked_grand_total, checked_line, valid_amount, valid_gst_rate, DocumentTotals, LineAmounts,
};
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
}

impl ProposalStatus {
    pub const ALL: [ProposalStatus; 5] = [
        ProposalStatus::Draft,
        ProposalStatus::Sent,
        ProposalStatus::Accepted,
        ProposalStatus::Rejected,
        ProposalStatus::Expired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Draft => "draft",
            ProposalStatus::Sent => "sent",
            ProposalStatus::Accepted => "accepted",
            ProposalStatus::Rejected => "rejected",
            ProposalStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// Parse a status coming from a request, with the 400 message listing valid values
    pub fn parse_requested(s: &str) -> Result<Self, DomainError> {
        Self::parse(s).ok_or_else(|| {
            let valid: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
            DomainError::ValidationError(format!(
                "Invalid status. Must be one of: {}",
                valid.join(", ")
            ))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProposalItemKind {
    #[default]
    Product,
    Service,
}

impl ProposalItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalItemKind::Product => "product",
            ProposalItemKind::Service => "service",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "product" => Some(ProposalItemKind::Product),
            "service" => Some(ProposalItemKind::Service),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub item_type: ProposalItemKind,
    pub quantity: i32,
    pub price: Decimal,
    pub gst_rate: Decimal,
    pub total: Decimal,
    pub position: i32,
}

impl ProposalItem {
    pub fn amounts(&self) -> LineAmounts {
        LineAmounts::compute(Decimal::from(self.quantity), self.price, self.gst_rate)
    }
}

fn default_quantity() -> i32 {
    1
}

/// Line item as sent by clients; any `total` in the payload is ignored
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "line_fits", skip_on_field_errors = true))]
pub struct ProposalItemInput {
    #[validate(length(min = 1, max = 255, message = "Item name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub item_type: ProposalItemKind,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(custom(function = "valid_amount"))]
    pub price: Decimal,
    #[validate(custom(function = "valid_gst_rate"))]
    pub gst_rate: Option<Decimal>,
    #[serde(alias = "order")]
    pub position: Option<i32>,
}

fn line_fits(item: &ProposalItemInput) -> Result<(), ValidationError> {
    item.checked_amounts().map(|_| ())
}

fn items_fit(input: &ProposalInput) -> Result<(), ValidationError> {
    let Some(items) = &input.items else {
        return Ok(());
    };
    let lines = items
        .iter()
        .map(ProposalItemInput::checked_amounts)
        .collect::<Result<Vec<_>, _>>()?;
    checked_grand_total(lines).map(|_| ())
}

impl ProposalItemInput {
    fn checked_amounts(&self) -> Result<LineAmounts, ValidationError> {
        checked_line(
            Decimal::from(self.quantity),
            self.price,
            self.gst_rate.unwrap_or(Decimal::ZERO),
        )
    }

    pub fn into_item(self, index: usize) -> ProposalItem {
        let gst_rate = self.gst_rate.unwrap_or(Decimal::ZERO);
        let amounts = LineAmounts::compute(Decimal::from(self.quantity), self.price, gst_rate);
        ProposalItem {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            item_type: self.item_type,
            quantity: self.quantity,
            price: self.price,
            gst_rate,
            total: amounts.total,
            position: self.position.unwrap_or(index as i32),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub id: Uuid,
    pub title: String,
    pub proposal_number: String,
    pub client_name: String,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub client_address: Option<String>,
    pub company_name: String,
    pub company_email: Option<String>,
    pub company_phone: Option<String>,
    pub company_address: Option<String>,
    pub company_logo: Option<String>,
    pub date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub subtotal: Decimal,
    pub total_gst: Decimal,
    pub grand_total: Decimal,
    pub notes: Option<String>,
    pub status: ProposalStatus,
    pub template: i16,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<ProposalItem>,
}

/// Create/update payload. Totals are never read from here.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "items_fit", skip_on_field_errors = true))]
pub struct ProposalInput {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub proposal_number: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Client name is required"))]
    pub client_name: Option<String>,
    #[validate(email)]
    pub client_email: Option<String>,
    #[validate(length(max = 20))]
    pub client_phone: Option<String>,
    pub client_address: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Company name is required"))]
    pub company_name: Option<String>,
    #[validate(email)]
    pub company_email: Option<String>,
    #[validate(length(max = 20))]
    pub company_phone: Option<String>,
    pub company_address: Option<String>,
    #[validate(url)]
    pub company_logo: Option<String>,
    pub date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub status: Option<ProposalStatus>,
    #[validate(range(min = 1, max = 3, message = "Template must be 1 (Classic), 2 (Modern) or 3 (Professional)"))]
    pub template: Option<i16>,
    #[validate(nested)]
    pub items: Option<Vec<ProposalItemInput>>,
}

fn required(value: Option<String>, field: &str) -> Result<String, DomainError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| DomainError::ValidationError(format!("{} is required", field)))
}

impl Proposal {
    /// Build a new proposal; `proposal_number` is used when the payload has none.
    pub fn from_input(input: ProposalInput, proposal_number: String) -> Result<Self, DomainError> {
        let now = Utc::now();
        let items: Vec<ProposalItem> = input
            .items
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, item)| item.into_item(i))
            .collect();

        let mut proposal = Self {
            id: Uuid::new_v4(),
            title: required(input.title, "title")?,
            proposal_number: input.proposal_number.unwrap_or(proposal_number),
            client_name: required(input.client_name, "client_name")?,
            client_email: input.client_email,
            client_phone: input.client_phone,
            client_address: input.client_address,
            company_name: required(input.company_name, "company_name")?,
            company_email: input.company_email,
            company_phone: input.company_phone,
            company_address: input.company_address,
            company_logo: input.company_logo,
            date: input
                .date
                .ok_or_else(|| DomainError::ValidationError("date is required".to_string()))?,
            due_date: input.due_date,
            subtotal: Decimal::ZERO,
            total_gst: Decimal::ZERO,
            grand_total: Decimal::ZERO,
            notes: input.notes,
            status: input.status.unwrap_or(ProposalStatus::Draft),
            template: input.template.unwrap_or(1),
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
            items,
        };
        proposal.recompute_totals();
        Ok(proposal)
    }

    /// Partial update. Returns `true` when the item set was replaced.
    pub fn apply(&mut self, input: ProposalInput) -> bool {
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
        set!(title, proposal_number, client_name, company_name, date, status, template);
        set_opt!(
            client_email, client_phone, client_address, company_email, company_phone,
            company_address, company_logo, due_date, notes
        );

        let replaced = match input.items {
            Some(items) => {
                self.items = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| item.into_item(i))
                    .collect();
                true
            }
            None => false,
        };

        self.recompute_totals();
        self.updated_at = Utc::now();
        replaced
    }

    pub fn recompute_totals(&mut self) {
        let totals = DocumentTotals::from_lines(self.items.iter().map(ProposalItem::amounts));
        self.subtotal = totals.subtotal;
        self.total_gst = totals.total_gst;
        self.grand_total = totals.grand_total;
    }
}

/// List row with the number of items
#[derive(Debug, Clone, Serialize)]
pub struct ProposalSummary {
    pub id: Uuid,
    pub proposal_number: String,
    pub title: String,
    pub client_name: String,
    pub client_email: Option<String>,
    pub date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub grand_total: Decimal,
    pub status: ProposalStatus,
    pub items_count: i64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Non-trashed proposal figures
#[derive(Debug, Clone, Serialize, Default)]
pub struct ProposalStats {
    pub total_proposals: i64,
    pub status_counts: BTreeMap<String, i64>,
    pub total_value: Decimal,
}

impl ProposalStats {
    /// Fill in every known status, so absent ones report zero
    pub fn from_counts(counts: Vec<(ProposalStatus, i64)>, total_value: Decimal) -> Self {
        let mut status_counts: BTreeMap<String, i64> =
            ProposalStatus::ALL.iter().map(|s| (s.as_str().to_string(), 0)).collect();
        let mut total = 0;
        for (status, count) in counts {
            total += count;
            status_counts.insert(status.as_str().to_string(), count);
        }
        Self { total_proposals: total, status_counts, total_value }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    pub(crate) fn item(name: &str, quantity: i32, price: Decimal, gst: Decimal) -> ProposalItemInput {
        ProposalItemInput {
            name: name.to_string(),
            description: None,
            item_type: ProposalItemKind::Service,
            quantity,
            price,
            gst_rate: Some(gst),
            position: None,
        }
    }

    pub(crate) fn input_with_items(items: Vec<ProposalItemInput>) -> ProposalInput {
        ProposalInput {
            title: Some("Website revamp".to_string()),
            client_name: Some("Globex".to_string()),
            company_name: Some("Acme".to_string()),
            date: NaiveDate::from_ymd_opt(2025, 1, 10),
            items: Some(items),
            ..Default::default()
        }
    }

    #[test]
    fn test_totals_are_computed_from_items() {
        let input = input_with_items(vec![
            item("Design", 2, dec!(500.00), dec!(18)),
            item("Hosting", 1, dec!(99.99), dec!(0)),
        ]);
        let proposal = Proposal::from_input(input, "PROP-20250110-1234".to_string()).unwrap();

        assert_eq!(proposal.items[0].total, dec!(1180.00));
        assert_eq!(proposal.subtotal, dec!(1099.99));
        assert_eq!(proposal.total_gst, dec!(180.00));
        assert_eq!(proposal.grand_total, dec!(1279.99));
        assert_eq!(proposal.status, ProposalStatus::Draft);
        assert_eq!(proposal.template, 1);
        assert_eq!(proposal.proposal_number, "PROP-20250110-1234");
    }

    #[test]
    fn test_missing_title_is_rejected() {
        let mut input = input_with_items(Vec::new());
        input.title = None;
        let err = Proposal::from_input(input, "PROP-1".to_string()).unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[test]
    fn test_update_replaces_items_only_when_present() {
        let mut proposal = Proposal::from_input(
            input_with_items(vec![item("Design", 1, dec!(100), dec!(0))]),
            "PROP-1".to_string(),
        )
        .unwrap();

        let replaced = proposal.apply(ProposalInput {
            notes: Some("Revised".to_string()),
            ..Default::default()
        });
        assert!(!replaced);
        assert_eq!(proposal.items.len(), 1);
        assert_eq!(proposal.grand_total, dec!(100));

        let replaced = proposal.apply(ProposalInput {
            items: Some(vec![item("Audit", 3, dec!(10), dec!(5))]),
            ..Default::default()
        });
        assert!(replaced);
        assert_eq!(proposal.items.len(), 1);
        assert_eq!(proposal.items[0].name, "Audit");
        assert_eq!(proposal.grand_total, dec!(31.50));
    }

    #[test]
    fn test_item_quantity_must_be_positive() {
        let bad = item("Design", 0, dec!(10), dec!(0));
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_item_amounts_must_fit_columns() {
        assert!(item("Retainer", 1, dec!(10000000000), dec!(0)).validate().is_err());
        assert!(item("Retainer", 1, dec!(10), dec!(100.5)).validate().is_err());
        // each field in range, but the line total overflows NUMERIC(12,2)
        let errors = item("Retainer", 2, dec!(9000000000), dec!(18)).validate().unwrap_err();
        assert!(errors.to_string().contains("Line total cannot exceed"));

        let input = ProposalInput {
            items: Some(vec![
                item("Build", 1, dec!(6000000000), dec!(0)),
                item("Run", 1, dec!(6000000000), dec!(0)),
            ]),
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_status_parse_requested() {
        assert_eq!(ProposalStatus::parse_requested("sent").unwrap(), ProposalStatus::Sent);
        let err = ProposalStatus::parse_requested("won").unwrap_err();
        assert!(err.to_string().contains("draft, sent, accepted, rejected, expired"));
    }

    #[test]
    fn test_stats_report_every_status() {
        let stats = ProposalStats::from_counts(
            vec![(ProposalStatus::Draft, 2), (ProposalStatus::Accepted, 1)],
            dec!(1500),
        );
        assert_eq!(stats.total_proposals, 3);
        assert_eq!(stats.status_counts["draft"], 2);
        assert_eq!(stats.status_counts["expired"], 0);
    }
}
