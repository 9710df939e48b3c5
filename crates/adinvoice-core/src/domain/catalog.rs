//! Product/service catalog and categories (tenant database)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use adinvoice_shared::utils::non_blank;

use crate::domain::money::valid_amount;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCategory {
    #[validate(length(min = 1, max = 100, message = "Category name is required"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Product,
    Service,
}

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKind::Product => "product",
            ProductKind::Service => "service",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "product" => Some(ProductKind::Product),
            "service" => Some(ProductKind::Service),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductService {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ProductKind,
    pub category_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub is_active: bool,
    pub hsn_code: Option<String>,
    pub stock_quantity: Option<i32>,
    pub delivery_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload for a product or service
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductInput {
    #[serde(rename = "type")]
    pub kind: Option<ProductKind>,
    #[serde(alias = "category")]
    pub category_id: Option<i64>,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "valid_amount"))]
    pub price: Option<Decimal>,
    pub is_active: Option<bool>,
    #[validate(length(max = 100))]
    pub hsn_code: Option<String>,
    #[validate(range(min = 0))]
    pub stock_quantity: Option<i32>,
    pub delivery_available: Option<bool>,
}

/// Fully-resolved product values ready for insert
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub kind: ProductKind,
    pub category_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub is_active: bool,
    pub hsn_code: Option<String>,
    pub stock_quantity: Option<i32>,
    pub delivery_available: bool,
}

impl NewProduct {
    /// `None` when the type or the name is missing
    pub fn from_input(input: ProductInput) -> Option<Self> {
        Some(Self {
            kind: input.kind?,
            category_id: input.category_id,
            name: input.name.filter(|n| !n.trim().is_empty())?,
            description: input.description,
            price: input.price,
            is_active: input.is_active.unwrap_or(true),
            hsn_code: non_blank(input.hsn_code),
            stock_quantity: Some(input.stock_quantity.unwrap_or(0)),
            delivery_available: input.delivery_available.unwrap_or(false),
        })
    }
}

impl ProductService {
    pub fn apply(&mut self, input: ProductInput) {
        if let Some(kind) = input.kind {
            self.kind = kind;
        }
        if input.category_id.is_some() {
            self.category_id = input.category_id;
        }
        if let Some(name) = input.name {
            self.name = name;
        }
        if input.description.is_some() {
            self.description = input.description;
        }
        if input.price.is_some() {
            self.price = input.price;
        }
        if let Some(active) = input.is_active {
            self.is_active = active;
        }
        if input.hsn_code.is_some() {
            self.hsn_code = non_blank(input.hsn_code);
        }
        if input.stock_quantity.is_some() {
            self.stock_quantity = input.stock_quantity;
        }
        if let Some(delivery) = input.delivery_available {
            self.delivery_available = delivery;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_negative_price_rejected() {
        let input = ProductInput {
            kind: Some(ProductKind::Product),
            name: Some("Widget".to_string()),
            price: Some(dec!(-1.00)),
            ..Default::default()
        };
        assert!(input.validate().is_err());

        let oversized = ProductInput { price: Some(dec!(10000000000)), ..input.clone() };
        assert!(oversized.validate().is_err());

        let free = ProductInput { price: Some(dec!(0)), ..input };
        assert!(free.validate().is_ok());
    }

    #[test]
    fn test_new_product_requires_type_and_name() {
        let input = ProductInput { name: Some("Widget".to_string()), ..Default::default() };
        assert!(NewProduct::from_input(input).is_none());

        let input = ProductInput {
            kind: Some(ProductKind::Service),
            name: Some("Consulting".to_string()),
            hsn_code: Some("".to_string()),
            ..Default::default()
        };
        let product = NewProduct::from_input(input).unwrap();
        assert!(product.is_active);
        assert!(product.hsn_code.is_none());
        assert_eq!(product.stock_quantity, Some(0));
    }

    #[test]
    fn test_payload_uses_type_and_category_keys() {
        let input: ProductInput = serde_json::from_str(
            r#"{"type": "service", "category": 4, "name": "Audit", "price": "1500.00"}"#,
        )
        .unwrap();
        assert_eq!(input.kind, Some(ProductKind::Service));
        assert_eq!(input.category_id, Some(4));
        assert_eq!(input.price, Some(dec!(1500.00)));
    }
}
