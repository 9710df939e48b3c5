// ============================================================================
// AdInvoice Core - Client Company Entity
// File: crates/adinvoice-core/src/domain/client.rs
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Customer company of a merchant (tenant database)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCompany {
    pub id: Uuid,
    pub name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub registration_number: Option<String>,
    pub tax_id: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub support_email: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload; on update only present fields are applied
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ClientCompanyInput {
    #[validate(length(min = 1, max = 255, message = "Client name is required"))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub industry: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    pub registration_number: Option<String>,
    pub tax_id: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 20))]
    pub postal_code: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(email)]
    pub support_email: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

impl ClientCompany {
    /// Build a new client from a create payload. Returns `None` without a name.
    pub fn from_input(input: ClientCompanyInput) -> Option<Self> {
        let name = input.name.as_deref().map(str::trim).filter(|n| !n.is_empty())?.to_string();
        let now = Utc::now();
        let mut client = Self {
            id: Uuid::new_v4(),
            name,
            industry: None,
            website: None,
            registration_number: None,
            tax_id: None,
            address_line1: None,
            address_line2: None,
            city: None,
            state: None,
            country: None,
            postal_code: None,
            phone: None,
            email: None,
            support_email: None,
            notes: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        client.apply(ClientCompanyInput { name: None, ..input });
        Some(client)
    }

    /// Apply a partial update
    pub fn apply(&mut self, input: ClientCompanyInput) {
        macro_rules! set {
            ($($field:ident),*) => {
                $( if input.$field.is_some() { self.$field = input.$field; } )*
            };
        }
        if let Some(name) = input.name {
            self.name = name.trim().to_string();
        }
        set!(
            industry, website, registration_number, tax_id, address_line1, address_line2,
            city, state, country, postal_code, phone, email, support_email, notes
        );
        if let Some(active) = input.is_active {
            self.is_active = active;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input_requires_name() {
        assert!(ClientCompany::from_input(ClientCompanyInput::default()).is_none());

        let blank = ClientCompanyInput { name: Some("   ".to_string()), ..Default::default() };
        assert!(ClientCompany::from_input(blank).is_none());
    }

    #[test]
    fn test_from_input_copies_fields() {
        let input = ClientCompanyInput {
            name: Some(" Globex ".to_string()),
            city: Some("Chennai".to_string()),
            ..Default::default()
        };
        let client = ClientCompany::from_input(input).unwrap();
        assert_eq!(client.name, "Globex");
        assert_eq!(client.city.as_deref(), Some("Chennai"));
        assert!(client.is_active);
    }

    #[test]
    fn test_apply_partial_update() {
        let mut client = ClientCompany::from_input(ClientCompanyInput {
            name: Some("Globex".to_string()),
            phone: Some("111".to_string()),
            ..Default::default()
        })
        .unwrap();

        client.apply(ClientCompanyInput {
            notes: Some("VIP".to_string()),
            is_active: Some(false),
            ..Default::default()
        });

        assert_eq!(client.name, "Globex");
        assert_eq!(client.phone.as_deref(), Some("111"));
        assert_eq!(client.notes.as_deref(), Some("VIP"));
        assert!(!client.is_active);
    }
}
