// ============================================================================
// AdInvoice Core - Tenant Entity
// File: crates/adinvoice-core/src/domain/tenant.rs
// Description: Tenant registry entry and its dedicated database name
// ============================================================================

use adinvoice_shared::constants::{DB_NAME_SUFFIX_LENGTH, MAX_DB_IDENTIFIER_LENGTH};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::user::User;

/// Tenant registry row (control database)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: i64,
    pub name: String,
    pub db_name: String,
    pub owner_id: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Routing context for tenant-scoped repositories
    pub fn context(&self) -> TenantContext {
        TenantContext {
            tenant_id: self.id,
            db_alias: self.db_name.clone(),
        }
    }
}

/// Payload accepted when creating a tenant
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewTenant {
    #[validate(length(min = 2, max = 255, message = "Tenant name must be between 2 and 255 characters"))]
    pub name: String,
    pub owner_id: Option<i64>,
}

/// `enable` / `disable` switch on tenant update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantAction {
    Enable,
    Disable,
}

impl TenantAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "enable" => Some(TenantAction::Enable),
            "disable" => Some(TenantAction::Disable),
            _ => None,
        }
    }
}

/// Tenant update payload; `db_name` is accepted but never applied
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TenantUpdate {
    pub action: Option<String>,
    #[validate(length(min = 2, max = 255, message = "Tenant name must be between 2 and 255 characters"))]
    pub name: Option<String>,
    #[serde(default)]
    pub db_name: Option<String>,
}

/// Resolved tenant routing information for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantContext {
    pub tenant_id: i64,
    /// Name under which the tenant's pool is registered
    pub db_alias: String,
}

/// Owner summary embedded in tenant responses
#[derive(Debug, Clone, Serialize)]
pub struct TenantOwner {
    pub id: i64,
    pub full_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub role: String,
}

impl From<User> for TenantOwner {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            company_name: user.profile.company_name,
            role: user.role.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TenantDetails {
    pub id: i64,
    pub name: String,
    pub db_name: String,
    pub is_active: bool,
    pub owner: Option<TenantOwner>,
    pub created_at: DateTime<Utc>,
}

impl TenantDetails {
    pub fn new(tenant: Tenant, owner: Option<TenantOwner>) -> Self {
        Self {
            id: tenant.id,
            name: tenant.name,
            db_name: tenant.db_name,
            is_active: tenant.is_active,
            owner,
            created_at: tenant.created_at,
        }
    }
}

/// Sanitised database name stem for a tenant name.
///
/// Lowercases, replaces every character outside `[a-z0-9_]` with `_`,
/// prefixes `t_` when the result does not start with a letter and
/// truncates so the suffixed name fits the identifier limit.
pub fn db_name_stem(tenant_name: &str) -> String {
    let mut stem: String = tenant_name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' { c } else { '_' })
        .collect();

    if !stem.starts_with(|c: char| c.is_ascii_lowercase()) {
        stem.insert_str(0, "t_");
    }

    // every char is ASCII here, byte truncation is safe
    stem.truncate(MAX_DB_IDENTIFIER_LENGTH - DB_NAME_SUFFIX_LENGTH - 1);
    stem
}

/// `<stem>_<6-digit suffix>`
pub fn db_name_with_suffix(tenant_name: &str, suffix: u32) -> String {
    format!(
        "{}_{:0width$}",
        db_name_stem(tenant_name),
        suffix % 1_000_000,
        width = DB_NAME_SUFFIX_LENGTH
    )
}

/// Generate a fresh database name with a random suffix.
pub fn generate_db_name(tenant_name: &str) -> String {
    let suffix: u32 = rand::rng().random_range(0..1_000_000);
    db_name_with_suffix(tenant_name, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_name_sanitises() {
        assert_eq!(db_name_with_suffix("Acme Corp", 42), "acme_corp_000042");
        assert_eq!(db_name_with_suffix("Joe's Café-Bar", 123456), "joe_s_caf__bar_123456");
    }

    #[test]
    fn test_db_name_prefix_when_not_letter() {
        assert_eq!(db_name_with_suffix("42 Labs", 1), "t_42_labs_000001");
        assert_eq!(db_name_with_suffix("_hidden", 1), "t__hidden_000001");
    }

    #[test]
    fn test_db_name_respects_identifier_limit() {
        let long_name = "x".repeat(300);
        let name = db_name_with_suffix(&long_name, 999999);
        assert_eq!(name.len(), MAX_DB_IDENTIFIER_LENGTH);
        assert!(name.ends_with("_999999"));
    }

    #[test]
    fn test_generated_name_shape() {
        let name = generate_db_name("Blue Ocean");
        assert!(name.starts_with("blue_ocean_"));
        assert_eq!(name.len(), "blue_ocean_".len() + DB_NAME_SUFFIX_LENGTH);
        assert!(name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
    }

    #[test]
    fn test_new_tenant_validation() {
        let short = NewTenant { name: "A".to_string(), owner_id: None };
        assert!(short.validate().is_err());

        let ok = NewTenant { name: "Acme".to_string(), owner_id: Some(1) };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_tenant_action_parse() {
        assert_eq!(TenantAction::parse("enable"), Some(TenantAction::Enable));
        assert_eq!(TenantAction::parse("disable"), Some(TenantAction::Disable));
        assert_eq!(TenantAction::parse("archive"), None);
    }
}
