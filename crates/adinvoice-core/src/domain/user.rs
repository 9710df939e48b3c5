// ============================================================================
// AdInvoice Core - User Entity
// File: crates/adinvoice-core/src/domain/user.rs
// Description: Platform users, merchant applications and company profiles
// ============================================================================

use std::sync::LazyLock;

use adinvoice_security::TokenSubject;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

static PHONE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 -]{4,19}$").ok());

fn phone_number(phone: &str) -> Result<(), ValidationError> {
    match PHONE_PATTERN.as_ref() {
        Some(pattern) if !pattern.is_match(phone.trim()) => Err(ValidationError::new("phone")
            .with_message("Phone must contain digits only".into())),
        _ => Ok(()),
    }
}

/// User role enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Staff,
    Entrepreneur,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Staff => "staff",
            UserRole::Entrepreneur => "entrepreneur",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(UserRole::Admin),
            "staff" => Some(UserRole::Staff),
            "entrepreneur" => Some(UserRole::Entrepreneur),
            _ => None,
        }
    }
}

/// Merchant application state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ApplicationStatus::Pending),
            "approved" => Some(ApplicationStatus::Approved),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

/// Company profile carried on merchant accounts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct CompanyProfile {
    #[validate(length(max = 255))]
    pub company_name: Option<String>,
    pub designation: Option<String>,
    pub industry: Option<String>,
    #[validate(range(min = 0, max = 100))]
    pub experience_years: Option<i32>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    #[validate(length(max = 10))]
    pub pincode: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(url)]
    pub linkedin_profile: Option<String>,
    #[validate(url)]
    pub twitter_profile: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub alternate_phone: Option<String>,
}

impl CompanyProfile {
    /// Overwrite every field present in `update`
    pub fn merge(&mut self, update: CompanyProfile) {
        macro_rules! take {
            ($($field:ident),*) => {
                $( if update.$field.is_some() { self.$field = update.$field; } )*
            };
        }
        take!(
            company_name, designation, industry, experience_years, address_line1,
            address_line2, city, state, country, pincode, website, linkedin_profile,
            twitter_profile, date_of_birth, alternate_phone
        );
    }

    /// A profile counts as completed once the company and its address are known
    pub fn is_complete(&self) -> bool {
        self.company_name.is_some()
            && self.address_line1.is_some()
            && self.city.is_some()
            && self.country.is_some()
    }
}

/// User entity (control database)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub tenant_id: Option<i64>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub application_status: ApplicationStatus,
    #[serde(flatten)]
    pub profile: CompanyProfile,
    pub profile_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Username assigned on approval: `<email local part>_<id>`
    pub fn approved_username(&self) -> String {
        let local = self.email.split('@').next().unwrap_or(&self.email);
        format!("{}_{}", local, self.id)
    }

    /// Merchant admins may only sign in once their application is approved
    pub fn requires_approval(&self) -> bool {
        self.role == UserRole::Admin
            && !self.is_superuser
            && self.application_status != ApplicationStatus::Approved
    }
}

/// Entrepreneur application submitted through public registration
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewApplication {
    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "First name is required"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "Last name is required"))]
    pub last_name: String,
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(
        length(min = 5, max = 20, message = "Phone is required"),
        custom(function = "phone_number")
    )]
    pub phone: String,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub company_name: Option<String>,
}

impl NewApplication {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// Values inserted for a new user row
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub is_superuser: bool,
    pub application_status: ApplicationStatus,
    pub profile: CompanyProfile,
}

impl NewUser {
    /// Pending merchant account created from a public application
    pub fn from_application(application: &NewApplication) -> Self {
        let profile = CompanyProfile {
            company_name: application.company_name.clone(),
            address_line1: application.address.clone(),
            date_of_birth: application.date_of_birth,
            ..CompanyProfile::default()
        };

        Self {
            username: format!("pending_{}", application.email),
            email: application.email.clone(),
            phone: Some(application.phone.clone()),
            password_hash: None,
            first_name: Some(application.first_name.trim().to_string()),
            last_name: Some(application.last_name.trim().to_string()),
            full_name: Some(application.full_name()),
            role: UserRole::Admin,
            is_active: false,
            is_superuser: false,
            application_status: ApplicationStatus::Pending,
            profile,
        }
    }

    /// Platform super-admin created at bootstrap
    pub fn superadmin(email: &str, password_hash: String) -> Self {
        let local = email.split('@').next().unwrap_or(email);
        Self {
            username: local.to_string(),
            email: email.to_string(),
            phone: None,
            password_hash: Some(password_hash),
            first_name: None,
            last_name: None,
            full_name: Some("Super Admin".to_string()),
            role: UserRole::Admin,
            is_active: true,
            is_superuser: true,
            application_status: ApplicationStatus::Approved,
            profile: CompanyProfile::default(),
        }
    }
}

/// Approval decision on a merchant application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalAction {
    Approve,
    Reject,
}

impl ApprovalAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approve" => Some(ApprovalAction::Approve),
            "reject" => Some(ApprovalAction::Reject),
            _ => None,
        }
    }
}

/// Result of an approval decision. The temporary password is only ever
/// returned here, in clear text, once.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalOutcome {
    pub user_id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_password: Option<String>,
    pub status: ApplicationStatus,
}

/// Company-details update payload
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CompanyDetailsUpdate {
    #[validate(length(min = 1, max = 150))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 150))]
    pub last_name: Option<String>,
    #[validate(length(min = 5, max = 20))]
    pub phone: Option<String>,
    #[serde(flatten)]
    #[validate(nested)]
    pub profile: CompanyProfile,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyAddress {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub pincode: Option<String>,
}

/// Company details view returned by `own-company`
#[derive(Debug, Clone, Serialize)]
pub struct CompanyDetails {
    pub id: i64,
    pub full_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub alternate_phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub company_name: Option<String>,
    pub designation: Option<String>,
    pub industry: Option<String>,
    pub experience_years: Option<i32>,
    pub address: CompanyAddress,
    pub website: Option<String>,
    pub linkedin_profile: Option<String>,
    pub twitter_profile: Option<String>,
    pub application_status: ApplicationStatus,
    pub profile_completed: bool,
}

impl From<User> for CompanyDetails {
    fn from(user: User) -> Self {
        let p = user.profile;
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            alternate_phone: p.alternate_phone,
            date_of_birth: p.date_of_birth,
            company_name: p.company_name,
            designation: p.designation,
            industry: p.industry,
            experience_years: p.experience_years,
            address: CompanyAddress {
                line1: p.address_line1,
                line2: p.address_line2,
                city: p.city,
                state: p.state,
                country: p.country,
                pincode: p.pincode,
            },
            website: p.website,
            linkedin_profile: p.linkedin_profile,
            twitter_profile: p.twitter_profile,
            application_status: user.application_status,
            profile_completed: user.profile_completed,
        }
    }
}

/// Row in the pending-application list
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub role: UserRole,
    pub application_status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            phone: user.phone,
            full_name: user.full_name,
            company_name: user.profile.company_name,
            role: user.role,
            application_status: user.application_status,
            created_at: user.created_at,
        }
    }
}

/// Authenticated caller, decoded from the bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub role: String,
    pub tenant_id: Option<i64>,
    pub is_superuser: bool,
}

impl From<TokenSubject> for Principal {
    fn from(subject: TokenSubject) -> Self {
        Self {
            user_id: subject.user_id,
            role: subject.role,
            tenant_id: subject.tenant_id,
            is_superuser: subject.is_superuser,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_user(id: i64) -> User {
        User {
            id,
            username: format!("user_{}", id),
            email: format!("owner{}@acme.test", id),
            phone: Some(format!("90000000{:02}", id)),
            password_hash: None,
            first_name: Some("Asha".to_string()),
            last_name: Some("Rao".to_string()),
            full_name: Some("Asha Rao".to_string()),
            role: UserRole::Admin,
            tenant_id: None,
            is_active: true,
            is_superuser: false,
            application_status: ApplicationStatus::Approved,
            profile: CompanyProfile::default(),
            profile_completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_approved_username() {
        let user = sample_user(17);
        assert_eq!(user.approved_username(), "owner17_17");
    }

    #[test]
    fn test_requires_approval() {
        let mut user = sample_user(1);
        user.application_status = ApplicationStatus::Pending;
        assert!(user.requires_approval());

        user.role = UserRole::Staff;
        assert!(!user.requires_approval());
    }

    #[test]
    fn test_pending_account_from_application() {
        let application = NewApplication {
            first_name: "Ravi".to_string(),
            last_name: "Kumar".to_string(),
            email: "ravi@shop.test".to_string(),
            phone: "9876543210".to_string(),
            address: Some("1 Market Rd".to_string()),
            date_of_birth: None,
            company_name: Some("Ravi Stores".to_string()),
        };
        assert!(application.validate().is_ok());

        let user = NewUser::from_application(&application);
        assert_eq!(user.username, "pending_ravi@shop.test");
        assert_eq!(user.role, UserRole::Admin);
        assert!(!user.is_active);
        assert_eq!(user.application_status, ApplicationStatus::Pending);
        assert_eq!(user.full_name.as_deref(), Some("Ravi Kumar"));
        assert_eq!(user.profile.address_line1.as_deref(), Some("1 Market Rd"));
    }

    #[test]
    fn test_application_requires_fields() {
        let application: NewApplication =
            serde_json::from_str(r#"{"email": "x@y.test"}"#).unwrap();
        assert!(application.validate().is_err());
    }

    #[test]
    fn test_phone_format() {
        assert!(phone_number("9876543210").is_ok());
        assert!(phone_number("+91 98765 43210").is_ok());
        assert!(phone_number("call-me").is_err());
    }

    #[test]
    fn test_profile_merge_keeps_missing_fields() {
        let mut profile = CompanyProfile {
            company_name: Some("Old".to_string()),
            city: Some("Pune".to_string()),
            ..CompanyProfile::default()
        };
        profile.merge(CompanyProfile {
            company_name: Some("New".to_string()),
            ..CompanyProfile::default()
        });
        assert_eq!(profile.company_name.as_deref(), Some("New"));
        assert_eq!(profile.city.as_deref(), Some("Pune"));
    }

    #[test]
    fn test_user_never_serializes_password_hash() {
        let mut user = sample_user(3);
        user.password_hash = Some("secret-hash".to_string());
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }
}
