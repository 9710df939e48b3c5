//! Domain errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Tenant ID is required")]
    TenantRequired,

    #[error("Tenant not found")]
    TenantNotFound,

    #[error("Tenant is disabled")]
    TenantNotActive,

    #[error("Tenant name already exists: {0}")]
    TenantNameAlreadyExists(String),

    #[error("Access to tenant {0} denied")]
    TenantAccessDenied(i64),

    #[error("User not found")]
    UserNotFound,

    #[error("Account is disabled. Contact AdInvoice Support Team.")]
    UserNotActive,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Application {0}. Please wait for approval.")]
    ApplicationNotApproved(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Phone number already exists: {0}")]
    PhoneAlreadyExists(String),

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("No role assigned")]
    NoRoleAssigned,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Password hash error: {0}")]
    PasswordHashError(String),

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error("Tenant database provisioning failed: {0}")]
    ProvisioningError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound { entity, id: id.to_string() }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.to_string())
    }
}
