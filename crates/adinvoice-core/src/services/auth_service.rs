// ============================================================================
// AdInvoice Core - Authentication Service
// File: crates/adinvoice-core/src/services/auth_service.rs
// ============================================================================
//! Merchant registration, sign-in, approval and company profiles

use std::sync::Arc;

use adinvoice_security::{JwtService, PasswordService, TokenSubject};
use adinvoice_shared::utils::mask_email;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use validator::Validate;

use crate::domain::{
    ApplicationStatus, ApprovalAction, ApprovalOutcome, CompanyDetails, CompanyDetailsUpdate,
    NewApplication, NewUser, Principal, User, UserRole, UserSummary,
};
use crate::error::DomainError;
use crate::repositories::UserRepository;

/// Authentication service for registration and sign-in flows
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
}

/// Result of a successful sign-in
#[derive(Debug, Clone, Serialize)]
pub struct SigninResult {
    pub access: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub role: UserRole,
    pub user_id: i64,
    pub tenant_id: Option<i64>,
    pub is_superuser: bool,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: Arc<JwtService>) -> Self {
        Self { users, jwt }
    }

    /// Submit a merchant application. The account stays inactive until approved.
    pub async fn register(&self, application: NewApplication) -> Result<User, DomainError> {
        application.validate().map_err(|_| {
            DomainError::ValidationError(
                "First name, last name, email and phone are required".to_string(),
            )
        })?;
        info!("Registration attempt for email: {}", mask_email(&application.email));

        if self.users.find_by_email(&application.email).await?.is_some() {
            warn!("Registration failed: email already exists");
            return Err(DomainError::EmailAlreadyExists(application.email));
        }

        if self.users.find_by_phone(&application.phone).await?.is_some() {
            warn!("Registration failed: phone already exists");
            return Err(DomainError::PhoneAlreadyExists(application.phone));
        }

        let user = self.users.create(&NewUser::from_application(&application)).await?;
        info!("Application {} submitted", user.id);
        Ok(user)
    }

    /// Sign in with email and password
    pub async fn signin(&self, email: &str, password: &str) -> Result<SigninResult, DomainError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(DomainError::ValidationError(
                "Email and password are required".to_string(),
            ));
        }

        // 1. Find user and verify password
        let user = self.users.find_by_email(email.trim()).await?.ok_or_else(|| {
            warn!("Signin failed: unknown email {}", mask_email(email));
            DomainError::InvalidCredentials
        })?;

        let stored_hash = user
            .password_hash
            .as_deref()
            .ok_or(DomainError::InvalidCredentials)?;

        let valid = PasswordService::verify(password, stored_hash)
            .map_err(|_| DomainError::InvalidCredentials)?;
        if !valid {
            warn!("Signin failed: invalid password for user {}", user.id);
            return Err(DomainError::InvalidCredentials);
        }

        // 2. Account state
        if !user.is_active {
            return Err(DomainError::UserNotActive);
        }
        if user.requires_approval() {
            return Err(DomainError::ApplicationNotApproved(
                user.application_status.as_str().to_string(),
            ));
        }

        // 3. Token
        let subject = TokenSubject {
            user_id: user.id,
            role: user.role.as_str().to_string(),
            tenant_id: user.tenant_id,
            is_superuser: user.is_superuser,
        };
        let access = self
            .jwt
            .generate_access_token(&subject)
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))?;

        info!("Signin successful for user {}", user.id);
        Ok(SigninResult {
            access,
            token_type: "Bearer",
            expires_in: self.jwt.access_token_expiry(),
            role: user.role,
            user_id: user.id,
            tenant_id: user.tenant_id,
            is_superuser: user.is_superuser,
        })
    }

    /// Approve or reject a merchant application
    pub async fn decide_application(
        &self,
        user_id: i64,
        action: &str,
    ) -> Result<ApprovalOutcome, DomainError> {
        let action = ApprovalAction::parse(action).ok_or_else(|| {
            DomainError::ValidationError("Invalid action. Use 'approve' or 'reject'.".to_string())
        })?;

        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .filter(|u| u.role == UserRole::Admin && !u.is_superuser)
            .ok_or_else(|| DomainError::not_found("Entrepreneur", user_id))?;

        let temp_password = match action {
            ApprovalAction::Approve => {
                let password = PasswordService::generate_temporary();
                let hash = PasswordService::hash(&password)
                    .map_err(|e| DomainError::PasswordHashError(e.to_string()))?;
                user.username = user.approved_username();
                user.password_hash = Some(hash);
                user.application_status = ApplicationStatus::Approved;
                user.is_active = true;
                Some(password)
            }
            ApprovalAction::Reject => {
                user.application_status = ApplicationStatus::Rejected;
                user.is_active = false;
                None
            }
        };
        user.updated_at = Utc::now();

        let user = self.users.update(&user).await?;
        info!("Application {} {}", user.id, user.application_status.as_str());

        Ok(ApprovalOutcome {
            user_id: user.id,
            username: user.username,
            temp_password,
            status: user.application_status,
        })
    }

    /// Company details of the caller, or of `user_id` (self or superuser only)
    pub async fn company_details(
        &self,
        principal: &Principal,
        user_id: Option<i64>,
    ) -> Result<CompanyDetails, DomainError> {
        let target = user_id.unwrap_or(principal.user_id);
        if target != principal.user_id && !principal.is_superuser {
            return Err(DomainError::PermissionDenied);
        }

        let user = self
            .users
            .find_by_id(target)
            .await?
            .ok_or_else(|| DomainError::not_found("Entrepreneur", target))?;
        Ok(CompanyDetails::from(user))
    }

    pub async fn update_company_details(
        &self,
        principal: &Principal,
        update: CompanyDetailsUpdate,
    ) -> Result<CompanyDetails, DomainError> {
        update.validate()?;
        let mut user = self
            .users
            .find_by_id(principal.user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        if let Some(phone) = update.phone {
            if user.phone.as_deref() != Some(phone.as_str()) {
                if let Some(other) = self.users.find_by_phone(&phone).await? {
                    if other.id != user.id {
                        return Err(DomainError::PhoneAlreadyExists(phone));
                    }
                }
            }
            user.phone = Some(phone);
        }
        if update.first_name.is_some() {
            user.first_name = update.first_name;
        }
        if update.last_name.is_some() {
            user.last_name = update.last_name;
        }
        if let (Some(first), Some(last)) = (&user.first_name, &user.last_name) {
            user.full_name = Some(format!("{} {}", first, last));
        }

        user.profile.merge(update.profile);
        user.profile_completed = user.profile.is_complete();
        user.updated_at = Utc::now();

        let user = self.users.update(&user).await?;
        Ok(CompanyDetails::from(user))
    }

    pub async fn pending_users(&self) -> Result<Vec<UserSummary>, DomainError> {
        let users = self.users.list_pending().await?;
        Ok(users.into_iter().map(UserSummary::from).collect())
    }

    /// Create the configured super-admin unless a user with that email exists
    pub async fn bootstrap_superadmin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        if self.users.find_by_email(email).await?.is_some() {
            return Ok(None);
        }

        let hash = PasswordService::hash(password)
            .map_err(|e| DomainError::PasswordHashError(e.to_string()))?;
        let user = self.users.create(&NewUser::superadmin(email, hash)).await?;
        info!("Bootstrapped super-admin {}", mask_email(email));
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::tests::sample_user;
    use crate::repositories::MockUserRepository;

    fn jwt() -> Arc<JwtService> {
        Arc::new(JwtService::new("test-secret-key-for-signing".to_string(), 3600))
    }

    fn application() -> NewApplication {
        NewApplication {
            first_name: "Ravi".to_string(),
            last_name: "Kumar".to_string(),
            email: "ravi@shop.test".to_string(),
            phone: "9876543210".to_string(),
            address: None,
            date_of_birth: None,
            company_name: None,
        }
    }

    fn user_with_password(password: &str) -> User {
        let mut user = sample_user(5);
        user.password_hash = Some(PasswordService::hash(password).unwrap());
        user
    }

    #[tokio::test]
    async fn test_register_creates_pending_admin() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users.expect_find_by_phone().returning(|_| Ok(None));
        users
            .expect_create()
            .withf(|new_user: &NewUser| {
                new_user.username == "pending_ravi@shop.test"
                    && !new_user.is_active
                    && new_user.application_status == ApplicationStatus::Pending
            })
            .times(1)
            .returning(|new_user| {
                let mut user = sample_user(9);
                user.username = new_user.username.clone();
                user.is_active = false;
                user.application_status = ApplicationStatus::Pending;
                Ok(user)
            });

        let service = AuthService::new(Arc::new(users), jwt());
        let user = service.register(application()).await.unwrap();
        assert_eq!(user.application_status, ApplicationStatus::Pending);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(Some(sample_user(1))));
        users.expect_create().never();

        let service = AuthService::new(Arc::new(users), jwt());
        let err = service.register(application()).await.unwrap_err();
        assert!(matches!(err, DomainError::EmailAlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_register_duplicate_phone() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users.expect_find_by_phone().returning(|_| Ok(Some(sample_user(1))));

        let service = AuthService::new(Arc::new(users), jwt());
        let err = service.register(application()).await.unwrap_err();
        assert!(matches!(err, DomainError::PhoneAlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_signin_success_issues_token() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(user_with_password("correct-horse"))));

        let jwt = jwt();
        let service = AuthService::new(Arc::new(users), jwt.clone());
        let result = service.signin("owner5@acme.test", "correct-horse").await.unwrap();

        assert_eq!(result.user_id, 5);
        assert_eq!(result.role, UserRole::Admin);
        let subject = jwt.validate_token(&result.access).unwrap();
        assert_eq!(subject.user_id, 5);
    }

    #[tokio::test]
    async fn test_signin_missing_fields() {
        let service = AuthService::new(Arc::new(MockUserRepository::new()), jwt());
        let err = service.signin("", "x").await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_signin_wrong_password() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|_| Ok(Some(user_with_password("correct-horse"))));

        let service = AuthService::new(Arc::new(users), jwt());
        let err = service.signin("owner5@acme.test", "battery-staple").await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_signin_inactive_account() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| {
            let mut user = user_with_password("correct-horse");
            user.is_active = false;
            Ok(Some(user))
        });

        let service = AuthService::new(Arc::new(users), jwt());
        let err = service.signin("owner5@acme.test", "correct-horse").await.unwrap_err();
        assert!(matches!(err, DomainError::UserNotActive));
    }

    #[tokio::test]
    async fn test_signin_unapproved_application() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| {
            let mut user = user_with_password("correct-horse");
            user.application_status = ApplicationStatus::Pending;
            Ok(Some(user))
        });

        let service = AuthService::new(Arc::new(users), jwt());
        let err = service.signin("owner5@acme.test", "correct-horse").await.unwrap_err();
        assert_eq!(err.to_string(), "Application pending. Please wait for approval.");
    }

    #[tokio::test]
    async fn test_approve_sets_credentials() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            let mut user = sample_user(id);
            user.is_active = false;
            user.application_status = ApplicationStatus::Pending;
            Ok(Some(user))
        });
        users.expect_update().times(1).returning(|user| Ok(user.clone()));

        let service = AuthService::new(Arc::new(users), jwt());
        let outcome = service.decide_application(12, "approve").await.unwrap();

        assert_eq!(outcome.username, "owner12_12");
        assert_eq!(outcome.status, ApplicationStatus::Approved);
        let password = outcome.temp_password.unwrap();
        assert_eq!(password.len(), 10);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn test_reject_has_no_password() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| Ok(Some(sample_user(id))));
        users
            .expect_update()
            .withf(|user: &User| !user.is_active && user.password_hash.is_none())
            .returning(|user| Ok(user.clone()));

        let service = AuthService::new(Arc::new(users), jwt());
        let outcome = service.decide_application(12, "reject").await.unwrap();
        assert!(outcome.temp_password.is_none());
        assert_eq!(outcome.status, ApplicationStatus::Rejected);
    }

    #[tokio::test]
    async fn test_invalid_decision() {
        let service = AuthService::new(Arc::new(MockUserRepository::new()), jwt());
        let err = service.decide_application(12, "maybe").await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_company_details_of_other_user_requires_superuser() {
        let service = AuthService::new(Arc::new(MockUserRepository::new()), jwt());
        let principal = Principal {
            user_id: 1,
            role: "admin".to_string(),
            tenant_id: Some(1),
            is_superuser: false,
        };
        let err = service.company_details(&principal, Some(2)).await.unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied));
    }

    #[tokio::test]
    async fn test_bootstrap_skips_existing() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(Some(sample_user(1))));
        users.expect_create().never();

        let service = AuthService::new(Arc::new(users), jwt());
        assert!(service.bootstrap_superadmin("root@adinvoice.test", "pw").await.unwrap().is_none());
    }
}
