//! User repository trait (port)

use async_trait::async_trait;

use crate::domain::{NewUser, User};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, DomainError>;
    async fn create(&self, user: &NewUser) -> Result<User, DomainError>;
    /// Persist every mutable column of `user`
    async fn update(&self, user: &User) -> Result<User, DomainError>;
    async fn list_pending(&self) -> Result<Vec<User>, DomainError>;
    /// `(admin-role users, approved admin-role users)`
    async fn count_merchants(&self) -> Result<(i64, i64), DomainError>;
    async fn set_tenant(&self, user_id: i64, tenant_id: Option<i64>) -> Result<(), DomainError>;
    /// Detach every user from a deleted tenant
    async fn clear_tenant(&self, tenant_id: i64) -> Result<(), DomainError>;
}
