//! Roles and permissions repository trait (port)

use async_trait::async_trait;

use crate::domain::{Permission, PermissionInput, Role};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessRepository: Send + Sync {
    async fn list_permissions(&self) -> Result<Vec<Permission>, DomainError>;
    async fn find_permission_by_code(&self, code: &str) -> Result<Option<Permission>, DomainError>;
    async fn create_permission(&self, input: &PermissionInput) -> Result<Permission, DomainError>;
    async fn update_permission(&self, id: i64, input: &PermissionInput) -> Result<Option<Permission>, DomainError>;
    async fn delete_permission(&self, id: i64) -> Result<bool, DomainError>;
    /// How many of `ids` exist
    async fn count_permissions(&self, ids: Vec<i64>) -> Result<i64, DomainError>;

    async fn list_roles(&self) -> Result<Vec<Role>, DomainError>;
    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, DomainError>;
    async fn create_role(&self, name: &str, permission_ids: Vec<i64>) -> Result<Role, DomainError>;
    /// `permission_ids = None` keeps the current grants
    async fn update_role(&self, id: i64, name: &str, permission_ids: Option<Vec<i64>>) -> Result<Option<Role>, DomainError>;
    async fn delete_role(&self, id: i64) -> Result<bool, DomainError>;
    async fn count_roles(&self, ids: Vec<i64>) -> Result<i64, DomainError>;

    /// Replace the roles held by a user
    async fn set_user_roles(&self, user_id: i64, role_ids: Vec<i64>) -> Result<(), DomainError>;
    async fn count_user_roles(&self, user_id: i64) -> Result<i64, DomainError>;
    async fn user_has_permission(&self, user_id: i64, code: &str) -> Result<bool, DomainError>;
}
