// ============================================================================
// AdInvoice Core - Access Service
// File: crates/adinvoice-core/src/services/access_service.rs
// Description: Role-based permissions held in the control database
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use crate::domain::{Permission, PermissionInput, Principal, Role, RoleAssignment, RoleInput};
use crate::error::DomainError;
use crate::repositories::{AccessRepository, UserRepository};

pub struct AccessService {
    access: Arc<dyn AccessRepository>,
    users: Arc<dyn UserRepository>,
}

impl AccessService {
    pub fn new(access: Arc<dyn AccessRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { access, users }
    }

    /// Superusers pass; everyone else needs a role granting `code`.
    pub async fn require_permission(
        &self,
        principal: &Principal,
        code: &str,
    ) -> Result<(), DomainError> {
        if principal.is_superuser {
            return Ok(());
        }

        if self.access.count_user_roles(principal.user_id).await? == 0 {
            warn!("User {} has no role (needs {})", principal.user_id, code);
            return Err(DomainError::NoRoleAssigned);
        }

        if !self.access.user_has_permission(principal.user_id, code).await? {
            warn!("User {} lacks permission {}", principal.user_id, code);
            return Err(DomainError::PermissionDenied);
        }

        Ok(())
    }

    pub fn require_superuser(&self, principal: &Principal) -> Result<(), DomainError> {
        if principal.is_superuser {
            Ok(())
        } else {
            Err(DomainError::PermissionDenied)
        }
    }

    // ------------------------------------------------------------------------
    // Permissions
    // ------------------------------------------------------------------------

    pub async fn list_permissions(&self) -> Result<Vec<Permission>, DomainError> {
        self.access.list_permissions().await
    }

    pub async fn create_permission(&self, input: PermissionInput) -> Result<Permission, DomainError> {
        input.validate()?;
        if self.access.find_permission_by_code(&input.code).await?.is_some() {
            return Err(DomainError::AlreadyExists(
                "Permission with this code already exists".to_string(),
            ));
        }

        let permission = self.access.create_permission(&input).await?;
        info!("Permission {} created", permission.code);
        Ok(permission)
    }

    pub async fn update_permission(
        &self,
        id: i64,
        input: PermissionInput,
    ) -> Result<Permission, DomainError> {
        input.validate()?;
        if let Some(existing) = self.access.find_permission_by_code(&input.code).await? {
            if existing.id != id {
                return Err(DomainError::AlreadyExists(
                    "Permission with this code already exists".to_string(),
                ));
            }
        }

        self.access
            .update_permission(id, &input)
            .await?
            .ok_or_else(|| DomainError::not_found("Permission", id))
    }

    pub async fn delete_permission(&self, id: i64) -> Result<(), DomainError> {
        if !self.access.delete_permission(id).await? {
            return Err(DomainError::not_found("Permission", id));
        }
        info!("Permission {} deleted", id);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------------

    pub async fn list_roles(&self) -> Result<Vec<Role>, DomainError> {
        self.access.list_roles().await
    }

    pub async fn create_role(&self, input: RoleInput) -> Result<Role, DomainError> {
        input.validate()?;
        let name = input.name.trim().to_string();
        if self.access.find_role_by_name(&name).await?.is_some() {
            return Err(DomainError::AlreadyExists(
                "Role with this name already exists".to_string(),
            ));
        }

        let permission_ids = dedup(input.permission_ids.unwrap_or_default());
        self.ensure_permissions_exist(&permission_ids).await?;

        let role = self.access.create_role(&name, permission_ids).await?;
        info!("Role {} created", role.name);
        Ok(role)
    }

    pub async fn update_role(&self, id: i64, input: RoleInput) -> Result<Role, DomainError> {
        input.validate()?;
        let name = input.name.trim().to_string();
        if let Some(existing) = self.access.find_role_by_name(&name).await? {
            if existing.id != id {
                return Err(DomainError::AlreadyExists(
                    "Role with this name already exists".to_string(),
                ));
            }
        }

        let permission_ids = input.permission_ids.map(dedup);
        if let Some(ids) = &permission_ids {
            self.ensure_permissions_exist(ids).await?;
        }

        self.access
            .update_role(id, &name, permission_ids)
            .await?
            .ok_or_else(|| DomainError::not_found("Role", id))
    }

    pub async fn delete_role(&self, id: i64) -> Result<(), DomainError> {
        if !self.access.delete_role(id).await? {
            return Err(DomainError::not_found("Role", id));
        }
        info!("Role {} deleted", id);
        Ok(())
    }

    /// Replace the roles held by `user_id`
    pub async fn assign_roles(
        &self,
        user_id: i64,
        assignment: RoleAssignment,
    ) -> Result<Vec<i64>, DomainError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        let role_ids = dedup(assignment.role_ids);
        let found = self.access.count_roles(role_ids.clone()).await?;
        if found != role_ids.len() as i64 {
            return Err(DomainError::ValidationError(
                "One or more role ids are invalid".to_string(),
            ));
        }

        self.access.set_user_roles(user_id, role_ids.clone()).await?;
        info!("User {} assigned roles {:?}", user_id, role_ids);
        Ok(role_ids)
    }

    async fn ensure_permissions_exist(&self, ids: &[i64]) -> Result<(), DomainError> {
        if ids.is_empty() {
            return Ok(());
        }
        let found = self.access.count_permissions(ids.to_vec()).await?;
        if found != ids.len() as i64 {
            return Err(DomainError::ValidationError(
                "One or more permission ids are invalid".to_string(),
            ));
        }
        Ok(())
    }
}

fn dedup(ids: Vec<i64>) -> Vec<i64> {
    ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::tests::sample_user;
    use crate::repositories::{MockAccessRepository, MockUserRepository};

    fn member(user_id: i64) -> Principal {
        Principal {
            user_id,
            role: "admin".to_string(),
            tenant_id: Some(1),
            is_superuser: false,
        }
    }

    fn service(access: MockAccessRepository) -> AccessService {
        AccessService::new(Arc::new(access), Arc::new(MockUserRepository::new()))
    }

    #[tokio::test]
    async fn test_superuser_bypasses_permission_checks() {
        let mut access = MockAccessRepository::new();
        access.expect_count_user_roles().never();

        let mut principal = member(1);
        principal.is_superuser = true;
        assert!(service(access).require_permission(&principal, "create_tenant").await.is_ok());
    }

    #[tokio::test]
    async fn test_user_without_role() {
        let mut access = MockAccessRepository::new();
        access.expect_count_user_roles().returning(|_| Ok(0));

        let err = service(access)
            .require_permission(&member(4), "list_tenant")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No role assigned");
    }

    #[tokio::test]
    async fn test_role_without_grant() {
        let mut access = MockAccessRepository::new();
        access.expect_count_user_roles().returning(|_| Ok(2));
        access
            .expect_user_has_permission()
            .withf(|user_id: &i64, code: &str| *user_id == 4 && code == "delete_tenant")
            .returning(|_, _| Ok(false));

        let err = service(access)
            .require_permission(&member(4), "delete_tenant")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied));
    }

    #[tokio::test]
    async fn test_role_with_grant() {
        let mut access = MockAccessRepository::new();
        access.expect_count_user_roles().returning(|_| Ok(1));
        access.expect_user_has_permission().returning(|_, _| Ok(true));

        assert!(service(access).require_permission(&member(4), "get_tenant").await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_permission_code() {
        let mut access = MockAccessRepository::new();
        access.expect_find_permission_by_code().returning(|code| {
            Ok(Some(Permission { id: 1, code: code.to_string(), description: None }))
        });
        access.expect_create_permission().never();

        let err = service(access)
            .create_permission(PermissionInput { code: "list_tenant".to_string(), description: None })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_create_role_rejects_unknown_permissions() {
        let mut access = MockAccessRepository::new();
        access.expect_find_role_by_name().returning(|_| Ok(None));
        access.expect_count_permissions().returning(|_| Ok(1));
        access.expect_create_role().never();

        let input = RoleInput { name: "billing".to_string(), permission_ids: Some(vec![1, 99]) };
        let err = service(access).create_role(input).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_create_role_deduplicates_permissions() {
        let mut access = MockAccessRepository::new();
        access.expect_find_role_by_name().returning(|_| Ok(None));
        access.expect_count_permissions().returning(|ids| Ok(ids.len() as i64));
        access
            .expect_create_role()
            .withf(|name: &str, ids: &Vec<i64>| name == "billing" && *ids == vec![1, 2])
            .returning(|name, _| Ok(Role { id: 3, name: name.to_string(), permissions: vec![] }));

        let input = RoleInput { name: " billing ".to_string(), permission_ids: Some(vec![2, 1, 2]) };
        let role = service(access).create_role(input).await.unwrap();
        assert_eq!(role.id, 3);
    }

    #[tokio::test]
    async fn test_update_missing_role() {
        let mut access = MockAccessRepository::new();
        access.expect_find_role_by_name().returning(|_| Ok(None));
        access.expect_update_role().returning(|_, _, _| Ok(None));

        let input = RoleInput { name: "billing".to_string(), permission_ids: None };
        let err = service(access).update_role(8, input).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Role", .. }));
    }

    #[tokio::test]
    async fn test_assign_roles() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| Ok(Some(sample_user(id))));

        let mut access = MockAccessRepository::new();
        access.expect_count_roles().returning(|ids| Ok(ids.len() as i64));
        access
            .expect_set_user_roles()
            .withf(|user_id: &i64, ids: &Vec<i64>| *user_id == 7 && *ids == vec![1, 4])
            .times(1)
            .returning(|_, _| Ok(()));

        let service = AccessService::new(Arc::new(access), Arc::new(users));
        let roles = service
            .assign_roles(7, RoleAssignment { role_ids: vec![4, 1] })
            .await
            .unwrap();
        assert_eq!(roles, vec![1, 4]);
    }
}
