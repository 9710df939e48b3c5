//! Roles and permissions (control database)

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: i64,
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PermissionInput {
    #[validate(length(min = 1, max = 100, message = "Permission code is required"))]
    pub code: String,
    #[validate(length(max = 255))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub permissions: Vec<Permission>,
}

/// Role create/update payload. On update, `permission_ids = None` keeps the
/// current grants.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RoleInput {
    #[validate(length(min = 1, max = 100, message = "Role name is required"))]
    pub name: String,
    #[serde(default, alias = "permissions")]
    pub permission_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleAssignment {
    #[serde(alias = "roles")]
    pub role_ids: Vec<i64>,
}

/// Permission codes guarding tenant administration
pub mod codes {
    pub const CREATE_TENANT: &str = "create_tenant";
    pub const LIST_TENANT: &str = "list_tenant";
    pub const GET_TENANT: &str = "get_tenant";
    pub const UPDATE_TENANT: &str = "update_tenant";
    pub const DELETE_TENANT: &str = "delete_tenant";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_input_accepts_permissions_alias() {
        let input: RoleInput =
            serde_json::from_str(r#"{"name": "billing", "permissions": [1, 2]}"#).unwrap();
        assert_eq!(input.permission_ids, Some(vec![1, 2]));

        let input: RoleInput = serde_json::from_str(r#"{"name": "billing"}"#).unwrap();
        assert!(input.permission_ids.is_none());
    }

    #[test]
    fn test_permission_code_required() {
        let input = PermissionInput { code: String::new(), description: None };
        assert!(input.validate().is_err());
    }
}
