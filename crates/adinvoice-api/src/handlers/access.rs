//! Permissions, roles and role assignment (mounted under `/api/users/`)

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;

use adinvoice_core::domain::{Permission, PermissionInput, Role, RoleAssignment, RoleInput};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, AuthUser};
use crate::response::{created, ok, ApiResponse, Message};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/permissions/", get(list_permissions).post(create_permission))
        .route("/permissions/{id}/", put(update_permission).delete(delete_permission))
        .route("/roles/", get(list_roles).post(create_role))
        .route("/roles/{id}/", put(update_role).delete(delete_role))
        .route("/{id}/roles/", put(assign_roles))
}

#[derive(Debug, Serialize)]
pub struct AssignedRoles {
    pub user_id: i64,
    pub role_ids: Vec<i64>,
}

pub async fn list_permissions(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<ApiResponse<Vec<Permission>>>, ApiError> {
    state.access.require_superuser(&principal)?;
    Ok(ok(state.access.list_permissions().await?))
}

pub async fn create_permission(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(input): ApiJson<PermissionInput>,
) -> Result<(StatusCode, Json<ApiResponse<Permission>>), ApiError> {
    state.access.require_superuser(&principal)?;
    Ok(created(state.access.create_permission(input).await?))
}

pub async fn update_permission(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<PermissionInput>,
) -> Result<Json<ApiResponse<Permission>>, ApiError> {
    state.access.require_superuser(&principal)?;
    Ok(ok(state.access.update_permission(id, input).await?))
}

pub async fn delete_permission(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    state.access.require_superuser(&principal)?;
    state.access.delete_permission(id).await?;
    Ok(Json(ApiResponse::message("Permission deleted")))
}

pub async fn list_roles(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<ApiResponse<Vec<Role>>>, ApiError> {
    state.access.require_superuser(&principal)?;
    Ok(ok(state.access.list_roles().await?))
}

pub async fn create_role(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(input): ApiJson<RoleInput>,
) -> Result<(StatusCode, Json<ApiResponse<Role>>), ApiError> {
    state.access.require_superuser(&principal)?;
    Ok(created(state.access.create_role(input).await?))
}

pub async fn update_role(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<RoleInput>,
) -> Result<Json<ApiResponse<Role>>, ApiError> {
    state.access.require_superuser(&principal)?;
    Ok(ok(state.access.update_role(id, input).await?))
}

pub async fn delete_role(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    state.access.require_superuser(&principal)?;
    state.access.delete_role(id).await?;
    Ok(Json(ApiResponse::message("Role deleted")))
}

/// PUT /api/users/{id}/roles/
pub async fn assign_roles(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(user_id): ApiPath<i64>,
    ApiJson(assignment): ApiJson<RoleAssignment>,
) -> Result<Json<ApiResponse<AssignedRoles>>, ApiError> {
    state.access.require_superuser(&principal)?;
    let role_ids = state.access.assign_roles(user_id, assignment).await?;
    Ok(ok(AssignedRoles { user_id, role_ids }))
}
