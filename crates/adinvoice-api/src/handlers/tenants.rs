// ============================================================================
// AdInvoice API - Tenant Handlers
// File: crates/adinvoice-api/src/handlers/tenants.rs
// ============================================================================
//! Tenant administration. Every route needs the matching tenant permission
//! code; superusers pass.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};

use adinvoice_core::domain::access::codes;
use adinvoice_core::domain::{NewTenant, Tenant, TenantDetails, TenantUpdate};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, AuthUser};
use crate::response::{created, ok, ApiResponse, Message};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create/", post(create_tenant))
        .route("/list/", get(list_tenants))
        .route("/{id}/", get(get_tenant))
        .route("/update/{id}/", put(update_tenant))
        .route("/delete/{id}/", delete(delete_tenant))
}

/// POST /api/tenants/create/
pub async fn create_tenant(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(input): ApiJson<NewTenant>,
) -> Result<(StatusCode, Json<ApiResponse<Tenant>>), ApiError> {
    state.access.require_permission(&principal, codes::CREATE_TENANT).await?;
    let tenant = state.tenants.create(input).await?;
    Ok(created(tenant))
}

/// GET /api/tenants/list/
pub async fn list_tenants(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<ApiResponse<Vec<TenantDetails>>>, ApiError> {
    state.access.require_permission(&principal, codes::LIST_TENANT).await?;
    Ok(ok(state.tenants.list().await?))
}

/// GET /api/tenants/{id}/
pub async fn get_tenant(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<TenantDetails>>, ApiError> {
    state.access.require_permission(&principal, codes::GET_TENANT).await?;
    Ok(ok(state.tenants.get(id).await?))
}

/// PUT /api/tenants/update/{id}/
pub async fn update_tenant(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<TenantUpdate>,
) -> Result<Json<ApiResponse<Tenant>>, ApiError> {
    state.access.require_permission(&principal, codes::UPDATE_TENANT).await?;
    Ok(ok(state.tenants.update(id, update).await?))
}

/// DELETE /api/tenants/delete/{id}/
pub async fn delete_tenant(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    state.access.require_permission(&principal, codes::DELETE_TENANT).await?;
    let tenant = state.tenants.delete(id).await?;
    Ok(Json(ApiResponse::message(format!(
        "Tenant '{}' and its database deleted",
        tenant.name
    ))))
}
