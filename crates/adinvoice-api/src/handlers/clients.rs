//! Client companies of a tenant

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use uuid::Uuid;

use adinvoice_core::domain::{ClientCompany, ClientCompanyInput};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser, TenantBody, TenantOnly, TenantQuery};
use crate::response::{created, ok, ApiResponse, Message};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list/{tenant}/", get(list_clients))
        .route("/create/", post(create_client))
        .route("/update/{id}/", put(update_client))
        .route("/delete/{id}/", delete(delete_client))
        .route("/toggle-status/{id}/", patch(toggle_client_status))
}

/// GET /api/clients/list/{tenant}/
pub async fn list_clients(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(tenant): ApiPath<i64>,
) -> Result<Json<ApiResponse<Vec<ClientCompany>>>, ApiError> {
    let ctx = state.tenant_context(&principal, Some(tenant)).await?;
    Ok(ok(state.clients.list(&ctx).await?))
}

/// POST /api/clients/create/
pub async fn create_client(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<TenantBody<ClientCompanyInput>>,
) -> Result<(StatusCode, Json<ApiResponse<ClientCompany>>), ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(created(state.clients.create(&ctx, body.payload).await?))
}

/// PUT /api/clients/update/{id}/
pub async fn update_client(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<TenantBody<ClientCompanyInput>>,
) -> Result<Json<ApiResponse<ClientCompany>>, ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(ok(state.clients.update(&ctx, id, body.payload).await?))
}

/// DELETE /api/clients/delete/{id}/?tenant=
pub async fn delete_client(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<TenantQuery>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    let ctx = state.tenant_context(&principal, query.tenant).await?;
    state.clients.delete(&ctx, id).await?;
    Ok(Json(ApiResponse::message("Client company deleted")))
}

/// PATCH /api/clients/toggle-status/{id}/
pub async fn toggle_client_status(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<TenantBody<TenantOnly>>,
) -> Result<Json<ApiResponse<ClientCompany>>, ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(ok(state.clients.toggle_status(&ctx, id).await?))
}
