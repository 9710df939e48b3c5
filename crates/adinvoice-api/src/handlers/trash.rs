//! Trash: trashed proposals, invoices and receipts of a tenant

use axum::{
    extract::State,
    routing::{delete, get, put},
    Json, Router,
};
use uuid::Uuid;

use adinvoice_core::domain::TrashedItem;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser, TenantBody, TenantOnly, TenantQuery};
use crate::response::{ok, ApiResponse, Message};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/all/", get(list_trash))
        .route("/{kind}/{id}/restore/", put(restore_item))
        .route("/{kind}/{id}/permanent-delete/", delete(purge_item))
}

pub async fn list_trash(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiQuery(query): ApiQuery<TenantQuery>,
) -> Result<Json<ApiResponse<Vec<TrashedItem>>>, ApiError> {
    let ctx = state.tenant_context(&principal, query.tenant).await?;
    Ok(ok(state.trash.list(&ctx).await?))
}

pub async fn restore_item(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath((kind, id)): ApiPath<(String, Uuid)>,
    ApiJson(body): ApiJson<TenantBody<TenantOnly>>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    let kind = state.trash.restore(&ctx, &kind, id).await?;
    Ok(Json(ApiResponse::message(format!("{} restored", kind.as_str()))))
}

/// Works on live items as well as trashed ones
pub async fn purge_item(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath((kind, id)): ApiPath<(String, Uuid)>,
    ApiQuery(query): ApiQuery<TenantQuery>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    let ctx = state.tenant_context(&principal, query.tenant).await?;
    let kind = state.trash.purge(&ctx, &kind, id).await?;
    Ok(Json(ApiResponse::message(format!(
        "{} permanently deleted",
        kind.as_str()
    ))))
}
