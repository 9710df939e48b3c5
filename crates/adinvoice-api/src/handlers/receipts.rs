//! Receipts. Every write re-derives the paid amount of the linked invoice.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, post, put},
    Json, Router,
};
use uuid::Uuid;

use adinvoice_core::domain::{Receipt, ReceiptInput, ReceiptStats};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser, TenantBody, TenantOnly, TenantQuery};
use crate::response::{created, ok, ApiResponse, Message};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create/", post(create_receipt))
        .route("/list/", post(list_receipts))
        .route("/stats/", post(receipt_stats))
        .route("/{id}/", post(get_receipt))
        .route("/{id}/update/", put(update_receipt).patch(update_receipt))
        .route("/{id}/delete/", delete(delete_receipt))
}

pub async fn create_receipt(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<TenantBody<ReceiptInput>>,
) -> Result<(StatusCode, Json<ApiResponse<Receipt>>), ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(created(state.receipts.create(&ctx, body.payload).await?))
}

pub async fn list_receipts(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<TenantBody<TenantOnly>>,
) -> Result<Json<ApiResponse<Vec<Receipt>>>, ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(ok(state.receipts.list(&ctx).await?))
}

pub async fn receipt_stats(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<TenantBody<TenantOnly>>,
) -> Result<Json<ApiResponse<ReceiptStats>>, ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(ok(state.receipts.stats(&ctx).await?))
}

pub async fn get_receipt(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<TenantBody<TenantOnly>>,
) -> Result<Json<ApiResponse<Receipt>>, ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(ok(state.receipts.get(&ctx, id).await?))
}

pub async fn update_receipt(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<TenantBody<ReceiptInput>>,
) -> Result<Json<ApiResponse<Receipt>>, ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(ok(state.receipts.update(&ctx, id, body.payload).await?))
}

pub async fn delete_receipt(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<TenantQuery>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    let ctx = state.tenant_context(&principal, query.tenant).await?;
    state.receipts.trash(&ctx, id).await?;
    Ok(Json(ApiResponse::message("Receipt moved to trash")))
}
