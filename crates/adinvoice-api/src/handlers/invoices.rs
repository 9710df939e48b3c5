//! Invoices

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, post, put},
    Json, Router,
};
use uuid::Uuid;

use adinvoice_core::domain::{Invoice, InvoiceInput, InvoiceStats, InvoiceSummary};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser, TenantBody, TenantOnly, TenantQuery};
use crate::handlers::proposals::StatusRequest;
use crate::response::{created, ok, ApiResponse, Message};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create/", post(create_invoice))
        .route("/list/", post(list_invoices))
        .route("/stats/", post(invoice_stats))
        .route("/{id}/", post(get_invoice))
        .route("/{id}/update/", put(update_invoice).patch(update_invoice))
        .route("/{id}/status/", post(set_invoice_status))
        .route("/{id}/delete/", delete(delete_invoice))
}

pub async fn create_invoice(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<TenantBody<InvoiceInput>>,
) -> Result<(StatusCode, Json<ApiResponse<Invoice>>), ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(created(state.invoices.create(&ctx, body.payload).await?))
}

pub async fn list_invoices(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<TenantBody<TenantOnly>>,
) -> Result<Json<ApiResponse<Vec<InvoiceSummary>>>, ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(ok(state.invoices.list(&ctx).await?))
}

pub async fn invoice_stats(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<TenantBody<TenantOnly>>,
) -> Result<Json<ApiResponse<InvoiceStats>>, ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(ok(state.invoices.stats(&ctx).await?))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<TenantBody<TenantOnly>>,
) -> Result<Json<ApiResponse<Invoice>>, ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(ok(state.invoices.get(&ctx, id).await?))
}

pub async fn update_invoice(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<TenantBody<InvoiceInput>>,
) -> Result<Json<ApiResponse<Invoice>>, ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(ok(state.invoices.update(&ctx, id, body.payload).await?))
}

pub async fn set_invoice_status(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<TenantBody<StatusRequest>>,
) -> Result<Json<ApiResponse<Invoice>>, ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(ok(state.invoices.set_status(&ctx, id, &body.payload.status).await?))
}

pub async fn delete_invoice(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<TenantQuery>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    let ctx = state.tenant_context(&principal, query.tenant).await?;
    state.invoices.trash(&ctx, id).await?;
    Ok(Json(ApiResponse::message("Invoice moved to trash")))
}
