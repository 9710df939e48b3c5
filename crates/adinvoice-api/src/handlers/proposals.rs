// ============================================================================
// AdInvoice API - Proposal Handlers
// File: crates/adinvoice-api/src/handlers/proposals.rs
// ============================================================================
//! Proposals (quotes). Detail, list and stats are POSTs carrying the tenant
//! in the body; item listing and deletion read `?tenant=`.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use adinvoice_core::domain::{
    Proposal, ProposalInput, ProposalItem, ProposalStats, ProposalSummary,
};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser, TenantBody, TenantOnly, TenantQuery};
use crate::response::{created, ok, ApiResponse, Message};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create/", post(create_proposal))
        .route("/list/", post(list_proposals))
        .route("/stats/", post(proposal_stats))
        .route("/client/{client_id}/", get(list_client_proposals))
        .route("/{id}/", post(get_proposal))
        .route("/{id}/items/", get(proposal_items))
        .route("/{id}/update/", put(update_proposal).patch(update_proposal))
        .route("/{id}/delete/", delete(delete_proposal))
        .route("/{id}/status/", post(set_proposal_status))
}

/// Body of the `status/` routes shared by proposals and invoices
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: String,
}

pub async fn create_proposal(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<TenantBody<ProposalInput>>,
) -> Result<(StatusCode, Json<ApiResponse<Proposal>>), ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(created(state.proposals.create(&ctx, body.payload).await?))
}

pub async fn list_proposals(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<TenantBody<TenantOnly>>,
) -> Result<Json<ApiResponse<Vec<ProposalSummary>>>, ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(ok(state.proposals.list(&ctx).await?))
}

pub async fn proposal_stats(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<TenantBody<TenantOnly>>,
) -> Result<Json<ApiResponse<ProposalStats>>, ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(ok(state.proposals.stats(&ctx).await?))
}

pub async fn list_client_proposals(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(client_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<TenantQuery>,
) -> Result<Json<ApiResponse<Vec<ProposalSummary>>>, ApiError> {
    let ctx = state.tenant_context(&principal, query.tenant).await?;
    Ok(ok(state.proposals.list_for_client(&ctx, client_id).await?))
}

pub async fn get_proposal(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<TenantBody<TenantOnly>>,
) -> Result<Json<ApiResponse<Proposal>>, ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(ok(state.proposals.get(&ctx, id).await?))
}

pub async fn proposal_items(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<TenantQuery>,
) -> Result<Json<ApiResponse<Vec<ProposalItem>>>, ApiError> {
    let ctx = state.tenant_context(&principal, query.tenant).await?;
    Ok(ok(state.proposals.items(&ctx, id).await?))
}

pub async fn update_proposal(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<TenantBody<ProposalInput>>,
) -> Result<Json<ApiResponse<Proposal>>, ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(ok(state.proposals.update(&ctx, id, body.payload).await?))
}

/// Soft delete; the proposal moves to the trash
pub async fn delete_proposal(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<TenantQuery>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    let ctx = state.tenant_context(&principal, query.tenant).await?;
    state.proposals.trash(&ctx, id).await?;
    Ok(Json(ApiResponse::message("Proposal moved to trash")))
}

pub async fn set_proposal_status(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<TenantBody<StatusRequest>>,
) -> Result<Json<ApiResponse<Proposal>>, ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(ok(state.proposals.set_status(&ctx, id, &body.payload.status).await?))
}
