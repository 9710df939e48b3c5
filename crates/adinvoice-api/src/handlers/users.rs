// ============================================================================
// AdInvoice API - User Handlers
// File: crates/adinvoice-api/src/handlers/users.rs
// ============================================================================
//! Registration, sign-in, merchant approval and company details

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

use adinvoice_core::domain::{
    ApprovalOutcome, CompanyDetails, CompanyDetailsUpdate, NewApplication, UserSummary,
};
use adinvoice_core::services::SigninResult;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, AuthUser};
use crate::handlers::access;
use crate::response::{created, ok, ApiResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register/", post(register))
        .route("/signin/", post(signin))
        .route("/approve-entrepreneur/{id}/", put(approve_entrepreneur))
        .route("/own-company/", get(own_company))
        .route("/own-company/{id}/", get(company_by_id))
        .route("/own-company/update/", put(update_own_company))
        .route("/pending-users/", get(pending_users))
        .merge(access::router())
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    #[serde(default)]
    pub action: String,
}

/// POST /api/users/register/
pub async fn register(
    State(state): State<AppState>,
    ApiJson(application): ApiJson<NewApplication>,
) -> Result<(StatusCode, Json<ApiResponse<UserSummary>>), ApiError> {
    let user = state.auth.register(application).await?;
    Ok(created(user.into()))
}

/// POST /api/users/signin/
pub async fn signin(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SigninRequest>,
) -> Result<Json<ApiResponse<SigninResult>>, ApiError> {
    Ok(ok(state.auth.signin(&request.email, &request.password).await?))
}

/// PUT /api/users/approve-entrepreneur/{id}/
pub async fn approve_entrepreneur(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<ApprovalRequest>,
) -> Result<Json<ApiResponse<ApprovalOutcome>>, ApiError> {
    state.access.require_superuser(&principal)?;
    Ok(ok(state.auth.decide_application(id, &request.action).await?))
}

/// GET /api/users/own-company/
pub async fn own_company(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<ApiResponse<CompanyDetails>>, ApiError> {
    Ok(ok(state.auth.company_details(&principal, None).await?))
}

/// GET /api/users/own-company/{id}/
pub async fn company_by_id(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<CompanyDetails>>, ApiError> {
    Ok(ok(state.auth.company_details(&principal, Some(id)).await?))
}

/// PUT /api/users/own-company/update/
pub async fn update_own_company(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(update): ApiJson<CompanyDetailsUpdate>,
) -> Result<Json<ApiResponse<CompanyDetails>>, ApiError> {
    Ok(ok(state.auth.update_company_details(&principal, update).await?))
}

/// GET /api/users/pending-users/
pub async fn pending_users(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<ApiResponse<Vec<UserSummary>>>, ApiError> {
    state.access.require_superuser(&principal)?;
    Ok(ok(state.auth.pending_users().await?))
}
