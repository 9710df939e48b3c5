//! Support tickets. Creation is open to tenant users, triage to superusers.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};

use adinvoice_core::domain::{SupportTicket, SupportTicketInput};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, AuthUser};
use crate::handlers::proposals::StatusRequest;
use crate::response::{created, ok, ApiResponse};
use crate::state::AppState;

/// Mounted under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/support/create/", post(create_ticket))
        .route("/superadmin/support-reports/", get(list_tickets))
        .route(
            "/superadmin/support-reports/{id}/update-status/",
            patch(update_ticket_status),
        )
}

pub async fn create_ticket(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(input): ApiJson<SupportTicketInput>,
) -> Result<(StatusCode, Json<ApiResponse<SupportTicket>>), ApiError> {
    Ok(created(state.support.create(&principal, input).await?))
}

pub async fn list_tickets(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<ApiResponse<Vec<SupportTicket>>>, ApiError> {
    state.access.require_superuser(&principal)?;
    Ok(ok(state.support.list().await?))
}

pub async fn update_ticket_status(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<StatusRequest>,
) -> Result<Json<ApiResponse<SupportTicket>>, ApiError> {
    state.access.require_superuser(&principal)?;
    Ok(ok(state.support.set_status(id, &request.status).await?))
}
