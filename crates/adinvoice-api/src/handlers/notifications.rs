//! Platform and tenant notifications

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use adinvoice_core::domain::{Notification, NotificationInput, NotificationView};

use crate::error::ApiError;
use crate::extract::{ApiJson, AuthUser};
use crate::response::{created, ok, ApiResponse, Message};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create/", post(create_notification))
        .route("/create/client-admin/", post(create_tenant_notification))
        .route("/list/", get(list_notifications))
        .route("/read/", post(mark_read))
}

#[derive(Debug, Deserialize)]
pub struct ReadRequest {
    pub notification_id: i64,
}

/// POST /api/notifications/create/ (superuser, global)
pub async fn create_notification(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(input): ApiJson<NotificationInput>,
) -> Result<(StatusCode, Json<ApiResponse<Notification>>), ApiError> {
    state.access.require_superuser(&principal)?;
    Ok(created(state.notifications.create_global(input).await?))
}

pub async fn create_tenant_notification(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(input): ApiJson<NotificationInput>,
) -> Result<(StatusCode, Json<ApiResponse<Notification>>), ApiError> {
    Ok(created(
        state.notifications.create_for_tenant(&principal, input).await?,
    ))
}

pub async fn list_notifications(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<ApiResponse<Vec<NotificationView>>>, ApiError> {
    Ok(ok(state.notifications.list(&principal).await?))
}

pub async fn mark_read(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(request): ApiJson<ReadRequest>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    state
        .notifications
        .mark_read(&principal, request.notification_id)
        .await?;
    Ok(Json(ApiResponse::message("Notification marked as read")))
}
