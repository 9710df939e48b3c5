//! Public contact enquiries

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};

use adinvoice_core::domain::{Enquiry, EnquiryInput, EnquiryStatusUpdate};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, AuthUser};
use crate::response::{created, ok, ApiResponse};
use crate::state::AppState;

/// Mounted under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/enquiries/", get(list_enquiries))
        .route("/enquiries/create/", post(create_enquiry))
        .route("/enquiries/{id}/", patch(update_enquiry))
}

/// POST /api/enquiries/create/ needs no token
pub async fn create_enquiry(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<EnquiryInput>,
) -> Result<(StatusCode, Json<ApiResponse<Enquiry>>), ApiError> {
    Ok(created(state.enquiries.create(input).await?))
}

pub async fn list_enquiries(
    State(state): State<AppState>,
    AuthUser(_principal): AuthUser,
) -> Result<Json<ApiResponse<Vec<Enquiry>>>, ApiError> {
    Ok(ok(state.enquiries.list().await?))
}

pub async fn update_enquiry(
    State(state): State<AppState>,
    AuthUser(_principal): AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<EnquiryStatusUpdate>,
) -> Result<Json<ApiResponse<Enquiry>>, ApiError> {
    Ok(ok(state.enquiries.set_status(id, update.status).await?))
}
