//! Dashboard analytics

use axum::{extract::State, routing::get, Json, Router};

use adinvoice_core::domain::{PlatformAnalytics, TenantAnalytics};

use crate::error::ApiError;
use crate::extract::{ApiPath, AuthUser};
use crate::response::{ok, ApiResponse};
use crate::state::AppState;

/// Mounted under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/client-admin/analytics/{tenant}/", get(tenant_analytics))
        .route("/superadmin/analytics/", get(platform_analytics))
}

pub async fn tenant_analytics(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(tenant): ApiPath<i64>,
) -> Result<Json<ApiResponse<TenantAnalytics>>, ApiError> {
    let ctx = state.tenant_context(&principal, Some(tenant)).await?;
    Ok(ok(state.analytics.tenant(&ctx).await?))
}

pub async fn platform_analytics(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<ApiResponse<PlatformAnalytics>>, ApiError> {
    state.access.require_superuser(&principal)?;
    Ok(ok(state.analytics.platform().await?))
}
