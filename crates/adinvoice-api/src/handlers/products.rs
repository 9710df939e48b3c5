//! Products, services and their categories

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};

use adinvoice_core::domain::{Category, NewCategory, ProductInput, ProductService};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, AuthUser, TenantBody, TenantOnly, TenantQuery};
use crate::response::{created, ok, ApiResponse, Message};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories/", get(list_categories))
        .route("/categories/create/", post(create_category))
        .route("/create/", post(create_product))
        .route("/my/", post(list_products))
        .route("/{id}/update/", put(update_product).patch(update_product))
        .route("/{id}/delete/", delete(delete_product))
}

pub async fn list_categories(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiQuery(query): ApiQuery<TenantQuery>,
) -> Result<Json<ApiResponse<Vec<Category>>>, ApiError> {
    let ctx = state.tenant_context(&principal, query.tenant).await?;
    Ok(ok(state.catalog.list_categories(&ctx).await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<TenantBody<NewCategory>>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>), ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(created(state.catalog.create_category(&ctx, body.payload).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<TenantBody<ProductInput>>,
) -> Result<(StatusCode, Json<ApiResponse<ProductService>>), ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(created(state.catalog.create_product(&ctx, body.payload).await?))
}

/// POST /api/products/my/ lists the tenant's catalog
pub async fn list_products(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiJson(body): ApiJson<TenantBody<TenantOnly>>,
) -> Result<Json<ApiResponse<Vec<ProductService>>>, ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(ok(state.catalog.list_products(&ctx).await?))
}

pub async fn update_product(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<TenantBody<ProductInput>>,
) -> Result<Json<ApiResponse<ProductService>>, ApiError> {
    let ctx = state.tenant_context(&principal, body.tenant).await?;
    Ok(ok(state.catalog.update_product(&ctx, id, body.payload).await?))
}

pub async fn delete_product(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<TenantQuery>,
) -> Result<Json<ApiResponse<Message>>, ApiError> {
    let ctx = state.tenant_context(&principal, query.tenant).await?;
    state.catalog.delete_product(&ctx, id).await?;
    Ok(Json(ApiResponse::message("Product/Service deleted")))
}
