// ============================================================================
// AdInvoice API - Request Extractors
// File: crates/adinvoice-api/src/extract.rs
// ============================================================================
//! Extractors shared by the handlers: JSON/path/query wrappers whose
//! rejections use the response envelope, the bearer-token principal and
//! the `tenant` selector carried in bodies and query strings.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use adinvoice_core::domain::Principal;
use adinvoice_security::JwtService;

use crate::error::ApiError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Caller authenticated by `Authorization: Bearer <token>`
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<JwtService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                ApiError::Unauthorized("Authentication credentials were not provided".to_string())
            })?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Invalid authorization header".to_string()))?;

        let jwt = Arc::<JwtService>::from_ref(state);
        let subject = jwt.validate_token(token).map_err(|e| {
            debug!("Rejected bearer token: {}", e);
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })?;

        Ok(AuthUser(subject.into()))
    }
}

/// Tenant ids arrive as numbers or as numeric strings
fn tenant_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(id)) => Ok(Some(id)),
        Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Raw::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid tenant id: {}", text))),
    }
}

/// `?tenant=` (or `tenant_id` / `tenantId`) on GET and DELETE routes
#[derive(Debug, Default, Deserialize)]
pub struct TenantQuery {
    #[serde(default, alias = "tenant_id", alias = "tenantId", deserialize_with = "tenant_id")]
    pub tenant: Option<i64>,
}

/// JSON body carrying the tenant next to the payload fields
#[derive(Debug, Deserialize)]
pub struct TenantBody<T> {
    #[serde(default, alias = "tenant_id", alias = "tenantId", deserialize_with = "tenant_id")]
    pub tenant: Option<i64>,
    #[serde(flatten)]
    pub payload: T,
}

/// Body of routes that carry nothing but the tenant
#[derive(Debug, Default, Deserialize)]
pub struct TenantOnly {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Named {
        name: String,
    }

    #[test]
    fn test_tenant_body_accepts_number_and_string() {
        let body: TenantBody<Named> =
            serde_json::from_str(r#"{"tenant": 4, "name": "Globex"}"#).unwrap();
        assert_eq!(body.tenant, Some(4));
        assert_eq!(body.payload.name, "Globex");

        let body: TenantBody<Named> =
            serde_json::from_str(r#"{"tenant_id": "12", "name": "Globex"}"#).unwrap();
        assert_eq!(body.tenant, Some(12));
    }

    #[test]
    fn test_tenant_body_without_tenant() {
        let body: TenantBody<Named> = serde_json::from_str(r#"{"name": "Globex"}"#).unwrap();
        assert_eq!(body.tenant, None);

        let body: TenantBody<TenantOnly> = serde_json::from_str("{}").unwrap();
        assert_eq!(body.tenant, None);
    }

    #[test]
    fn test_tenant_body_rejects_garbage() {
        assert!(serde_json::from_str::<TenantBody<TenantOnly>>(r#"{"tenant": "acme"}"#).is_err());
    }
}
