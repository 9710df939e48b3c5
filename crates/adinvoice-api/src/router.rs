// ============================================================================
// AdInvoice API - Router
// File: crates/adinvoice-api/src/router.rs
// ============================================================================

use std::any::Any;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::{error, warn};

use crate::error::ApiError;
use crate::handlers::{
    analytics, clients, enquiries, health, invoices, notifications, products, proposals,
    receipts, support, tenants, trash, users,
};
use crate::state::AppState;

/// Assemble every route under `/api` plus the health probes.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.app.cors_origin.as_deref());
    let timeout = Duration::from_secs(state.config.app.request_timeout_seconds.max(1));

    let api = Router::new()
        .nest("/tenants", tenants::router())
        .nest("/users", users::router())
        .nest("/clients", clients::router())
        .nest("/products", products::router())
        .nest("/proposal", proposals::router())
        .nest("/invoices", invoices::router())
        .nest("/receipts", receipts::router())
        .nest("/trash", trash::router())
        .nest("/notifications", notifications::router())
        .merge(support::router())
        .merge(enquiries::router())
        .merge(analytics::router());

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .nest("/api", api)
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}

/// Single configured origin, or any origin when none is set
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let Some(origin) = origin.map(str::trim).filter(|o| !o.is_empty()) else {
        return CorsLayer::permissive();
    };

    match origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        Err(_) => {
            warn!("Ignoring invalid CORS origin {:?}; cross-origin requests refused", origin);
            CorsLayer::new()
        }
    }
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {}", detail);
    ApiError::InternalError("Internal server error".to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let app = build_router(testing::state());
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn json_request(method: Method, uri: &str, auth: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(get_request("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let (status, body) = send(get_request("/api/notifications/list/", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        assert_eq!(
            body["error"]["message"],
            "Authentication credentials were not provided"
        );
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let (status, body) =
            send(get_request("/api/notifications/list/", Some("Bearer not.a.jwt"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Invalid or expired token");

        let (status, _) = send(get_request("/api/notifications/list/", Some("Token abc"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_signin_requires_credentials() {
        let (status, body) =
            send(json_request(Method::POST, "/api/users/signin/", None, "{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_malformed_json_uses_envelope() {
        let (status, body) =
            send(json_request(Method::POST, "/api/users/signin/", None, "{\"email\":")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_enquiry_rejects_invalid_email() {
        let payload = r#"{
            "name": "Meera",
            "email": "not-an-email",
            "mobile": "9876543210",
            "subject": "Pricing",
            "message": "Do you support GST invoices?"
        }"#;
        let (status, body) =
            send(json_request(Method::POST, "/api/enquiries/create/", None, payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_support_reports_need_superuser() {
        let state = testing::state();
        let auth = testing::bearer(&state, Some(1), false);
        let (status, body) =
            send(get_request("/api/superadmin/support-reports/", Some(&auth))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn test_cross_tenant_request_is_forbidden() {
        let state = testing::state();
        let auth = testing::bearer(&state, Some(1), false);
        let (status, _) = send(get_request("/api/trash/all/?tenant=2", Some(&auth))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) =
            send(json_request(Method::POST, "/api/proposal/list/", Some(&auth), r#"{"tenant": "2"}"#))
                .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_missing_tenant_is_bad_request() {
        let state = testing::state();
        let auth = testing::bearer(&state, Some(1), false);
        let (status, _) = send(get_request("/api/trash/all/", Some(&auth))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send(json_request(Method::POST, "/api/invoices/list/", Some(&auth), "{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_global_notification_validates_message() {
        let state = testing::state();
        let auth = testing::bearer(&state, None, true);
        let (status, _) = send(json_request(
            Method::POST,
            "/api/notifications/create/",
            Some(&auth),
            r#"{"message": ""}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_support_ticket_needs_tenant() {
        let state = testing::state();
        let auth = testing::bearer(&state, None, true);
        let (status, _) = send(json_request(
            Method::POST,
            "/api/support/create/",
            Some(&auth),
            r#"{"subject": "Export broken", "description": "PDF export fails"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_path_id_is_bad_request() {
        let state = testing::state();
        let auth = testing::bearer(&state, Some(1), false);
        let (status, body) =
            send(get_request("/api/proposal/not-a-uuid/items/?tenant=1", Some(&auth))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[test]
    fn test_cors_layer_accepts_any_config() {
        let _ = cors_layer(None);
        let _ = cors_layer(Some("http://localhost:5173"));
        let _ = cors_layer(Some("bad\norigin"));
    }
}
