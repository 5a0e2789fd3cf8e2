//! Role gates, rate limits and response headers on the full router.
//!
//! Every request here is answered before the database is touched.

#![allow(clippy::unwrap_used)]

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use gamehub_integration_tests::test_app;

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", "203.0.113.7")
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-forwarded-for", "203.0.113.7")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::empty())
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &axum::response::Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn test_health() {
    let response = test_app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let response = test_app().oneshot(get("/health/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let response = test_app().oneshot(get("/health")).await.unwrap();
    let headers = response.headers();

    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert!(headers.contains_key("content-security-policy"));
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_signed_in_pages_redirect_anonymous_visitors() {
    for uri in [
        "/cart",
        "/checkout",
        "/sell/requests",
        "/checker",
        "/admin",
    ] {
        let response = test_app().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), Some("/auth/login"), "{uri}");
    }
}

#[tokio::test]
async fn test_notice_polling_is_unauthorized_for_anonymous_visitors() {
    let response = test_app()
        .oneshot(get("/api/sell-requests/notices"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(location(&response), None);
}

#[tokio::test]
async fn test_anonymous_reveal_is_refused() {
    let uri = "/checker/requests/00000000-0000-0000-0000-000000000000/reveal";
    let response = test_app().oneshot(post(uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/auth/login"));
}

#[tokio::test]
async fn test_anonymous_cart_count_is_zero() {
    let response = test_app().oneshot(get("/cart/count")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(">0<"));
}

#[tokio::test]
async fn test_login_page_renders() {
    let response = test_app().oneshot(get("/auth/login")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("<form"));
}

#[tokio::test]
async fn test_auth_routes_are_rate_limited() {
    let app = test_app();
    let mut statuses = Vec::new();
    for _ in 0..8 {
        let response = app.clone().oneshot(get("/auth/login")).await.unwrap();
        statuses.push(response.status());
    }

    assert_eq!(statuses.first(), Some(&StatusCode::OK));
    assert!(statuses.contains(&StatusCode::TOO_MANY_REQUESTS));
}
