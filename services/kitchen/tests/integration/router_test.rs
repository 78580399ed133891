use axum::http::StatusCode;
use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::Value;

use larder_kitchen::router::build_router;
use larder_kitchen::state::AppState;
use larder_testing::auth::MockAuth;

/// Router over a disconnected database. Only paths that fail before touching storage
/// are exercised here.
fn server() -> TestServer {
    let state = AppState {
        db: DatabaseConnection::default(),
        cookie_domain: "larder.test".into(),
        invite_ttl_days: 7,
    };
    TestServer::new(build_router(state)).unwrap()
}

fn with_auth(
    mut request: axum_test::TestRequest,
    auth: &MockAuth,
) -> axum_test::TestRequest {
    for (name, value) in auth.headers().iter() {
        request = request.add_header(name.clone(), value.clone());
    }
    request
}

#[tokio::test]
async fn should_report_liveness_and_readiness() {
    let server = server();
    server.get("/healthz").await.assert_status_ok();
    server
        .get("/readyz")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn should_tag_responses_with_request_id() {
    let response = server().get("/healthz").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn should_reject_tenant_routes_without_identity() {
    let server = server();
    server
        .get("/recipes")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/inventory-items")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_require_household_selection_for_recipes() {
    let server = server();
    let response = with_auth(server.get("/recipes"), &MockAuth::new(1, 0)).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["kind"], "HOUSEHOLD_REQUIRED");
    assert_eq!(body["message"], "select a household first");
}

#[tokio::test]
async fn should_require_household_selection_for_inventory() {
    let server = server();
    let response = with_auth(server.get("/inventory-items/metadata"), &MockAuth::new(1, 0)).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn should_forbid_malformed_household_selector() {
    let server = server();
    let auth = MockAuth::new(1, 0).selecting("abc");
    let response = with_auth(server.get("/recipes"), &auth).await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INVALID_HOUSEHOLD_CONTEXT");
}

#[tokio::test]
async fn should_reject_malformed_query_string() {
    let server = server();
    let response = with_auth(server.get("/tags?limit=lots"), &MockAuth::new(1, 0)).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "MISSING_DATA");
}

#[tokio::test]
async fn should_validate_catalog_limit() {
    let server = server();
    let response = with_auth(server.get("/ingredients?limit=500"), &MockAuth::new(1, 0)).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert!(body["errors"]["limit"].is_array());
}
