// Integration tests for the health endpoint

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use mcindex::http::{router, AppState};
use serde_json::Value;
use tower::ServiceExt as TowerServiceExt;

use crate::common::{create_test_env, research_store};

#[tokio::test]
async fn test_health_reports_version() {
    let env = create_test_env(research_store());
    let app = router(AppState::from_services(&env.services));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let env = create_test_env(research_store());
    let app = router(AppState::from_services(&env.services));

    let response = app
        .oneshot(Request::builder().uri("/api/v1/search").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
