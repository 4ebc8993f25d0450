// Integration tests for the file-serving endpoint

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use mcindex::core::error::{IndexError, Result};
use mcindex::http::{router, AppState, FileAccess, FileRecord};
use mcindex::core::types::MediaType;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt as TowerServiceExt;

use crate::common::fixtures::{ALIAS_FILE, API_KEY, NOTES_FILE, NOTES_TEXT, SCAN_FILE};
use crate::common::{create_test_env, research_store, write_file_bytes, TestEnv};

fn app() -> (Router, TestEnv) {
    let env = create_test_env(research_store());
    write_file_bytes(&env.content_root());
    (router(AppState::from_services(&env.services)), env)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

#[tokio::test]
async fn test_missing_apikey_is_unauthorized() {
    let (app, _env) = app();

    let response = app
        .oneshot(get(&format!("/datafiles/static/{NOTES_FILE}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn test_unknown_apikey_is_unauthorized() {
    let (app, _env) = app();

    let response = app
        .oneshot(get(&format!("/datafiles/static/{NOTES_FILE}?apikey=nope")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_serves_original_bytes_with_media_type() {
    let (app, _env) = app();

    let response = app
        .oneshot(get(&format!("/datafiles/static/{NOTES_FILE}?apikey={API_KEY}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    assert_eq!(body_bytes(response).await, NOTES_TEXT.as_bytes());
}

#[tokio::test]
async fn test_alias_serves_shared_bytes() {
    let (app, _env) = app();

    let response = app
        .oneshot(get(&format!("/datafiles/static/{ALIAS_FILE}?apikey={API_KEY}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, NOTES_TEXT.as_bytes());
}

#[tokio::test]
async fn test_convertible_image_serves_preview() {
    let (app, _env) = app();

    let response = app
        .oneshot(get(&format!("/datafiles/static/{SCAN_FILE}?apikey={API_KEY}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert!(body_bytes(response).await.starts_with(b"\xff\xd8"));
}

#[tokio::test]
async fn test_original_flag_serves_source_image() {
    let (app, _env) = app();

    let response = app
        .oneshot(get(&format!(
            "/datafiles/static/{SCAN_FILE}?apikey={API_KEY}&original=true"
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/tiff");
    assert!(body_bytes(response).await.starts_with(b"II*"));
}

#[tokio::test]
async fn test_unknown_file_is_not_found() {
    let (app, _env) = app();

    let response = app
        .oneshot(get(&format!("/datafiles/static/abc-zzzz-000?apikey={API_KEY}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_bytes_are_not_found() {
    let env = create_test_env(research_store());
    let app = router(AppState::from_services(&env.services));

    let response = app
        .oneshot(get(&format!("/datafiles/static/{NOTES_FILE}?apikey={API_KEY}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Access double that grants every key and returns one fixed record
struct GrantAll(FileRecord);

#[async_trait]
impl FileAccess for GrantAll {
    async fn get_file(&self, _apikey: &str, file_id: &str) -> Result<FileRecord> {
        if file_id == self.0.id {
            Ok(self.0.clone())
        } else {
            Err(IndexError::FileNotFound(file_id.to_string()))
        }
    }
}

#[tokio::test]
async fn test_unshardable_id_is_bad_request() {
    let env = create_test_env(research_store());
    let record = FileRecord {
        id: "nodashes".to_string(),
        name: "odd".to_string(),
        media_type: MediaType {
            mime: "text/plain".to_string(),
            ..MediaType::default()
        },
        uses_id: String::new(),
        size: 0,
    };
    let state = AppState::new(Arc::clone(&env.services.content), Arc::new(GrantAll(record)));

    let response = router(state)
        .oneshot(get("/datafiles/static/nodashes?apikey=any"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
