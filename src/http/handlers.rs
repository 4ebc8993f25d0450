//! HTTP request handlers
//!
//! Health check and authenticated file serving.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::io::ErrorKind;
use tokio_util::io::ReaderStream;

use super::state::AppState;
use crate::core::error::IndexError;
use crate::core::types::HealthResponse;

/// Health check handler
///
/// Returns server status and version information.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Query parameters of a file request
#[derive(Debug, Default, Deserialize)]
pub struct FileParams {
    #[serde(default)]
    pub apikey: String,
    /// Any non-empty value asks for the original bytes
    #[serde(default)]
    pub original: String,
}

/// Serve the bytes of a stored file
///
/// Convertible images are served as their JPEG preview unless
/// `original` is set.
///
/// # Errors
///
/// - `NoAccess` (401): missing or unknown API key
/// - `FileNotFound` (404): no such record, or bytes missing on disk
/// - `InvalidFileId` (400): identifier cannot be sharded
pub async fn serve_file_handler(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    Query(params): Query<FileParams>,
) -> Result<Response, IndexError> {
    if params.apikey.is_empty() {
        return Err(IndexError::NoAccess);
    }
    let want_original = !params.original.is_empty();

    let file = state.access.get_file(&params.apikey, &file_id).await?;
    let resolved = state.content.resolve_path(
        &file.id,
        &file.media_type.mime,
        &file.uses_id,
        want_original,
    )?;

    tracing::debug!(file_id = %file.id, path = ?resolved.path, "Serving file");

    let handle = tokio::fs::File::open(&resolved.path)
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => IndexError::FileNotFound(file.id.clone()),
            _ => IndexError::Io(e),
        })?;

    let body = Body::from_stream(ReaderStream::new(handle));
    Ok(([(header::CONTENT_TYPE, resolved.content_type)], body).into_response())
}
