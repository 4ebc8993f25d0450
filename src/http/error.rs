//! HTTP mapping for core errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::core::error::IndexError;

/// HTTP status code for an error
pub fn status_code(err: &IndexError) -> StatusCode {
    if err.is_unauthorized() {
        StatusCode::UNAUTHORIZED
    } else if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if err.is_bad_request() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Implement IntoResponse for automatic error conversion in Axum
impl IntoResponse for IndexError {
    fn into_response(self) -> Response {
        let status = status_code(&self);
        let body = Json(json!({
            "error": self.message(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
