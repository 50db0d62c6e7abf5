//! API error type.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use marine_core::error::CacheError;

/// Error returned by a handler.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// No snapshot has been committed or loaded yet.
    pub fn no_data() -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "Data not yet available, try again shortly".to_string(),
        }
    }
}

/// A read from the store only fails when there is nothing to serve.
impl From<CacheError> for ApiError {
    fn from(_: CacheError) -> Self {
        Self::no_data()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
            "has_data": false,
        });
        (self.status, axum::Json(body)).into_response()
    }
}
