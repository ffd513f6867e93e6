// Mapping of application errors to HTTP responses
use crate::domain::filter::FilterError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unknown view {0}")]
    UnknownView(String),
    #[error(transparent)]
    InvalidFilter(#[from] FilterError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownView(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidFilter(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_client_error() {
            tracing::debug!("Rejecting request: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
