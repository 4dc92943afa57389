use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use crate::pages;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("generator model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("invalid request: {0}")]
    BadRequest(String),
    #[error("model execution failed: {0}")]
    Inference(String),
    #[error("batch size mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("composite rendering failed: {0}")]
    Render(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("other: {0}")]
    Other(String),
}

impl From<image::ImageError> for ServiceError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(io) => ServiceError::Io(io),
            other => ServiceError::Render(other.to_string()),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match self {
            ServiceError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Inference(_)
            | ServiceError::ShapeMismatch { .. }
            | ServiceError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Internals stay in the log; the page only carries the status.
        tracing::error!(error = %self, %status, "request failed");

        (status, Html(pages::failure_page(status))).into_response()
    }
}
