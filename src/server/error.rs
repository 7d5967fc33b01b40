//! HTTP error responses for the query surface

use crate::{RegionError, WilayahError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors a query handler can answer with
#[derive(Debug, Error)]
pub enum ApiError {
    /// The path carried a code that is not valid for the collection
    #[error("Bad request: {0}")]
    BadRequest(#[source] RegionError),

    /// Every resolution tier failed
    #[error("Service unavailable")]
    Unavailable,
}

impl ApiError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<WilayahError> for ApiError {
    fn from(err: WilayahError) -> Self {
        match err {
            WilayahError::Region(e) => Self::BadRequest(e),
            _ => Self::Unavailable,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Self::BadRequest(e) => json!({ "error": e.to_string() }),
            Self::Unavailable => json!({ "error": "Service unavailable" }),
        };

        (status, Json(body)).into_response()
    }
}
