//! HTTP mapping of store errors.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hpg_store::StoreError;
use serde_json::json;
use tracing::{error, warn};

/// Error returned by every API handler. The body is
/// `{"error": message, "kind": tag}`.
#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    /// A blocking task panicked or was cancelled.
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::AlreadyExists { .. }) => StatusCode::CONFLICT,
            Self::Store(StoreError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::OperationFailed { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(StoreError::Persistence { .. }) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Store(err) => err.kind(),
            Self::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Store(err) => err.to_string(),
            Self::Internal(msg) => msg.clone(),
        };
        if status.is_server_error() {
            error!(kind = self.kind(), error = %message, "request failed");
        } else {
            warn!(kind = self.kind(), error = %message, "request rejected");
        }
        let body = json!({ "error": message, "kind": self.kind() });
        (status, Json(body)).into_response()
    }
}
