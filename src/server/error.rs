//! HTTP error responses
//!
//! Every failure leaves the server as `{"error": "..."}` with a status code
//! derived from the error's kind. Internal details are logged, never sent.

use crate::error::{ErrorKind, ImgToolsError};
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Standard error response structure
///
/// ```json
/// { "error": "Image file is required" }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

/// Error returned by handlers
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new<S: Into<String>>(status: StatusCode, message: S) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Translate a multipart parsing failure, keeping axum's status (e.g. 413)
    pub fn from_multipart(err: &MultipartError) -> Self {
        let status = err.status();
        let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
            "Upload is too large".to_string()
        } else {
            format!("Malformed upload: {}", err.body_text())
        };
        Self::new(status, message)
    }
}

/// HTTP status for an error kind
#[must_use]
pub fn status_for(err: &ImgToolsError) -> StatusCode {
    match err.kind() {
        ErrorKind::InvalidInput | ErrorKind::DecodeFailure => StatusCode::BAD_REQUEST,
        ErrorKind::UpstreamServiceFailure => StatusCode::BAD_GATEWAY,
        ErrorKind::InternalFailure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ImgToolsError> for ApiError {
    fn from(err: ImgToolsError) -> Self {
        match err.kind() {
            ErrorKind::InternalFailure => tracing::error!(error = %err, "request failed"),
            ErrorKind::UpstreamServiceFailure => tracing::warn!(error = %err, "upstream failure"),
            ErrorKind::InvalidInput | ErrorKind::DecodeFailure => {
                tracing::debug!(error = %err, "rejected request");
            },
        }
        Self::new(status_for(&err), err.user_message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&ImgToolsError::invalid_input("x")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ImgToolsError::invalid_background("x")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ImgToolsError::no_foreground("x")),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&ImgToolsError::service_unavailable("x")),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&ImgToolsError::internal("x")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let api: ApiError = ImgToolsError::internal("disk full at /var/tmp").into();
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message.contains("/var/tmp"));
    }
}
