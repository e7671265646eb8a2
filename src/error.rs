//! Error taxonomy for the API surface.
//!
//! Every handler failure collapses into [`ApiError`], which renders the
//! same JSON envelope the original handlers produced:
//! `{ "error": ... }` for client mistakes and
//! `{ "error": ..., "message": ... }` when an upstream call rejected.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::blob::BlobError;
use crate::notion::NotionError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed request input (400)
    #[error("{0}")]
    BadRequest(String),
    /// Requested record or attachment does not exist (404)
    #[error("{0}")]
    NotFound(String),
    /// Path is known but the method is not registered (405)
    #[error("Method not allowed")]
    MethodNotAllowed,
    /// An upstream SDK call rejected (500)
    #[error("{error}: {message}")]
    Upstream { error: String, message: String },
    /// A file download from an upstream URL failed (502)
    #[error("{error}: {message}")]
    BadGateway { error: String, message: String },
}

impl ApiError {
    /// Replace the generic upstream label with the endpoint-specific one
    /// (e.g. "Failed to fetch posts") while keeping the upstream message.
    pub fn with_label(self, label: &str) -> Self {
        match self {
            ApiError::Upstream { message, .. } => ApiError::Upstream {
                error: label.to_string(),
                message,
            },
            ApiError::BadGateway { message, .. } => ApiError::BadGateway {
                error: label.to_string(),
                message,
            },
            other => other,
        }
    }

    pub fn bad_gateway(label: &str, message: impl std::fmt::Display) -> Self {
        ApiError::BadGateway {
            error: label.to_string(),
            message: message.to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<NotionError> for ApiError {
    fn from(err: NotionError) -> Self {
        match err {
            NotionError::NotFound(what) => {
                ApiError::NotFound(format!("Not found: {}", what))
            }
            other => ApiError::Upstream {
                error: "Notion API error".to_string(),
                message: other.to_string(),
            },
        }
    }
}

impl From<BlobError> for ApiError {
    fn from(err: BlobError) -> Self {
        ApiError::Upstream {
            error: "Blob upload failed".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for ApiError {
    fn from(err: zip::result::ZipError) -> Self {
        ApiError::BadRequest(format!("Invalid zip archive: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => {
                json!({ "error": msg })
            }
            ApiError::MethodNotAllowed => json!({ "error": "Method not allowed" }),
            ApiError::Upstream { error, message }
            | ApiError::BadGateway { error, message } => {
                json!({ "error": error, "message": message })
            }
        };

        if status.is_server_error() {
            log::error!("{} {}", status.as_u16(), self);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_label_rewrites_upstream_only() {
        let err = ApiError::Upstream {
            error: "Notion API error".to_string(),
            message: "database not shared".to_string(),
        };
        match err.with_label("Failed to fetch posts") {
            ApiError::Upstream { error, message } => {
                assert_eq!(error, "Failed to fetch posts");
                assert_eq!(message, "database not shared");
            }
            other => panic!("unexpected variant: {:?}", other),
        }

        let err = ApiError::BadRequest("pageId is required".to_string());
        match err.with_label("Failed to fetch posts") {
            ApiError::BadRequest(msg) => assert_eq!(msg, "pageId is required"),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::BadRequest(String::new()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound(String::new()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
