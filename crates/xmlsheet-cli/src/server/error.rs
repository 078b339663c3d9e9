//! API error types and handling.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use xmlsheet::XmlSheetError;

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Internal server error.
    Internal(String),
    /// Error from the xmlsheet library.
    XmlSheet(XmlSheetError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// Status code for a library error.
fn status_for(err: &XmlSheetError) -> StatusCode {
    match err {
        XmlSheetError::Fetch { .. } => StatusCode::BAD_GATEWAY,
        e if e.is_input_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
            ApiError::XmlSheet(e) => (status_for(&e), e.kind(), e.to_string()),
        };

        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

impl From<XmlSheetError> for ApiError {
    fn from(err: XmlSheetError) -> Self {
        ApiError::XmlSheet(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
            ApiError::XmlSheet(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&XmlSheetError::schema("no records")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&XmlSheetError::Validation("empty name".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&XmlSheetError::WrongExtension(PathBuf::from("a.txt"))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&XmlSheetError::Fetch {
                url: "http://x".into(),
                message: "404".into()
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&XmlSheetError::Persistence("disk full".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
