//! Protocol-level errors returned by connector handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ndc_schema::{DecodeError, ErrorResponse, NarrowingError};
use serde_json::{json, Value};
use thiserror::Error;

use crate::utils::ValueError;

/// Error classes of the NDC protocol. Each carries a human readable message
/// and free-form JSON details.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("bad request: {message}")]
    BadRequest { message: String, details: Value },

    #[error("unprocessable content: {message}")]
    UnprocessableContent { message: String, details: Value },

    #[error("not supported: {message}")]
    NotSupported { message: String, details: Value },

    #[error("conflict: {message}")]
    Conflict { message: String, details: Value },

    #[error("internal error: {message}")]
    Internal { message: String, details: Value },
}

impl ConnectorError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        ConnectorError::BadRequest {
            message: message.into(),
            details,
        }
    }

    /// A bad request whose details hold `{"cause": <cause>}`.
    pub fn bad_request_with_cause(message: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::bad_request(message, json!({ "cause": cause.to_string() }))
    }

    pub fn unprocessable_content(message: impl Into<String>, details: Value) -> Self {
        ConnectorError::UnprocessableContent {
            message: message.into(),
            details,
        }
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        ConnectorError::NotSupported {
            message: message.into(),
            details: Value::Null,
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        ConnectorError::Conflict {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        ConnectorError::Internal {
            message: message.into(),
            details,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ConnectorError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ConnectorError::UnprocessableContent { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ConnectorError::NotSupported { .. } => StatusCode::NOT_IMPLEMENTED,
            ConnectorError::Conflict { .. } => StatusCode::CONFLICT,
            ConnectorError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ConnectorError::BadRequest { message, .. }
            | ConnectorError::UnprocessableContent { message, .. }
            | ConnectorError::NotSupported { message, .. }
            | ConnectorError::Conflict { message, .. }
            | ConnectorError::Internal { message, .. } => message,
        }
    }

    pub fn details(&self) -> &Value {
        match self {
            ConnectorError::BadRequest { details, .. }
            | ConnectorError::UnprocessableContent { details, .. }
            | ConnectorError::NotSupported { details, .. }
            | ConnectorError::Conflict { details, .. }
            | ConnectorError::Internal { details, .. } => details,
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            message: self.message().to_string(),
            details: self.details().clone(),
        }
    }
}

impl IntoResponse for ConnectorError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("{}", self);
        }
        (status, Json(self.to_error_response())).into_response()
    }
}

impl From<DecodeError> for ConnectorError {
    fn from(e: DecodeError) -> Self {
        ConnectorError::bad_request_with_cause("failed to decode request", e)
    }
}

impl From<NarrowingError> for ConnectorError {
    fn from(e: NarrowingError) -> Self {
        ConnectorError::bad_request(
            e.to_string(),
            json!({ "expected": e.expected, "found": e.found }),
        )
    }
}

impl From<ValueError> for ConnectorError {
    fn from(e: ValueError) -> Self {
        ConnectorError::bad_request_with_cause("failed to resolve arguments", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ConnectorError::bad_request("x", Value::Null).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ConnectorError::unprocessable_content("x", Value::Null).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ConnectorError::not_supported("x").status(),
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(
            ConnectorError::conflict("x", Value::Null).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ConnectorError::internal("x", Value::Null).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_cause_details() {
        let err = ConnectorError::bad_request_with_cause("failed to resolve arguments", "Limit: field is required");
        assert_eq!(err.message(), "failed to resolve arguments");
        assert_eq!(err.details(), &json!({"cause": "Limit: field is required"}));
    }

    #[test]
    fn test_narrowing_error_is_bad_request() {
        let err: ConnectorError = NarrowingError {
            entity: "NestedField",
            expected: "array",
            found: "object",
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.details()["found"], "object");
    }

    #[test]
    fn test_error_response_body() {
        let body = ConnectorError::not_supported("query explain is not supported").to_error_response();
        assert_eq!(body.message, "query explain is not supported");
        assert_eq!(body.details, Value::Null);
    }
}
