// HTTP API Error Types
use serde_json::{json, Value};

use crate::database::DatabaseError;
use crate::secrets::SecretError;

/// Message returned in place of internal details when they are not exposed
pub const GENERIC_ERROR_DETAIL: &str = "An error occurred while processing your request";

/// Boundary error for the note handlers
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized,

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error; carries the underlying failure text
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized => 401,
            ApiError::NotFound(_) => 404,
            ApiError::InternalServerError(_) => 500,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized => "Unauthorized",
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::InternalServerError(detail) => json!({
                "error": "Internal server error",
                "message": detail,
            }),
            _ => json!({ "error": self.message() }),
        }
    }

    /// Replace internal failure text with a generic message
    pub fn redacted(self) -> Self {
        match self {
            ApiError::InternalServerError(_) => {
                ApiError::InternalServerError(GENERIC_ERROR_DETAIL.to_string())
            }
            other => other,
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized() -> Self {
        ApiError::Unauthorized
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::internal_server_error(err.to_string())
    }
}

impl From<SecretError> for ApiError {
    fn from(err: SecretError) -> Self {
        ApiError::internal_server_error(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bodies_match_contract() {
        assert_eq!(ApiError::unauthorized().to_json(), json!({ "error": "Unauthorized" }));
        assert_eq!(
            ApiError::bad_request("Title is required").to_json(),
            json!({ "error": "Title is required" })
        );
        assert_eq!(
            ApiError::not_found("Note not found").to_json(),
            json!({ "error": "Note not found" })
        );
        assert_eq!(
            ApiError::internal_server_error("boom").to_json(),
            json!({ "error": "Internal server error", "message": "boom" })
        );
    }

    #[test]
    fn status_codes() {
        assert_eq!(ApiError::unauthorized().status_code(), 401);
        assert_eq!(ApiError::bad_request("x").status_code(), 400);
        assert_eq!(ApiError::not_found("x").status_code(), 404);
        assert_eq!(ApiError::internal_server_error("x").status_code(), 500);
    }

    #[test]
    fn redaction_only_touches_internal_errors() {
        let redacted = ApiError::internal_server_error("password authentication failed").redacted();
        assert_eq!(redacted.message(), GENERIC_ERROR_DETAIL);

        let kept = ApiError::not_found("Note not found").redacted();
        assert_eq!(kept, ApiError::not_found("Note not found"));
    }

    #[test]
    fn collapses_component_errors() {
        let err: ApiError = DatabaseError::ConnectionTimeout.into();
        assert_eq!(err.status_code(), 500);
        assert!(err.message().contains("Connection timeout"));

        let err: ApiError = SecretError::NotConfigured("DB_SECRET_ARN").into();
        assert!(err.message().contains("DB_SECRET_ARN"));
    }
}
