//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(hirehub_storage::StorageError),

    #[error("Firestore error: {0}")]
    Firestore(hirehub_firestore::FirestoreError),
}

/// Store failures with an HTTP meaning of their own translate to the matching
/// status; only opaque failures stay 500. Retryable store errors (server
/// errors, network failures, upstream rate limits) surface as 503 so clients
/// know the condition is transient.
impl From<hirehub_firestore::FirestoreError> for ApiError {
    fn from(err: hirehub_firestore::FirestoreError) -> Self {
        use hirehub_firestore::FirestoreError;
        match err {
            FirestoreError::NotFound(_) => ApiError::NotFound("Resource not found".to_string()),
            FirestoreError::AlreadyExists(_) => {
                ApiError::Duplicate("Resource already exists".to_string())
            }
            err if err.is_retryable() => ApiError::ServiceUnavailable(err.to_string()),
            err => ApiError::Firestore(err),
        }
    }
}

impl From<hirehub_storage::StorageError> for ApiError {
    fn from(err: hirehub_storage::StorageError) -> Self {
        use hirehub_storage::StorageError;
        match err {
            StorageError::NotFound(_) => ApiError::NotFound("Object not found".to_string()),
            StorageError::Timeout(msg) => ApiError::ServiceUnavailable(msg),
            StorageError::InvalidKey(msg) => ApiError::BadRequest(msg),
            err => ApiError::Storage(err),
        }
    }
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Duplicate(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) | ApiError::Duplicate(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) | ApiError::Storage(_) | ApiError::Firestore(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
    #[serde(rename = "isDuplicate", skip_serializing_if = "Option::is_none")]
    is_duplicate: Option<bool>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let message = match &self {
            ApiError::Internal(_) | ApiError::Storage(_) | ApiError::Firestore(_) => {
                if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
                    "An internal error occurred".to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            message,
            is_duplicate: matches!(self, ApiError::Duplicate(_)).then_some(true),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hirehub_firestore::FirestoreError;
    use hirehub_storage::StorageError;

    #[test]
    fn test_store_unavailable_surfaces_as_503() {
        let err: ApiError = FirestoreError::from_http_status(503, "unavailable").into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            err.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        let err: ApiError = FirestoreError::RateLimited(1000).into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_store_not_found_surfaces_as_404() {
        let err: ApiError = FirestoreError::not_found("job_posts/j-1").into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_store_conflict_surfaces_as_duplicate() {
        let err: ApiError = FirestoreError::from_http_status(409, "exists").into();
        assert!(matches!(err, ApiError::Duplicate(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_storage_timeout_surfaces_as_503() {
        let err: ApiError = StorageError::timeout("get resumes/x.pdf timed out").into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let err: ApiError = StorageError::not_found("resumes/x.pdf").into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_opaque_store_failure_stays_500() {
        let err: ApiError = FirestoreError::invalid_response("garbled").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_duplicate_is_bad_request_with_flag() {
        let err = ApiError::duplicate("You have already applied for this job");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let body = serde_json::json!({
            "message": err.to_string(),
            "isDuplicate": true,
        });
        assert_eq!(body["isDuplicate"], true);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::unauthorized("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::forbidden("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::RateLimited.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::ServiceUnavailable("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
