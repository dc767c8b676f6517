use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Unified error type for every API handler.
///
/// Each variant maps to an HTTP status; the JSON body is always
/// `{"msg": "..."}`. `Forbidden` is deliberately distinct from
/// `NotFound` so a failed ownership check never masquerades as a
/// missing task.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Input data is invalid. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid credentials. HTTP 401.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not owner/admin. HTTP 403.
    #[error("{0}")]
    Forbidden(String),

    /// Resource does not exist. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Storage backend failure. HTTP 500.
    #[error("{0}")]
    Storage(String),

    /// Unexpected internal error. HTTP 500.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // 500s carry details in the log only, never in the response body.
        let msg = match &self {
            ApiError::Storage(detail) | ApiError::Internal(detail) => {
                tracing::error!("{}: {}", status, detail);
                "Server error".to_string()
            }
            other => other.to_string(),
        };
        let body = serde_json::json!({ "msg": msg });
        (status, axum::Json(body)).into_response()
    }
}

impl From<redis::RedisError> for ApiError {
    fn from(err: redis::RedisError) -> Self {
        ApiError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_mapping() {
        assert_eq!(ApiError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Storage("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::Internal("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn forbidden_is_not_not_found() {
        assert_ne!(
            ApiError::Forbidden("x".into()).status_code(),
            ApiError::NotFound("x".into()).status_code()
        );
    }

    #[test]
    fn display_is_just_the_message() {
        assert_eq!(ApiError::NotFound("Task not found".into()).to_string(), "Task not found");
        assert_eq!(ApiError::Forbidden("Not authorized".into()).to_string(), "Not authorized");
    }

    #[test]
    fn response_status_matches_variant() {
        let resp = ApiError::NotFound("Task not found".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
