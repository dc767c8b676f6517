//! Bearer-token middleware for the task routes.
//!
//! Extracts `Authorization: Bearer <token>`, verifies it, and stores a
//! [`Caller`] in request extensions for downstream handlers.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use shared::Role;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

/// Authenticated identity attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request)
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization token".into()))?;
    let claims = state.jwt.verify(&token)?;
    request.extensions_mut().insert(Caller {
        id: claims.sub,
        role: claims.role,
    });
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<String> {
    let header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    header
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_auth(value: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/api/tasks");
        if let Some(v) = value {
            builder = builder.header(axum::http::header::AUTHORIZATION, v);
        }
        builder.body(axum::body::Body::empty()).unwrap()
    }

    #[test]
    fn extracts_bearer_token() {
        let req = request_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&req).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_header_is_none() {
        assert_eq!(bearer_token(&request_with_auth(None)), None);
    }

    #[test]
    fn non_bearer_scheme_is_none() {
        let req = request_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&req), None);
    }

    #[test]
    fn empty_bearer_is_none() {
        let req = request_with_auth(Some("Bearer "));
        assert_eq!(bearer_token(&req), None);
    }
}
