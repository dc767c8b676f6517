//! Bearer token issuing and verification (HS256).

use serde::{Deserialize, Serialize};
use shared::Role;
use uuid::Uuid;

use crate::error::ApiError;

/// What's inside a token. The task API consumes only `sub` + `role`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: Uuid,
    /// Display name, echoed back to the client on login.
    pub username: String,
    pub role: Role,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: jsonwebtoken::EncodingKey,
    decoding_key: jsonwebtoken::DecodingKey,
    validation: jsonwebtoken::Validation,
    expire_secs: i64,
}

impl JwtService {
    pub fn new(secret: &str, expire_secs: i64) -> Self {
        Self {
            encoding_key: jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: jsonwebtoken::DecodingKey::from_secret(secret.as_bytes()),
            validation: jsonwebtoken::Validation::default(),
            expire_secs,
        }
    }

    /// Issue a signed token for a user.
    pub fn issue(&self, user_id: Uuid, username: &str, role: Role) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            role,
            iat: now,
            exp: now + self.expire_secs,
        };
        jsonwebtoken::encode(&jsonwebtoken::Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("jwt encode: {}", e)))
    }

    /// Verify a token and extract its claims. Fails on invalid signature,
    /// expiry, or tampering.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| ApiError::Unauthorized(format!("invalid token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test-secret", 3600)
    }

    #[test]
    fn issue_and_verify() {
        let svc = service();
        let id = Uuid::new_v4();
        let token = svc.issue(id, "alice", Role::Admin).unwrap();
        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn garbage_token_rejected() {
        assert!(service().verify("invalid.token.here").is_err());
    }

    #[test]
    fn wrong_secret_rejected() {
        let issuer = JwtService::new("secret-a", 3600);
        let verifier = JwtService::new("secret-b", 3600);
        let token = issuer.issue(Uuid::new_v4(), "alice", Role::User).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn expired_token_rejected() {
        let svc = JwtService::new("test-secret", -120);
        let token = svc.issue(Uuid::new_v4(), "alice", Role::User).unwrap();
        assert!(svc.verify(&token).is_err());
    }
}
