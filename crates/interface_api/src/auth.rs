//! Authentication and authorization

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ApiError;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject; recorded as the actor on every write
    pub sub: String,
    /// User's roles
    pub roles: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Missing permission: {0}")]
    MissingPermission(String),
}

/// Creates a new JWT token
pub fn create_token(
    user_id: &str,
    roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: user_id.to_string(),
        roles,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Checks if user has required role
pub fn has_role(claims: &Claims, required_role: &str) -> bool {
    claims
        .roles
        .iter()
        .any(|r| r == required_role || r == permissions::ADMIN)
}

/// Fails with `Forbidden` unless the caller holds `required_role`
pub fn require_role(claims: &Claims, required_role: &str) -> Result<(), ApiError> {
    if has_role(claims, required_role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            AuthError::MissingPermission(required_role.to_string()).to_string(),
        ))
    }
}

/// Permission definitions
pub mod permissions {
    pub const COMMISSION_READ: &str = "commission:read";
    pub const COMMISSION_WRITE: &str = "commission:write";
    pub const COMMISSION_PAY: &str = "commission:pay";
    pub const AGENT_WRITE: &str = "agent:write";
    pub const ADMIN: &str = "admin";
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_round_trip() {
        let token = create_token("finance@hq", vec!["commission:pay".to_string()], SECRET, 60).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, "finance@hq");
        assert!(has_role(&claims, permissions::COMMISSION_PAY));
        assert!(!has_role(&claims, permissions::AGENT_WRITE));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token("finance@hq", vec![], SECRET, 60).unwrap();
        assert!(matches!(validate_token(&token, "other"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_admin_implies_every_role() {
        let claims = Claims {
            sub: "root".to_string(),
            roles: vec![permissions::ADMIN.to_string()],
            exp: 0,
            iat: 0,
        };
        assert!(require_role(&claims, permissions::COMMISSION_PAY).is_ok());
    }
}
