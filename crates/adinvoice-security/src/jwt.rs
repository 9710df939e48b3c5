//! JWT token handling

use adinvoice_shared::constants::TOKEN_TYPE_ACCESS;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token validation failed: {0}")]
    ValidationError(String),
    #[error("Token expired")]
    TokenExpired,
}

/// Identity carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: i64,
    pub role: String,
    pub tenant_id: Option<i64>,
    pub is_superuser: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub tenant: Option<i64>,
    pub su: bool,
    pub iat: i64,
    pub exp: i64,
    pub token_type: String,
}

impl Claims {
    pub fn subject(&self) -> Result<TokenSubject, JwtError> {
        let user_id = self
            .sub
            .parse::<i64>()
            .map_err(|_| JwtError::ValidationError("malformed subject".to_string()))?;
        Ok(TokenSubject {
            user_id,
            role: self.role.clone(),
            tenant_id: self.tenant,
            is_superuser: self.su,
        })
    }
}

pub struct JwtService {
    secret: String,
    access_token_expiry: i64,
}

impl JwtService {
    pub fn new(secret: String, access_expiry: i64) -> Self {
        Self {
            secret,
            access_token_expiry: access_expiry,
        }
    }

    pub fn access_token_expiry(&self) -> i64 {
        self.access_token_expiry
    }

    pub fn generate_access_token(&self, subject: &TokenSubject) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.user_id.to_string(),
            role: subject.role.clone(),
            tenant: subject.tenant_id,
            su: subject.is_superuser,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
            token_type: TOKEN_TYPE_ACCESS.to_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| JwtError::CreationError(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<TokenSubject, JwtError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            _ => JwtError::ValidationError(e.to_string()),
        })?;

        if claims.token_type != TOKEN_TYPE_ACCESS {
            return Err(JwtError::ValidationError("unexpected token type".to_string()));
        }
        claims.subject()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merchant() -> TokenSubject {
        TokenSubject {
            user_id: 42,
            role: "admin".to_string(),
            tenant_id: Some(7),
            is_superuser: false,
        }
    }

    #[test]
    fn test_token_round_trip_keeps_identity() {
        let service = JwtService::new("unit-test-secret".to_string(), 3600);
        let token = service.generate_access_token(&merchant()).unwrap();
        let subject = service.validate_token(&token).unwrap();
        assert_eq!(subject, merchant());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let issuer = JwtService::new("secret-a".to_string(), 3600);
        let verifier = JwtService::new("secret-b".to_string(), 3600);
        let token = issuer.generate_access_token(&merchant()).unwrap();
        assert!(matches!(
            verifier.validate_token(&token),
            Err(JwtError::ValidationError(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Default validation allows 60s of leeway.
        let service = JwtService::new("unit-test-secret".to_string(), -120);
        let token = service.generate_access_token(&merchant()).unwrap();
        assert!(matches!(service.validate_token(&token), Err(JwtError::TokenExpired)));
    }
}
