//! Bearer tokens handed out after a successful login.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use thiserror::Error;

use quantii_core::SessionId;

use crate::claims::{SessionClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Encode(String),

    #[error("malformed or forged token: {0}")]
    Decode(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Token plus its expiry, as returned to the client on login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub session_id: SessionId,
    pub expires_at: DateTime<Utc>,
}

/// Issue and verify session tokens.
pub trait SessionTokens: Send + Sync {
    fn issue(&self, session_id: SessionId, now: DateTime<Utc>) -> Result<IssuedToken, TokenError>;

    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError>;
}

/// HS256-signed JWT sessions.
pub struct Hs256SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256SessionTokens {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }
}

impl SessionTokens for Hs256SessionTokens {
    fn issue(&self, session_id: SessionId, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let claims = SessionClaims {
            sub: session_id,
            issued_at: now,
            expires_at: now + self.ttl,
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))?;

        Ok(IssuedToken {
            token,
            session_id,
            expires_at: claims.expires_at,
        })
    }

    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        // Time checks run against the caller's clock in `validate_claims`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|e| TokenError::Decode(e.to_string()))?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}
