use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use quantii_core::SessionId;

/// Claims carried by a session token.
///
/// Timestamps travel as the standard `iat`/`exp` seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Session the bearer belongs to (keys the server-side cart).
    pub sub: SessionId,

    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate session claims against `now`.
///
/// Signature verification happens in [`crate::tokens`]; this only checks the
/// time window.
pub fn validate_claims(
    claims: &SessionClaims,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn claims(iat: i64, exp: i64) -> SessionClaims {
        SessionClaims {
            sub: SessionId::new(),
            issued_at: Utc.timestamp_opt(iat, 0).unwrap(),
            expires_at: Utc.timestamp_opt(exp, 0).unwrap(),
        }
    }

    #[test]
    fn window_checks() {
        let c = claims(1_000, 2_000);
        let at = |s| Utc.timestamp_opt(s, 0).unwrap();

        assert_eq!(validate_claims(&c, at(1_500)), Ok(()));
        assert_eq!(validate_claims(&c, at(999)), Err(TokenValidationError::NotYetValid));
        assert_eq!(validate_claims(&c, at(2_000)), Err(TokenValidationError::Expired));
        assert_eq!(
            validate_claims(&claims(2_000, 2_000), at(2_000) - Duration::seconds(1)),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn serializes_standard_claim_names() {
        let json = serde_json::to_value(claims(1_000, 2_000)).unwrap();
        assert_eq!(json["iat"], 1_000);
        assert_eq!(json["exp"], 2_000);
        assert!(json.get("sub").is_some());
    }
}
