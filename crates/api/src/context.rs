use chrono::{DateTime, Utc};

use quantii_core::SessionId;

/// Authenticated session for a request, derived from its bearer token.
///
/// Present on every protected route.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionContext {
    session_id: SessionId,
    expires_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(session_id: SessionId, expires_at: DateTime<Utc>) -> Self {
        Self { session_id, expires_at }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}
