use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use quantii_auth::SessionTokens;

use crate::app::errors::json_error;
use crate::app::services::RevokedSessions;
use crate::context::SessionContext;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn SessionTokens>,
    pub revoked: Arc<RevokedSessions>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).ok_or_else(unauthorized)?;

    let claims = state.tokens.validate(token, Utc::now()).map_err(|e| {
        tracing::debug!(error = %e, "rejected session token");
        unauthorized()
    })?;

    if state.revoked.is_revoked(claims.sub) {
        tracing::debug!(session_id = %claims.sub, "rejected token of a closed session");
        return Err(unauthorized());
    }

    req.extensions_mut()
        .insert(SessionContext::new(claims.sub, claims.expires_at));

    Ok(next.run(req).await)
}

fn unauthorized() -> Response {
    json_error(StatusCode::UNAUTHORIZED, "unauthorized", "sign in to continue")
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}
