use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use chrono::Utc;

use quantii_core::SessionId;

use crate::app::dto::LoginRequest;
use crate::app::errors::{ApiError, ApiResult};
use crate::app::extract::JsonBody;
use crate::app::services::AppServices;
use crate::context::SessionContext;

/// POST /session/login
///
/// Exchange the shared access key for a bearer token.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    services
        .gate()
        .verify(&body.access_key)
        .map_err(|_| ApiError::InvalidAccessKey)?;

    let issued = services
        .tokens()
        .issue(SessionId::new(), Utc::now())
        .map_err(|e| ApiError::Session(e.to_string()))?;

    tracing::info!(session_id = %issued.session_id, "session started");

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "token": issued.token,
            "session_id": issued.session_id.to_string(),
            "expires_at": issued.expires_at.to_rfc3339(),
        })),
    ))
}

/// POST /session/logout
///
/// Closes the gate: the token is refused from now on and the cart is gone.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> StatusCode {
    services.revoked().revoke(&session, Utc::now());
    services.carts().end_session(session.session_id());
    tracing::info!(session_id = %session.session_id(), "session ended");
    StatusCode::NO_CONTENT
}
