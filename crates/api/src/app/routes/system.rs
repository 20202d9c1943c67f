use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::services::{self, AppServices};
use crate::context::SessionContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(session): Extension<SessionContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "session_id": session.session_id().to_string(),
        "expires_at": session.expires_at().to_rfc3339(),
    }))
}

/// Live snapshots of inventory, transactions and settings.
pub async fn stream(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    services::snapshot_sse_stream(&services)
}
