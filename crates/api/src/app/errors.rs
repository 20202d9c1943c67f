//! Failures as `{error, message}` JSON bodies (the dismissible banner).

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use quantii_core::DomainError;
use quantii_infra::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid access key")]
    InvalidAccessKey,

    #[error("failed to start session: {0}")]
    Session(String),

    /// The request body or query string could not be read.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected { status: rejection.status(), message: rejection.body_text() }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected { status: rejection.status(), message: rejection.body_text() }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Domain(e) => domain_error_to_response(e),
            ApiError::Store(e) => store_error_to_response(e),
            ApiError::NotFound(what) => {
                json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
            }
            ApiError::InvalidAccessKey => {
                json_error(StatusCode::UNAUTHORIZED, "invalid_access_key", "invalid access key")
            }
            ApiError::Session(msg) => {
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "session_error", msg)
            }
            ApiError::Rejected { status, message } => {
                json_error(status, "invalid_request", message)
            }
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Unauthorized => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized")
        }
    }
}

pub fn store_error_to_response(err: StoreError) -> Response {
    match err {
        StoreError::NotFound { .. } => {
            json_error(StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        StoreError::Invalid(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_document", msg),
        StoreError::Codec(_) | StoreError::Backend(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
