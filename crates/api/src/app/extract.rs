//! Body and query extractors that fail with the `{error, message}` banner
//! instead of axum's plain-text rejections.

use axum::extract::{FromRequest, FromRequestParts};

use crate::app::errors::ApiError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);
