use std::sync::Arc;

use axum::{Json, extract::Extension};

use quantii_infra::{Fields, Settings};

use crate::app::errors::ApiResult;
use crate::app::extract::JsonBody;
use crate::app::services::AppServices;

/// GET /settings (`null` until something is saved)
pub async fn get_settings(
    Extension(services): Extension<Arc<AppServices>>,
) -> ApiResult<Json<Option<Settings>>> {
    Ok(Json(services.settings.get().await?))
}

/// PUT /settings
///
/// Merges the given fields into the stored settings.
pub async fn update_settings(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(values): JsonBody<Fields>,
) -> ApiResult<Json<Settings>> {
    Ok(Json(services.settings.update(values).await?))
}
