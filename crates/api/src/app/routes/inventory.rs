use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use quantii_core::ItemId;
use quantii_inventory::{InventoryItem, ItemForm};

use crate::app::errors::{ApiError, ApiResult};
use crate::app::extract::JsonBody;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
) -> ApiResult<Json<Vec<InventoryItem>>> {
    Ok(Json(services.inventory.get_all().await?))
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(form): JsonBody<ItemForm>,
) -> ApiResult<impl IntoResponse> {
    let fields = form.into_new_item(Utc::now())?;
    let item = services.inventory.add(fields).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<Json<InventoryItem>> {
    let id: ItemId = id.parse()?;
    let item = services.inventory.get(id).await?.ok_or(ApiError::NotFound("item"))?;
    Ok(Json(item))
}

/// PUT /inventory/:id
///
/// Takes the same form as create; a blank SKU keeps the current one.
pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    JsonBody(form): JsonBody<ItemForm>,
) -> ApiResult<Json<InventoryItem>> {
    let id: ItemId = id.parse()?;
    let existing = services.inventory.get(id).await?.ok_or(ApiError::NotFound("item"))?;
    let fields = form.into_update(&existing)?;
    Ok(Json(services.inventory.update(id, fields).await?))
}

/// DELETE /inventory/:id
///
/// Deleting an item that is already gone still succeeds.
pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id: ItemId = id.parse()?;
    services.inventory.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
