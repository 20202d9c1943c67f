use std::sync::Arc;

use axum::{Json, extract::Extension};

use quantii_sales::Transaction;

use crate::app::errors::ApiResult;
use crate::app::services::AppServices;

/// GET /transactions (newest first)
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
) -> ApiResult<Json<Vec<Transaction>>> {
    Ok(Json(services.transactions.get_all().await?))
}
