use std::sync::Arc;

use axum::{Json, extract::Extension};
use serde::Serialize;

use quantii_inventory::InventorySummary;
use quantii_sales::{Transaction, TransactionSummary};

use crate::app::errors::ApiResult;
use crate::app::services::AppServices;

const RECENT_TRANSACTIONS: usize = 5;

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub inventory: InventorySummary,
    pub sales: TransactionSummary,
    pub recent_transactions: Vec<Transaction>,
}

pub async fn dashboard(
    Extension(services): Extension<Arc<AppServices>>,
) -> ApiResult<Json<DashboardView>> {
    let items = services.inventory.get_all().await?;
    let mut transactions = services.transactions.get_all().await?;

    let sales = TransactionSummary::from_transactions(&transactions);
    transactions.truncate(RECENT_TRANSACTIONS);

    Ok(Json(DashboardView {
        inventory: InventorySummary::from_items(&items),
        sales,
        recent_transactions: transactions,
    }))
}
