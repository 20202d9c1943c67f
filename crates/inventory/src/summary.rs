use serde::{Deserialize, Serialize};

use quantii_core::Money;

use crate::item::InventoryItem;

/// Items below this level are flagged on the dashboard.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// Dashboard roll-up of the catalogue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub item_count: usize,
    pub total_stock: u64,
    pub low_stock_count: usize,
    pub stock_value: Money,
}

impl InventorySummary {
    pub fn from_items(items: &[InventoryItem]) -> Self {
        items.iter().fold(Self::default(), |mut acc, item| {
            acc.item_count += 1;
            acc.total_stock += u64::from(item.stock);
            if item.stock < LOW_STOCK_THRESHOLD {
                acc.low_stock_count += 1;
            }
            let value = item.price.checked_mul(item.stock).unwrap_or(Money::from_cents(u64::MAX));
            acc.stock_value = acc.stock_value.saturating_add(value);
            acc
        })
    }
}
