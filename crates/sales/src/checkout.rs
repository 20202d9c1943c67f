use chrono::{DateTime, Utc};

use quantii_core::{DomainError, DomainResult};
use quantii_inventory::{InventoryItem, StockAdjustment, apply_sale};

use crate::cart::Cart;
use crate::transaction::{NewTransaction, format_timestamp};

/// Everything a completed sale writes: the transaction record plus the stock
/// levels of the items it touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub transaction: NewTransaction,
    pub adjustments: Vec<StockAdjustment>,
}

impl Checkout {
    /// Price the cart against `inventory` as it stands now.
    ///
    /// Lines whose item has since been deleted are still sold at their
    /// snapshot price; they just produce no stock adjustment.
    pub fn from_cart(
        cart: &Cart,
        inventory: &[InventoryItem],
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if cart.is_empty() {
            return Err(DomainError::validation("cart is empty"));
        }

        let sold: Vec<_> = cart.lines().iter().map(|l| (l.item_id, l.quantity)).collect();
        let adjustments = apply_sale(inventory, &sold);

        Ok(Self {
            transaction: NewTransaction {
                items: cart.lines().to_vec(),
                total: cart.total(),
                timestamp: now,
                timestamp_formatted: format_timestamp(now),
            },
            adjustments,
        })
    }
}
