use serde::{Deserialize, Serialize};

use quantii_core::{ItemId, Money};
use quantii_sales::{Cart, CartLine, Transaction};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub access_key: String,
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub item_id: ItemId,
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

// -------------------------
// Response views
// -------------------------

/// The cart panel: lines plus running totals.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total: Money,
    pub item_count: u64,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines().to_vec(),
            total: cart.total(),
            item_count: cart.item_count(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub transaction: Transaction,
    pub total: Money,
}
