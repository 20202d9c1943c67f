//! Inventory domain module.
//!
//! Business rules for the stock catalogue, implemented as deterministic domain
//! logic (no IO, no HTTP, no storage).

pub mod form;
pub mod item;
pub mod summary;

pub use form::ItemForm;
pub use item::{
    DEFAULT_CATEGORY, InventoryItem, ItemFields, StockAdjustment, apply_sale, demo_items,
};
pub use summary::{InventorySummary, LOW_STOCK_THRESHOLD};
