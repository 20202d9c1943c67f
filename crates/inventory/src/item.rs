use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quantii_core::{Entity, ItemId, Money, find_by_id};

/// Category used when the form leaves it blank.
pub const DEFAULT_CATEGORY: &str = "General";

/// Editable fields of an inventory item, exactly as written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFields {
    pub name: String,
    pub price: Money,
    pub stock: u32,
    pub category: String,
    pub sku: String,
}

/// A stocked product in the `inventory` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    pub name: String,
    pub price: Money,
    pub stock: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for InventoryItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl InventoryItem {
    pub fn from_fields(id: ItemId, fields: ItemFields) -> Self {
        Self {
            id,
            name: fields.name,
            price: fields.price,
            stock: fields.stock,
            category: fields.category,
            sku: fields.sku,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn fields(&self) -> ItemFields {
        ItemFields {
            name: self.name.clone(),
            price: self.price,
            stock: self.stock,
            category: self.category.clone(),
            sku: self.sku.clone(),
        }
    }

    /// Only items with stock on hand can be rung up.
    pub fn is_sellable(&self) -> bool {
        self.stock > 0
    }

    /// Remove `quantity` units, clamping at zero. Returns the new stock level.
    pub fn decrement_stock(&mut self, quantity: u32) -> u32 {
        self.stock = self.stock.saturating_sub(quantity);
        self.stock
    }
}

/// Stock change produced by a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub item_id: ItemId,
    pub previous_stock: u32,
    pub new_stock: u32,
}

impl StockAdjustment {
    /// True when the sale asked for more than was on hand.
    pub fn was_clamped(&self, sold: u32) -> bool {
        sold > self.previous_stock
    }
}

/// Compute the stock levels left after selling `sold` (item id, quantity).
///
/// Items not mentioned are untouched; unknown ids are skipped. Quantities for
/// the same id accumulate. Stock never goes below zero.
pub fn apply_sale(items: &[InventoryItem], sold: &[(ItemId, u32)]) -> Vec<StockAdjustment> {
    let mut adjustments: Vec<StockAdjustment> = Vec::new();

    for (item_id, quantity) in sold {
        if let Some(existing) = adjustments.iter_mut().find(|a| a.item_id == *item_id) {
            existing.new_stock = existing.new_stock.saturating_sub(*quantity);
            continue;
        }

        let Some(item) = find_by_id(items, item_id) else {
            continue;
        };

        adjustments.push(StockAdjustment {
            item_id: *item_id,
            previous_stock: item.stock,
            new_stock: item.stock.saturating_sub(*quantity),
        });
    }

    adjustments
}

/// Catalogue a fresh till starts with.
pub fn demo_items() -> Vec<ItemFields> {
    let item = |name: &str, cents: u64, stock: u32, category: &str, sku: &str| ItemFields {
        name: name.to_string(),
        price: Money::from_cents(cents),
        stock,
        category: category.to_string(),
        sku: sku.to_string(),
    };

    vec![
        item("Coffee", 350, 100, "Beverages", "BEV001"),
        item("Sandwich", 899, 50, "Food", "FOOD001"),
        item("Muffin", 425, 30, "Food", "FOOD002"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(stock: u32) -> InventoryItem {
        InventoryItem::from_fields(
            ItemId::new(),
            ItemFields {
                name: "Coffee".to_string(),
                price: Money::from_cents(350),
                stock,
                category: "Beverages".to_string(),
                sku: "BEV001".to_string(),
            },
        )
    }

    #[test]
    fn decrement_clamps_at_zero() {
        let mut coffee = item(3);
        assert_eq!(coffee.decrement_stock(2), 1);
        assert_eq!(coffee.decrement_stock(5), 0);
        assert_eq!(coffee.stock, 0);
    }

    #[test]
    fn only_items_in_stock_are_sellable() {
        assert!(item(1).is_sellable());
        assert!(!item(0).is_sellable());
    }

    #[test]
    fn sale_with_insufficient_stock_clamps_to_zero() {
        let coffee = item(2);
        let adjustments = apply_sale(std::slice::from_ref(&coffee), &[(coffee.id, 5)]);

        assert_eq!(adjustments.len(), 1);
        assert_eq!(adjustments[0].previous_stock, 2);
        assert_eq!(adjustments[0].new_stock, 0);
        assert!(adjustments[0].was_clamped(5));
    }

    #[test]
    fn sale_leaves_other_items_alone_and_skips_unknown_ids() {
        let coffee = item(10);
        let muffin = item(4);
        let sold = [(coffee.id, 3), (ItemId::new(), 1)];
        let adjustments = apply_sale(&[coffee.clone(), muffin], &sold);

        assert_eq!(adjustments.len(), 1);
        assert_eq!(adjustments[0].item_id, coffee.id);
        assert_eq!(adjustments[0].new_stock, 7);
    }

    #[test]
    fn repeated_ids_in_one_sale_accumulate() {
        let coffee = item(10);
        let sold = [(coffee.id, 3), (coffee.id, 4)];
        let adjustments = apply_sale(std::slice::from_ref(&coffee), &sold);

        assert_eq!(adjustments.len(), 1);
        assert_eq!(adjustments[0].new_stock, 3);
    }

    #[test]
    fn stored_document_without_optional_fields_deserializes() {
        let id = ItemId::new();
        let doc = serde_json::json!({
            "id": id.to_string(),
            "name": "Tea",
            "price": 2.75,
            "stock": 12,
        });

        let item: InventoryItem = serde_json::from_value(doc).unwrap();
        assert_eq!(item.price, Money::from_cents(275));
        assert_eq!(item.category, "");
        assert!(item.created_at.is_none());
    }

    #[test]
    fn demo_catalogue_matches_till_defaults() {
        let demo = demo_items();
        let skus: Vec<_> = demo.iter().map(|i| i.sku.as_str()).collect();
        assert_eq!(skus, ["BEV001", "FOOD001", "FOOD002"]);
        assert_eq!(demo[1].price, Money::from_cents(899));
    }

    proptest! {
        #[test]
        fn stock_never_underflows(stock in 0u32..1_000, sold in 0u32..2_000) {
            let coffee = item(stock);
            let adjustments = apply_sale(std::slice::from_ref(&coffee), &[(coffee.id, sold)]);
            prop_assert_eq!(adjustments[0].new_stock, stock.saturating_sub(sold));
            prop_assert!(adjustments[0].new_stock <= stock);
        }
    }
}
