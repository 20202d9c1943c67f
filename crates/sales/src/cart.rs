use serde::{Deserialize, Serialize};

use quantii_core::{DomainError, DomainResult, ItemId, Money};
use quantii_inventory::InventoryItem;

/// One product in the cart: a snapshot of the item at the time it was rung up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "id")]
    pub item_id: ItemId,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub sku: String,
    pub quantity: u32,
}

impl CartLine {
    /// One unit of `item`, priced as it stands now.
    pub fn from_item(item: &InventoryItem) -> Self {
        Self {
            item_id: item.id,
            name: item.name.clone(),
            price: item.price,
            category: item.category.clone(),
            sku: item.sku.clone(),
            quantity: 1,
        }
    }

    pub fn line_total(&self) -> Money {
        self.price
            .checked_mul(self.quantity)
            .unwrap_or(Money::from_cents(u64::MAX))
    }
}

/// Lines of an in-progress sale. Exists only while a session is ringing up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Ring up one unit of `item`. A second scan bumps the existing line.
    pub fn add_item(&mut self, item: &InventoryItem) -> DomainResult<&CartLine> {
        if !item.is_sellable() {
            return Err(DomainError::validation(format!("'{}' is out of stock", item.name)));
        }

        let idx = match self.lines.iter().position(|l| l.item_id == item.id) {
            Some(idx) => {
                let line = &mut self.lines[idx];
                line.quantity = line.quantity.saturating_add(1);
                idx
            }
            None => {
                self.lines.push(CartLine::from_item(item));
                self.lines.len() - 1
            }
        };

        Ok(&self.lines[idx])
    }

    /// Returns whether a line was removed.
    pub fn remove(&mut self, item_id: ItemId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.item_id != item_id);
        self.lines.len() != before
    }

    /// Set a line's quantity. Zero or below drops the line.
    pub fn update_quantity(&mut self, item_id: ItemId, quantity: i64) -> DomainResult<()> {
        if quantity <= 0 {
            return if self.remove(item_id) {
                Ok(())
            } else {
                Err(DomainError::not_found())
            };
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.item_id == item_id)
            .ok_or_else(DomainError::not_found)?;
        line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        Ok(())
    }

    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Fold `other` into this cart. Lines for items already here add their
    /// quantities; new lines keep their snapshot and go at the end.
    pub fn absorb(&mut self, other: Cart) {
        for line in other.lines {
            match self.lines.iter_mut().find(|l| l.item_id == line.item_id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => self.lines.push(line),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use quantii_inventory::demo_items;

    fn catalogue() -> Vec<InventoryItem> {
        demo_items()
            .into_iter()
            .map(|f| InventoryItem::from_fields(ItemId::new(), f))
            .collect()
    }

    #[test]
    fn adding_twice_increments_instead_of_duplicating() {
        let items = catalogue();
        let mut cart = Cart::new();

        cart.add_item(&items[0]).unwrap();
        let line = cart.add_item(&items[0]).unwrap();

        assert_eq!(line.quantity, 2);
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn out_of_stock_items_cannot_be_added() {
        let mut items = catalogue();
        items[0].stock = 0;
        let mut cart = Cart::new();

        let err = cart.add_item(&items[0]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("out of stock")));
        assert!(cart.is_empty());
    }

    #[test]
    fn non_positive_quantity_removes_line() {
        let items = catalogue();
        let mut cart = Cart::new();
        cart.add_item(&items[0]).unwrap();
        cart.add_item(&items[1]).unwrap();

        cart.update_quantity(items[0].id, 0).unwrap();
        cart.update_quantity(items[1].id, -3).unwrap();

        assert!(cart.is_empty());
    }

    #[test]
    fn updating_a_missing_line_is_not_found() {
        let mut cart = Cart::new();
        assert_eq!(cart.update_quantity(ItemId::new(), 2), Err(DomainError::NotFound));
        assert_eq!(cart.update_quantity(ItemId::new(), 0), Err(DomainError::NotFound));
    }

    #[test]
    fn total_is_price_times_quantity() {
        let items = catalogue();
        let mut cart = Cart::new();
        cart.add_item(&items[0]).unwrap(); // 3.50
        cart.add_item(&items[1]).unwrap(); // 8.99
        cart.update_quantity(items[0].id, 3).unwrap();

        assert_eq!(cart.total(), Money::from_cents(3 * 350 + 899));
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn remove_reports_whether_anything_changed() {
        let items = catalogue();
        let mut cart = Cart::new();
        cart.add_item(&items[2]).unwrap();

        assert!(cart.remove(items[2].id));
        assert!(!cart.remove(items[2].id));
    }

    #[test]
    fn absorbing_merges_matching_lines_and_appends_the_rest() {
        let items = catalogue();
        let mut held = Cart::new();
        held.add_item(&items[0]).unwrap();
        held.add_item(&items[1]).unwrap();

        let mut newer = Cart::new();
        newer.add_item(&items[1]).unwrap();
        newer.add_item(&items[2]).unwrap();

        held.absorb(newer);

        let quantities: Vec<_> = held.lines().iter().map(|l| (l.item_id, l.quantity)).collect();
        assert_eq!(quantities, [(items[0].id, 1), (items[1].id, 2), (items[2].id, 1)]);
    }

    #[test]
    fn line_serializes_item_id_as_id() {
        let items = catalogue();
        let mut cart = Cart::new();
        cart.add_item(&items[0]).unwrap();

        let json = serde_json::to_value(&cart.lines()[0]).unwrap();
        assert_eq!(json["id"], items[0].id.to_string());
        assert_eq!(json["quantity"], 1);
        assert_eq!(json["price"], 3.5);
    }

    proptest! {
        #[test]
        fn n_scans_make_one_line_of_n(n in 1usize..50) {
            let items = catalogue();
            let mut cart = Cart::new();
            for _ in 0..n {
                cart.add_item(&items[0]).unwrap();
            }
            prop_assert_eq!(cart.lines().len(), 1);
            prop_assert_eq!(cart.lines()[0].quantity as usize, n);
        }
    }
}
