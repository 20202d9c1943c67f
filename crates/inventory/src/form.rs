//! Raw add/edit form input and the rules that turn it into item fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use quantii_core::{DomainError, DomainResult, Money};

use crate::item::{DEFAULT_CATEGORY, InventoryItem, ItemFields};

/// Add/edit item form, as typed by the operator.
///
/// Every field is free text; JSON clients may also send numbers for `price`
/// and `stock`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemForm {
    #[serde(default, deserialize_with = "text_or_number")]
    pub name: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub price: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub stock: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub category: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub sku: String,
}

impl ItemForm {
    /// Pre-fill the form with an existing item (edit flow).
    pub fn from_item(item: &InventoryItem) -> Self {
        let cents = item.price.cents();
        Self {
            name: item.name.clone(),
            price: format!("{}.{:02}", cents / 100, cents % 100),
            stock: item.stock.to_string(),
            category: item.category.clone(),
            sku: item.sku.clone(),
        }
    }

    /// Fields for a brand-new item. A blank SKU is generated from `now`.
    pub fn into_new_item(self, now: DateTime<Utc>) -> DomainResult<ItemFields> {
        let sku = if self.sku.trim().is_empty() {
            format!("SKU{}", now.timestamp_millis())
        } else {
            self.sku.trim().to_string()
        };
        self.into_fields(sku)
    }

    /// Fields replacing `existing`. A blank SKU keeps the current one.
    pub fn into_update(self, existing: &InventoryItem) -> DomainResult<ItemFields> {
        let sku = if self.sku.trim().is_empty() {
            existing.sku.clone()
        } else {
            self.sku.trim().to_string()
        };
        self.into_fields(sku)
    }

    fn into_fields(self, sku: String) -> DomainResult<ItemFields> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        let price = Money::parse(&self.price)?;

        let category = match self.category.trim() {
            "" => DEFAULT_CATEGORY.to_string(),
            c => c.to_string(),
        };

        Ok(ItemFields {
            name: name.to_string(),
            price,
            stock: parse_stock(&self.stock),
            category,
            sku,
        })
    }
}

/// Lenient integer parse: leading digits count, anything unusable is 0,
/// negatives clamp to 0.
fn parse_stock(raw: &str) -> u32 {
    let s = raw.trim();
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let digits = &rest[..end];
    if negative || digits.is_empty() {
        return 0;
    }
    digits
        .parse::<u64>()
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(u32::MAX)
}

fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
        Raw::Null(()) => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use quantii_core::ItemId;

    fn form(name: &str, price: &str, stock: &str, category: &str, sku: &str) -> ItemForm {
        ItemForm {
            name: name.into(),
            price: price.into(),
            stock: stock.into(),
            category: category.into(),
            sku: sku.into(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_123).unwrap()
    }

    #[test]
    fn new_item_fills_defaults() {
        let fields = form("Tea", "2.5", "", "", "").into_new_item(now()).unwrap();
        assert_eq!(fields.name, "Tea");
        assert_eq!(fields.price, Money::from_cents(250));
        assert_eq!(fields.stock, 0);
        assert_eq!(fields.category, DEFAULT_CATEGORY);
        assert_eq!(fields.sku, "SKU1700000000123");
    }

    #[test]
    fn name_and_price_are_required() {
        let err = form("  ", "1", "1", "", "").into_new_item(now()).unwrap_err();
        assert_eq!(err, DomainError::validation("name is required"));

        let err = form("Tea", "", "1", "", "").into_new_item(now()).unwrap_err();
        assert_eq!(err, DomainError::validation("price is required"));
    }

    #[test]
    fn stock_parsing_is_lenient_but_never_negative() {
        assert_eq!(parse_stock("12"), 12);
        assert_eq!(parse_stock(" 7 "), 7);
        assert_eq!(parse_stock("12abc"), 12);
        assert_eq!(parse_stock("3.9"), 3);
        assert_eq!(parse_stock("abc"), 0);
        assert_eq!(parse_stock("-5"), 0);
        assert_eq!(parse_stock("99999999999"), u32::MAX);
    }

    #[test]
    fn update_keeps_existing_sku_when_blank() {
        let existing = InventoryItem::from_fields(
            ItemId::new(),
            form("Coffee", "3.50", "100", "Beverages", "BEV001")
                .into_new_item(now())
                .unwrap(),
        );

        let fields = form("Coffee", "3.75", "90", "", " ").into_update(&existing).unwrap();
        assert_eq!(fields.sku, "BEV001");
        assert_eq!(fields.category, DEFAULT_CATEGORY);
        assert_eq!(fields.price, Money::from_cents(375));
    }

    #[test]
    fn edit_form_round_trips_through_prefill() {
        let existing = InventoryItem::from_fields(
            ItemId::new(),
            form("Muffin", "4.25", "30", "Food", "FOOD002")
                .into_new_item(now())
                .unwrap(),
        );

        let prefilled = ItemForm::from_item(&existing);
        assert_eq!(prefilled.price, "4.25");
        assert_eq!(prefilled.into_update(&existing).unwrap(), existing.fields());
    }

    #[test]
    fn json_form_accepts_numbers() {
        let form: ItemForm = serde_json::from_value(serde_json::json!({
            "name": "Bagel",
            "price": 2.5,
            "stock": 40,
            "category": null,
        }))
        .unwrap();

        assert_eq!(form.price, "2.5");
        assert_eq!(form.stock, "40");
        assert_eq!(form.category, "");
        assert_eq!(form.sku, "");
    }
}
