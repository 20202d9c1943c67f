//! Global search across the till's screens and the stocked items.

use std::sync::Arc;

use axum::{Json, extract::Extension};
use serde::Serialize;

use quantii_inventory::InventoryItem;

use crate::app::dto::SearchQuery;
use crate::app::errors::ApiResult;
use crate::app::extract::QueryParams;
use crate::app::services::AppServices;

pub const MAX_RESULTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Nav,
    Item,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub kind: ResultKind,
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

impl SearchResult {
    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.subtitle.as_deref().is_some_and(|s| s.to_lowercase().contains(needle))
    }
}

const NAV_TARGETS: [(&str, &str); 5] = [
    ("dashboard", "Dashboard"),
    ("inventory", "Inventory Management"),
    ("pos", "Point of Sale"),
    ("transactions", "Transaction History"),
    ("add-item", "Add New Item"),
];

/// Case-insensitive substring match on title or subtitle; screens first,
/// then items in inventory order. A blank query finds nothing.
pub fn search_all(query: &str, items: &[InventoryItem]) -> Vec<SearchResult> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let nav = NAV_TARGETS.iter().map(|(id, title)| SearchResult {
        kind: ResultKind::Nav,
        id: (*id).to_string(),
        title: (*title).to_string(),
        subtitle: None,
    });

    let stocked = items.iter().map(|item| SearchResult {
        kind: ResultKind::Item,
        id: format!("item-{}", item.id),
        title: format!("{} - {}", item.name, item.price),
        subtitle: Some(format!("Stock: {} | {}", item.stock, item.category)),
    });

    nav.chain(stocked)
        .filter(|r| r.matches(&needle))
        .take(MAX_RESULTS)
        .collect()
}

/// GET /search?q=
pub async fn search(
    Extension(services): Extension<Arc<AppServices>>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> ApiResult<Json<Vec<SearchResult>>> {
    if query.q.trim().is_empty() {
        return Ok(Json(Vec::new()));
    }
    let items = services.inventory.get_all().await?;
    Ok(Json(search_all(&query.q, &items)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantii_core::{ItemId, Money};
    use quantii_inventory::{ItemFields, demo_items};

    fn catalogue() -> Vec<InventoryItem> {
        demo_items()
            .into_iter()
            .map(|f| InventoryItem::from_fields(ItemId::new(), f))
            .collect()
    }

    #[test]
    fn blank_query_finds_nothing() {
        assert!(search_all("   ", &catalogue()).is_empty());
    }

    #[test]
    fn matching_ignores_case() {
        let results = search_all("COFFEE", &catalogue());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Coffee - $3.50");
        assert_eq!(results[0].subtitle.as_deref(), Some("Stock: 100 | Beverages"));
    }

    #[test]
    fn subtitle_matches_count() {
        let results = search_all("food", &catalogue());
        let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Sandwich - $8.99", "Muffin - $4.25"]);
    }

    #[test]
    fn navigation_targets_are_searchable() {
        let results = search_all("point of", &[]);
        assert_eq!(results[0].kind, ResultKind::Nav);
        assert_eq!(results[0].id, "pos");
    }

    #[test]
    fn caps_results() {
        let items: Vec<_> = (0..20)
            .map(|n| {
                InventoryItem::from_fields(
                    ItemId::new(),
                    ItemFields {
                        name: format!("Bagel {n}"),
                        price: Money::from_cents(199),
                        stock: 3,
                        category: "Food".into(),
                        sku: format!("BAG{n:03}"),
                    },
                )
            })
            .collect();

        assert_eq!(search_all("bagel", &items).len(), MAX_RESULTS);
    }
}
