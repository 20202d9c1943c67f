use chrono::Utc;
use serde_json::Value as JsonValue;

use quantii_core::ItemId;
use quantii_inventory::{InventoryItem, ItemFields, StockAdjustment, demo_items};

use super::{SnapshotSubscription, stamp};
use crate::document_store::{Collection, Document, Fields, SharedStore, StoreError};

const COLLECTION: Collection = Collection::Inventory;

/// The `inventory` collection as typed items.
#[derive(Clone)]
pub struct InventoryService {
    store: SharedStore,
}

impl InventoryService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Result<Vec<InventoryItem>, StoreError> {
        let docs = self
            .store
            .list(COLLECTION, None)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to load inventory"))?;
        docs.into_iter().map(Document::decode).collect()
    }

    pub async fn get(&self, id: ItemId) -> Result<Option<InventoryItem>, StoreError> {
        let doc = self
            .store
            .get(COLLECTION, *id.as_uuid())
            .await
            .inspect_err(|e| tracing::error!(item_id = %id, error = %e, "failed to load item"))?;
        doc.map(Document::decode).transpose()
    }

    /// Store a new item; returns it as persisted.
    pub async fn add(&self, fields: ItemFields) -> Result<InventoryItem, StoreError> {
        let now = Utc::now();
        let mut doc = Document::encode(&fields)?;
        stamp(&mut doc, "created_at", now);
        stamp(&mut doc, "updated_at", now);

        let id = self
            .store
            .add(COLLECTION, doc)
            .await
            .inspect_err(|e| {
                tracing::error!(name = %fields.name, error = %e, "failed to add item")
            })?;

        tracing::info!(item_id = %id, name = %fields.name, "item added");

        let mut item = InventoryItem::from_fields(ItemId::from_uuid(id), fields);
        item.created_at = Some(now);
        item.updated_at = Some(now);
        Ok(item)
    }

    /// Replace the editable fields of an existing item.
    pub async fn update(
        &self,
        id: ItemId,
        fields: ItemFields,
    ) -> Result<InventoryItem, StoreError> {
        let mut doc = Document::encode(&fields)?;
        stamp(&mut doc, "updated_at", Utc::now());
        self.write(id, doc).await?;

        self.get(id)
            .await?
            .ok_or(StoreError::NotFound { collection: COLLECTION, id: *id.as_uuid() })
    }

    /// Take `sold` units off the item's stock, clamping at zero.
    ///
    /// The read and the write happen as one store operation, so concurrent
    /// sales of the same item all land. `None` when the item is gone.
    pub async fn decrement_stock(
        &self,
        id: ItemId,
        sold: u32,
    ) -> Result<Option<StockAdjustment>, StoreError> {
        let now = Utc::now();
        let edit = |doc: &mut Fields| {
            let left = stock_of(doc).saturating_sub(sold);
            doc.insert("stock".to_string(), JsonValue::from(left));
            stamp(doc, "updated_at", now);
        };

        let before = match self.store.modify(COLLECTION, *id.as_uuid(), &edit).await {
            Ok(before) => before,
            Err(StoreError::NotFound { .. }) => return Ok(None),
            Err(e) => {
                tracing::error!(item_id = %id, error = %e, "failed to decrement stock");
                return Err(e);
            }
        };

        let previous_stock = stock_of(&before);
        Ok(Some(StockAdjustment {
            item_id: id,
            previous_stock,
            new_stock: previous_stock.saturating_sub(sold),
        }))
    }

    /// Returns `false` when there was nothing to delete.
    pub async fn delete(&self, id: ItemId) -> Result<bool, StoreError> {
        let removed = self
            .store
            .delete(COLLECTION, *id.as_uuid())
            .await
            .inspect_err(|e| tracing::error!(item_id = %id, error = %e, "failed to delete item"))?;
        if removed {
            tracing::info!(item_id = %id, "item deleted");
        }
        Ok(removed)
    }

    pub fn subscribe(&self) -> SnapshotSubscription<InventoryItem> {
        SnapshotSubscription::new(self.store.clone(), COLLECTION, None, Document::decode)
    }

    /// Load the demo catalogue into an empty inventory. Returns how many
    /// items were written (0 if anything was already there).
    pub async fn seed_if_empty(&self) -> Result<usize, StoreError> {
        if !self.get_all().await?.is_empty() {
            tracing::debug!("inventory already populated; skipping demo seed");
            return Ok(0);
        }

        let items = demo_items();
        let count = items.len();
        for fields in items {
            self.add(fields).await?;
        }
        tracing::info!(count, "seeded demo inventory");
        Ok(count)
    }

    async fn write(&self, id: ItemId, doc: Fields) -> Result<(), StoreError> {
        self.store
            .update(COLLECTION, *id.as_uuid(), doc)
            .await
            .inspect_err(|e| tracing::error!(item_id = %id, error = %e, "failed to update item"))
    }
}

/// Stock as stored; anything unreadable counts as none on hand.
fn stock_of(doc: &Fields) -> u32 {
    doc.get("stock")
        .and_then(JsonValue::as_u64)
        .map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX))
}
