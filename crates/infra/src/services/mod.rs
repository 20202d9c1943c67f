//! Typed wrappers over the raw collections.
//!
//! Every wrapper logs store failures where they happen and hands the error
//! back to the caller unchanged.

mod inventory;
mod settings;
mod transactions;

pub use inventory::InventoryService;
pub use settings::{Settings, SettingsService};
pub use transactions::TransactionService;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::document_store::{
    ChangeNotice, Collection, Document, Fields, OrderBy, SharedStore, StoreError,
};

/// Live view of one collection.
///
/// Yields the full collection once on the first `next()`, then again after
/// every change to it. A lagging receiver re-reads instead of replaying the
/// notices it missed.
pub struct SnapshotSubscription<T> {
    store: SharedStore,
    collection: Collection,
    order: Option<OrderBy>,
    notices: broadcast::Receiver<ChangeNotice>,
    decode: fn(Document) -> Result<T, StoreError>,
    primed: bool,
}

impl<T> SnapshotSubscription<T> {
    pub(crate) fn new(
        store: SharedStore,
        collection: Collection,
        order: Option<OrderBy>,
        decode: fn(Document) -> Result<T, StoreError>,
    ) -> Self {
        // Subscribe before the first read so no write slips between them.
        let notices = store.subscribe();
        Self { store, collection, order, notices, decode, primed: false }
    }

    /// Next snapshot, or `None` once the store has shut down.
    pub async fn next(&mut self) -> Option<Result<Vec<T>, StoreError>> {
        if !self.primed {
            self.primed = true;
            return Some(self.snapshot().await);
        }

        loop {
            match self.notices.recv().await {
                Ok(notice) if notice.collection == self.collection => {
                    return Some(self.snapshot().await);
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(
                        collection = %self.collection,
                        skipped,
                        "snapshot subscriber lagged; re-reading"
                    );
                    return Some(self.snapshot().await);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    async fn snapshot(&self) -> Result<Vec<T>, StoreError> {
        let docs = self
            .store
            .list(self.collection, self.order.as_ref())
            .await
            .inspect_err(|e| {
                tracing::error!(collection = %self.collection, error = %e, "snapshot read failed")
            })?;
        docs.into_iter().map(self.decode).collect()
    }
}

pub(crate) fn stamp(fields: &mut Fields, key: &str, at: DateTime<Utc>) {
    fields.insert(key.to_string(), JsonValue::String(at.to_rfc3339()));
}
