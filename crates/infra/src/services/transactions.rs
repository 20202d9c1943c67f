use chrono::Utc;

use quantii_core::TransactionId;
use quantii_sales::{NewTransaction, Transaction};

use super::{SnapshotSubscription, stamp};
use crate::document_store::{Collection, Document, OrderBy, SharedStore, StoreError};

const COLLECTION: Collection = Collection::Transactions;

fn newest_first() -> OrderBy {
    OrderBy::desc("timestamp")
}

/// The append-only `transactions` collection.
#[derive(Clone)]
pub struct TransactionService {
    store: SharedStore,
}

impl TransactionService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// All recorded sales, newest first.
    pub async fn get_all(&self) -> Result<Vec<Transaction>, StoreError> {
        let docs = self
            .store
            .list(COLLECTION, Some(&newest_first()))
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to load transactions"))?;
        docs.into_iter().map(Document::decode).collect()
    }

    pub async fn add(&self, new: NewTransaction) -> Result<Transaction, StoreError> {
        let now = Utc::now();
        let mut doc = Document::encode(&new)?;
        stamp(&mut doc, "created_at", now);

        let id = self
            .store
            .add(COLLECTION, doc)
            .await
            .inspect_err(|e| {
                tracing::error!(total = %new.total, error = %e, "failed to record transaction")
            })?;

        tracing::info!(
            transaction_id = %id,
            total = %new.total,
            lines = new.items.len(),
            "transaction recorded"
        );

        let mut transaction = Transaction::from_new(TransactionId::from_uuid(id), new);
        transaction.created_at = Some(now);
        Ok(transaction)
    }

    /// Only the diagnostics tooling removes transactions.
    pub async fn delete(&self, id: TransactionId) -> Result<bool, StoreError> {
        self.store
            .delete(COLLECTION, *id.as_uuid())
            .await
            .inspect_err(|e| {
                tracing::error!(transaction_id = %id, error = %e, "failed to delete transaction")
            })
    }

    pub fn subscribe(&self) -> SnapshotSubscription<Transaction> {
        let order = Some(newest_first());
        SnapshotSubscription::new(self.store.clone(), COLLECTION, order, Document::decode)
    }
}
