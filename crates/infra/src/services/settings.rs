use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use super::{SnapshotSubscription, stamp};
use crate::document_store::{Collection, Document, Fields, SharedStore, StoreError};

const COLLECTION: Collection = Collection::Settings;

/// The single free-form settings document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub id: Uuid,
    #[serde(flatten)]
    pub values: Fields,
}

impl Settings {
    fn from_document(doc: Document) -> Result<Self, StoreError> {
        Ok(Self { id: doc.id, values: doc.fields })
    }
}

#[derive(Clone)]
pub struct SettingsService {
    store: SharedStore,
}

impl SettingsService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// The first settings document, if one was ever written.
    pub async fn get(&self) -> Result<Option<Settings>, StoreError> {
        let docs = self
            .store
            .list(COLLECTION, None)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to load settings"))?;
        docs.into_iter().next().map(Settings::from_document).transpose()
    }

    /// Merge `values` into the settings document, creating it on first use.
    pub async fn update(&self, mut values: Fields) -> Result<Settings, StoreError> {
        values.remove("id");
        let now = Utc::now();
        stamp(&mut values, "updated_at", now);

        let id = match self.get().await? {
            Some(existing) => {
                self.store
                    .update(COLLECTION, existing.id, values)
                    .await
                    .inspect_err(|e| tracing::error!(error = %e, "failed to update settings"))?;
                existing.id
            }
            None => {
                stamp(&mut values, "created_at", now);
                self.store
                    .add(COLLECTION, values)
                    .await
                    .inspect_err(|e| tracing::error!(error = %e, "failed to create settings"))?
            }
        };

        let doc = self
            .store
            .get(COLLECTION, id)
            .await?
            .ok_or(StoreError::NotFound { collection: COLLECTION, id })?;
        Settings::from_document(doc)
    }

    pub fn subscribe(&self) -> SnapshotSubscription<Settings> {
        SnapshotSubscription::new(self.store.clone(), COLLECTION, None, Settings::from_document)
    }
}
