use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::query::{merge_fields, sort_documents};
use super::r#trait::{
    ChangeKind, ChangeNotice, Collection, Document, DocumentStore, FieldEdit, Fields, OrderBy,
    StoreError,
};

const NOTICE_CAPACITY: usize = 256;

/// In-memory document store.
///
/// Intended for tests/dev. Each collection keeps insertion order.
#[derive(Debug)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
    notices: broadcast::Sender<ChangeNotice>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            collections: RwLock::new(HashMap::new()),
            notices,
        }
    }

    fn notify(&self, collection: Collection, id: Option<Uuid>, kind: ChangeKind) {
        // No receivers is fine.
        let _ = self.notices.send(ChangeNotice { collection, id, kind });
    }

    fn poisoned() -> StoreError {
        StoreError::Backend("lock poisoned".to_string())
    }

    /// Edit one document under the write lock; returns its fields from before.
    fn edit_in_place(
        &self,
        collection: Collection,
        id: Uuid,
        edit: impl FnOnce(&mut Fields),
    ) -> Result<Fields, StoreError> {
        let before = {
            let mut map = self.collections.write().map_err(|_| Self::poisoned())?;
            let doc = map
                .get_mut(&collection)
                .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
                .ok_or(StoreError::NotFound { collection, id })?;
            let before = doc.fields.clone();
            edit(&mut doc.fields);
            before
        };
        self.notify(collection, Some(id), ChangeKind::Modified);
        Ok(before)
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn list(
        &self,
        collection: Collection,
        order: Option<&OrderBy>,
    ) -> Result<Vec<Document>, StoreError> {
        let mut docs = {
            let map = self.collections.read().map_err(|_| Self::poisoned())?;
            map.get(&collection).cloned().unwrap_or_default()
        };
        if let Some(order) = order {
            sort_documents(&mut docs, order);
        }
        Ok(docs)
    }

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, StoreError> {
        let map = self.collections.read().map_err(|_| Self::poisoned())?;
        Ok(map
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn add(&self, collection: Collection, fields: Fields) -> Result<Uuid, StoreError> {
        let id = Uuid::now_v7();
        {
            let mut map = self.collections.write().map_err(|_| Self::poisoned())?;
            map.entry(collection).or_default().push(Document { id, fields });
        }
        self.notify(collection, Some(id), ChangeKind::Added);
        Ok(id)
    }

    async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.edit_in_place(collection, id, |target| merge_fields(target, fields)).map(|_| ())
    }

    async fn modify(
        &self,
        collection: Collection,
        id: Uuid,
        edit: FieldEdit<'_>,
    ) -> Result<Fields, StoreError> {
        self.edit_in_place(collection, id, edit)
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, StoreError> {
        let removed = {
            let mut map = self.collections.write().map_err(|_| Self::poisoned())?;
            match map.get_mut(&collection) {
                Some(docs) => {
                    let before = docs.len();
                    docs.retain(|d| d.id != id);
                    docs.len() != before
                }
                None => false,
            }
        };
        if removed {
            self.notify(collection, Some(id), ChangeKind::Removed);
        }
        Ok(removed)
    }

    async fn clear(&self, collection: Collection) -> Result<usize, StoreError> {
        let removed = {
            let mut map = self.collections.write().map_err(|_| Self::poisoned())?;
            map.remove(&collection).map(|docs| docs.len()).unwrap_or(0)
        };
        if removed > 0 {
            self.notify(collection, None, ChangeKind::Cleared);
        }
        Ok(removed)
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeNotice> {
        self.notices.subscribe()
    }
}
