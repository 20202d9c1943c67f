use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Flat field map of a stored document (no schema beyond field names).
pub type Fields = serde_json::Map<String, JsonValue>;

/// The flat collections the till keeps.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Inventory,
    Transactions,
    Settings,
    /// Scratch space for connection probes.
    Diagnostics,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Inventory => "inventory",
            Collection::Transactions => "transactions",
            Collection::Settings => "settings",
            Collection::Diagnostics => "diagnostics",
        }
    }
}

impl core::fmt::Display for Collection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored document: store-assigned id plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub fields: Fields,
}

impl Document {
    /// Decode into a domain record, exposing the document id as `id`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, StoreError> {
        let mut fields = self.fields;
        fields.insert("id".to_string(), JsonValue::String(self.id.to_string()));
        Ok(serde_json::from_value(JsonValue::Object(fields))?)
    }

    /// Flatten `value` into document fields. `value` must serialize to a JSON object.
    pub fn encode<T: Serialize>(value: &T) -> Result<Fields, StoreError> {
        match serde_json::to_value(value)? {
            JsonValue::Object(mut fields) => {
                fields.remove("id");
                Ok(fields)
            }
            other => Err(StoreError::Invalid(format!(
                "documents must be JSON objects, got {other}"
            ))),
        }
    }
}

/// Sort order for `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self { field: field.into(), descending: false }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self { field: field.into(), descending: true }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
    Cleared,
}

/// Broadcast after every successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeNotice {
    pub collection: Collection,
    /// `None` for collection-wide changes.
    pub id: Option<Uuid>,
    pub kind: ChangeKind,
}

/// In-place edit applied by [`DocumentStore::modify`].
pub type FieldEdit<'a> = &'a (dyn Fn(&mut Fields) + Send + Sync);

/// Document store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{collection} document {id} not found")]
    NotFound { collection: Collection, id: Uuid },

    #[error("invalid document: {0}")]
    Invalid(String),

    #[error("document encoding failed: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Schemaless document store with change notifications.
///
/// Semantics every backend follows:
/// - `add` assigns a fresh time-ordered id and returns it
/// - `update` merges the given fields into an existing document
///   (`NotFound` if there is none)
/// - `modify` runs a read-modify-write that no other write can interleave
///   with, returning the fields as they were before the edit
/// - `delete` of a missing document is a no-op returning `false`
/// - `list` without an order returns documents in insertion order
/// - every successful write broadcasts a [`ChangeNotice`]; lagging receivers
///   lose notices, not data
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list(
        &self,
        collection: Collection,
        order: Option<&OrderBy>,
    ) -> Result<Vec<Document>, StoreError>;

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, StoreError>;

    async fn add(&self, collection: Collection, fields: Fields) -> Result<Uuid, StoreError>;

    async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        fields: Fields,
    ) -> Result<(), StoreError>;

    async fn modify(
        &self,
        collection: Collection,
        id: Uuid,
        edit: FieldEdit<'_>,
    ) -> Result<Fields, StoreError>;

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, StoreError>;

    /// Remove every document in `collection`; returns how many went.
    async fn clear(&self, collection: Collection) -> Result<usize, StoreError>;

    fn subscribe(&self) -> broadcast::Receiver<ChangeNotice>;
}

/// Store handle shared across the process.
pub type SharedStore = Arc<dyn DocumentStore>;

#[async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn list(
        &self,
        collection: Collection,
        order: Option<&OrderBy>,
    ) -> Result<Vec<Document>, StoreError> {
        (**self).list(collection, order).await
    }

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, StoreError> {
        (**self).get(collection, id).await
    }

    async fn add(&self, collection: Collection, fields: Fields) -> Result<Uuid, StoreError> {
        (**self).add(collection, fields).await
    }

    async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        fields: Fields,
    ) -> Result<(), StoreError> {
        (**self).update(collection, id, fields).await
    }

    async fn modify(
        &self,
        collection: Collection,
        id: Uuid,
        edit: FieldEdit<'_>,
    ) -> Result<Fields, StoreError> {
        (**self).modify(collection, id, edit).await
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, StoreError> {
        (**self).delete(collection, id).await
    }

    async fn clear(&self, collection: Collection) -> Result<usize, StoreError> {
        (**self).clear(collection).await
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeNotice> {
        (**self).subscribe()
    }
}
