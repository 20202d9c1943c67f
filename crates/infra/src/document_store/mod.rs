//! Document store boundary.
//!
//! A flat, schemaless collection/document model with change notifications.
//! Backends: in-memory (tests/dev) and SQLite (single-node persistence).

pub mod in_memory;
pub mod query;
pub mod sqlite;
pub mod r#trait;

use std::sync::Arc;

pub use in_memory::InMemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;
pub use r#trait::{
    ChangeKind, ChangeNotice, Collection, Document, DocumentStore, FieldEdit, Fields, OrderBy,
    SharedStore, StoreError,
};

use crate::config::StoreBackend;

/// Open the configured backend.
pub async fn connect(backend: &StoreBackend) -> Result<SharedStore, StoreError> {
    match backend {
        StoreBackend::Memory => {
            tracing::info!("using in-memory document store (data is lost on exit)");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
        StoreBackend::Sqlite { url } => {
            tracing::info!(url = %url, "using sqlite document store");
            Ok(Arc::new(SqliteDocumentStore::connect(url).await?))
        }
    }
}
