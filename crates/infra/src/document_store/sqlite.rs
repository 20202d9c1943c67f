//! SQLite-backed document store.
//!
//! One `documents` table keyed by `(collection, id)`; fields live in a JSON
//! text column. `seq` preserves insertion order. Read-modify-write
//! operations are serialized per store so concurrent edits cannot interleave.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tokio::sync::{Mutex, broadcast};
use uuid::Uuid;

use super::query::{merge_fields, sort_documents};
use super::r#trait::{
    ChangeKind, ChangeNotice, Collection, Document, DocumentStore, FieldEdit, Fields, OrderBy,
    StoreError,
};

const NOTICE_CAPACITY: usize = 256;

pub struct SqliteDocumentStore {
    pool: SqlitePool,
    notices: broadcast::Sender<ChangeNotice>,
    edit_lock: Mutex<()>,
}

impl SqliteDocumentStore {
    /// Connect (creating the database file if the URL allows it) and ensure
    /// the schema.
    ///
    /// `sqlite::memory:` gets a single connection so every query sees the
    /// same database.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = if url.contains(":memory:") {
            // The database lives and dies with its one connection.
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().max_connections(5).connect_with(options).await?
        };

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                seq        INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                id         TEXT NOT NULL,
                data       TEXT NOT NULL,
                UNIQUE (collection, id)
            )
            "#,
        )
        .execute(&pool)
        .await?;

        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Ok(Self { pool, notices, edit_lock: Mutex::new(()) })
    }

    fn notify(&self, collection: Collection, id: Option<Uuid>, kind: ChangeKind) {
        let _ = self.notices.send(ChangeNotice { collection, id, kind });
    }

    fn row_to_document(row: &sqlx::sqlite::SqliteRow) -> Result<Document, StoreError> {
        let id: String = row.try_get("id")?;
        let data: String = row.try_get("data")?;

        let id = Uuid::parse_str(&id)
            .map_err(|e| StoreError::Invalid(format!("bad document id '{id}': {e}")))?;
        let fields: Fields = serde_json::from_str(&data)?;
        Ok(Document { id, fields })
    }

    /// One read-modify-write inside a transaction; returns the fields from
    /// before the edit.
    async fn edit_row(
        &self,
        collection: Collection,
        id: Uuid,
        edit: impl FnOnce(&mut Fields),
    ) -> Result<Fields, StoreError> {
        let _guard = self.edit_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT id, data FROM documents WHERE collection = ?1 AND id = ?2")
            .bind(collection.as_str())
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound { collection, id })?;

        let mut doc = Self::row_to_document(&row)?;
        let before = doc.fields.clone();
        edit(&mut doc.fields);

        sqlx::query("UPDATE documents SET data = ?3 WHERE collection = ?1 AND id = ?2")
            .bind(collection.as_str())
            .bind(id.to_string())
            .bind(serde_json::to_string(&doc.fields)?)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.notify(collection, Some(id), ChangeKind::Modified);
        Ok(before)
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn list(
        &self,
        collection: Collection,
        order: Option<&OrderBy>,
    ) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query("SELECT id, data FROM documents WHERE collection = ?1 ORDER BY seq")
            .bind(collection.as_str())
            .fetch_all(&self.pool)
            .await?;

        let mut docs =
            rows.iter().map(Self::row_to_document).collect::<Result<Vec<_>, _>>()?;
        if let Some(order) = order {
            sort_documents(&mut docs, order);
        }
        Ok(docs)
    }

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query("SELECT id, data FROM documents WHERE collection = ?1 AND id = ?2")
            .bind(collection.as_str())
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_document).transpose()
    }

    async fn add(&self, collection: Collection, fields: Fields) -> Result<Uuid, StoreError> {
        let id = Uuid::now_v7();
        let data = serde_json::to_string(&fields)?;

        sqlx::query("INSERT INTO documents (collection, id, data) VALUES (?1, ?2, ?3)")
            .bind(collection.as_str())
            .bind(id.to_string())
            .bind(data)
            .execute(&self.pool)
            .await?;

        self.notify(collection, Some(id), ChangeKind::Added);
        Ok(id)
    }

    async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.edit_row(collection, id, |target| merge_fields(target, fields)).await.map(|_| ())
    }

    async fn modify(
        &self,
        collection: Collection,
        id: Uuid,
        edit: FieldEdit<'_>,
    ) -> Result<Fields, StoreError> {
        self.edit_row(collection, id, edit).await
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ?1 AND id = ?2")
            .bind(collection.as_str())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            self.notify(collection, Some(id), ChangeKind::Removed);
        }
        Ok(removed)
    }

    async fn clear(&self, collection: Collection) -> Result<usize, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ?1")
            .bind(collection.as_str())
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() as usize;
        if removed > 0 {
            self.notify(collection, None, ChangeKind::Cleared);
        }
        Ok(removed)
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeNotice> {
        self.notices.subscribe()
    }
}
