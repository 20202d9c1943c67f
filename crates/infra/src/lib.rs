//! Infrastructure layer: document store backends, collection wrappers, config.

pub mod config;
pub mod diagnostics;
pub mod document_store;
pub mod services;

pub use config::{AppConfig, ConfigError, StoreBackend};
pub use diagnostics::{ProbeReport, ProbeStep, StepOutcome, probe_connection};
pub use document_store::{
    ChangeKind, ChangeNotice, Collection, Document, DocumentStore, FieldEdit, Fields,
    InMemoryDocumentStore, OrderBy, SharedStore, SqliteDocumentStore, StoreError, connect,
};
pub use services::{
    InventoryService, Settings, SettingsService, SnapshotSubscription, TransactionService,
};
