use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde_json::Value as JsonValue;

use quantii_core::{ItemId, Money, TransactionId, find_by_id};
use quantii_infra::{
    Collection, Document, DocumentStore, Fields, InventoryService, SharedStore, TransactionService,
    probe_connection,
};
use quantii_inventory::{InventoryItem, ItemFields};
use quantii_sales::{CartLine, NewTransaction, format_timestamp};

/// Marks documents written by the smoke test.
const TEST_MARKER: &str = "is_test_data";

/// Suggested fix for a store failure message, when we recognise it.
pub fn remedy_for(message: &str) -> Option<&'static str> {
    let message = message.to_lowercase();
    if message.contains("unable to open database file") {
        Some("hint: the database directory must exist; add `?mode=rwc` to create the file")
    } else if message.contains("readonly") || message.contains("read-only") {
        Some("hint: the database file is read-only; check its permissions")
    } else if message.contains("locked") || message.contains("busy") {
        Some("hint: another process holds the database; stop it or change QUANTII_DATABASE_URL")
    } else if message.contains("permission denied") {
        Some("hint: the current user cannot access the database path")
    } else {
        None
    }
}

pub async fn run_check(store: &dyn DocumentStore) -> bool {
    let report = probe_connection(store).await;

    for step in &report.steps {
        let mark = if step.ok { "ok  " } else { "FAIL" };
        println!("[{mark}] {:?}: {}", step.step, step.detail);
    }

    match report.first_failure() {
        None => println!("store is healthy"),
        Some(failure) => {
            if let Some(hint) = remedy_for(&failure.detail) {
                println!("{hint}");
            }
        }
    }

    report.is_healthy()
}

pub async fn run_smoke(store: SharedStore) -> Result<bool> {
    let inventory = InventoryService::new(store.clone());
    let transactions = TransactionService::new(store.clone());

    // Inventory round trip.
    let fields = ItemFields {
        name: "Smoke Test Item".to_string(),
        price: Money::from_cents(999),
        stock: 10,
        category: "Test".to_string(),
        sku: format!("TEST{}", Utc::now().timestamp_millis()),
    };
    let item_id = ItemId::from_uuid(
        store
            .add(Collection::Inventory, marked(&fields)?)
            .await
            .context("failed to add test item")?,
    );
    println!("added test item {item_id}");

    let items = inventory.get_all().await.context("failed to list inventory")?;
    println!("inventory holds {} item(s)", items.len());
    if find_by_id(&items, &item_id).is_none() {
        bail!("test item {item_id} missing from inventory listing");
    }

    inventory.delete(item_id).await.context("failed to delete test item")?;
    println!("deleted test item");

    // Transaction round trip.
    let item = InventoryItem::from_fields(item_id, fields);
    let now = Utc::now();
    let sale = NewTransaction {
        items: vec![CartLine::from_item(&item)],
        total: item.price,
        timestamp: now,
        timestamp_formatted: format_timestamp(now),
    };
    let transaction_id = TransactionId::from_uuid(
        store
            .add(Collection::Transactions, marked(&sale)?)
            .await
            .context("failed to add test transaction")?,
    );
    println!("added test transaction {transaction_id}");

    let recorded = transactions.get_all().await.context("failed to list transactions")?;
    println!("{} transaction(s) on record", recorded.len());
    if find_by_id(&recorded, &transaction_id).is_none() {
        bail!("test transaction {transaction_id} missing from listing");
    }

    transactions
        .delete(transaction_id)
        .await
        .context("failed to delete test transaction")?;
    println!("deleted test transaction");

    println!("smoke test passed");
    Ok(true)
}

pub async fn run_seed(store: SharedStore) -> Result<bool> {
    let seeded = InventoryService::new(store)
        .seed_if_empty()
        .await
        .context("failed to seed inventory")?;

    if seeded == 0 {
        println!("inventory already has items; nothing seeded");
    } else {
        println!("seeded {seeded} demo item(s)");
    }
    Ok(true)
}

fn marked<T: serde::Serialize>(value: &T) -> Result<Fields> {
    let mut fields = Document::encode(value)?;
    fields.insert(TEST_MARKER.to_string(), JsonValue::Bool(true));
    fields.insert("created_at".to_string(), JsonValue::String(Utc::now().to_rfc3339()));
    Ok(fields)
}
