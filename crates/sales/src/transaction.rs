use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quantii_core::{Entity, Money, TransactionId};

use crate::cart::CartLine;

/// Receipt-style rendering, e.g. `3/14/2025, 9:05:07 AM`.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// A sale ready to be appended to the `transactions` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub items: Vec<CartLine>,
    pub total: Money,
    pub timestamp: DateTime<Utc>,
    pub timestamp_formatted: String,
}

/// A recorded sale. Append-only: never updated once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub items: Vec<CartLine>,
    pub total: Money,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub timestamp_formatted: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Transaction {
    pub fn from_new(id: TransactionId, new: NewTransaction) -> Self {
        Self {
            id,
            items: new.items,
            total: new.total,
            timestamp: new.timestamp,
            timestamp_formatted: new.timestamp_formatted,
            created_at: None,
        }
    }

    pub fn units(&self) -> u64 {
        self.items.iter().map(|l| u64::from(l.quantity)).sum()
    }
}

/// Dashboard roll-up of recorded sales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub count: usize,
    pub revenue: Money,
    pub units_sold: u64,
}

impl TransactionSummary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        Self {
            count: transactions.len(),
            revenue: transactions.iter().map(|t| t.total).sum(),
            units_sold: transactions.iter().map(Transaction::units).sum(),
        }
    }
}
