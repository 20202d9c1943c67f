//! Sales domain module: the till cart, checkout and recorded transactions.
//!
//! Pure domain logic (no IO, no HTTP, no storage). Persisting a checkout is the
//! caller's job.

pub mod cart;
pub mod checkout;
pub mod transaction;

pub use cart::{Cart, CartLine};
pub use checkout::Checkout;
pub use transaction::{NewTransaction, Transaction, TransactionSummary, format_timestamp};
