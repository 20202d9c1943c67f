//! `quantii-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no storage, no HTTP).

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use entity::{Entity, find_by_id};
pub use error::{DomainError, DomainResult};
pub use id::{ItemId, SessionId, TransactionId};
pub use money::Money;
pub use value_object::ValueObject;
