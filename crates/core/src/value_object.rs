//! Value object trait: equality by value, not identity.
//!
//! A value object has no identity. Two instances holding the same values are
//! the same value (e.g. `Money(350)` is `$3.50` wherever it appears).

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by value. To "modify" one, build a
/// new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Sku(String);
///
/// impl ValueObject for Sku {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
