//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Debit/credit summaries, line items and balance sides are values: two of them
/// with the same fields are interchangeable, and "changing" one means building a
/// new one. Entities (see [`crate::Entity`]) are the opposite case.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct Summary { debit: Decimal, credit: Decimal }
///
/// impl ValueObject for Summary {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
