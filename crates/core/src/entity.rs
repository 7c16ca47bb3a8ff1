//! Entity trait: identity + continuity across state changes.

/// Something identified by a stable key rather than by its attribute values.
///
/// A voucher keeps its identity when one of its lines is corrected; two vouchers
/// with identical lines are still two different vouchers.
pub trait Entity {
    /// Identifier type (a voucher reference, an account code, ...).
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
