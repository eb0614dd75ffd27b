//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Version snapshots hold value objects: two snapshots with equal content are
/// interchangeable, which is what lets a rollback copy an earlier version's
/// content into a fresh version.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
