//! Aggregate root trait shared by write-side aggregates and read-side projections.

use crate::id::AggregateId;

/// Identity + soft-delete status of an event-sourced entity.
///
/// State transitions are defined on top of this in `nostify-events` (the
/// `Aggregate::apply` capability); this trait carries only what the runtime
/// needs without knowing the event shape.
pub trait AggregateRoot {
    /// Returns the aggregate identifier.
    fn id(&self) -> AggregateId;

    /// Terminal soft-delete flag. Deleted aggregates are skipped by rebuilds.
    fn is_deleted(&self) -> bool;
}
