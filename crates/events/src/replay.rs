//! Aggregate replay: fold an ordered event history into current state.
//!
//! Ordering within one aggregate is by timestamp, ties broken by event id, so
//! replay is deterministic regardless of the order the store returned events in.

use chrono::{DateTime, Utc};

use nostify_core::{AggregateId, DomainError, DomainResult};

use crate::{Aggregate, Event};

/// Sort events into replay order (timestamp, then event id).
pub fn order_events(events: &mut [Event]) {
    events.sort_by(|a, b| {
        a.timestamp()
            .cmp(&b.timestamp())
            .then_with(|| a.id().cmp(&b.id()))
    });
}

/// Apply already-ordered events to `aggregate`, rejecting events that belong
/// to a different aggregate. Returns the number of events applied.
pub fn apply_events<'a, A: Aggregate>(
    aggregate: &mut A,
    events: impl IntoIterator<Item = &'a Event>,
) -> DomainResult<usize> {
    let id = aggregate.id();
    let mut applied = 0;
    for event in events {
        if event.aggregate_root_id() != id {
            return Err(DomainError::invalid_argument(
                "events",
                format!(
                    "event {} targets aggregate {}, not {id}",
                    event.id(),
                    event.aggregate_root_id()
                ),
            ));
        }
        aggregate.apply(event)?;
        applied += 1;
    }
    Ok(applied)
}

/// Rebuild an aggregate from its full history.
pub fn rehydrate<A: Aggregate>(id: AggregateId, events: Vec<Event>) -> DomainResult<A> {
    rehydrate_until(id, events, None)
}

/// Rebuild an aggregate from the part of its history at or before `point_in_time`.
pub fn rehydrate_until<A: Aggregate>(
    id: AggregateId,
    mut events: Vec<Event>,
    point_in_time: Option<DateTime<Utc>>,
) -> DomainResult<A> {
    if let Some(cutoff) = point_in_time {
        events.retain(|e| e.timestamp() <= cutoff);
    }
    order_events(&mut events);

    let mut aggregate = A::empty(id);
    apply_events(&mut aggregate, &events)?;
    Ok(aggregate)
}
