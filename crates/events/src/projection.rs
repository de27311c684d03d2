use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use nostify_core::{AggregateId, DomainError, DomainResult, PartitionKey, UserId};

use crate::{Aggregate, Command, Event};

/// Readiness of a projection instance.
///
/// Transitions only move forward:
/// `Uninitialized → Rehydrating → Initialized`.
///
/// Persisted as the boolean `initialized` flag, so `Rehydrating` is stored as
/// `false` and is never served as ready.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InitState {
    #[default]
    Uninitialized,
    Rehydrating,
    Initialized,
}

impl InitState {
    /// Move to `next` unless that would go backwards.
    pub fn advance(self, next: InitState) -> InitState {
        self.max(next)
    }

    pub fn is_initialized(self) -> bool {
        self == InitState::Initialized
    }
}

impl Serialize for InitState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.is_initialized())
    }
}

impl<'de> Deserialize<'de> for InitState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(if bool::deserialize(deserializer)? {
            InitState::Initialized
        } else {
            InitState::Uninitialized
        })
    }
}

/// A read-side entity built from an aggregate plus externally sourced data.
///
/// Projections apply events exactly like aggregates do. They are seeded from
/// their source aggregate with a `projection.init` event whose payload is the
/// aggregate's serialized state, then receive [`ExternalDataEvent`]s through
/// the same [`Aggregate::apply`].
pub trait Projection: Aggregate {
    /// The aggregate this projection is derived from (same id).
    type Source: Aggregate;

    fn init_state(&self) -> InitState;

    /// Store the new state. Callers go through [`advance_init_state`].
    fn set_init_state(&mut self, state: InitState);

    fn is_initialized(&self) -> bool {
        self.init_state().is_initialized()
    }
}

/// Forward-only state transition for a projection instance.
pub fn advance_init_state<P: Projection>(projection: &mut P, next: InitState) {
    let state = projection.init_state().advance(next);
    projection.set_init_state(state);
}

/// The `projection.init` event that seeds a projection from its source aggregate.
pub fn init_event<A: Aggregate>(source: &A) -> DomainResult<Event> {
    let payload = serde_json::to_value(source).map_err(|e| {
        DomainError::serialization(format!("{} {}: {e}", A::AGGREGATE_TYPE, source.id()))
    })?;
    Ok(Event::from_parts(
        Uuid::now_v7(),
        source.id(),
        Command::projection_init(),
        payload,
        Utc::now(),
        UserId::nil(),
        PartitionKey::nil(),
    ))
}

/// Externally fetched events destined for one projection instance.
///
/// The inner events usually belong to other aggregates (that is the point); they
/// are applied in order to the projection identified by `aggregate_root_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalDataEvent {
    aggregate_root_id: AggregateId,
    events: Vec<Event>,
}

impl ExternalDataEvent {
    pub fn new(aggregate_root_id: AggregateId, events: Vec<Event>) -> Self {
        Self {
            aggregate_root_id,
            events,
        }
    }

    pub fn aggregate_root_id(&self) -> AggregateId {
        self.aggregate_root_id
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}
