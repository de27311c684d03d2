//! State store boundary.
//!
//! The store is an external collaborator; this module defines the contract the
//! rehydration core is written against, typed helpers on top of it, and an
//! in-memory implementation for tests/dev.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryStateStore;
pub use r#trait::{
    DELETED_FIELD, DocumentFilter, INITIALIZED_FIELD, StateStore, StoreError, UpsertOutcome,
};

use serde::Serialize;
use serde_json::Value as JsonValue;

use nostify_core::AggregateId;
use nostify_events::Aggregate;

/// Encode a value as a store document.
pub fn encode<T: Serialize>(value: &T) -> Result<JsonValue, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Encode(e.to_string()))
}

/// Load and decode the current state of one aggregate, if it exists.
pub async fn load_aggregate<A, S>(store: &S, id: AggregateId) -> Result<Option<A>, StoreError>
where
    A: Aggregate,
    S: StateStore + ?Sized,
{
    match store.load_document(A::AGGREGATE_TYPE, id).await? {
        None => Ok(None),
        Some(document) => serde_json::from_value(document)
            .map(Some)
            .map_err(|e| StoreError::Decode(format!("{} {id}: {e}", A::AGGREGATE_TYPE))),
    }
}
