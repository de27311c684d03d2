use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use thiserror::Error;

use nostify_core::AggregateId;
use nostify_events::Event;

/// Document field holding an aggregate's soft-delete flag.
pub const DELETED_FIELD: &str = "isDeleted";

/// Document field holding a projection's readiness flag.
pub const INITIALIZED_FIELD: &str = "initialized";

/// State store operation error.
///
/// These are **infrastructure errors** (availability, encoding) as opposed to
/// domain errors (validation, invariants). Retrying transient failures is the
/// store's business; callers only see the final outcome.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to encode document: {0}")]
    Encode(String),

    #[error("failed to decode document: {0}")]
    Decode(String),
}

/// Which documents a container query returns.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DocumentFilter {
    All,
    /// Documents whose `isDeleted` flag is not `true`.
    NotDeleted,
    /// Documents whose `initialized` flag is not `true`.
    Uninitialized,
}

impl DocumentFilter {
    pub fn matches(self, document: &JsonValue) -> bool {
        let flag = |field: &str| document.get(field).and_then(JsonValue::as_bool) == Some(true);
        match self {
            DocumentFilter::All => true,
            DocumentFilter::NotDeleted => !flag(DELETED_FIELD),
            DocumentFilter::Uninitialized => !flag(INITIALIZED_FIELD),
        }
    }
}

/// Outcome of writing one document in a bulk upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub id: AggregateId,
    pub error: Option<String>,
}

impl UpsertOutcome {
    pub fn ok(id: AggregateId) -> Self {
        Self { id, error: None }
    }

    pub fn failed(id: AggregateId, error: impl Into<String>) -> Self {
        Self {
            id,
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Event history + current-state document store.
///
/// Documents live in named containers (one per aggregate or projection type)
/// and are keyed by aggregate id. The event history is the source of truth;
/// containers are current-state caches and read models that can be rebuilt.
///
/// ## Implementation Requirements
///
/// - `load_event_history` returns every event for the aggregate. Order is not
///   relied upon; callers sort with [`order_events`](nostify_events::order_events).
/// - `bulk_upsert` reports one outcome per document; one bad document must not
///   fail the others.
/// - `delete_all` only touches the named container.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load_document(
        &self,
        container: &str,
        id: AggregateId,
    ) -> Result<Option<JsonValue>, StoreError>;

    async fn query_documents(
        &self,
        container: &str,
        filter: DocumentFilter,
    ) -> Result<Vec<JsonValue>, StoreError>;

    async fn load_event_history(&self, aggregate_id: AggregateId) -> Result<Vec<Event>, StoreError>;

    async fn bulk_upsert(
        &self,
        container: &str,
        documents: Vec<(AggregateId, JsonValue)>,
    ) -> Result<Vec<UpsertOutcome>, StoreError>;

    /// Remove every document in `container`, returning how many were removed.
    async fn delete_all(&self, container: &str) -> Result<u64, StoreError>;
}

#[async_trait]
impl<S> StateStore for Arc<S>
where
    S: StateStore + ?Sized,
{
    async fn load_document(
        &self,
        container: &str,
        id: AggregateId,
    ) -> Result<Option<JsonValue>, StoreError> {
        (**self).load_document(container, id).await
    }

    async fn query_documents(
        &self,
        container: &str,
        filter: DocumentFilter,
    ) -> Result<Vec<JsonValue>, StoreError> {
        (**self).query_documents(container, filter).await
    }

    async fn load_event_history(&self, aggregate_id: AggregateId) -> Result<Vec<Event>, StoreError> {
        (**self).load_event_history(aggregate_id).await
    }

    async fn bulk_upsert(
        &self,
        container: &str,
        documents: Vec<(AggregateId, JsonValue)>,
    ) -> Result<Vec<UpsertOutcome>, StoreError> {
        (**self).bulk_upsert(container, documents).await
    }

    async fn delete_all(&self, container: &str) -> Result<u64, StoreError> {
        (**self).delete_all(container).await
    }
}
