use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use nostify_core::AggregateId;
use nostify_events::{Aggregate, Event};

use super::encode;
use super::r#trait::{DocumentFilter, StateStore, StoreError, UpsertOutcome};

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

/// In-memory state store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    containers: RwLock<HashMap<String, BTreeMap<AggregateId, JsonValue>>>,
    events: RwLock<HashMap<AggregateId, Vec<Event>>>,
    rejected_upserts: RwLock<HashSet<AggregateId>>,
    bulk_upsert_calls: AtomicUsize,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to an aggregate's event history.
    pub fn append(&self, event: Event) -> Result<(), StoreError> {
        let mut events = self.events.write().map_err(|_| poisoned())?;
        events.entry(event.aggregate_root_id()).or_default().push(event);
        Ok(())
    }

    /// Write a current-state document directly.
    pub fn put_document(
        &self,
        container: &str,
        id: AggregateId,
        document: JsonValue,
    ) -> Result<(), StoreError> {
        let mut containers = self.containers.write().map_err(|_| poisoned())?;
        containers
            .entry(container.to_string())
            .or_default()
            .insert(id, document);
        Ok(())
    }

    /// Write an aggregate's current state into its own container.
    pub fn put<A: Aggregate>(&self, aggregate: &A) -> Result<(), StoreError> {
        self.put_document(A::AGGREGATE_TYPE, aggregate.id(), encode(aggregate)?)
    }

    pub fn document(&self, container: &str, id: AggregateId) -> Option<JsonValue> {
        let containers = self.containers.read().ok()?;
        containers.get(container)?.get(&id).cloned()
    }

    pub fn container_len(&self, container: &str) -> usize {
        self.containers
            .read()
            .ok()
            .and_then(|c| c.get(container).map(BTreeMap::len))
            .unwrap_or(0)
    }

    /// Make every later upsert of `id` fail (per-item failure simulation).
    pub fn reject_upserts_for(&self, id: AggregateId) {
        if let Ok(mut rejected) = self.rejected_upserts.write() {
            rejected.insert(id);
        }
    }

    pub fn bulk_upsert_calls(&self) -> usize {
        self.bulk_upsert_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load_document(
        &self,
        container: &str,
        id: AggregateId,
    ) -> Result<Option<JsonValue>, StoreError> {
        let containers = self.containers.read().map_err(|_| poisoned())?;
        Ok(containers.get(container).and_then(|c| c.get(&id)).cloned())
    }

    async fn query_documents(
        &self,
        container: &str,
        filter: DocumentFilter,
    ) -> Result<Vec<JsonValue>, StoreError> {
        let containers = self.containers.read().map_err(|_| poisoned())?;
        Ok(containers
            .get(container)
            .map(|c| c.values().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn load_event_history(&self, aggregate_id: AggregateId) -> Result<Vec<Event>, StoreError> {
        let events = self.events.read().map_err(|_| poisoned())?;
        Ok(events.get(&aggregate_id).cloned().unwrap_or_default())
    }

    async fn bulk_upsert(
        &self,
        container: &str,
        documents: Vec<(AggregateId, JsonValue)>,
    ) -> Result<Vec<UpsertOutcome>, StoreError> {
        self.bulk_upsert_calls.fetch_add(1, Ordering::Relaxed);

        let rejected = self.rejected_upserts.read().map_err(|_| poisoned())?.clone();
        let mut containers = self.containers.write().map_err(|_| poisoned())?;
        let target = containers.entry(container.to_string()).or_default();

        let mut outcomes = Vec::with_capacity(documents.len());
        for (id, document) in documents {
            if rejected.contains(&id) {
                outcomes.push(UpsertOutcome::failed(id, "write rejected"));
                continue;
            }
            target.insert(id, document);
            outcomes.push(UpsertOutcome::ok(id));
        }
        Ok(outcomes)
    }

    async fn delete_all(&self, container: &str) -> Result<u64, StoreError> {
        let mut containers = self.containers.write().map_err(|_| poisoned())?;
        Ok(containers
            .remove(container)
            .map(|c| c.len() as u64)
            .unwrap_or(0))
    }
}
