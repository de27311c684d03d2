//! Projection rehydration.
//!
//! A projection is seeded from its source aggregate's state (a `projection.init`
//! event through the ordinary `apply`), then converged with whatever external
//! data the provider returns for the batch, and finally marked initialized.
//!
//! ```text
//! ids ─► load aggregates ─► seed projections (Rehydrating)
//!                                 │
//!                 one batched fetch_external_data call
//!                                 │
//!                 apply ExternalDataEvents ─► Initialized ─► (bulk upsert)
//! ```
//!
//! Failures are collected per aggregate in an [`InitReport`]; one bad item
//! never aborts the batch. Cancellation aborts the whole call and no
//! projection from it is handed back, so nothing cancelled is ever observed as
//! initialized.

use std::collections::{HashMap, HashSet};
use std::future::Future;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use nostify_core::{AggregateId, AggregateRoot};
use nostify_events::{
    Aggregate, Event, InitState, Projection, advance_init_state, init_event, order_events,
    payload_id, rehydrate_until,
};

use crate::external::{ExternalDataBatch, ExternalDataProvider};
use crate::store::{DocumentFilter, StateStore, StoreError, encode, load_aggregate};

/// Errors that abort a whole initializer call.
#[derive(Debug, Error)]
pub enum RehydrationError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("rehydration cancelled")]
    Cancelled,
}

/// Where a single projection's rehydration failed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InitStage {
    Load,
    Replay,
    Seed,
    ExternalData,
    Apply,
    Persist,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitFailure {
    pub aggregate_id: AggregateId,
    pub stage: InitStage,
    pub reason: String,
}

/// Converged projections plus the per-item failures of one call.
#[derive(Debug, Clone)]
pub struct InitReport<P> {
    pub projections: Vec<P>,
    pub failures: Vec<InitFailure>,
}

impl<P> InitReport<P> {
    fn new() -> Self {
        Self {
            projections: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn fail(&mut self, aggregate_id: AggregateId, stage: InitStage, reason: impl ToString) {
        self.failures.push(InitFailure {
            aggregate_id,
            stage,
            reason: reason.to_string(),
        });
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failure(&self, aggregate_id: AggregateId) -> Option<&InitFailure> {
        self.failures.iter().find(|f| f.aggregate_id == aggregate_id)
    }
}

impl<P: AggregateRoot> InitReport<P> {
    pub fn get(&self, aggregate_id: AggregateId) -> Option<&P> {
        self.projections.iter().find(|p| p.id() == aggregate_id)
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<(), RehydrationError> {
    if cancel.is_cancelled() {
        Err(RehydrationError::Cancelled)
    } else {
        Ok(())
    }
}

async fn until_cancelled<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, RehydrationError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RehydrationError::Cancelled),
        out = fut => Ok(out),
    }
}

fn unique(ids: &[AggregateId]) -> Vec<AggregateId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn document_ids(documents: &[serde_json::Value], container: &str) -> Vec<AggregateId> {
    documents
        .iter()
        .filter_map(|doc| match payload_id(doc) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(container, error = %e, "skipping document without a usable id");
                None
            }
        })
        .collect()
}

/// Concurrent aggregate loads / history reads per call unless configured.
pub const DEFAULT_LOAD_CONCURRENCY: usize = 16;

/// Builds projections of type `P` from the store and an external data provider.
pub struct ProjectionInitializer<S, X> {
    store: S,
    external: X,
    load_concurrency: usize,
}

impl<S, X> ProjectionInitializer<S, X>
where
    S: StateStore,
{
    pub fn new(store: S, external: X) -> Self {
        Self {
            store,
            external,
            load_concurrency: DEFAULT_LOAD_CONCURRENCY,
        }
    }

    /// Cap on store reads in flight at once; at least one.
    pub fn with_load_concurrency(mut self, limit: usize) -> Self {
        self.load_concurrency = limit.max(1);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Converge projections for `ids` from current aggregate state.
    ///
    /// Nothing is persisted; the caller decides what to do with the result.
    /// Re-running for already initialized ids yields the same state.
    #[instrument(skip(self, ids, cancel), fields(projection = P::AGGREGATE_TYPE, requested = ids.len()))]
    pub async fn init<P>(
        &self,
        ids: &[AggregateId],
        cancel: &CancellationToken,
    ) -> Result<InitReport<P>, RehydrationError>
    where
        P: Projection,
        X: ExternalDataProvider<P>,
    {
        ensure_active(cancel)?;
        let ids = unique(ids);
        let mut report = InitReport::new();

        let loaded = until_cancelled(
            cancel,
            stream::iter(ids.iter().map(|id| load_aggregate::<P::Source, S>(&self.store, *id)))
                .buffered(self.load_concurrency)
                .collect::<Vec<_>>(),
        )
        .await?;

        let mut sources = Vec::with_capacity(ids.len());
        for (id, result) in ids.into_iter().zip(loaded) {
            match result {
                Ok(Some(source)) => sources.push(source),
                Ok(None) => report.fail(id, InitStage::Load, "aggregate not found"),
                Err(e) => report.fail(id, InitStage::Load, e),
            }
        }

        let report = self.converge(sources, None, cancel, report).await?;
        debug!(
            converged = report.projections.len(),
            failed = report.failures.len(),
            "projections initialized"
        );
        Ok(report)
    }

    /// Destructive rebuild of the whole projection container from event history.
    ///
    /// Not resumable: if it is interrupted, run it again from the start.
    /// With `point_in_time`, only events at or before that instant are replayed
    /// and the provider is asked for data as of that instant.
    #[instrument(skip(self, cancel), fields(projection = P::AGGREGATE_TYPE))]
    pub async fn init_container<P>(
        &self,
        point_in_time: Option<DateTime<Utc>>,
        cancel: &CancellationToken,
    ) -> Result<InitReport<P>, RehydrationError>
    where
        P: Projection,
        X: ExternalDataProvider<P>,
    {
        ensure_active(cancel)?;

        let removed = until_cancelled(cancel, self.store.delete_all(P::AGGREGATE_TYPE)).await??;
        info!(removed, "projection container cleared");

        let source_type = <P::Source as Aggregate>::AGGREGATE_TYPE;
        let documents = until_cancelled(
            cancel,
            self.store.query_documents(source_type, DocumentFilter::NotDeleted),
        )
        .await??;
        let ids = document_ids(&documents, source_type);

        let histories = until_cancelled(
            cancel,
            stream::iter(ids.iter().map(|id| self.store.load_event_history(*id)))
                .buffered(self.load_concurrency)
                .collect::<Vec<_>>(),
        )
        .await?;

        let mut report = InitReport::new();
        let mut sources = Vec::with_capacity(ids.len());
        for (id, history) in ids.into_iter().zip(histories) {
            let history = match history {
                Ok(history) => history,
                Err(e) => {
                    report.fail(id, InitStage::Load, e);
                    continue;
                }
            };
            if history.is_empty() {
                report.fail(id, InitStage::Replay, "no event history");
                continue;
            }
            if let Some(cutoff) = point_in_time {
                if history.iter().all(|e| e.timestamp() > cutoff) {
                    debug!(aggregate_id = %id, "aggregate did not exist at point in time");
                    continue;
                }
            }

            match rehydrate_until::<P::Source>(id, history, point_in_time) {
                Ok(source) if source.is_deleted() => {
                    debug!(aggregate_id = %id, "aggregate deleted by its history; skipped");
                }
                Ok(source) => sources.push(source),
                Err(e) => report.fail(id, InitStage::Replay, e),
            }
        }

        let mut report = self.converge(sources, point_in_time, cancel, report).await?;
        self.persist(&mut report, cancel).await?;

        info!(
            rebuilt = report.projections.len(),
            failed = report.failures.len(),
            "projection container rebuilt"
        );
        Ok(report)
    }

    /// Initialize every stored projection still flagged `initialized == false`,
    /// writing the results back with a single bulk upsert.
    #[instrument(skip(self, cancel), fields(projection = P::AGGREGATE_TYPE))]
    pub async fn init_all_uninitialized<P>(
        &self,
        cancel: &CancellationToken,
    ) -> Result<InitReport<P>, RehydrationError>
    where
        P: Projection,
        X: ExternalDataProvider<P>,
    {
        ensure_active(cancel)?;

        let documents = until_cancelled(
            cancel,
            self.store.query_documents(P::AGGREGATE_TYPE, DocumentFilter::Uninitialized),
        )
        .await??;
        let ids = document_ids(&documents, P::AGGREGATE_TYPE);
        if ids.is_empty() {
            return Ok(InitReport::new());
        }

        let mut report = self.init::<P>(&ids, cancel).await?;
        self.persist(&mut report, cancel).await?;

        info!(
            initialized = report.projections.len(),
            failed = report.failures.len(),
            "uninitialized projections processed"
        );
        Ok(report)
    }

    async fn converge<P>(
        &self,
        sources: Vec<P::Source>,
        point_in_time: Option<DateTime<Utc>>,
        cancel: &CancellationToken,
        mut report: InitReport<P>,
    ) -> Result<InitReport<P>, RehydrationError>
    where
        P: Projection,
        X: ExternalDataProvider<P>,
    {
        let mut pending: Vec<P> = Vec::with_capacity(sources.len());
        for source in &sources {
            let id = source.id();
            let mut projection = P::empty(id);
            advance_init_state(&mut projection, InitState::Rehydrating);
            match init_event(source).and_then(|event| projection.apply(&event)) {
                Ok(()) => pending.push(projection),
                Err(e) => report.fail(id, InitStage::Seed, e),
            }
        }
        if pending.is_empty() {
            return Ok(report);
        }

        let fetched = until_cancelled(
            cancel,
            self.external.fetch_external_data(&pending, point_in_time),
        )
        .await?;

        let ExternalDataBatch { events, failures } = match fetched {
            Ok(batch) => batch,
            Err(e) => {
                warn!(count = pending.len(), error = %e, "external data fetch failed");
                for projection in &pending {
                    report.fail(projection.id(), InitStage::ExternalData, &e);
                }
                return Ok(report);
            }
        };

        let pending_ids: HashSet<AggregateId> = pending.iter().map(|p| p.id()).collect();
        let mut unavailable = HashSet::new();
        for failure in failures {
            if pending_ids.contains(&failure.aggregate_id) && unavailable.insert(failure.aggregate_id) {
                warn!(aggregate_id = %failure.aggregate_id, reason = %failure.reason, "external data unavailable");
                report.fail(failure.aggregate_id, InitStage::ExternalData, failure.reason);
            }
        }

        let mut by_id: HashMap<AggregateId, Vec<Event>> = HashMap::new();
        for external in events {
            by_id
                .entry(external.aggregate_root_id())
                .or_default()
                .extend(external.into_events());
        }

        for mut projection in pending {
            let id = projection.id();
            if unavailable.contains(&id) {
                continue;
            }
            let mut events = by_id.remove(&id).unwrap_or_default();
            order_events(&mut events);
            match events.iter().try_for_each(|event| projection.apply(event)) {
                Ok(()) => {
                    advance_init_state(&mut projection, InitState::Initialized);
                    report.projections.push(projection);
                }
                Err(e) => report.fail(id, InitStage::Apply, e),
            }
        }

        if !by_id.is_empty() {
            debug!(unmatched = by_id.len(), "ignored external data for projections outside the batch");
        }
        Ok(report)
    }

    async fn persist<P: Projection>(
        &self,
        report: &mut InitReport<P>,
        cancel: &CancellationToken,
    ) -> Result<(), RehydrationError> {
        if report.projections.is_empty() {
            return Ok(());
        }

        let mut documents = Vec::with_capacity(report.projections.len());
        let mut encoded = Vec::with_capacity(report.projections.len());
        for projection in std::mem::take(&mut report.projections) {
            match encode(&projection) {
                Ok(document) => {
                    documents.push((projection.id(), document));
                    encoded.push(projection);
                }
                Err(e) => report.fail(projection.id(), InitStage::Persist, e),
            }
        }

        let outcomes = match until_cancelled(
            cancel,
            self.store.bulk_upsert(P::AGGREGATE_TYPE, documents),
        )
        .await?
        {
            Ok(outcomes) => outcomes,
            Err(e) => {
                warn!(count = encoded.len(), error = %e, "bulk upsert failed");
                for projection in &encoded {
                    report.fail(projection.id(), InitStage::Persist, &e);
                }
                return Ok(());
            }
        };

        let rejected: HashMap<AggregateId, String> = outcomes
            .into_iter()
            .filter_map(|o| o.error.map(|e| (o.id, e)))
            .collect();
        for projection in encoded {
            match rejected.get(&projection.id()) {
                Some(reason) => {
                    warn!(aggregate_id = %projection.id(), reason = %reason, "projection write rejected");
                    report.fail(projection.id(), InitStage::Persist, reason);
                }
                None => report.projections.push(projection),
            }
        }
        Ok(())
    }
}
