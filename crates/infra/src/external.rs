//! External data boundary.
//!
//! Projections often need data owned by other services. A provider receives
//! the whole batch of projections being rehydrated so it can coalesce remote
//! calls, and answers with [`ExternalDataEvent`]s that the initializer applies
//! through the projection's ordinary `apply`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use nostify_core::AggregateId;
use nostify_events::{ExternalDataEvent, Projection};

/// The provider call failed as a whole; every projection in the batch is affected.
#[derive(Debug, Error)]
pub enum ExternalDataError {
    #[error("external data source unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A projection whose external data could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalDataFailure {
    pub aggregate_id: AggregateId,
    pub reason: String,
}

/// Result of one batched fetch: events for some projections, failures for others.
#[derive(Debug, Clone, Default)]
pub struct ExternalDataBatch {
    pub events: Vec<ExternalDataEvent>,
    pub failures: Vec<ExternalDataFailure>,
}

impl ExternalDataBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: ExternalDataEvent) {
        self.events.push(event);
    }

    pub fn fail(&mut self, aggregate_id: AggregateId, reason: impl Into<String>) {
        self.failures.push(ExternalDataFailure {
            aggregate_id,
            reason: reason.into(),
        });
    }
}

impl From<Vec<ExternalDataEvent>> for ExternalDataBatch {
    fn from(events: Vec<ExternalDataEvent>) -> Self {
        Self {
            events,
            failures: Vec::new(),
        }
    }
}

/// Fetches the external data a batch of projections still needs.
#[async_trait]
pub trait ExternalDataProvider<P: Projection>: Send + Sync {
    /// `point_in_time` restricts the data to what existed at that instant
    /// (historical rebuilds); `None` means current data.
    async fn fetch_external_data(
        &self,
        projections: &[P],
        point_in_time: Option<DateTime<Utc>>,
    ) -> Result<ExternalDataBatch, ExternalDataError>;
}

#[async_trait]
impl<P, X> ExternalDataProvider<P> for Arc<X>
where
    P: Projection,
    X: ExternalDataProvider<P> + ?Sized,
{
    async fn fetch_external_data(
        &self,
        projections: &[P],
        point_in_time: Option<DateTime<Utc>>,
    ) -> Result<ExternalDataBatch, ExternalDataError> {
        (**self).fetch_external_data(projections, point_in_time).await
    }
}

/// Provider for projections that need nothing from outside their aggregate.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoExternalData;

#[async_trait]
impl<P: Projection> ExternalDataProvider<P> for NoExternalData {
    async fn fetch_external_data(
        &self,
        _projections: &[P],
        _point_in_time: Option<DateTime<Utc>>,
    ) -> Result<ExternalDataBatch, ExternalDataError> {
        Ok(ExternalDataBatch::new())
    }
}
