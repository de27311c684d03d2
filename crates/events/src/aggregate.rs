//! Event-applying aggregate capability.

use serde::Serialize;
use serde::de::DeserializeOwned;

use nostify_core::{AggregateId, AggregateRoot, DomainResult};

use crate::{Command, Event};

/// An aggregate whose state is the fold of its event history.
///
/// # Contract
///
/// - [`apply`](Aggregate::apply) is the only way state changes. It must be
///   deterministic, and applying a prefix of the history followed by the rest
///   must end in the same state as applying the whole history at once.
/// - Update payloads merge: fields present overwrite, absent fields are kept
///   (see [`PayloadFields`](nostify_core::PayloadFields)).
/// - Events the aggregate does not recognise should leave state unchanged.
pub trait Aggregate:
    AggregateRoot + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Stable type name, also used as the storage container name.
    const AGGREGATE_TYPE: &'static str;

    /// Blank instance to fold events into.
    fn empty(id: AggregateId) -> Self;

    /// Payload fields that must be present (and non-null) for an event carrying
    /// `command` to be constructed against this type with validation enabled.
    ///
    /// Scoped per command so partial updates can require nothing.
    fn required_fields(_command: &Command) -> &'static [&'static str] {
        &[]
    }

    /// Evolve state from a single event.
    fn apply(&mut self, event: &Event) -> DomainResult<()>;
}
