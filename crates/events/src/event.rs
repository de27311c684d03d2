use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use nostify_core::{AggregateId, PartitionKey, UserId};

use crate::Command;

/// Immutable record of one state transition.
///
/// Events are:
/// - **immutable** (treat them as facts; there are no setters)
/// - produced only by [`EventFactory`](crate::EventFactory) /
///   [`EventBuilder`](crate::EventBuilder) or decoded from the transport
/// - **append-only** in the event history of their aggregate
///
/// A `null` payload is represented by [`JsonValue::Null`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    id: Uuid,
    aggregate_root_id: AggregateId,
    command: Command,
    payload: JsonValue,
    timestamp: DateTime<Utc>,
    user_id: UserId,
    partition_key: PartitionKey,
}

impl Event {
    pub(crate) fn from_parts(
        id: Uuid,
        aggregate_root_id: AggregateId,
        command: Command,
        payload: JsonValue,
        timestamp: DateTime<Utc>,
        user_id: UserId,
        partition_key: PartitionKey,
    ) -> Self {
        Self {
            id,
            aggregate_root_id,
            command,
            payload,
            timestamp,
            user_id,
            partition_key,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn aggregate_root_id(&self) -> AggregateId {
        self.aggregate_root_id
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn payload(&self) -> &JsonValue {
        &self.payload
    }

    pub fn has_payload(&self) -> bool {
        !self.payload.is_null()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn partition_key(&self) -> PartitionKey {
        self.partition_key
    }
}
