//! Transport decode boundary.
//!
//! Inbound events arrive as a serialized structured document:
//!
//! ```text
//! { "id", "aggregateRootId", "command": { "name", .. }, "payload",
//!   "timestamp", "userId", "partitionKey" }
//! ```
//!
//! The command is resolved back to its registered instance by name. A message
//! with no value at all is reported as [`DecodeError::Empty`], which is a
//! different condition from a value that fails to decode.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use nostify_core::{AggregateId, PartitionKey, UserId};

use crate::{CommandRegistry, Event};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The message carried no value to decode.
    #[error("event envelope has no value")]
    Empty,

    /// The value was present but is not a well-formed event envelope.
    #[error("malformed event envelope: {0}")]
    Malformed(String),

    /// The envelope names a command that was never registered.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCommand {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEvent {
    id: Uuid,
    aggregate_root_id: AggregateId,
    command: WireCommand,
    #[serde(default)]
    payload: JsonValue,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    user_id: UserId,
    #[serde(default)]
    partition_key: PartitionKey,
}

/// Decode one transport message value into an [`Event`].
pub fn decode_event(value: Option<&str>, registry: &CommandRegistry) -> Result<Event, DecodeError> {
    let raw = match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => return Err(DecodeError::Empty),
    };

    let document: JsonValue =
        serde_json::from_str(raw).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    decode_document(document, registry)
}

/// Decode an already-parsed envelope document.
pub fn decode_document(document: JsonValue, registry: &CommandRegistry) -> Result<Event, DecodeError> {
    if document.is_null() {
        return Err(DecodeError::Empty);
    }

    let wire: WireEvent =
        serde_json::from_value(document).map_err(|e| DecodeError::Malformed(e.to_string()))?;

    let command = registry
        .resolve(&wire.command.name)
        .cloned()
        .ok_or(DecodeError::UnknownCommand(wire.command.name))?;

    Ok(Event::from_parts(
        wire.id,
        wire.aggregate_root_id,
        command,
        wire.payload,
        wire.timestamp,
        wire.user_id,
        wire.partition_key,
    ))
}

/// Serialize an event into its transport form.
pub fn encode_event(event: &Event) -> Result<String, serde_json::Error> {
    serde_json::to_string(event)
}
