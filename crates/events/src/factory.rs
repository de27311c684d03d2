//! Event construction with payload validation.
//!
//! [`EventBuilder`] is the general path (explicit event id / timestamp);
//! [`EventFactory`] wraps it with caller defaults for the common cases. Both
//! validate the same way: when validation is on, the payload is checked
//! against the fields the target aggregate requires for that command
//! ([`Aggregate::required_fields`]) and every violation is reported together.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::debug;
use uuid::Uuid;

use nostify_core::{
    AggregateId, DomainError, DomainResult, PartitionKey, UserId, ValidationError,
    ValidationErrors,
};

use crate::{Aggregate, Command, Event};

fn to_payload(payload: impl Serialize) -> DomainResult<JsonValue> {
    serde_json::to_value(payload).map_err(|e| DomainError::serialization(format!("payload: {e}")))
}

/// Read the aggregate id embedded in a payload's `id` field.
pub fn payload_id(payload: &JsonValue) -> DomainResult<AggregateId> {
    match payload.get("id") {
        Some(JsonValue::String(raw)) => raw.parse(),
        Some(other) => Err(DomainError::invalid_id(format!("payload id is not a string: {other}"))),
        None => Err(DomainError::invalid_argument(
            "payload",
            "payload does not contain an `id` field",
        )),
    }
}

/// Check `payload` against `A`'s required fields for `command`.
pub fn validate_payload<A: Aggregate>(command: &Command, payload: &JsonValue) -> DomainResult<()> {
    let mut errors = ValidationErrors::new();

    match payload {
        JsonValue::Null if command.allow_null_payload() => {}
        JsonValue::Null => errors.push(ValidationError::new(
            "payload",
            format!("payload is required for command `{command}`"),
        )),
        JsonValue::Object(fields) => {
            for field in A::required_fields(command) {
                let present = fields.get(*field).is_some_and(|v| !v.is_null());
                if !present {
                    errors.push(ValidationError::new(*field, format!("{field} is required")));
                }
            }
        }
        _ => errors.push(ValidationError::new(
            "payload",
            "payload must be a structured document",
        )),
    }

    if !errors.is_empty() {
        debug!(
            command = %command,
            aggregate_type = A::AGGREGATE_TYPE,
            violations = errors.len(),
            "event payload rejected"
        );
    }
    errors.into_result()
}

/// Fluent event constructor.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    command: Command,
    aggregate_id: Option<AggregateId>,
    payload: DomainResult<JsonValue>,
    event_id: Option<Uuid>,
    timestamp: Option<DateTime<Utc>>,
    user_id: UserId,
    partition_key: PartitionKey,
    validate: bool,
}

impl EventBuilder {
    pub fn new(command: &Command) -> Self {
        Self {
            command: command.clone(),
            aggregate_id: None,
            payload: Ok(JsonValue::Null),
            event_id: None,
            timestamp: None,
            user_id: UserId::nil(),
            partition_key: PartitionKey::nil(),
            validate: true,
        }
    }

    /// Target aggregate. When unset, `build` reads it from the payload's `id`.
    pub fn aggregate_id(mut self, id: AggregateId) -> Self {
        self.aggregate_id = Some(id);
        self
    }

    /// Serialization failures surface from [`build`](Self::build).
    pub fn payload(mut self, payload: impl Serialize) -> Self {
        self.payload = to_payload(payload);
        self
    }

    /// Reuse an existing event id instead of minting a new one.
    pub fn event_id(mut self, id: Uuid) -> Self {
        self.event_id = Some(id);
        self
    }

    pub fn timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = Some(at);
        self
    }

    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn partition_key(mut self, partition_key: PartitionKey) -> Self {
        self.partition_key = partition_key;
        self
    }

    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn build<A: Aggregate>(self) -> DomainResult<Event> {
        let payload = self.payload?;
        let aggregate_id = match self.aggregate_id {
            Some(id) => id,
            None => payload_id(&payload)?,
        };

        if self.validate {
            validate_payload::<A>(&self.command, &payload)?;
        }

        Ok(Event::from_parts(
            self.event_id.unwrap_or_else(Uuid::now_v7),
            aggregate_id,
            self.command,
            payload,
            self.timestamp.unwrap_or_else(Utc::now),
            self.user_id,
            self.partition_key,
        ))
    }
}

/// Event construction with per-caller defaults.
///
/// ```ignore
/// let events = EventFactory::new().user(actor);
/// let created = events.create::<InventoryItem>(&CREATE_ITEM, id, &payload)?;
/// let deleted = events.create_null_payload_event(&DELETE_ITEM, id);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EventFactory {
    user_id: UserId,
    partition_key: PartitionKey,
    validate: bool,
}

impl Default for EventFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl EventFactory {
    /// Nil user / partition key, validation on.
    pub fn new() -> Self {
        Self {
            user_id: UserId::nil(),
            partition_key: PartitionKey::nil(),
            validate: true,
        }
    }

    pub fn user(mut self, user_id: UserId) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn partition_key(mut self, partition_key: PartitionKey) -> Self {
        self.partition_key = partition_key;
        self
    }

    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    fn builder(&self, command: &Command) -> EventBuilder {
        EventBuilder::new(command)
            .user_id(self.user_id)
            .partition_key(self.partition_key)
            .validate(self.validate)
    }

    /// `None` keeps the factory's own value.
    fn with_ids(&self, user_id: Option<&str>, partition_key: Option<&str>) -> DomainResult<Self> {
        let mut factory = *self;
        if let Some(raw) = user_id {
            factory = factory.user(raw.parse()?);
        }
        if let Some(raw) = partition_key {
            factory = factory.partition_key(raw.parse()?);
        }
        Ok(factory)
    }

    /// Event for `aggregate_id`.
    pub fn create<A: Aggregate>(
        &self,
        command: &Command,
        aggregate_id: AggregateId,
        payload: impl Serialize,
    ) -> DomainResult<Event> {
        self.builder(command)
            .aggregate_id(aggregate_id)
            .payload(payload)
            .build::<A>()
    }

    /// Event for the aggregate named by the payload's `id` field.
    pub fn create_from_payload<A: Aggregate>(
        &self,
        command: &Command,
        payload: impl Serialize,
    ) -> DomainResult<Event> {
        self.builder(command).payload(payload).build::<A>()
    }

    /// [`create`](Self::create) with string identifiers; parse failures are returned.
    /// A `None` user id or partition key falls back to the factory default.
    pub fn create_with_str_ids<A: Aggregate>(
        &self,
        command: &Command,
        aggregate_id: &str,
        payload: impl Serialize,
        user_id: Option<&str>,
        partition_key: Option<&str>,
    ) -> DomainResult<Event> {
        self.with_ids(user_id, partition_key)?
            .create::<A>(command, aggregate_id.parse()?, payload)
    }

    /// [`create_from_payload`](Self::create_from_payload) with string identifiers.
    pub fn create_from_payload_with_str_ids<A: Aggregate>(
        &self,
        command: &Command,
        payload: impl Serialize,
        user_id: Option<&str>,
        partition_key: Option<&str>,
    ) -> DomainResult<Event> {
        self.with_ids(user_id, partition_key)?
            .create_from_payload::<A>(command, payload)
    }

    /// Event with a `null` payload. Never validated, whatever the command.
    pub fn create_null_payload_event(&self, command: &Command, aggregate_id: AggregateId) -> Event {
        Event::from_parts(
            Uuid::now_v7(),
            aggregate_id,
            command.clone(),
            JsonValue::Null,
            Utc::now(),
            self.user_id,
            self.partition_key,
        )
    }

    pub fn create_null_payload_event_with_str_ids(
        &self,
        command: &Command,
        aggregate_id: &str,
        user_id: Option<&str>,
        partition_key: Option<&str>,
    ) -> DomainResult<Event> {
        let aggregate_id = aggregate_id.parse()?;
        Ok(self
            .with_ids(user_id, partition_key)?
            .create_null_payload_event(command, aggregate_id))
    }
}
