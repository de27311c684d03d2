//! Partial-update ("merge") helper for applying structured payloads.
//!
//! Aggregates apply update events field by field: a field present in the
//! payload overwrites the aggregate's value, an absent field leaves it alone.
//! An explicit `null` clears `Option` targets and is ignored for targets that
//! cannot hold it, so one sparse event never stops a replay.
//!
//! ```ignore
//! let fields = PayloadFields::new(event.payload());
//! fields.merge("name", &mut self.name)?;
//! fields.merge("quantity", &mut self.quantity)?;
//! ```

use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

use crate::error::{DomainError, DomainResult};

/// Read-only view over the top-level fields of a payload object.
///
/// Non-object payloads (including `null`) expose no fields, so merging them is
/// a no-op.
#[derive(Debug, Clone, Copy)]
pub struct PayloadFields<'a> {
    fields: Option<&'a Map<String, JsonValue>>,
}

impl<'a> PayloadFields<'a> {
    pub fn new(payload: &'a JsonValue) -> Self {
        Self {
            fields: payload.as_object(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.is_some_and(|f| f.contains_key(name))
    }

    pub fn raw(&self, name: &str) -> Option<&'a JsonValue> {
        self.fields.and_then(|f| f.get(name))
    }

    /// Decode field `name` if present.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> DomainResult<Option<T>> {
        match self.raw(name) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| DomainError::serialization(format!("field `{name}`: {e}"))),
        }
    }

    /// Overwrite `target` with field `name` when present; returns whether it did.
    pub fn merge<T: DeserializeOwned>(&self, name: &str, target: &mut T) -> DomainResult<bool> {
        let Some(raw) = self.raw(name) else {
            return Ok(false);
        };
        match serde_json::from_value(raw.clone()) {
            Ok(value) => {
                *target = value;
                Ok(true)
            }
            Err(_) if raw.is_null() => Ok(false),
            Err(e) => Err(DomainError::serialization(format!("field `{name}`: {e}"))),
        }
    }
}
