//! Commands, events, and the state-transition machinery built on them.
//!
//! - [`Command`] / [`CommandRegistry`]: name-keyed operation descriptors
//! - [`Event`], [`EventFactory`], [`EventBuilder`]: validated event construction
//! - [`Aggregate`] / [`Projection`]: the `apply` capability and projection readiness
//! - [`replay`]: deterministic history folding
//! - [`envelope`]: transport decode/encode

pub mod aggregate;
pub mod command;
pub mod envelope;
pub mod event;
pub mod factory;
pub mod projection;
pub mod replay;

pub use aggregate::Aggregate;
pub use command::{Command, CommandRegistry, PROJECTION_INIT};
pub use envelope::{DecodeError, decode_document, decode_event, encode_event};
pub use event::Event;
pub use factory::{EventBuilder, EventFactory, payload_id, validate_payload};
pub use projection::{ExternalDataEvent, InitState, Projection, advance_init_state, init_event};
pub use replay::{apply_events, order_events, rehydrate, rehydrate_until};
