//! Infrastructure layer: state store, configuration, external data, and
//! projection initialization.

pub mod config;
pub mod external;
pub mod projections;
pub mod store;

pub use config::EnvConfig;
pub use external::{ExternalDataBatch, ExternalDataError, ExternalDataFailure, ExternalDataProvider, NoExternalData};
pub use projections::{InitFailure, InitReport, InitStage, ProjectionInitializer, RehydrationError};
pub use store::{DocumentFilter, InMemoryStateStore, StateStore, StoreError, UpsertOutcome, load_aggregate};
