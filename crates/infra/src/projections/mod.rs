//! Projection initialization.
//!
//! Projections are rebuildable from aggregate state plus external data; this
//! module owns the three entry points that (re)build them:
//! - [`ProjectionInitializer::init`]: a specific set of ids, not persisted
//! - [`ProjectionInitializer::init_container`]: destructive full rebuild
//! - [`ProjectionInitializer::init_all_uninitialized`]: catch-up for stored
//!   projections still flagged uninitialized

pub mod initializer;

pub use initializer::{
    DEFAULT_LOAD_CONCURRENCY, InitFailure, InitReport, InitStage, ProjectionInitializer,
    RehydrationError,
};
