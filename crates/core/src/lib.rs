//! `nostify-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the error taxonomy, validation, and the configuration lookup
//! contract used to resolve validation limits.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod id;
pub mod merge;
pub mod validation;

pub use aggregate::AggregateRoot;
pub use config::{ConfigProvider, MapConfig};
pub use error::{DomainError, DomainResult};
pub use id::{AggregateId, PartitionKey, UserId};
pub use merge::PayloadFields;
pub use validation::{
    AggregateValidator, MaxLength, Validate, ValidationError, ValidationErrors, ValidationRules,
    ValidatorSettings,
};
