//! Typed ReSpec configuration records with layered loading.
//!
//! This crate owns the `respecConfig` schema, its validation, and the
//! merge/diff operations used to evolve one record across edits. Records are
//! plain values: load one, pass it to whatever consumes it, drop it.

mod error;
mod loader;
mod model;

/// Public error types returned by loading and validation APIs.
pub use error::{ConfigError, ValidationError};
/// Layered config types, value-level merge and diff results.
pub use loader::{
    ChangeKind, ConfigLayer, ConfigLayerSource, FieldChange, LayeredConfig, LayeredConfigOptions,
    merge_values,
};
/// Configuration schema models.
pub use model::*;
