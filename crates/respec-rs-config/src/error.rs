//! Error types for config loading and validation.

use thiserror::Error;

/// Errors returned while loading or validating a spec config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a config source failed.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing a config source failed.
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] json5::Error),
    /// Converting JSON values failed.
    #[error("failed to decode config: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// A script source did not contain a config object literal.
    #[error("no config object found in {0}")]
    MissingObject(String),
    /// The record violates the config schema or one of its invariants.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ConfigError {
    /// Borrow the validation failure, if this error is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            ConfigError::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// Schema and invariant violations found in a config record.
///
/// `layer` names the source the offending value came from (`config`,
/// `effective`, or a layer label such as `override(path)`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is absent or empty.
    #[error("missing required field {layer}:{field}")]
    MissingRequiredField { layer: String, field: String },
    /// An alias entry points at a citation that is neither local nor external.
    #[error("citation {key} is an alias of unknown citation {target}")]
    InvalidAliasTarget { key: String, target: String },
    /// The same citation key was defined twice.
    #[error("duplicate citation key {key}")]
    DuplicateCitationKey { key: String },
    /// A person entry is missing its name or carries an invalid field.
    #[error("malformed person entry at {layer}:{path}: {message}")]
    MalformedPersonEntry {
        layer: String,
        path: String,
        message: String,
    },
    /// A bibliography entry is neither a full reference nor an alias.
    #[error("malformed bibliography entry {key}: {message}")]
    MalformedBibliographyEntry { key: String, message: String },
    /// A specific field has the wrong shape or value.
    #[error("invalid config at {layer}:{path}: {message}")]
    InvalidField {
        layer: String,
        path: String,
        message: String,
    },
}

impl ValidationError {
    /// Dotted field path the error refers to, when it has one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::MissingRequiredField { field, .. } => Some(field),
            ValidationError::MalformedPersonEntry { path, .. }
            | ValidationError::InvalidField { path, .. } => Some(path),
            _ => None,
        }
    }
}
