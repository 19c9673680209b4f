//! IO helpers for reading config sources from disk and text.

use super::source::{self, KeyAudit};
use super::{ConfigLayer, ConfigLayerSource, LoadedLayer, SchemaMode, schema};
use crate::{ConfigError, ValidationError};
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Load and shape-check a layer from disk.
pub(super) fn load_layer(
    source: ConfigLayerSource,
    path: &Path,
) -> Result<LoadedLayer, ConfigError> {
    debug!(
        "loading config layer (source={:?}, path={})",
        source,
        path.display()
    );
    let label = layer_label(source, path);
    let value = read_source(path, &label)?;
    schema::validate_layer_schema(&value, SchemaMode::Partial, &label)?;
    Ok(LoadedLayer {
        meta: ConfigLayer {
            source,
            path: Some(path.to_path_buf()),
            disabled_reason: None,
        },
        value,
    })
}

/// Read a source file and parse it into a JSON value.
pub(super) fn read_source(path: &Path, label: &str) -> Result<Value, ConfigError> {
    let contents = fs::read_to_string(path)?;
    parse_source(&contents, label)
}

/// Parse JSON5 or a script assigning `respecConfig` into a JSON value.
///
/// Repeated keys are rejected here because the parsed value silently keeps
/// only the last one.
pub(super) fn parse_source(contents: &str, label: &str) -> Result<Value, ConfigError> {
    let literal = if contents.trim_start().starts_with('{') {
        contents
    } else {
        debug!("source is not a bare object literal; scanning script ({label})");
        source::extract_object_literal(contents)
            .ok_or_else(|| ConfigError::MissingObject(label.to_string()))?
    };

    let audit: KeyAudit = json5::from_str(literal)?;
    if let Some(path) = audit.duplicates.first() {
        return Err(duplicate_key_error(path, label).into());
    }
    Ok(json5::from_str(literal)?)
}

fn duplicate_key_error(path: &[String], label: &str) -> ValidationError {
    match path {
        [section, key] if section == "localBiblio" => {
            ValidationError::DuplicateCitationKey { key: key.clone() }
        }
        _ => ValidationError::InvalidField {
            layer: label.to_string(),
            path: source::render_path(path),
            message: "duplicate key".to_string(),
        },
    }
}

/// Build a user-friendly label for validation errors.
pub(super) fn layer_label(source: ConfigLayerSource, path: &Path) -> String {
    let name = match source {
        ConfigLayerSource::Base => "base",
        ConfigLayerSource::Override => "override",
    };
    format!("{name}({})", path.display())
}

/// Produce a stable unique path used for de-duplication.
pub(super) fn unique_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
