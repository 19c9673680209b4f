//! Config loader with schema validation and layered overrides.
//!
//! Reads a base record plus optional override records (JSON5 or a ReSpec
//! script), validates each layer, merges them shallowly and produces the final
//! `SpecConfig`.

mod diff;
mod layer_io;
mod merge;
mod schema;
mod source;

#[cfg(test)]
mod tests;

pub use diff::{ChangeKind, FieldChange};
pub use merge::merge_values;

use crate::{ConfigError, SpecConfig, ValidationError};
use log::{debug, info};
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Label used for single-source loads.
const SINGLE_SOURCE_LABEL: &str = "config";
/// Label used for the merged record of a layered load.
const EFFECTIVE_LABEL: &str = "effective";
/// Variable the renderer reads its configuration from.
pub(crate) const RESPEC_CONFIG_VAR: &str = "respecConfig";

/// Effective config plus metadata about which layers were read.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// The merged, validated config.
    pub config: SpecConfig,
    /// Metadata for each layer considered during load.
    pub layers: Vec<ConfigLayer>,
}

/// Position of a layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// The record every override applies to.
    Base,
    /// A later edit; later overrides win.
    Override,
}

/// Metadata about a config layer, including why it was skipped.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    /// Layer position (base or override).
    pub source: ConfigLayerSource,
    /// Location on disk if present.
    pub path: Option<PathBuf>,
    /// Reason the layer was skipped.
    pub disabled_reason: Option<String>,
}

/// Schema validation mode for layered configs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchemaMode {
    /// Shape checks only; required fields may come from another layer.
    Partial,
    /// Shape checks plus required fields, for the effective config.
    Full,
}

/// Options controlling which sources make up a layered load.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Base config source.
    pub base_path: PathBuf,
    /// Override sources applied in order after the base.
    pub override_paths: Vec<PathBuf>,
}

impl LayeredConfigOptions {
    /// Options with just a base source.
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            override_paths: Vec::new(),
        }
    }

    /// Add an override source that is applied after those already listed.
    pub fn with_override(mut self, path: impl AsRef<Path>) -> Self {
        self.override_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl SpecConfig {
    /// Load a single config from a path (no layering).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading spec config from path: {}", path.display());
        let value = layer_io::read_source(path, SINGLE_SOURCE_LABEL)?;
        config_from_value(value, SINGLE_SOURCE_LABEL)
    }

    /// Load a single config from JSON5 or script contents (no layering).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!(
            "loading spec config from raw contents (len={})",
            contents.len()
        );
        let value = layer_io::parse_source(contents, SINGLE_SOURCE_LABEL)?;
        config_from_value(value, SINGLE_SOURCE_LABEL)
    }

    /// Load a base config and apply each override in order.
    pub fn load_layered<B: AsRef<Path>, P: AsRef<Path>>(
        base_path: B,
        override_paths: &[P],
    ) -> Result<LayeredConfig, ConfigError> {
        let options = override_paths
            .iter()
            .fold(LayeredConfigOptions::new(base_path), |options, path| {
                options.with_override(path)
            });
        Self::load_layered_with_options(options)
    }

    /// Load a layered config stack using explicit layer locations.
    ///
    /// Each layer is shape-checked on its own; required fields are enforced
    /// only on the merged result. A path listed more than once is read once.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        info!(
            "loading layered spec config (base={}, overrides={})",
            options.base_path.display(),
            options.override_paths.len()
        );
        let mut layers = Vec::new();
        let mut seen_paths = HashSet::new();

        let base = layer_io::load_layer(ConfigLayerSource::Base, &options.base_path)?;
        seen_paths.insert(layer_io::unique_path(&options.base_path));
        layers.push(base.meta);
        let mut merged = base.value;

        for path in &options.override_paths {
            if !seen_paths.insert(layer_io::unique_path(path)) {
                debug!("skipping duplicate layer (path={})", path.display());
                layers.push(ConfigLayer {
                    source: ConfigLayerSource::Override,
                    path: Some(path.clone()),
                    disabled_reason: Some("already loaded".to_string()),
                });
                continue;
            }
            let loaded = layer_io::load_layer(ConfigLayerSource::Override, path)?;
            merge::merge_values(&mut merged, &loaded.value);
            layers.push(loaded.meta);
        }

        let config = config_from_value(merged, EFFECTIVE_LABEL)?;
        info!("layered spec config loaded (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Validate invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_in(SINGLE_SOURCE_LABEL)
    }

    /// Same checks as [`SpecConfig::validate`], reporting errors under `layer`.
    pub(crate) fn validate_in(&self, layer: &str) -> Result<(), ValidationError> {
        let missing = |field: &str| ValidationError::MissingRequiredField {
            layer: layer.to_string(),
            field: field.to_string(),
        };
        if self.group.trim().is_empty() {
            return Err(missing("group"));
        }
        if self.xref.is_empty() {
            return Err(missing("xref"));
        }

        // A typed key among the extras would be written twice on output.
        if let Some(key) = self
            .extras
            .keys()
            .find(|key| schema::TYPED_KEYS.contains(&key.as_str()))
        {
            return Err(ValidationError::InvalidField {
                layer: layer.to_string(),
                path: key.clone(),
                message: "typed option cannot be kept as an extra".to_string(),
            });
        }

        let people = [
            ("editors", self.editors.iter().collect::<Vec<_>>()),
            (
                "formerEditors",
                self.former_editors.iter().map(|f| &f.person).collect(),
            ),
            ("authors", self.authors.iter().collect()),
        ];
        for (list, persons) in people {
            for (idx, person) in persons.iter().enumerate() {
                if person.name.trim().is_empty() {
                    return Err(ValidationError::MalformedPersonEntry {
                        layer: layer.to_string(),
                        path: format!("{list}[{idx}].name"),
                        message: "missing name".to_string(),
                    });
                }
            }
        }

        self.local_biblio.validate_aliases()
    }

    /// Pretty JSON rendering; the output is also valid JSON5 input.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Script declaring the record the way the renderer expects to find it.
    pub fn to_respec_script(&self) -> Result<String, ConfigError> {
        Ok(format!(
            "var {RESPEC_CONFIG_VAR} = {};\n",
            self.to_json_string()?
        ))
    }
}

/// Internal representation of a loaded config layer.
#[derive(Debug, Clone)]
struct LoadedLayer {
    meta: ConfigLayer,
    value: Value,
}

fn config_from_value(value: Value, label: &str) -> Result<SpecConfig, ConfigError> {
    schema::validate_layer_schema(&value, SchemaMode::Full, label)?;
    let config: SpecConfig = serde_json::from_value(value)?;
    if !config.extras.is_empty() {
        debug!(
            "keeping unmodelled options verbatim: {:?}",
            config.extras.keys().collect::<Vec<_>>()
        );
    }
    config.validate_in(label)?;
    Ok(config)
}
