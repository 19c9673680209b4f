//! Shallow merge of config records: the override's top-level keys win.
//!
//! Arrays, the bibliography and nested objects are replaced wholesale, never
//! unioned, so an override that drops an xref target really drops it.

use crate::SpecConfig;
use log::debug;
use serde_json::Value;

/// Merge overlay values into the base, replacing each top-level key it sets.
pub fn merge_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                base_map.insert(key.clone(), value.clone());
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value.clone();
        }
    }
}

impl SpecConfig {
    /// Apply `overlay` on top of `self`.
    ///
    /// A typed record carries every top-level field, an unset optional
    /// included, so each one replaces the base's and the result is the
    /// overlay. Partial edits that should fall through to the base are
    /// layered as raw values with [`merge_values`] before decoding.
    pub fn merge(&self, overlay: &SpecConfig) -> SpecConfig {
        if self != overlay {
            debug!(
                "override replaces base record (group {} -> {})",
                self.group, overlay.group
            );
        }
        overlay.clone()
    }
}
