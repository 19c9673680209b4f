//! Top-level differences between two config records.

use crate::{ConfigError, SpecConfig};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// How a top-level key differs between two records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
    Changed,
}

/// One top-level key that differs, with the values on each side.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub key: String,
    pub kind: ChangeKind,
    pub before: Option<Value>,
    pub after: Option<Value>,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let render = |value: &Option<Value>| {
            value
                .as_ref()
                .map(Value::to_string)
                .unwrap_or_default()
        };
        match self.kind {
            ChangeKind::Added => write!(f, "+ {}: {}", self.key, render(&self.after)),
            ChangeKind::Removed => write!(f, "- {}: {}", self.key, render(&self.before)),
            ChangeKind::Changed => write!(
                f,
                "~ {}: {} -> {}",
                self.key,
                render(&self.before),
                render(&self.after)
            ),
        }
    }
}

impl SpecConfig {
    /// Keys that differ between `self` and `other`, in key order.
    pub fn diff(&self, other: &SpecConfig) -> Result<Vec<FieldChange>, ConfigError> {
        let before = serde_json::to_value(self)?;
        let after = serde_json::to_value(other)?;
        Ok(diff_values(&before, &after))
    }
}

/// Compare two serialized records key by key.
pub(super) fn diff_values(before: &Value, after: &Value) -> Vec<FieldChange> {
    let empty = serde_json::Map::new();
    let before = before.as_object().unwrap_or(&empty);
    let after = after.as_object().unwrap_or(&empty);
    let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();

    keys.into_iter()
        .filter_map(|key| {
            let old = before.get(key);
            let new = after.get(key);
            let kind = match (old, new) {
                (None, Some(_)) => ChangeKind::Added,
                (Some(_), None) => ChangeKind::Removed,
                (Some(old), Some(new)) if old != new => ChangeKind::Changed,
                _ => return None,
            };
            Some(FieldChange {
                key: key.clone(),
                kind,
                before: old.cloned(),
                after: new.cloned(),
            })
        })
        .collect()
}
