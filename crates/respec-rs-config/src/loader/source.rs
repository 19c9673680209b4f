//! Source text handling: locating the config literal and auditing its keys.

use super::RESPEC_CONFIG_VAR;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use std::collections::HashSet;
use std::fmt;

/// Slice out the object literal assigned to `respecConfig`.
///
/// Falls back to the first top-level object literal when the script never
/// assigns the variable. Braces inside strings and comments are ignored.
pub(super) fn extract_object_literal(script: &str) -> Option<&str> {
    let bytes = script.as_bytes();
    let search_from = find_assignment(bytes).unwrap_or(0);
    let open = find_open_brace(bytes, search_from)?;
    let close = matching_brace(bytes, open)?;
    Some(&script[open..=close])
}

/// Index just past the `=` of the first `respecConfig =` outside strings
/// and comments.
fn find_assignment(bytes: &[u8]) -> Option<usize> {
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'"' | b'\'' | b'`' => idx = skip_string(bytes, idx)?,
            b'/' if bytes.get(idx + 1) == Some(&b'/') => idx = skip_line_comment(bytes, idx),
            b'/' if bytes.get(idx + 1) == Some(&b'*') => idx = skip_block_comment(bytes, idx)?,
            _ => {
                if let Some(after) = assignment_at(bytes, idx) {
                    return Some(after);
                }
            }
        }
        idx += 1;
    }
    None
}

/// If `respecConfig` starts at `idx` as a whole identifier followed by a
/// plain `=`, the index just past that `=`.
fn assignment_at(bytes: &[u8], idx: usize) -> Option<usize> {
    let name = RESPEC_CONFIG_VAR.as_bytes();
    if !bytes[idx..].starts_with(name) {
        return None;
    }
    if idx > 0 && is_ident_byte(bytes[idx - 1]) {
        return None;
    }
    let mut next = idx + name.len();
    if bytes.get(next).copied().is_some_and(is_ident_byte) {
        return None;
    }
    while bytes.get(next).is_some_and(u8::is_ascii_whitespace) {
        next += 1;
    }
    (bytes.get(next) == Some(&b'=') && bytes.get(next + 1) != Some(&b'=')).then_some(next + 1)
}

fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
}

/// Index of the first `{` at or after `from`, outside strings and comments.
fn find_open_brace(bytes: &[u8], from: usize) -> Option<usize> {
    let mut idx = from;
    while idx < bytes.len() {
        match bytes[idx] {
            b'{' => return Some(idx),
            b'"' | b'\'' | b'`' => idx = skip_string(bytes, idx)?,
            b'/' if bytes.get(idx + 1) == Some(&b'/') => idx = skip_line_comment(bytes, idx),
            b'/' if bytes.get(idx + 1) == Some(&b'*') => idx = skip_block_comment(bytes, idx)?,
            _ => {}
        }
        idx += 1;
    }
    None
}

/// Index of the `}` closing the brace at `open`.
fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut idx = open;
    while idx < bytes.len() {
        match bytes[idx] {
            b'"' | b'\'' | b'`' => idx = skip_string(bytes, idx)?,
            b'/' if bytes.get(idx + 1) == Some(&b'/') => idx = skip_line_comment(bytes, idx),
            b'/' if bytes.get(idx + 1) == Some(&b'*') => idx = skip_block_comment(bytes, idx)?,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
        idx += 1;
    }
    None
}

/// Index of the quote closing the string that starts at `start`.
fn skip_string(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = bytes[start];
    let mut idx = start + 1;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\\' => idx += 1,
            byte if byte == quote => return Some(idx),
            _ => {}
        }
        idx += 1;
    }
    None
}

/// Index of the newline ending a `//` comment (or the last byte).
fn skip_line_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|byte| *byte == b'\n')
        .map_or(bytes.len(), |offset| start + offset)
}

/// Index of the `/` closing a `/* */` comment.
fn skip_block_comment(bytes: &[u8], start: usize) -> Option<usize> {
    let body = start + 2;
    bytes
        .get(body..)?
        .windows(2)
        .position(|pair| pair == b"*/")
        .map(|offset| body + offset + 1)
}

/// Object keys that appear more than once, found while parsing.
///
/// `serde_json::Value` keeps only the last of repeated keys, so duplicates are
/// collected in a separate pass over the same text.
#[derive(Debug, Default)]
pub(super) struct KeyAudit {
    /// Paths (from the root) of every repeated key.
    pub(super) duplicates: Vec<Vec<String>>,
}

impl KeyAudit {
    fn adopt(&mut self, segment: &str, child: KeyAudit) {
        for mut path in child.duplicates {
            path.insert(0, segment.to_string());
            self.duplicates.push(path);
        }
    }
}

/// Render a path from `KeyAudit` as `a.b[0].c`.
pub(super) fn render_path(path: &[String]) -> String {
    let mut rendered = String::new();
    for segment in path {
        if !rendered.is_empty() && !segment.starts_with('[') {
            rendered.push('.');
        }
        rendered.push_str(segment);
    }
    rendered
}

impl<'de> Deserialize<'de> for KeyAudit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(KeyAuditVisitor)
    }
}

struct KeyAuditVisitor;

impl<'de> Visitor<'de> for KeyAuditVisitor {
    type Value = KeyAudit;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON5 value")
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<KeyAudit, E> {
        Ok(KeyAudit::default())
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<KeyAudit, E> {
        Ok(KeyAudit::default())
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<KeyAudit, E> {
        Ok(KeyAudit::default())
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<KeyAudit, E> {
        Ok(KeyAudit::default())
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<KeyAudit, E> {
        Ok(KeyAudit::default())
    }

    fn visit_unit<E: de::Error>(self) -> Result<KeyAudit, E> {
        Ok(KeyAudit::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<KeyAudit, E> {
        Ok(KeyAudit::default())
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<KeyAudit, D::Error> {
        KeyAudit::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<KeyAudit, A::Error> {
        let mut audit = KeyAudit::default();
        let mut idx = 0usize;
        while let Some(child) = seq.next_element::<KeyAudit>()? {
            audit.adopt(&format!("[{idx}]"), child);
            idx += 1;
        }
        Ok(audit)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<KeyAudit, A::Error> {
        let mut audit = KeyAudit::default();
        let mut seen = HashSet::new();
        while let Some(key) = map.next_key::<String>()? {
            let child: KeyAudit = map.next_value()?;
            if !seen.insert(key.clone()) {
                audit.duplicates.push(vec![key.clone()]);
            }
            audit.adopt(&key, child);
        }
        Ok(audit)
    }
}
