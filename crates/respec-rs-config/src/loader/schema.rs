//! Schema validation helpers for ReSpec config layers.
//!
//! Works on the raw JSON value so errors can name the exact dotted path and
//! layer; serde only sees values that already passed these checks.

use super::SchemaMode;
use crate::model::check_repository_scheme;
use crate::{GithubRepo, SpecStatus, ValidationError};
use chrono::NaiveDate;
use log::debug;
use serde_json::{Map, Value};
use url::Url;

/// Top-level keys with a typed shape; anything else is kept as an extra.
pub(super) const TYPED_KEYS: &[&str] = &[
    "group",
    "github",
    "shortName",
    "specStatus",
    "edDraftURI",
    "latestVersion",
    "xref",
    "lint",
    "subjectPrefix",
    "wgPublicList",
    "editors",
    "formerEditors",
    "authors",
    "otherLinks",
    "localBiblio",
];

const PERSON_KEYS: &[&str] = &[
    "name",
    "company",
    "companyURL",
    "url",
    "w3cid",
    "mailto",
    "note",
    "retiredDate",
];

const REFERENCE_KEYS: &[&str] = &["title", "href", "publisher", "authors", "status", "date"];

/// Date format used by `retiredDate`.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Whether a person list requires or forbids `retiredDate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Retirement {
    Required,
    Forbidden,
}

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(
    value: &Value,
    mode: SchemaMode,
    layer: &str,
) -> Result<(), ValidationError> {
    let map = expect_object(value, layer, "")?;

    for key in map.keys().filter(|key| !TYPED_KEYS.contains(&key.as_str())) {
        debug!("untyped option {key} in {layer}");
    }

    if mode == SchemaMode::Full {
        require_present(map, layer, "group")?;
        require_present(map, layer, "specStatus")?;
        require_present(map, layer, "xref")?;
    }

    if let Some(value) = map.get("group") {
        let group = expect_str(value, layer, "group")?;
        if group.trim().is_empty() {
            return Err(missing(layer, "group"));
        }
    }
    if let Some(value) = optional(map, "github") {
        validate_github(value, layer, "github")?;
    }
    for key in ["shortName", "subjectPrefix", "wgPublicList"] {
        if let Some(value) = optional(map, key) {
            expect_str(value, layer, key)?;
        }
    }
    if let Some(value) = map.get("specStatus") {
        let token = expect_str(value, layer, "specStatus")?;
        if let Err(message) = token.parse::<SpecStatus>() {
            return Err(invalid_field(layer, "specStatus", &message));
        }
    }
    if let Some(value) = optional(map, "edDraftURI") {
        expect_url(value, layer, "edDraftURI")?;
    }
    if let Some(value) = optional(map, "latestVersion") {
        expect_str(value, layer, "latestVersion")?;
    }
    if let Some(value) = map.get("xref") {
        validate_string_array(value, layer, "xref")?;
        if mode == SchemaMode::Full && value.as_array().is_some_and(Vec::is_empty) {
            return Err(missing(layer, "xref"));
        }
    }
    if let Some(value) = map.get("lint") {
        validate_lint(value, layer, "lint")?;
    }
    if let Some(value) = map.get("editors") {
        validate_people(value, layer, "editors", Retirement::Forbidden)?;
    }
    if let Some(value) = map.get("authors") {
        validate_people(value, layer, "authors", Retirement::Forbidden)?;
    }
    if let Some(value) = map.get("formerEditors") {
        validate_people(value, layer, "formerEditors", Retirement::Required)?;
    }
    if let Some(value) = map.get("otherLinks") {
        validate_other_links(value, layer, "otherLinks")?;
    }
    if let Some(value) = map.get("localBiblio") {
        validate_bibliography(value, layer, "localBiblio")?;
    }

    Ok(())
}

/// Validate the `github` option (shorthand string or object).
fn validate_github(value: &Value, layer: &str, path: &str) -> Result<(), ValidationError> {
    if let Some(spec) = value.as_str() {
        return GithubRepo::parse(spec)
            .map(|_| ())
            .map_err(|message| invalid_field(layer, path, &message));
    }
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["repoURL", "branch"], layer, path)?;

    let repo_path = join_path(path, "repoURL");
    let repo = map
        .get("repoURL")
        .ok_or_else(|| missing(layer, &repo_path))?;
    let repo_url = expect_url(repo, layer, &repo_path)?;
    check_repository_scheme(&repo_url)
        .map_err(|message| invalid_field(layer, &repo_path, &message))?;
    if let Some(value) = map.get("branch") {
        expect_str(value, layer, &join_path(path, "branch"))?;
    }
    Ok(())
}

/// Validate the lint rule table.
fn validate_lint(value: &Value, layer: &str, path: &str) -> Result<(), ValidationError> {
    let map = expect_object(value, layer, path)?;
    for (rule, enabled) in map {
        if !enabled.is_boolean() {
            return Err(invalid_field(layer, &join_path(path, rule), "expected bool"));
        }
    }
    Ok(())
}

/// Validate a list of editors, authors or former editors.
fn validate_people(
    value: &Value,
    layer: &str,
    path: &str,
    retirement: Retirement,
) -> Result<(), ValidationError> {
    let arr = expect_array(value, layer, path)?;
    for (idx, entry) in arr.iter().enumerate() {
        validate_person(entry, layer, &format!("{path}[{idx}]"), retirement)?;
    }
    Ok(())
}

/// Validate a single person entry.
fn validate_person(
    value: &Value,
    layer: &str,
    path: &str,
    retirement: Retirement,
) -> Result<(), ValidationError> {
    let malformed = |field: &str, message: &str| ValidationError::MalformedPersonEntry {
        layer: layer.to_string(),
        path: join_path(path, field),
        message: message.to_string(),
    };

    let Some(map) = value.as_object() else {
        return Err(malformed("", "expected object"));
    };
    for key in map.keys() {
        if !PERSON_KEYS.contains(&key.as_str()) {
            return Err(malformed(key, "unknown key"));
        }
    }

    match map.get("name").map(Value::as_str) {
        None => return Err(malformed("name", "missing name")),
        Some(None) => return Err(malformed("name", "expected string")),
        Some(Some(name)) if name.trim().is_empty() => {
            return Err(malformed("name", "missing name"));
        }
        Some(Some(_)) => {}
    }
    for key in ["company", "mailto", "note"] {
        if map.get(key).is_some_and(|value| !value.is_string()) {
            return Err(malformed(key, "expected string"));
        }
    }
    for key in ["companyURL", "url"] {
        if let Some(value) = map.get(key) {
            if !value.as_str().is_some_and(|url| Url::parse(url).is_ok()) {
                return Err(malformed(key, "expected URL"));
            }
        }
    }
    if let Some(value) = map.get("w3cid") {
        let numeric = match value {
            Value::Number(number) => number.is_u64(),
            Value::String(digits) => digits.parse::<u64>().is_ok(),
            _ => false,
        };
        if !numeric {
            return Err(malformed("w3cid", "expected numeric id"));
        }
    }

    match (retirement, map.get("retiredDate")) {
        (Retirement::Forbidden, Some(_)) => Err(malformed(
            "retiredDate",
            "only former editors carry a retirement date",
        )),
        (Retirement::Required, None) => Err(malformed("retiredDate", "missing retirement date")),
        (Retirement::Required, Some(value)) => {
            let valid = value
                .as_str()
                .is_some_and(|date| NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok());
            if valid {
                Ok(())
            } else {
                Err(malformed("retiredDate", "expected YYYY-MM-DD date"))
            }
        }
        (Retirement::Forbidden, None) => Ok(()),
    }
}

/// Validate `otherLinks` groups.
fn validate_other_links(value: &Value, layer: &str, path: &str) -> Result<(), ValidationError> {
    let groups = expect_array(value, layer, path)?;
    for (idx, group) in groups.iter().enumerate() {
        let group_path = format!("{path}[{idx}]");
        let map = expect_object(group, layer, &group_path)?;
        ensure_allowed_keys(map, &["key", "data"], layer, &group_path)?;

        let key_path = join_path(&group_path, "key");
        let key = map.get("key").ok_or_else(|| missing(layer, &key_path))?;
        expect_str(key, layer, &key_path)?;

        let Some(data) = map.get("data") else {
            continue;
        };
        let data_path = join_path(&group_path, "data");
        for (link_idx, link) in expect_array(data, layer, &data_path)?.iter().enumerate() {
            let link_path = format!("{data_path}[{link_idx}]");
            let link = expect_object(link, layer, &link_path)?;
            ensure_allowed_keys(link, &["value", "href"], layer, &link_path)?;

            let value_path = join_path(&link_path, "value");
            let value = link.get("value").ok_or_else(|| missing(layer, &value_path))?;
            expect_str(value, layer, &value_path)?;

            let href_path = join_path(&link_path, "href");
            let href = link.get("href").ok_or_else(|| missing(layer, &href_path))?;
            expect_url(href, layer, &href_path)?;
        }
    }
    Ok(())
}

/// Validate the local bibliography; alias targets are checked after decoding.
fn validate_bibliography(value: &Value, layer: &str, path: &str) -> Result<(), ValidationError> {
    let entries = expect_object(value, layer, path)?;
    for (key, entry) in entries {
        validate_citation(key, entry)?;
    }
    Ok(())
}

/// Validate one bibliography entry: a full reference or a bare alias.
fn validate_citation(key: &str, entry: &Value) -> Result<(), ValidationError> {
    let malformed = |message: &str| ValidationError::MalformedBibliographyEntry {
        key: key.to_string(),
        message: message.to_string(),
    };

    let Some(map) = entry.as_object() else {
        return Err(malformed("expected object"));
    };

    if let Some(target) = map.get("aliasOf") {
        if map.len() > 1 {
            return Err(malformed("alias entries take no other fields"));
        }
        return match target.as_str() {
            Some(target) if !target.trim().is_empty() => Ok(()),
            _ => Err(malformed("aliasOf must name a citation")),
        };
    }

    for field in map.keys() {
        if !REFERENCE_KEYS.contains(&field.as_str()) {
            return Err(malformed(&format!("unknown key {field}")));
        }
    }
    for field in ["title", "publisher"] {
        match map.get(field) {
            None => return Err(malformed(&format!("missing {field}"))),
            Some(value) if !value.is_string() => {
                return Err(malformed(&format!("{field} must be a string")));
            }
            Some(_) => {}
        }
    }
    match map.get("href").map(Value::as_str) {
        None => return Err(malformed("missing href")),
        Some(Some(href)) if Url::parse(href).is_ok() => {}
        Some(_) => return Err(malformed("href must be a URL")),
    }
    if let Some(authors) = map.get("authors") {
        let all_strings = authors
            .as_array()
            .is_some_and(|authors| authors.iter().all(Value::is_string));
        if !all_strings {
            return Err(malformed("authors must be a list of strings"));
        }
    }
    for field in ["status", "date"] {
        if map.get(field).is_some_and(|value| !value.is_string()) {
            return Err(malformed(&format!("{field} must be a string")));
        }
    }
    Ok(())
}

/// Value of an optional top-level key; an explicit `null` clears it.
fn optional<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

/// Fail with `MissingRequiredField` when `key` is absent or null.
fn require_present(map: &Map<String, Value>, layer: &str, key: &str) -> Result<(), ValidationError> {
    match map.get(key) {
        None | Some(Value::Null) => Err(missing(layer, key)),
        Some(_) => Ok(()),
    }
}

/// Expect a JSON object or return a typed error.
fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ValidationError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid_field(layer, path, "expected object")),
    }
}

/// Expect a JSON array or return a typed error.
fn expect_array<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Vec<Value>, ValidationError> {
    match value {
        Value::Array(arr) => Ok(arr),
        _ => Err(invalid_field(layer, path, "expected array")),
    }
}

/// Expect a JSON string or return a typed error.
fn expect_str<'a>(value: &'a Value, layer: &str, path: &str) -> Result<&'a str, ValidationError> {
    value
        .as_str()
        .ok_or_else(|| invalid_field(layer, path, "expected string"))
}

/// Expect an absolute URL string.
fn expect_url(value: &Value, layer: &str, path: &str) -> Result<Url, ValidationError> {
    let raw = expect_str(value, layer, path)?;
    Url::parse(raw).map_err(|err| invalid_field(layer, path, &format!("expected URL ({err})")))
}

/// Validate that a value is an array of strings.
fn validate_string_array(value: &Value, layer: &str, path: &str) -> Result<(), ValidationError> {
    let arr = expect_array(value, layer, path)?;
    for (idx, entry) in arr.iter().enumerate() {
        if entry.as_str().is_none() {
            return Err(invalid_field(
                layer,
                &format!("{path}[{idx}]"),
                "expected string",
            ));
        }
    }
    Ok(())
}

/// Ensure an object contains only allowed keys.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ValidationError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_field(layer, &join_path(path, key), "unknown key"));
        }
    }
    Ok(())
}

/// Join nested paths for better error messages.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else if key.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn missing(layer: &str, field: &str) -> ValidationError {
    ValidationError::MissingRequiredField {
        layer: layer.to_string(),
        field: field.to_string(),
    }
}

/// Build a structured invalid-field error.
fn invalid_field(layer: &str, path: &str, message: &str) -> ValidationError {
    let normalized_path = if path.is_empty() { "root" } else { path };
    ValidationError::InvalidField {
        layer: layer.to_string(),
        path: normalized_path.to_string(),
        message: message.to_string(),
    }
}
