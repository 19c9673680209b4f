//! Tests for config loading, validation and layering.

use super::*;
use crate::{
    BibliographyEntry, GithubRepo, Person, Reference, SpecStatus, ValidationError, W3cId,
};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use respec_rs_test_utils::{
    MINIMAL, VARIANT1_XREF, VARIANT3_XREF, WEBRTC_EXTENSIONS_SCRIPT, WEBRTC_EXTENSIONS_V2,
    WEBRTC_EXTENSIONS_V3_OVERRIDE, write_source,
};
use serde_json::json;
use tempfile::TempDir;
use url::Url;

fn validation_error(contents: &str) -> ValidationError {
    let err = SpecConfig::load_from_str(contents).unwrap_err();
    err.as_validation()
        .cloned()
        .unwrap_or_else(|| panic!("expected validation error, got {err}"))
}

fn url(raw: &str) -> Url {
    Url::parse(raw).expect("url")
}

/// The shipped script form parses into the full typed record.
#[test]
fn parses_webrtc_extensions_script() {
    let config = SpecConfig::load_from_str(WEBRTC_EXTENSIONS_SCRIPT).expect("config");

    assert_eq!(config.group, "webrtc");
    assert_eq!(config.spec_status, SpecStatus::EditorsDraft);
    assert_eq!(
        config.github,
        Some(GithubRepo::new(
            url("https://github.com/w3c/webrtc-extensions/"),
            "main"
        ))
    );
    assert_eq!(config.latest_version, None);
    assert_eq!(config.xref.as_slice(), VARIANT1_XREF);
    assert_eq!(config.wg_public_list.as_deref(), Some("public-webrtc"));

    assert_eq!(config.editors.len(), 1);
    assert_eq!(config.editors[0].name, "Bernard Aboba");
    assert_eq!(
        config.editors[0].company.as_deref(),
        Some("Microsoft Corporation")
    );
    assert_eq!(config.editors[0].w3cid, Some(W3cId(65611)));

    assert_eq!(config.former_editors.len(), 1);
    assert_eq!(config.former_editors[0].person.name, "Henrik Boström");
    assert_eq!(
        config.former_editors[0].retired_date,
        NaiveDate::from_ymd_opt(2021, 2, 1).expect("date")
    );
    assert!(config.authors.is_empty());

    assert_eq!(config.other_links[0].key, "Participate");
    assert_eq!(
        config.other_links[0].data[0].href,
        url("https://lists.w3.org/Archives/Public/public-webrtc/")
    );

    assert_eq!(config.local_biblio.len(), 3);
    assert_eq!(
        config.local_biblio.get("CRYPTEX"),
        Some(&BibliographyEntry::alias_of("RFC9335"))
    );
    let Some(BibliographyEntry::Reference(capture_time)) =
        config.local_biblio.get("RTP-EXT-CAPTURE-TIME")
    else {
        panic!("expected full reference");
    };
    assert_eq!(capture_time.authors, vec!["H. Alvestrand".to_string()]);
    assert_eq!(capture_time.publisher, "IETF");
    assert!(config.extras.is_empty());
}

/// Loading, re-emitting and loading again yields the same record.
#[test]
fn reload_after_serialization_is_identical() {
    for source in [WEBRTC_EXTENSIONS_SCRIPT, WEBRTC_EXTENSIONS_V2, MINIMAL] {
        let config = SpecConfig::load_from_str(source).expect("config");
        let json = config.to_json_string().expect("json");
        assert_eq!(SpecConfig::load_from_str(&json).expect("json reload"), config);
        let script = config.to_respec_script().expect("script");
        assert!(script.starts_with("var respecConfig = {"));
        assert_eq!(
            SpecConfig::load_from_str(&script).expect("script reload"),
            config
        );
    }
}

#[test]
fn missing_group_is_reported_by_name() {
    let err = validation_error(r#"{ specStatus: "ED", xref: ["webrtc"] }"#);
    assert_eq!(
        err,
        ValidationError::MissingRequiredField {
            layer: "config".to_string(),
            field: "group".to_string(),
        }
    );
    assert_eq!(err.field(), Some("group"));
}

#[test]
fn missing_status_and_empty_xref_are_required_fields() {
    let err = validation_error(r#"{ group: "webrtc", xref: ["webrtc"] }"#);
    assert_eq!(err.field(), Some("specStatus"));

    let err = validation_error(r#"{ group: "webrtc", specStatus: "ED", xref: [] }"#);
    assert!(matches!(
        err,
        ValidationError::MissingRequiredField { ref field, .. } if field == "xref"
    ));
}

#[test]
fn rejects_unknown_spec_status() {
    let err = validation_error(r#"{ group: "webrtc", specStatus: "DRAFTY", xref: ["dom"] }"#);
    let msg = err.to_string();
    assert!(msg.contains("specStatus"), "{msg}");
    assert!(msg.contains("unknown spec status"), "{msg}");
}

/// An alias into an external registry needs no local definition.
#[test]
fn external_alias_alone_loads() {
    let config = SpecConfig::load_from_str(
        r#"{ group: "webrtc", specStatus: "ED", xref: ["webrtc"],
             localBiblio: { "CRYPTEX": { "aliasOf": "RFC9335" } } }"#,
    )
    .expect("config");
    assert_eq!(config.local_biblio.len(), 1);
}

#[test]
fn alias_to_unknown_local_key_is_invalid() {
    let err = validation_error(
        r#"{ group: "webrtc", specStatus: "ED", xref: ["webrtc"],
             localBiblio: { "CRYPTEX": { "aliasOf": "CRYPTEX-TYPO" } } }"#,
    );
    assert_eq!(
        err,
        ValidationError::InvalidAliasTarget {
            key: "CRYPTEX".to_string(),
            target: "CRYPTEX-TYPO".to_string(),
        }
    );
}

#[test]
fn alias_chains_resolve_and_cycles_do_not() {
    let config = SpecConfig::load_from_str(
        r#"{ group: "webrtc", specStatus: "ED", xref: ["webrtc"],
             localBiblio: {
               A: { aliasOf: "B" },
               B: { aliasOf: "C" },
               C: { title: "C", href: "https://example.org/c", publisher: "W3C" },
             } }"#,
    )
    .expect("chain");
    assert_eq!(config.local_biblio.len(), 3);

    let err = validation_error(
        r#"{ group: "webrtc", specStatus: "ED", xref: ["webrtc"],
             localBiblio: { A: { aliasOf: "B" }, B: { aliasOf: "A" } } }"#,
    );
    assert!(matches!(err, ValidationError::InvalidAliasTarget { .. }));

    let err = validation_error(
        r#"{ group: "webrtc", specStatus: "ED", xref: ["webrtc"],
             localBiblio: { SELF: { aliasOf: "SELF" } } }"#,
    );
    assert!(matches!(err, ValidationError::InvalidAliasTarget { .. }));
}

#[test]
fn alias_with_extra_fields_is_malformed() {
    let err = validation_error(
        r#"{ group: "webrtc", specStatus: "ED", xref: ["webrtc"],
             localBiblio: { CRYPTEX: { aliasOf: "RFC9335", title: "Cryptex" } } }"#,
    );
    assert!(matches!(
        err,
        ValidationError::MalformedBibliographyEntry { ref key, .. } if key == "CRYPTEX"
    ));
}

#[test]
fn reference_without_title_is_malformed() {
    let err = validation_error(
        r#"{ group: "webrtc", specStatus: "ED", xref: ["webrtc"],
             localBiblio: { X: { href: "https://example.org/", publisher: "IANA" } } }"#,
    );
    assert_eq!(
        err,
        ValidationError::MalformedBibliographyEntry {
            key: "X".to_string(),
            message: "missing title".to_string(),
        }
    );
}

#[test]
fn repeated_citation_key_in_source_is_rejected() {
    let err = validation_error(
        r#"{ group: "webrtc", specStatus: "ED", xref: ["webrtc"],
             localBiblio: {
               CRYPTEX: { aliasOf: "RFC9335" },
               CRYPTEX: { aliasOf: "RFC9335" },
             } }"#,
    );
    assert_eq!(
        err,
        ValidationError::DuplicateCitationKey {
            key: "CRYPTEX".to_string()
        }
    );
}

#[test]
fn repeated_top_level_key_is_rejected() {
    let err = validation_error(
        r#"{ group: "webrtc", group: "webapps", specStatus: "ED", xref: ["webrtc"] }"#,
    );
    assert!(matches!(
        err,
        ValidationError::InvalidField { ref path, ref message, .. }
            if path == "group" && message == "duplicate key"
    ));
}

#[test]
fn person_without_name_is_malformed() {
    let err = validation_error(
        r#"{ group: "webrtc", specStatus: "ED", xref: ["webrtc"],
             editors: [{ company: "Google" }] }"#,
    );
    assert_eq!(
        err,
        ValidationError::MalformedPersonEntry {
            layer: "config".to_string(),
            path: "editors[0].name".to_string(),
            message: "missing name".to_string(),
        }
    );
}

#[test]
fn retirement_date_only_on_former_editors() {
    let err = validation_error(
        r#"{ group: "webrtc", specStatus: "ED", xref: ["webrtc"],
             editors: [{ name: "A", retiredDate: "2021-02-01" }] }"#,
    );
    assert_eq!(err.field(), Some("editors[0].retiredDate"));

    let err = validation_error(
        r#"{ group: "webrtc", specStatus: "ED", xref: ["webrtc"],
             formerEditors: [{ name: "A" }] }"#,
    );
    assert_eq!(err.field(), Some("formerEditors[0].retiredDate"));

    let err = validation_error(
        r#"{ group: "webrtc", specStatus: "ED", xref: ["webrtc"],
             formerEditors: [{ name: "A", retiredDate: "Feb 2021" }] }"#,
    );
    assert!(matches!(err, ValidationError::MalformedPersonEntry { .. }));
}

#[test]
fn rejects_non_numeric_w3cid() {
    let err = validation_error(
        r#"{ group: "webrtc", specStatus: "ED", xref: ["webrtc"],
             authors: [{ name: "A", w3cid: "abc" }] }"#,
    );
    assert_eq!(err.field(), Some("authors[0].w3cid"));
}

#[test]
fn rejects_unknown_key_in_typed_block() {
    let err = validation_error(
        r#"{ group: "webrtc", specStatus: "ED", xref: ["webrtc"],
             github: { repoURL: "https://github.com/w3c/x/", tag: "v1" } }"#,
    );
    let msg = err.to_string();
    assert!(msg.contains("github.tag"), "{msg}");
    assert!(msg.contains("unknown key"), "{msg}");
}

#[test]
fn keeps_unmodelled_options_verbatim() {
    let config = SpecConfig::load_from_str(
        r#"{ group: "webrtc", specStatus: "ED", xref: ["webrtc"],
             maxTocLevel: 2, postProcess: ["fixup"] }"#,
    )
    .expect("config");
    assert_eq!(config.extras.get("maxTocLevel"), Some(&json!(2)));
    let json = config.to_json_string().expect("json");
    assert!(json.contains("\"postProcess\""));
}

#[test]
fn github_shorthand_is_normalized() {
    let config = SpecConfig::load_from_str(WEBRTC_EXTENSIONS_V2).expect("config");
    assert_eq!(
        config.github,
        Some(GithubRepo::new(
            url("https://github.com/w3c/webrtc-extensions/"),
            "main"
        ))
    );
    assert_eq!(config.lint.get("no-unused-dfns"), Some(&false));
    assert_eq!(config.editors[0].w3cid, Some(W3cId(65611)));
}

#[test]
fn repeated_xref_targets_keep_first_occurrence() {
    let config = SpecConfig::load_from_str(
        r#"{ group: "webrtc", specStatus: "ED", xref: ["dom", "webrtc", "dom"] }"#,
    )
    .expect("config");
    assert_eq!(config.xref.as_slice(), ["dom", "webrtc"]);
}

#[test]
fn script_without_object_is_reported() {
    let err = SpecConfig::load_from_str("var respecConfig = null;").unwrap_err();
    assert!(matches!(err, ConfigError::MissingObject(_)));
}

#[test]
fn loads_from_path() {
    let temp = TempDir::new().expect("tmp");
    let path = write_source(temp.path(), "respec-config.js", WEBRTC_EXTENSIONS_SCRIPT);
    let config = SpecConfig::load_from_path(&path).expect("config");
    assert_eq!(config.group, "webrtc");

    let err = SpecConfig::load_from_path(temp.path().join("missing.js")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFailed(_)));
}

/// A later edit that only lists xref replaces the list and keeps the rest.
#[test]
fn layered_override_replaces_xref_list() {
    let temp = TempDir::new().expect("tmp");
    let base = write_source(temp.path(), "respec-config.js", WEBRTC_EXTENSIONS_SCRIPT);
    let edit = write_source(temp.path(), "edits/v3.json5", WEBRTC_EXTENSIONS_V3_OVERRIDE);

    let layered = SpecConfig::load_layered(&base, &[&edit]).expect("layered");
    assert_eq!(layered.config.xref.as_slice(), VARIANT3_XREF);
    assert_eq!(layered.config.editors[0].name, "Bernard Aboba");
    assert_eq!(layered.config.local_biblio.len(), 3);

    let sources: Vec<ConfigLayerSource> =
        layered.layers.iter().map(|layer| layer.source).collect();
    assert_eq!(
        sources,
        vec![ConfigLayerSource::Base, ConfigLayerSource::Override]
    );
}

#[test]
fn later_overrides_win() {
    let temp = TempDir::new().expect("tmp");
    let base = write_source(temp.path(), "base.json5", MINIMAL);
    let first = write_source(temp.path(), "first.json5", r#"{ shortName: "first" }"#);
    let second = write_source(temp.path(), "second.json5", r#"{ shortName: "second" }"#);

    let options = LayeredConfigOptions::new(&base)
        .with_override(&first)
        .with_override(&second);
    let layered = SpecConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.config.short_name.as_deref(), Some("second"));
}

#[test]
fn required_fields_checked_on_effective_record_only() {
    let temp = TempDir::new().expect("tmp");
    let base = write_source(
        temp.path(),
        "base.json5",
        r#"{ specStatus: "ED", xref: ["webrtc"] }"#,
    );
    let edit = write_source(temp.path(), "group.json5", r#"{ group: "webrtc" }"#);

    let layered = SpecConfig::load_layered(&base, &[&edit]).expect("layered");
    assert_eq!(layered.config.group, "webrtc");

    let no_overrides: &[PathBuf] = &[];
    let err = SpecConfig::load_layered(&base, no_overrides).unwrap_err();
    assert_eq!(
        err.as_validation(),
        Some(&ValidationError::MissingRequiredField {
            layer: "effective".to_string(),
            field: "group".to_string(),
        })
    );
}

#[test]
fn override_layers_are_shape_checked() {
    let temp = TempDir::new().expect("tmp");
    let base = write_source(temp.path(), "base.json5", MINIMAL);
    let edit = write_source(temp.path(), "bad.json5", r#"{ xref: "webrtc" }"#);

    let err = SpecConfig::load_layered(&base, &[&edit]).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("override("), "{msg}");
    assert!(msg.contains("xref"), "{msg}");
    assert!(msg.contains("expected array"), "{msg}");
}

#[test]
fn repeated_override_path_is_read_once() {
    let temp = TempDir::new().expect("tmp");
    let base = write_source(temp.path(), "base.json5", MINIMAL);
    let edit = write_source(temp.path(), "edit.json5", r#"{ shortName: "x" }"#);

    let layered = SpecConfig::load_layered(&base, &[&edit, &edit]).expect("layered");
    assert_eq!(layered.layers.len(), 3);
    assert_eq!(layered.layers[1].disabled_reason, None);
    assert_eq!(
        layered.layers[2].disabled_reason.as_deref(),
        Some("already loaded")
    );
}

#[test]
fn builder_rejects_repeated_citation_key() {
    let reference = Reference::new(
        "STUN Error Codes",
        url("https://www.iana.org/assignments/stun-parameters/"),
        "IANA",
    );
    let err = SpecConfig::builder("webrtc", SpecStatus::EditorsDraft)
        .cite("IANA-STUN-6", reference.clone().into())
        .expect("first")
        .cite("IANA-STUN-6", reference.into())
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::DuplicateCitationKey {
            key: "IANA-STUN-6".to_string()
        }
    );
}

#[test]
fn builder_enforces_loader_invariants() {
    let err = SpecConfig::builder("webrtc", SpecStatus::EditorsDraft)
        .build()
        .unwrap_err();
    assert_eq!(err.field(), Some("xref"));

    let err = SpecConfig::builder("webrtc", SpecStatus::EditorsDraft)
        .xref(["webrtc"])
        .editor(Person::new(" "))
        .build()
        .unwrap_err();
    assert_eq!(err.field(), Some("editors[0].name"));

    let config = SpecConfig::builder("webrtc", SpecStatus::EditorsDraft)
        .xref(["webrtc"])
        .editor(Person::new("Bernard Aboba").with_w3cid(65611))
        .former_editor(
            Person::new("Henrik Boström")
                .with_company("Google")
                .retired(NaiveDate::from_ymd_opt(2021, 2, 1).expect("date")),
        )
        .cite("CRYPTEX", BibliographyEntry::alias_of("RFC9335"))
        .expect("cite")
        .build()
        .expect("config");
    let reloaded =
        SpecConfig::load_from_str(&config.to_json_string().expect("json")).expect("reload");
    assert_eq!(reloaded, config);
}

#[test]
fn assignment_after_commented_mention_loads() {
    let config = SpecConfig::load_from_str(
        "// respecConfig = ReSpec's settings object\n\
         var respecConfig = { group: \"webrtc\", specStatus: \"ED\", xref: [\"webrtc\"] };",
    )
    .expect("config");
    assert_eq!(config.group, "webrtc");
}

#[test]
fn override_can_clear_optional_fields_with_null() {
    let temp = TempDir::new().expect("tmp");
    let base = write_source(
        temp.path(),
        "base.json5",
        r#"{ group: "webrtc", specStatus: "ED", xref: ["webrtc"],
             shortName: "x", github: "w3c/webrtc-extensions",
             edDraftURI: "https://w3c.github.io/webrtc-extensions/",
             subjectPrefix: "[webrtc-extensions]" }"#,
    );
    let edit = write_source(
        temp.path(),
        "clear.json5",
        r#"{ shortName: null, github: null, edDraftURI: null }"#,
    );

    let layered = SpecConfig::load_layered(&base, &[&edit]).expect("layered");
    assert_eq!(layered.config.short_name, None);
    assert_eq!(layered.config.github, None);
    assert_eq!(layered.config.ed_draft_uri, None);
    assert_eq!(
        layered.config.subject_prefix.as_deref(),
        Some("[webrtc-extensions]")
    );

    let edit = write_source(temp.path(), "group.json5", r#"{ group: null }"#);
    let err = SpecConfig::load_layered(&base, &[&edit]).unwrap_err();
    assert!(err.to_string().contains("override("), "{err}");
}

#[test]
fn typed_keys_cannot_be_extras() {
    let err = SpecConfig::builder("webrtc", SpecStatus::EditorsDraft)
        .xref(["webrtc"])
        .extra("group", json!("other"))
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::InvalidField {
            layer: "builder".to_string(),
            path: "group".to_string(),
            message: "typed option cannot be kept as an extra".to_string(),
        }
    );

    let config = SpecConfig::builder("webrtc", SpecStatus::EditorsDraft)
        .xref(["webrtc"])
        .extra("maxTocLevel", json!(2))
        .build()
        .expect("config");
    let json = config.to_json_string().expect("json");
    assert_eq!(SpecConfig::load_from_str(&json).expect("reload"), config);
}

#[test]
fn validation_errors_name_their_source() {
    let err = SpecConfig::builder(" ", SpecStatus::EditorsDraft)
        .xref(["webrtc"])
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::MissingRequiredField {
            layer: "builder".to_string(),
            field: "group".to_string(),
        }
    );

    let mut config = SpecConfig::load_from_str(MINIMAL).expect("config");
    config.xref = Vec::<String>::new().into();
    assert_eq!(
        config.validate(),
        Err(ValidationError::MissingRequiredField {
            layer: "config".to_string(),
            field: "xref".to_string(),
        })
    );
    assert_eq!(
        config.validate_in(EFFECTIVE_LABEL).unwrap_err().to_string(),
        "missing required field effective:xref"
    );
}

#[test]
fn repository_urls_must_be_http() {
    assert!(GithubRepo::parse("foo:bar").is_err());
    assert!(GithubRepo::parse("ftp://example.org/w3c/x").is_err());
    assert!(GithubRepo::parse("http://github.com/w3c/x/").is_ok());

    let err = validation_error(
        r#"{ group: "webrtc", specStatus: "ED", xref: ["webrtc"], github: "foo:bar" }"#,
    );
    assert_eq!(err.field(), Some("github"));

    let err = validation_error(
        r#"{ group: "webrtc", specStatus: "ED", xref: ["webrtc"],
             github: { repoURL: "mailto:someone@example.org" } }"#,
    );
    assert_eq!(err.field(), Some("github.repoURL"));
}
