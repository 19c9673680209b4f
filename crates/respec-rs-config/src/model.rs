//! Configuration schema for ReSpec spec records.
//!
//! Field names on the wire match the renderer's `respecConfig` keys exactly,
//! which is why most structs rename to camelCase.

use crate::ValidationError;
use chrono::NaiveDate;
use regex::Regex;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use url::Url;

/// Citation namespaces owned by external registries; aliases into them are
/// never resolved locally.
static EXTERNAL_CITATION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(?:RFC|BCP|STD)\d+|FIPS-?\d+|draft-.+|I-D\..+)$").ok()
});

/// Label validation errors carry for records assembled in code.
const BUILDER_LABEL: &str = "builder";

/// Root config record handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecConfig {
    pub group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<GithubRepo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    pub spec_status: SpecStatus,
    #[serde(
        default,
        rename = "edDraftURI",
        skip_serializing_if = "Option::is_none"
    )]
    pub ed_draft_uri: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    pub xref: XrefTargets,
    #[serde(default)]
    pub lint: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wg_public_list: Option<String>,
    #[serde(default)]
    pub editors: Vec<Person>,
    #[serde(default)]
    pub former_editors: Vec<FormerEditor>,
    #[serde(default)]
    pub authors: Vec<Person>,
    #[serde(default)]
    pub other_links: Vec<LinkGroup>,
    #[serde(default)]
    pub local_biblio: Bibliography,
    /// Renderer options this schema does not model, kept verbatim.
    #[serde(flatten)]
    pub extras: BTreeMap<String, Value>,
}

impl SpecConfig {
    /// Start building a record in code.
    pub fn builder(group: impl Into<String>, spec_status: SpecStatus) -> SpecConfigBuilder {
        SpecConfigBuilder::new(group, spec_status)
    }
}

/// Builder for assembling a `SpecConfig` programmatically.
#[derive(Debug, Clone)]
pub struct SpecConfigBuilder {
    config: SpecConfig,
}

impl SpecConfigBuilder {
    /// Create a builder with the two required scalar fields set.
    pub fn new(group: impl Into<String>, spec_status: SpecStatus) -> Self {
        Self {
            config: SpecConfig {
                group: group.into(),
                github: None,
                short_name: None,
                spec_status,
                ed_draft_uri: None,
                latest_version: None,
                xref: XrefTargets::default(),
                lint: BTreeMap::new(),
                subject_prefix: None,
                wg_public_list: None,
                editors: Vec::new(),
                former_editors: Vec::new(),
                authors: Vec::new(),
                other_links: Vec::new(),
                local_biblio: Bibliography::default(),
                extras: BTreeMap::new(),
            },
        }
    }

    /// Set the repository location.
    pub fn github(mut self, github: GithubRepo) -> Self {
        self.config.github = Some(github);
        self
    }

    /// Set the document short name.
    pub fn short_name(mut self, short_name: impl Into<String>) -> Self {
        self.config.short_name = Some(short_name.into());
        self
    }

    /// Set the editor's draft location.
    pub fn ed_draft_uri(mut self, uri: Url) -> Self {
        self.config.ed_draft_uri = Some(uri);
        self
    }

    /// Replace the cross-reference targets.
    pub fn xref<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.xref = targets.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable a lint rule.
    pub fn lint(mut self, rule: impl Into<String>, enabled: bool) -> Self {
        self.config.lint.insert(rule.into(), enabled);
        self
    }

    /// Set the mailing-list subject prefix.
    pub fn subject_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.subject_prefix = Some(prefix.into());
        self
    }

    /// Set the working group's public mailing list.
    pub fn wg_public_list(mut self, list: impl Into<String>) -> Self {
        self.config.wg_public_list = Some(list.into());
        self
    }

    /// Append an editor.
    pub fn editor(mut self, person: Person) -> Self {
        self.config.editors.push(person);
        self
    }

    /// Append a former editor.
    pub fn former_editor(mut self, former: FormerEditor) -> Self {
        self.config.former_editors.push(former);
        self
    }

    /// Append an author.
    pub fn author(mut self, person: Person) -> Self {
        self.config.authors.push(person);
        self
    }

    /// Append a group of links.
    pub fn other_links(mut self, group: LinkGroup) -> Self {
        self.config.other_links.push(group);
        self
    }

    /// Add a bibliography entry, rejecting a key that is already present.
    pub fn cite(
        mut self,
        key: impl Into<String>,
        entry: BibliographyEntry,
    ) -> Result<Self, ValidationError> {
        self.config.local_biblio.insert(key, entry)?;
        Ok(self)
    }

    /// Keep a renderer option this schema does not model.
    ///
    /// Keys the schema already types are rejected by [`SpecConfigBuilder::build`].
    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.extras.insert(key.into(), value);
        self
    }

    /// Finalize the record, checking the same invariants as the loader.
    pub fn build(self) -> Result<SpecConfig, ValidationError> {
        self.config.validate_in(BUILDER_LABEL)?;
        Ok(self.config)
    }
}

/// Document maturity token understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum SpecStatus {
    /// Editor's Draft.
    EditorsDraft,
    /// First Public Working Draft.
    FirstPublicWorkingDraft,
    WorkingDraft,
    CandidateRecommendation,
    CandidateRecommendationDraft,
    ProposedRecommendation,
    Recommendation,
    Rescinded,
    Discontinued,
    Note,
    DraftNote,
    Statement,
    DraftRegistry,
    Registry,
    CandidateRegistryDraft,
    CommunityGroupDraft,
    CommunityGroupFinal,
    BusinessGroupDraft,
    BusinessGroupFinal,
    MemberSubmission,
    Unofficial,
    Base,
}

impl SpecStatus {
    const ALL: [SpecStatus; 22] = [
        SpecStatus::EditorsDraft,
        SpecStatus::FirstPublicWorkingDraft,
        SpecStatus::WorkingDraft,
        SpecStatus::CandidateRecommendation,
        SpecStatus::CandidateRecommendationDraft,
        SpecStatus::ProposedRecommendation,
        SpecStatus::Recommendation,
        SpecStatus::Rescinded,
        SpecStatus::Discontinued,
        SpecStatus::Note,
        SpecStatus::DraftNote,
        SpecStatus::Statement,
        SpecStatus::DraftRegistry,
        SpecStatus::Registry,
        SpecStatus::CandidateRegistryDraft,
        SpecStatus::CommunityGroupDraft,
        SpecStatus::CommunityGroupFinal,
        SpecStatus::BusinessGroupDraft,
        SpecStatus::BusinessGroupFinal,
        SpecStatus::MemberSubmission,
        SpecStatus::Unofficial,
        SpecStatus::Base,
    ];

    /// Token as written in `specStatus`.
    pub fn as_str(self) -> &'static str {
        match self {
            SpecStatus::EditorsDraft => "ED",
            SpecStatus::FirstPublicWorkingDraft => "FPWD",
            SpecStatus::WorkingDraft => "WD",
            SpecStatus::CandidateRecommendation => "CR",
            SpecStatus::CandidateRecommendationDraft => "CRD",
            SpecStatus::ProposedRecommendation => "PR",
            SpecStatus::Recommendation => "REC",
            SpecStatus::Rescinded => "RSCND",
            SpecStatus::Discontinued => "DISC",
            SpecStatus::Note => "NOTE",
            SpecStatus::DraftNote => "DNOTE",
            SpecStatus::Statement => "STMT",
            SpecStatus::DraftRegistry => "DRY",
            SpecStatus::Registry => "RY",
            SpecStatus::CandidateRegistryDraft => "CRYD",
            SpecStatus::CommunityGroupDraft => "CG-DRAFT",
            SpecStatus::CommunityGroupFinal => "CG-FINAL",
            SpecStatus::BusinessGroupDraft => "BG-DRAFT",
            SpecStatus::BusinessGroupFinal => "BG-FINAL",
            SpecStatus::MemberSubmission => "Member-SUBM",
            SpecStatus::Unofficial => "unofficial",
            SpecStatus::Base => "base",
        }
    }

    /// True for documents still being edited rather than published.
    pub fn is_draft(self) -> bool {
        matches!(
            self,
            SpecStatus::EditorsDraft
                | SpecStatus::FirstPublicWorkingDraft
                | SpecStatus::WorkingDraft
                | SpecStatus::CandidateRecommendationDraft
                | SpecStatus::DraftNote
                | SpecStatus::DraftRegistry
                | SpecStatus::CandidateRegistryDraft
                | SpecStatus::CommunityGroupDraft
                | SpecStatus::BusinessGroupDraft
        )
    }
}

impl fmt::Display for SpecStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecStatus {
    type Err = String;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        SpecStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == token)
            .ok_or_else(|| format!("unknown spec status {token:?}"))
    }
}

impl TryFrom<String> for SpecStatus {
    type Error = String;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        token.parse()
    }
}

impl From<SpecStatus> for &'static str {
    fn from(status: SpecStatus) -> Self {
        status.as_str()
    }
}

/// Repository hosting the document sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GithubSource")]
pub struct GithubRepo {
    #[serde(rename = "repoURL")]
    pub repo_url: Url,
    pub branch: String,
}

impl GithubRepo {
    /// Repository at `repo_url` tracking `branch`.
    pub fn new(repo_url: Url, branch: impl Into<String>) -> Self {
        Self {
            repo_url,
            branch: branch.into(),
        }
    }

    /// Repository at `repo_url`, which must be an `http` or `https` URL.
    pub fn from_url(repo_url: Url, branch: impl Into<String>) -> Result<Self, String> {
        check_repository_scheme(&repo_url)?;
        Ok(Self::new(repo_url, branch))
    }

    /// Parse `owner/repo` shorthand or a repository URL; branch defaults to `main`.
    pub fn parse(spec: &str) -> Result<Self, String> {
        if let Ok(url) = Url::parse(spec) {
            return Self::from_url(url, default_branch());
        }
        let mut parts = spec.trim_matches('/').split('/');
        let (Some(owner), Some(repo), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(format!("expected owner/repo or a URL, got {spec:?}"));
        };
        if owner.is_empty() || repo.is_empty() {
            return Err(format!("expected owner/repo or a URL, got {spec:?}"));
        }
        let repo_url = Url::parse(&format!("https://github.com/{owner}/{repo}/"))
            .map_err(|err| err.to_string())?;
        Ok(Self::new(repo_url, default_branch()))
    }
}

pub(crate) fn check_repository_scheme(url: &Url) -> Result<(), String> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(format!(
            "expected an http(s) repository URL, got scheme {scheme:?}"
        )),
    }
}

/// Accepted spellings of the `github` option.
#[derive(Deserialize)]
#[serde(untagged)]
enum GithubSource {
    Shorthand(String),
    Full {
        #[serde(rename = "repoURL")]
        repo_url: Url,
        #[serde(default = "default_branch")]
        branch: String,
    },
}

impl TryFrom<GithubSource> for GithubRepo {
    type Error = String;

    fn try_from(source: GithubSource) -> Result<Self, Self::Error> {
        match source {
            GithubSource::Shorthand(spec) => GithubRepo::parse(&spec),
            GithubSource::Full { repo_url, branch } => GithubRepo::from_url(repo_url, branch),
        }
    }
}

fn default_branch() -> String {
    "main".to_string()
}

/// Ordered set of specifications whose terms may be linked.
///
/// Order is kept because it sets lookup precedence; repeated identifiers are
/// dropped, keeping the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct XrefTargets(Vec<String>);

impl XrefTargets {
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, spec: &str) -> bool {
        self.0.iter().any(|target| target == spec)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for XrefTargets {
    fn from(targets: Vec<String>) -> Self {
        targets.into_iter().collect()
    }
}

impl From<XrefTargets> for Vec<String> {
    fn from(targets: XrefTargets) -> Self {
        targets.0
    }
}

impl FromIterator<String> for XrefTargets {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut targets: Vec<String> = Vec::new();
        for target in iter {
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
        Self(targets)
    }
}

impl<'a> IntoIterator for &'a XrefTargets {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Editor or author credited on the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(
        default,
        rename = "companyURL",
        skip_serializing_if = "Option::is_none"
    )]
    pub company_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w3cid: Option<W3cId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mailto: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Person {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            company: None,
            company_url: None,
            url: None,
            w3cid: None,
            mailto: None,
            note: None,
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_company_url(mut self, url: Url) -> Self {
        self.company_url = Some(url);
        self
    }

    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    pub fn with_w3cid(mut self, id: u64) -> Self {
        self.w3cid = Some(W3cId(id));
        self
    }

    /// Retire this person as of `date`.
    pub fn retired(self, date: NaiveDate) -> FormerEditor {
        FormerEditor {
            person: self,
            retired_date: date,
        }
    }
}

/// Previous editor, kept for attribution history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormerEditor {
    #[serde(flatten)]
    pub person: Person,
    #[serde(rename = "retiredDate")]
    pub retired_date: NaiveDate,
}

/// Numeric W3C account identifier.
///
/// Sources write it either as a number or as a digit string; it is emitted as
/// a string, which is what the renderer's own examples use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct W3cId(pub u64);

impl fmt::Display for W3cId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for W3cId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for W3cId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct W3cIdVisitor;

        impl Visitor<'_> for W3cIdVisitor {
            type Value = W3cId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or digit string")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<W3cId, E> {
                Ok(W3cId(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<W3cId, E> {
                u64::try_from(value)
                    .map(W3cId)
                    .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<W3cId, E> {
                value
                    .parse()
                    .map(W3cId)
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
            }
        }

        deserializer.deserialize_any(W3cIdVisitor)
    }
}

/// Labelled group of links shown in the document header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkGroup {
    pub key: String,
    #[serde(default)]
    pub data: Vec<Link>,
}

/// Single entry of a link group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub value: String,
    pub href: Url,
}

/// Local bibliography keyed by citation tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bibliography(BTreeMap<String, BibliographyEntry>);

impl Bibliography {
    /// Insert an entry; a key may only be defined once.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        entry: BibliographyEntry,
    ) -> Result<(), ValidationError> {
        match self.0.entry(key.into()) {
            btree_map::Entry::Occupied(slot) => Err(ValidationError::DuplicateCitationKey {
                key: slot.key().clone(),
            }),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(())
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&BibliographyEntry> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, BibliographyEntry> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check that every alias ends at a local reference or an external citation.
    pub fn validate_aliases(&self) -> Result<(), ValidationError> {
        for (key, entry) in &self.0 {
            let BibliographyEntry::Alias { alias_of } = entry else {
                continue;
            };
            let mut seen = vec![key.as_str()];
            let mut target = alias_of.as_str();
            loop {
                if is_external_citation(target) {
                    break;
                }
                let invalid = || ValidationError::InvalidAliasTarget {
                    key: key.clone(),
                    target: alias_of.clone(),
                };
                if seen.contains(&target) {
                    return Err(invalid());
                }
                match self.0.get(target) {
                    Some(BibliographyEntry::Reference(_)) => break,
                    Some(BibliographyEntry::Alias { alias_of: next }) => {
                        seen.push(target);
                        target = next.as_str();
                    }
                    None => return Err(invalid()),
                }
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Bibliography {
    type Item = (&'a String, &'a BibliographyEntry);
    type IntoIter = btree_map::Iter<'a, String, BibliographyEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// True when `tag` belongs to an external citation registry namespace.
pub fn is_external_citation(tag: &str) -> bool {
    EXTERNAL_CITATION
        .as_ref()
        .is_some_and(|regex| regex.is_match(tag))
}

/// Single local bibliography entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BibliographyEntry {
    /// Points at the canonical definition under another tag.
    Alias {
        #[serde(rename = "aliasOf")]
        alias_of: String,
    },
    Reference(Reference),
}

impl BibliographyEntry {
    pub fn alias_of(target: impl Into<String>) -> Self {
        BibliographyEntry::Alias {
            alias_of: target.into(),
        }
    }
}

/// Fully described citation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub title: String,
    pub href: Url,
    pub publisher: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Reference {
    pub fn new(title: impl Into<String>, href: Url, publisher: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            href,
            publisher: publisher.into(),
            authors: Vec::new(),
            status: None,
            date: None,
        }
    }
}

impl From<Reference> for BibliographyEntry {
    fn from(reference: Reference) -> Self {
        BibliographyEntry::Reference(reference)
    }
}
