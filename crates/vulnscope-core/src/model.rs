//! Core data structures: dependency identity and analysis results

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while parsing a package URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurlError {
    #[error("package url must start with `pkg:`: {0}")]
    MissingScheme(String),
    #[error("package url has no type: {0}")]
    MissingType(String),
    #[error("package url has no name: {0}")]
    MissingName(String),
}

/// A parsed package URL (`pkg:type/namespace/name@version?qualifiers#subpath`).
///
/// Namespace, name and version are stored percent-decoded, with the
/// lowercasing the package type requires already applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageUrl {
    pub ty: String,
    pub namespace: Option<String>,
    pub name: String,
    pub version: Option<String>,
    pub qualifiers: Option<String>,
    pub subpath: Option<String>,
}

impl PackageUrl {
    pub fn parse(input: &str) -> Result<Self, PurlError> {
        let trimmed = input.trim();
        let rest = trimmed
            .strip_prefix("pkg:")
            .ok_or_else(|| PurlError::MissingScheme(input.to_string()))?;

        let (rest, subpath) = split_off(rest, '#');
        let (rest, qualifiers) = split_off(rest, '?');
        let rest = rest.trim_matches('/');

        let (ty, path) = rest
            .split_once('/')
            .ok_or_else(|| PurlError::MissingType(input.to_string()))?;
        if ty.is_empty() {
            return Err(PurlError::MissingType(input.to_string()));
        }

        // The version separator is the last `@` after the final path segment
        // starts, so unencoded npm scopes (`@scope/name`) survive.
        let last_segment = path.rfind('/').map_or(0, |i| i + 1);
        let (path, version) = match path[last_segment..].rfind('@') {
            Some(at) => {
                let at = last_segment + at;
                (&path[..at], non_empty(&path[at + 1..]))
            }
            None => (path, None),
        };

        let (namespace, name) = match path.rsplit_once('/') {
            Some((ns, name)) => (non_empty(ns), name),
            None => (None, path),
        };
        if name.is_empty() {
            return Err(PurlError::MissingName(input.to_string()));
        }

        let ty = ty.to_ascii_lowercase();
        let namespace = namespace.map(|ns| {
            let decoded = ns.split('/').map(decode).collect::<Vec<_>>().join("/");
            canonical_namespace(&ty, decoded)
        });
        let name = canonical_name(&ty, decode(name));

        Ok(PackageUrl {
            ty,
            namespace,
            name,
            version: version.map(|v| decode(&v)),
            qualifiers,
            subpath,
        })
    }

    /// Canonical form without version, qualifiers or subpath.
    pub fn versionless(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("pkg:{}/{}/{}", self.ty, ns, self.name),
            None => format!("pkg:{}/{}", self.ty, self.name),
        }
    }
}

impl fmt::Display for PackageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.versionless())?;
        if let Some(version) = &self.version {
            write!(f, "@{version}")?;
        }
        if let Some(qualifiers) = &self.qualifiers {
            write!(f, "?{qualifiers}")?;
        }
        if let Some(subpath) = &self.subpath {
            write!(f, "#{subpath}")?;
        }
        Ok(())
    }
}

fn split_off(input: &str, sep: char) -> (&str, Option<String>) {
    match input.split_once(sep) {
        Some((head, tail)) => (head, non_empty(tail)),
        None => (input, None),
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn decode(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

// Case-insensitive package types store lowercase coordinates.
fn canonical_namespace(ty: &str, namespace: String) -> String {
    match ty {
        "bitbucket" | "composer" | "github" => namespace.to_lowercase(),
        _ => namespace,
    }
}

fn canonical_name(ty: &str, name: String) -> String {
    match ty {
        "bitbucket" | "composer" | "github" => name.to_lowercase(),
        "pypi" => name.to_lowercase().replace('_', "-"),
        _ => name,
    }
}

/// Cache key for a declared dependency.
///
/// A version-insensitive identity compares equal to any other
/// version-insensitive identity for the same package, whatever the declared
/// version. Identities of different sensitivity are never equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dependency {
    purl: PackageUrl,
    version_sensitive: bool,
}

impl Dependency {
    pub fn new(purl: PackageUrl) -> Self {
        Dependency {
            purl,
            version_sensitive: true,
        }
    }

    pub fn parse(purl: &str) -> Result<Self, PurlError> {
        PackageUrl::parse(purl).map(Self::new)
    }

    /// The comparison key used when matching requested dependencies to findings.
    pub fn version_insensitive(&self) -> Self {
        Dependency {
            purl: self.purl.clone(),
            version_sensitive: false,
        }
    }

    pub fn purl(&self) -> &PackageUrl {
        &self.purl
    }

    pub fn version(&self) -> Option<&str> {
        self.purl.version.as_deref()
    }

    pub fn is_version_sensitive(&self) -> bool {
        self.version_sensitive
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.version_sensitive == other.version_sensitive
            && self.purl.ty == other.purl.ty
            && self.purl.namespace == other.purl.namespace
            && self.purl.name == other.purl.name
            && (!self.version_sensitive || self.purl.version == other.purl.version)
    }
}

impl Eq for Dependency {}

impl Hash for Dependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.version_sensitive.hash(state);
        self.purl.ty.hash(state);
        self.purl.namespace.hash(state);
        self.purl.name.hash(state);
        if self.version_sensitive {
            self.purl.version.hash(state);
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.purl, f)
    }
}

impl TryFrom<String> for Dependency {
    type Error = PurlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Dependency::parse(&value)
    }
}

impl From<Dependency> for String {
    fn from(dep: Dependency) -> Self {
        dep.purl.to_string()
    }
}

/// Vulnerability severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// A single vulnerability reported against a package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub severity: Severity,
    #[serde(default)]
    pub cvss_score: Option<f32>,
}

/// Findings for a package pulled in transitively by a direct dependency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitiveReport {
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

/// One dependency's analysis outcome as returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyReport {
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub transitive: Vec<TransitiveReport>,
    #[serde(default)]
    pub recommendation: Option<String>,
}

impl DependencyReport {
    /// The version-insensitive identity this finding refers to, if its
    /// reference is present and parses.
    pub fn ref_dependency(&self) -> Option<Dependency> {
        let reference = self.reference.as_deref()?;
        match Dependency::parse(reference) {
            Ok(dep) => Some(dep.version_insensitive()),
            Err(e) => {
                tracing::debug!("Ignoring finding with invalid ref: {}", e);
                None
            }
        }
    }

    /// Worst severity among direct and transitive issues.
    pub fn highest_severity(&self) -> Option<Severity> {
        self.issues
            .iter()
            .chain(self.transitive.iter().flat_map(|t| t.issues.iter()))
            .map(|issue| issue.severity)
            .max()
    }
}

/// Whole-file response from the analysis provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    #[serde(default)]
    pub dependencies: Option<Vec<DependencyReport>>,
}

/// Cached outcome for a single dependency.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    Finding(Arc<DependencyReport>),
    /// The dependency was analyzed and the provider reported nothing for it.
    NoFindings,
}

/// Shared "analyzed, no findings" sentinel.
pub const NO_FINDINGS: AnalysisResult = AnalysisResult::NoFindings;

impl AnalysisResult {
    pub fn is_no_findings(&self) -> bool {
        matches!(self, AnalysisResult::NoFindings)
    }

    pub fn finding(&self) -> Option<&DependencyReport> {
        match self {
            AnalysisResult::Finding(report) => Some(report.as_ref()),
            AnalysisResult::NoFindings => None,
        }
    }

    pub fn highest_severity(&self) -> Option<Severity> {
        self.finding().and_then(DependencyReport::highest_severity)
    }
}

impl From<DependencyReport> for AnalysisResult {
    fn from(report: DependencyReport) -> Self {
        AnalysisResult::Finding(Arc::new(report))
    }
}
