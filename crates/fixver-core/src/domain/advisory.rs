//! Advisories (errata), the bug index keyed by advisory, and version results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::bug::BugRecord;

/// Placeholder prefix rendered for every unresolved version.
pub const UNKNOWN_VERSION: &str = "<unknown version>";

/// Synopsis locations, tried in order. `rhba` is the bug fix / general
/// availability advisory, `rhsa` the security advisory.
pub const SYNOPSIS_POINTERS: [&str; 2] = ["/errata/rhba/synopsis", "/errata/rhsa/synopsis"];

/// Advisory (erratum) identifier: the digit string from `advisory/<digits>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdvisoryId(String);

impl AdvisoryId {
    /// Returns `None` unless the value is a non-empty run of ASCII digits.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if !v.is_empty() && v.chars().all(|c| c.is_ascii_digit()) {
            Some(Self(v))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AdvisoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decoded body of `GET /{id}.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdvisoryRecord(serde_json::Value);

impl AdvisoryRecord {
    pub fn new(body: serde_json::Value) -> Self {
        Self(body)
    }

    pub fn body(&self) -> &serde_json::Value {
        &self.0
    }

    /// First synopsis string found along [`SYNOPSIS_POINTERS`].
    pub fn synopsis(&self) -> Option<&str> {
        SYNOPSIS_POINTERS
            .iter()
            .find_map(|pointer| self.0.pointer(pointer).and_then(|v| v.as_str()))
    }
}

/// Outcome of resolving one advisory to a product version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum VersionResult {
    /// A dotted `X.Y.Z` version taken verbatim from the synopsis.
    Resolved(String),
    /// Placeholder; the optional detail is appended after the prefix.
    Unknown(Option<String>),
}

impl VersionResult {
    pub fn unknown() -> Self {
        VersionResult::Unknown(None)
    }

    pub fn unknown_with(detail: impl Into<String>) -> Self {
        VersionResult::Unknown(Some(detail.into()))
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, VersionResult::Resolved(_))
    }

    pub fn version(&self) -> Option<&str> {
        match self {
            VersionResult::Resolved(v) => Some(v),
            VersionResult::Unknown(_) => None,
        }
    }
}

impl std::fmt::Display for VersionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionResult::Resolved(v) => write!(f, "{}", v),
            VersionResult::Unknown(None) => write!(f, "{}", UNKNOWN_VERSION),
            VersionResult::Unknown(Some(detail)) => write!(f, "{} {}", UNKNOWN_VERSION, detail),
        }
    }
}

/// Bugs grouped under the advisory they were shipped in.
///
/// Guarantees:
/// - Advisories iterate in first-discovery order.
/// - Bugs under one advisory iterate in insertion order.
/// - A bug id is registered under at most one advisory; later inserts of the
///   same id are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvisoryBugIndex {
    entries: Vec<(AdvisoryId, Vec<BugRecord>)>,
    positions: HashMap<AdvisoryId, usize>,
}

impl AdvisoryBugIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bug` under `advisory`. Returns `false` if the bug was
    /// already indexed (under any advisory).
    pub fn insert(&mut self, advisory: AdvisoryId, bug: BugRecord) -> bool {
        if self.contains_bug(&bug) {
            return false;
        }
        match self.positions.get(&advisory) {
            Some(&pos) => self.entries[pos].1.push(bug),
            None => {
                self.positions.insert(advisory.clone(), self.entries.len());
                self.entries.push((advisory, vec![bug]));
            }
        }
        true
    }

    pub fn bugs_for(&self, advisory: &AdvisoryId) -> Option<&[BugRecord]> {
        self.positions
            .get(advisory)
            .map(|&pos| self.entries[pos].1.as_slice())
    }

    pub fn contains_bug(&self, bug: &BugRecord) -> bool {
        self.entries
            .iter()
            .any(|(_, bugs)| bugs.iter().any(|b| b.id == bug.id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AdvisoryId, &[BugRecord])> {
        self.entries
            .iter()
            .map(|(id, bugs)| (id, bugs.as_slice()))
    }

    /// Number of distinct advisories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of bugs across all advisories.
    pub fn bug_count(&self) -> usize {
        self.entries.iter().map(|(_, bugs)| bugs.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(s: &str) -> AdvisoryId {
        AdvisoryId::new(s).unwrap()
    }

    #[test]
    fn test_advisory_id_rejects_non_digits() {
        assert!(AdvisoryId::new("").is_none());
        assert!(AdvisoryId::new("79123a").is_none());
        assert_eq!(AdvisoryId::new("79123").unwrap().as_str(), "79123");
    }

    #[test]
    fn test_synopsis_prefers_rhba() {
        let record = AdvisoryRecord::new(json!({
            "errata": {
                "rhsa": {"synopsis": "security"},
                "rhba": {"synopsis": "bug fix"}
            }
        }));
        assert_eq!(record.synopsis(), Some("bug fix"));
    }

    #[test]
    fn test_synopsis_falls_back_to_rhsa() {
        let record = AdvisoryRecord::new(json!({
            "errata": {"rhsa": {"synopsis": "Moderate: OpenShift 4.7.2 security update"}}
        }));
        assert_eq!(
            record.synopsis(),
            Some("Moderate: OpenShift 4.7.2 security update")
        );
    }

    #[test]
    fn test_synopsis_absent() {
        assert_eq!(AdvisoryRecord::new(json!({})).synopsis(), None);
        assert_eq!(
            AdvisoryRecord::new(json!({"errata": {"rhea": {"synopsis": "x"}}})).synopsis(),
            None
        );
        assert_eq!(
            AdvisoryRecord::new(json!({"errata": {"rhba": {"synopsis": 42}}})).synopsis(),
            None
        );
    }

    #[test]
    fn test_version_result_display() {
        assert_eq!(VersionResult::Resolved("4.8.13".into()).to_string(), "4.8.13");
        assert_eq!(VersionResult::unknown().to_string(), "<unknown version>");
        assert_eq!(
            VersionResult::unknown_with("No synopsis in Errata 7").to_string(),
            "<unknown version> No synopsis in Errata 7"
        );
    }

    #[test]
    fn test_unknown_always_renders_marker_substring() {
        for result in [
            VersionResult::unknown(),
            VersionResult::unknown_with("No version in Errata 1 synopsis:foo"),
        ] {
            assert!(result.to_string().contains("unknown version"));
            assert!(!result.is_resolved());
        }
    }

    #[test]
    fn test_index_appends_in_discovery_order() {
        let mut index = AdvisoryBugIndex::new();
        assert!(index.insert(id("2"), BugRecord::new(10, "a")));
        assert!(index.insert(id("1"), BugRecord::new(11, "b")));
        assert!(index.insert(id("2"), BugRecord::new(12, "c")));

        let order: Vec<_> = index.iter().map(|(a, _)| a.as_str().to_string()).collect();
        assert_eq!(order, vec!["2", "1"]);

        let ids: Vec<_> = index
            .bugs_for(&id("2"))
            .unwrap()
            .iter()
            .map(|b| b.id.as_u64())
            .collect();
        assert_eq!(ids, vec![10, 12]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.bug_count(), 3);
    }

    #[test]
    fn test_index_keeps_first_advisory_for_a_bug() {
        let mut index = AdvisoryBugIndex::new();
        let bug = BugRecord::new(10, "a");
        assert!(index.insert(id("1"), bug.clone()));
        assert!(!index.insert(id("2"), bug));
        assert!(index.bugs_for(&id("2")).is_none());
        assert_eq!(index.bug_count(), 1);
    }
}
