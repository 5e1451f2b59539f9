//! Bug records and the search filter that selects them.

use serde::{Deserialize, Serialize};

/// Default product searched in Bugzilla.
pub const DEFAULT_PRODUCT: &str = "OpenShift Container Platform";

/// Default component searched in Bugzilla.
pub const DEFAULT_COMPONENT: &str = "Insights Operator";

/// Default bug statuses, comma-joined the way Bugzilla expects them.
pub const DEFAULT_STATUS: &str = "CLOSED,VERIFIED";

/// Default product version (release line) used when none is given.
pub const DEFAULT_PRODUCT_VERSION: &str = "4.8";

/// Numeric Bugzilla bug identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BugId(u64);

impl BugId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for BugId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for BugId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lightweight view of a bug: only what the report needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugRecord {
    pub id: BugId,
    pub summary: String,
}

impl BugRecord {
    pub fn new(id: u64, summary: impl Into<String>) -> Self {
        Self {
            id: BugId(id),
            summary: summary.into(),
        }
    }
}

/// A single comment on a bug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub creator: String,
    pub text: String,
}

impl Comment {
    pub fn new(creator: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            creator: creator.into(),
            text: text.into(),
        }
    }
}

/// Search criteria sent to `GET /bug`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugFilter {
    pub product: String,
    pub component: String,
    /// Comma-joined status list, e.g. `CLOSED,VERIFIED`.
    pub status: String,
    pub version: String,
}

impl Default for BugFilter {
    fn default() -> Self {
        Self {
            product: DEFAULT_PRODUCT.to_string(),
            component: DEFAULT_COMPONENT.to_string(),
            status: DEFAULT_STATUS.to_string(),
            version: DEFAULT_PRODUCT_VERSION.to_string(),
        }
    }
}

impl BugFilter {
    /// Default filter for the given product version.
    pub fn for_version(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    /// Set the status list from individual statuses.
    pub fn with_statuses<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.status = statuses
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        self
    }

    /// Query parameters in the order Bugzilla receives them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("product", self.product.clone()),
            ("component", self.component.clone()),
            ("status", self.status.clone()),
            ("version", self.version.clone()),
        ]
    }
}

/// `limit`/`offset` pair for a follow-up page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}

/// One page of a bug search response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BugPage {
    pub bugs: Vec<BugRecord>,
    /// Server page size; absent when the server returned everything at once.
    pub limit: Option<u64>,
    /// Total number of matches across all pages.
    pub total_matches: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_matches_release_line() {
        let filter = BugFilter::default();
        assert_eq!(filter.product, "OpenShift Container Platform");
        assert_eq!(filter.component, "Insights Operator");
        assert_eq!(filter.status, "CLOSED,VERIFIED");
        assert_eq!(filter.version, "4.8");
    }

    #[test]
    fn test_with_statuses_joins_and_trims() {
        let filter = BugFilter::for_version("4.6").with_statuses([" CLOSED", "", "ON_QA "]);
        assert_eq!(filter.status, "CLOSED,ON_QA");
        assert_eq!(filter.version, "4.6");
    }

    #[test]
    fn test_query_pairs_order() {
        let keys: Vec<_> = BugFilter::default()
            .query_pairs()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["product", "component", "status", "version"]);
    }

    #[test]
    fn test_bug_id_serializes_as_number() {
        let bug = BugRecord::new(1_987_654, "IO crashes on start");
        let json = serde_json::to_value(&bug).unwrap();
        assert_eq!(json["id"], 1_987_654);
    }
}
