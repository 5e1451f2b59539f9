//! Report emission.
//!
//! Each advisory in the index is resolved exactly once and the result is
//! shared by every bug filed under it. Bugs whose advisory resolved to an
//! `<unknown version>` placeholder produce no line.

use serde::{Deserialize, Serialize};

use crate::domain::{AdvisoryBugIndex, AdvisoryId, BugId, VersionResult};
use crate::obs::emit_advisory_resolved;
use crate::ports::AdvisoryService;
use crate::resolver::resolve_version;

/// One emitted report line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub bug_id: BugId,
    pub summary: String,
    pub version: String,
    pub advisory_id: AdvisoryId,
}

impl std::fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Bug {}: {} Version: {}",
            self.bug_id, self.summary, self.version
        )
    }
}

/// Resolution of one advisory and how many bugs it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryResolution {
    pub advisory_id: AdvisoryId,
    pub version: VersionResult,
    pub bug_count: usize,
}

/// Ordered report: advisories in index order, bugs in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub entries: Vec<ReportEntry>,
    pub resolutions: Vec<AdvisoryResolution>,
}

impl Report {
    fn push<'b>(
        &mut self,
        advisory: &AdvisoryId,
        bugs: impl ExactSizeIterator<Item = (BugId, &'b str)>,
        version: VersionResult,
    ) {
        let bug_count = bugs.len();
        if let Some(v) = version.version() {
            self.entries.extend(bugs.map(|(bug_id, summary)| ReportEntry {
                bug_id,
                summary: summary.to_string(),
                version: v.to_string(),
                advisory_id: advisory.clone(),
            }));
        }
        self.resolutions.push(AdvisoryResolution {
            advisory_id: advisory.clone(),
            version,
            bug_count,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advisories that resolved to a real version.
    pub fn resolved_advisories(&self) -> usize {
        self.resolutions
            .iter()
            .filter(|r| r.version.is_resolved())
            .count()
    }

    /// One `Bug <id>: <summary> Version: <version>` line per entry.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.entries.iter().map(|e| e.to_string())
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for line in self.lines() {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

/// Resolve every advisory in `index` once and build the report.
pub async fn build_report<S: AdvisoryService + ?Sized>(
    service: &S,
    index: &AdvisoryBugIndex,
) -> Report {
    let mut report = Report::default();
    for (advisory, bugs) in index.iter() {
        let version = resolve_version(service, advisory).await;
        emit_advisory_resolved(advisory.as_str(), &version, bugs.len());
        report.push(
            advisory,
            bugs.iter().map(|b| (b.id, b.summary.as_str())),
            version,
        );
    }
    report
}
