//! The fixver run: fetch bugs, link them to advisories, resolve and report.
//!
//! Every remote call is awaited before the next one is issued. A failed bug
//! search aborts the run; failures on a single bug or advisory are logged
//! and only affect that unit.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{AdvisoryBugIndex, BugFilter, BugRecord, FixverError, Result};
use crate::linker::{AdvisoryLinker, LinkMarker, LinkOutcome};
use crate::obs::{emit_bug_linked, emit_bugs_fetched, emit_run_finished, emit_run_started};
use crate::pager::fetch_all_bugs;
use crate::ports::{AdvisoryService, BugTracker};
use crate::report::{build_report, Report, ReportEntry};

/// What to search for and how to recognise the advisory comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub filter: BugFilter,
    pub marker: LinkMarker,
}

impl RunConfig {
    pub fn new(filter: BugFilter) -> Self {
        Self {
            filter,
            marker: LinkMarker::default(),
        }
    }

    pub fn with_marker(mut self, marker: LinkMarker) -> Self {
        self.marker = marker;
        self
    }

    /// Reject blank search or marker fields.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("product", &self.filter.product),
            ("component", &self.filter.component),
            ("status", &self.filter.status),
            ("version", &self.filter.version),
            ("marker creator", &self.marker.creator),
            ("marker phrase", &self.marker.phrase),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(FixverError::InvalidConfig(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }
}

/// Counters describing one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub bugs_found: usize,
    pub bugs_linked: usize,
    pub advisories: usize,
    pub advisories_resolved: usize,
    pub lines: usize,
}

impl RunSummary {
    pub fn from_parts(bugs: &[BugRecord], index: &AdvisoryBugIndex, report: &Report) -> Self {
        Self {
            bugs_found: bugs.len(),
            bugs_linked: index.bug_count(),
            advisories: index.len(),
            advisories_resolved: report.resolved_advisories(),
            lines: report.len(),
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub bugs: Vec<BugRecord>,
    pub index: AdvisoryBugIndex,
    pub report: Report,
    pub summary: RunSummary,
}

/// Machine-readable form of a finished run (`--format json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub generated_at: DateTime<Utc>,
    pub filter: BugFilter,
    pub summary: RunSummary,
    pub entries: Vec<ReportEntry>,
}

impl ReportDocument {
    pub fn new(filter: &BugFilter, summary: RunSummary, report: &Report) -> Self {
        Self {
            generated_at: Utc::now(),
            filter: filter.clone(),
            summary,
            entries: report.entries.clone(),
        }
    }
}

/// Runs the three stages against a bug tracker and an advisory service.
pub struct Pipeline<'a, T: BugTracker + ?Sized, S: AdvisoryService + ?Sized> {
    tracker: &'a T,
    advisories: &'a S,
    config: RunConfig,
}

impl<'a, T, S> Pipeline<'a, T, S>
where
    T: BugTracker + ?Sized,
    S: AdvisoryService + ?Sized,
{
    pub fn new(tracker: &'a T, advisories: &'a S, config: RunConfig) -> Self {
        Self {
            tracker,
            advisories,
            config,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Stage 1: every bug matching the filter. Fatal on any page failure.
    pub async fn fetch_bugs(&self) -> Result<Vec<BugRecord>> {
        let filter = &self.config.filter;
        emit_run_started(&filter.product, &filter.component, &filter.version);
        let bugs = fetch_all_bugs(self.tracker, filter)
            .await
            .map_err(FixverError::BugSearch)?;
        emit_bugs_fetched(bugs.len());
        Ok(bugs)
    }

    /// Stage 2: file bugs under the advisory they shipped in.
    pub async fn link(&self, bugs: &[BugRecord]) -> Result<AdvisoryBugIndex> {
        let linker = AdvisoryLinker::new(self.tracker, self.config.marker.clone());
        let mut index = AdvisoryBugIndex::new();
        for bug in bugs {
            if let LinkOutcome::Linked(advisory) = linker.link(bug, &mut index).await? {
                emit_bug_linked(bug.id.as_u64(), advisory.as_str());
            }
        }
        info!(
            advisories = index.len(),
            bugs = index.bug_count(),
            "linked bugs to advisories"
        );
        Ok(index)
    }

    /// Stage 3: resolve each advisory once and join versions onto bugs.
    pub async fn report(&self, index: &AdvisoryBugIndex) -> Report {
        build_report(self.advisories, index).await
    }

    /// All three stages. `on_fetched` sees the bug list before linking
    /// starts.
    pub async fn run<F>(&self, on_fetched: F) -> Result<RunOutcome>
    where
        F: FnOnce(&[BugRecord]),
    {
        let started = Instant::now();
        let bugs = self.fetch_bugs().await?;
        on_fetched(&bugs);
        let index = self.link(&bugs).await?;
        let report = self.report(&index).await;
        let summary = RunSummary::from_parts(&bugs, &index, &report);
        finish(&summary, started);
        Ok(RunOutcome {
            bugs,
            index,
            report,
            summary,
        })
    }
}

fn finish(summary: &RunSummary, started: Instant) {
    emit_run_finished(
        summary.bugs_found,
        summary.bugs_linked,
        summary.advisories,
        summary.advisories_resolved,
        summary.lines,
        started.elapsed().as_millis() as u64,
    );
}
