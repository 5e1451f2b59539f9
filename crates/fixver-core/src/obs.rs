//! Structured observability hooks for a fixver run.
//!
//! This module provides:
//! - A run-scoped tracing span via the `RunSpan` RAII guard
//! - Emission functions for the run lifecycle: start, bugs fetched, bug linked,
//!   advisory resolved, finish
//!
//! Events are emitted at `info!` level except per-bug linking, which is
//! `debug!`. Filter with `RUST_LOG`.

use tracing::{debug, info};

use crate::domain::VersionResult;

/// RAII guard that enters a run-scoped tracing span for the duration of a run.
///
/// # Example
///
/// ```ignore
/// let _span = RunSpan::enter("5f0c...");
/// // every event below carries run_id = "5f0c..."
/// ```
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    /// Create and enter a span tagged with the run id.
    pub fn enter(run_id: &str) -> Self {
        let span = tracing::info_span!("fixver.run", run_id = %run_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: run started for a product version.
pub fn emit_run_started(product: &str, component: &str, version: &str) {
    info!(
        event = "run.started",
        product = %product,
        component = %component,
        version = %version,
    );
}

/// Emit event: bug search finished.
pub fn emit_bugs_fetched(count: usize) {
    info!(event = "bugs.fetched", count = count);
}

/// Emit event: a bug was filed under an advisory.
pub fn emit_bug_linked(bug_id: u64, advisory_id: &str) {
    debug!(event = "bug.linked", bug_id = bug_id, advisory_id = %advisory_id);
}

/// Emit event: an advisory was resolved (or not) to a version.
pub fn emit_advisory_resolved(advisory_id: &str, version: &VersionResult, bug_count: usize) {
    info!(
        event = "advisory.resolved",
        advisory_id = %advisory_id,
        version = %version,
        resolved = version.is_resolved(),
        bug_count = bug_count,
    );
}

/// Emit event: run finished with its counters.
pub fn emit_run_finished(
    bugs_found: usize,
    bugs_linked: usize,
    advisories: usize,
    advisories_resolved: usize,
    lines: usize,
    duration_ms: u64,
) {
    info!(
        event = "run.finished",
        bugs_found = bugs_found,
        bugs_linked = bugs_linked,
        advisories = advisories,
        advisories_resolved = advisories_resolved,
        lines = lines,
        duration_ms = duration_ms,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_span_create() {
        let _span = RunSpan::enter("test-run-id");
        emit_advisory_resolved("1", &VersionResult::unknown(), 2);
    }
}
