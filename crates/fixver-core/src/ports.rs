//! Port traits for the two remote systems fixver talks to:
//! - `BugTracker`: bug search and per-bug comments (Bugzilla)
//! - `AdvisoryService`: advisory records (Errata Tool)
//!
//! Both traits are async and transport-agnostic. The HTTP implementations
//! live in `fixver-clients`; in-memory fakes live in [`crate::fakes`].

use async_trait::async_trait;

use crate::domain::{
    AdvisoryError, AdvisoryId, AdvisoryRecord, BugFilter, BugId, BugPage, Comment, PageRequest,
    TrackerError,
};

/// Result type for bug tracker calls
pub type TrackerResult<T> = std::result::Result<T, TrackerError>;

/// Result type for advisory service calls
pub type AdvisoryResult<T> = std::result::Result<T, AdvisoryError>;

/// Read access to a bug tracker.
///
/// Guarantees:
/// - `search(filter, None)` returns the first page together with the
///   server's page size and total match count.
/// - `search(filter, Some(page))` returns rows starting at `page.offset`.
/// - `comments(id)` returns the bug's comments in chronological order.
#[async_trait]
pub trait BugTracker: Send + Sync {
    /// Run a bug search, optionally at a given page.
    async fn search(
        &self,
        filter: &BugFilter,
        page: Option<PageRequest>,
    ) -> TrackerResult<BugPage>;

    /// Fetch all comments of a bug.
    async fn comments(&self, bug: BugId) -> TrackerResult<Vec<Comment>>;
}

/// Read access to advisory records.
#[async_trait]
pub trait AdvisoryService: Send + Sync {
    /// Fetch one advisory. Non-success HTTP statuses surface as
    /// [`AdvisoryError::Status`].
    async fn advisory(&self, id: &AdvisoryId) -> AdvisoryResult<AdvisoryRecord>;
}
