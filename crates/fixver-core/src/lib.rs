//! fixver core library
//!
//! Finds the product version that shipped each bug fix: bugs are searched in
//! the bug tracker, linked to the advisory named in their RELEASE_PENDING
//! comment, and the advisory synopsis yields an `X.Y.Z` version.
//!
//! ## Key Components
//!
//! - `BugPager`: paginated bug search
//! - `AdvisoryLinker`: comment scan and `AdvisoryBugIndex` construction
//! - `resolve_version`: advisory synopsis to `VersionResult`
//! - `build_report`: one resolution per advisory, one line per resolved bug
//! - `Pipeline`: the three stages in order
//!
//! Remote systems are reached through the `BugTracker` and `AdvisoryService`
//! ports; HTTP implementations live in `fixver-clients`.

pub mod domain;
pub mod fakes;
pub mod linker;
pub mod obs;
pub mod pager;
pub mod pipeline;
pub mod ports;
pub mod report;
pub mod resolver;
pub mod telemetry;

pub use domain::{
    AdvisoryBugIndex, AdvisoryError, AdvisoryId, AdvisoryRecord, BugFilter, BugId, BugPage,
    BugRecord, Comment, FixverError, PageRequest, Result, TrackerError, VersionResult,
    DEFAULT_COMPONENT, DEFAULT_PRODUCT, DEFAULT_PRODUCT_VERSION, DEFAULT_STATUS, UNKNOWN_VERSION,
};
pub use linker::{
    extract_advisory_id, AdvisoryLinker, LinkMarker, LinkOutcome, DEFAULT_MARKER_CREATOR,
    DEFAULT_MARKER_PHRASE,
};
pub use obs::RunSpan;
pub use pager::{fetch_all_bugs, BugPager};
pub use pipeline::{Pipeline, ReportDocument, RunConfig, RunOutcome, RunSummary};
pub use ports::{AdvisoryResult, AdvisoryService, BugTracker, TrackerResult};
pub use report::{build_report, AdvisoryResolution, Report, ReportEntry};
pub use resolver::{access_hint, extract_version, resolve_version};
pub use telemetry::{init_tracing, LogTarget};

/// fixver version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
