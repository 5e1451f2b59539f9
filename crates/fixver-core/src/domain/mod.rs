//! Domain models for fixver.
//!
//! - `BugRecord`, `BugFilter`, `Comment`: what the bug tracker hands us
//! - `AdvisoryId`, `AdvisoryRecord`, `AdvisoryBugIndex`: advisories and the bugs shipped in them
//! - `VersionResult`: a resolved version or an `<unknown version>` placeholder

pub mod advisory;
pub mod bug;
pub mod error;

pub use advisory::{
    AdvisoryBugIndex, AdvisoryId, AdvisoryRecord, VersionResult, SYNOPSIS_POINTERS,
    UNKNOWN_VERSION,
};
pub use bug::{
    BugFilter, BugId, BugPage, BugRecord, Comment, PageRequest, DEFAULT_COMPONENT,
    DEFAULT_PRODUCT, DEFAULT_PRODUCT_VERSION, DEFAULT_STATUS,
};
pub use error::{AdvisoryError, FixverError, Result, TrackerError};
