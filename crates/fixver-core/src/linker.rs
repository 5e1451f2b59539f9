//! Advisory linking: find the advisory a bug shipped in.
//!
//! When a bug is attached to an advisory, the Errata Tool system account
//! posts a comment announcing the RELEASE_PENDING transition that contains
//! the advisory path (`.../advisory/<id>`). The first such comment wins.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{
    AdvisoryBugIndex, AdvisoryId, BugRecord, Comment, FixverError, Result, TrackerError,
};
use crate::ports::BugTracker;

/// Account that posts the release-pending comment.
pub const DEFAULT_MARKER_CREATOR: &str = "errata-xmlrpc@redhat.com";

/// Phrase identifying the release-pending comment.
pub const DEFAULT_MARKER_PHRASE: &str = "Bug report changed to RELEASE_PENDING status";

fn advisory_path_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"advisory/(\d+)").ok()).as_ref()
}

/// Which comment marks the hand-off to an advisory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMarker {
    pub creator: String,
    pub phrase: String,
}

impl Default for LinkMarker {
    fn default() -> Self {
        Self {
            creator: DEFAULT_MARKER_CREATOR.to_string(),
            phrase: DEFAULT_MARKER_PHRASE.to_string(),
        }
    }
}

impl LinkMarker {
    pub fn new(creator: impl Into<String>, phrase: impl Into<String>) -> Self {
        Self {
            creator: creator.into(),
            phrase: phrase.into(),
        }
    }

    pub fn matches(&self, comment: &Comment) -> bool {
        comment.creator == self.creator && comment.text.contains(&self.phrase)
    }

    /// First comment posted by the marker account that carries the phrase.
    pub fn find<'c>(&self, comments: &'c [Comment]) -> Option<&'c Comment> {
        comments.iter().find(|c| self.matches(c))
    }
}

/// Digits of the first `advisory/<digits>` fragment in `text`.
pub fn extract_advisory_id(text: &str) -> Option<AdvisoryId> {
    advisory_path_regex()?
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| AdvisoryId::new(m.as_str()))
}

/// What linking one bug did to the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Linked(AdvisoryId),
    /// No release-pending comment.
    NoMarker,
    /// Release-pending comment without an advisory path.
    MarkerWithoutAdvisory,
    /// The bug was already indexed; the index is unchanged.
    AlreadyIndexed,
    /// Comments could not be read; the bug is dropped.
    Skipped,
}

impl LinkOutcome {
    pub fn is_linked(&self) -> bool {
        matches!(self, LinkOutcome::Linked(_))
    }
}

/// Reads bug comments and files bugs under their advisory.
pub struct AdvisoryLinker<'a, T: BugTracker + ?Sized> {
    tracker: &'a T,
    marker: LinkMarker,
}

impl<'a, T: BugTracker + ?Sized> AdvisoryLinker<'a, T> {
    pub fn new(tracker: &'a T, marker: LinkMarker) -> Self {
        Self { tracker, marker }
    }

    /// Link one bug into `index`.
    ///
    /// Undecodable comment bodies and HTTP error statuses drop the bug with a
    /// diagnostic. Transport failures are returned as errors.
    pub async fn link(&self, bug: &BugRecord, index: &mut AdvisoryBugIndex) -> Result<LinkOutcome> {
        let comments = match self.tracker.comments(bug.id).await {
            Ok(comments) => comments,
            Err(err) if err.is_decode() => {
                warn!(bug_id = %bug.id, error = %err, "can't decode comments in bug {}", bug.id);
                return Ok(LinkOutcome::Skipped);
            }
            Err(err @ TrackerError::Status { .. }) => {
                warn!(bug_id = %bug.id, error = %err, "can't read comments in bug {}", bug.id);
                return Ok(LinkOutcome::Skipped);
            }
            Err(source) => {
                return Err(FixverError::Comments {
                    bug: bug.id,
                    source,
                })
            }
        };

        let Some(comment) = self.marker.find(&comments) else {
            return Ok(LinkOutcome::NoMarker);
        };

        let Some(advisory) = extract_advisory_id(&comment.text) else {
            debug!(bug_id = %bug.id, "release-pending comment names no advisory");
            return Ok(LinkOutcome::MarkerWithoutAdvisory);
        };

        if index.insert(advisory.clone(), bug.clone()) {
            Ok(LinkOutcome::Linked(advisory))
        } else {
            Ok(LinkOutcome::AlreadyIndexed)
        }
    }

}
