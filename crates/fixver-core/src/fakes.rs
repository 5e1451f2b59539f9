//! In-memory fakes for the port traits (testing only)
//!
//! Provides `MemoryBugTracker` and `MemoryAdvisoryService`, which satisfy the
//! trait contracts without any network access and record every request so
//! tests can assert on paging parameters and fetch counts.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{
    AdvisoryError, AdvisoryId, AdvisoryRecord, BugFilter, BugId, BugPage, BugRecord, Comment,
    PageRequest, TrackerError,
};
use crate::ports::{AdvisoryResult, AdvisoryService, BugTracker, TrackerResult};

// ---------------------------------------------------------------------------
// MemoryBugTracker
// ---------------------------------------------------------------------------

/// What `comments()` returns for a given bug.
#[derive(Debug, Clone)]
pub enum CommentFixture {
    Comments(Vec<Comment>),
    /// Body is not valid JSON.
    Undecodable,
    /// HTTP error status, e.g. a private or deleted bug.
    Status(u16, String),
    /// Connection-level failure.
    Unreachable,
}

/// In-memory bug tracker serving a fixed bug list in pages of `page_size`.
#[derive(Debug)]
pub struct MemoryBugTracker {
    bugs: Vec<BugRecord>,
    page_size: u64,
    comments: HashMap<BugId, CommentFixture>,
    fail_search_at: Option<usize>,
    searches: Mutex<Vec<Option<PageRequest>>>,
    comment_requests: Mutex<Vec<BugId>>,
}

impl MemoryBugTracker {
    pub fn new(bugs: Vec<BugRecord>, page_size: u64) -> Self {
        Self {
            bugs,
            page_size,
            comments: HashMap::new(),
            fail_search_at: None,
            searches: Mutex::new(Vec::new()),
            comment_requests: Mutex::new(Vec::new()),
        }
    }

    /// Bugs `1..=count` with summaries `bug <n>`.
    pub fn with_generated(count: u64, page_size: u64) -> Self {
        let bugs = (1..=count)
            .map(|n| BugRecord::new(n, format!("bug {}", n)))
            .collect();
        Self::new(bugs, page_size)
    }

    pub fn with_comments(mut self, bug: u64, comments: Vec<Comment>) -> Self {
        self.comments
            .insert(BugId::new(bug), CommentFixture::Comments(comments));
        self
    }

    pub fn with_comment_fixture(mut self, bug: u64, fixture: CommentFixture) -> Self {
        self.comments.insert(BugId::new(bug), fixture);
        self
    }

    /// Make the `n`th search call (0-based) fail with a transport error.
    pub fn failing_search_at(mut self, n: usize) -> Self {
        self.fail_search_at = Some(n);
        self
    }

    /// Every search request in call order; `None` is the initial request.
    pub fn searches(&self) -> Vec<Option<PageRequest>> {
        self.searches.lock().unwrap().clone()
    }

    pub fn comment_requests(&self) -> Vec<BugId> {
        self.comment_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl BugTracker for MemoryBugTracker {
    async fn search(
        &self,
        _filter: &BugFilter,
        page: Option<PageRequest>,
    ) -> TrackerResult<BugPage> {
        let call = {
            let mut searches = self.searches.lock().unwrap();
            searches.push(page);
            searches.len() - 1
        };
        if self.fail_search_at == Some(call) {
            return Err(TrackerError::Transport {
                url: "memory://bugzilla/bug".to_string(),
                message: "connection reset by peer".to_string(),
            });
        }

        let (offset, limit) = match page {
            Some(p) => (p.offset, p.limit),
            None => (0, self.page_size),
        };
        let start = (offset as usize).min(self.bugs.len());
        let end = start.saturating_add(limit as usize).min(self.bugs.len());

        Ok(BugPage {
            bugs: self.bugs[start..end].to_vec(),
            limit: Some(self.page_size),
            total_matches: Some(self.bugs.len() as u64),
        })
    }

    async fn comments(&self, bug: BugId) -> TrackerResult<Vec<Comment>> {
        self.comment_requests.lock().unwrap().push(bug);
        let url = format!("memory://bugzilla/bug/{}/comment", bug);
        match self.comments.get(&bug) {
            None => Ok(Vec::new()),
            Some(CommentFixture::Comments(c)) => Ok(c.clone()),
            Some(CommentFixture::Undecodable) => Err(TrackerError::Decode {
                url,
                message: "expected value at line 1 column 1".to_string(),
            }),
            Some(CommentFixture::Status(status, reason)) => Err(TrackerError::Status {
                url,
                status: *status,
                reason: reason.clone(),
            }),
            Some(CommentFixture::Unreachable) => Err(TrackerError::Transport {
                url,
                message: "connection refused".to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryAdvisoryService
// ---------------------------------------------------------------------------

/// What `advisory()` returns for a given id.
#[derive(Debug, Clone)]
pub enum AdvisoryFixture {
    Record(serde_json::Value),
    Status(u16, String),
    Unreachable,
}

/// In-memory advisory service. Unknown ids answer `404 Not Found`.
#[derive(Debug, Default)]
pub struct MemoryAdvisoryService {
    advisories: HashMap<AdvisoryId, AdvisoryFixture>,
    fetches: Mutex<Vec<AdvisoryId>>,
}

impl MemoryAdvisoryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url_for(id: &AdvisoryId) -> String {
        format!("memory://errata/{}.json", id)
    }

    pub fn with_fixture(mut self, id: &str, fixture: AdvisoryFixture) -> Self {
        if let Some(id) = AdvisoryId::new(id) {
            self.advisories.insert(id, fixture);
        }
        self
    }

    /// Advisory of kind `rhba` carrying the given synopsis.
    pub fn with_synopsis(self, id: &str, synopsis: &str) -> Self {
        self.with_fixture(
            id,
            AdvisoryFixture::Record(serde_json::json!({
                "errata": {"rhba": {"synopsis": synopsis}}
            })),
        )
    }

    pub fn with_status(self, id: &str, status: u16, reason: &str) -> Self {
        self.with_fixture(id, AdvisoryFixture::Status(status, reason.to_string()))
    }

    /// Every fetch in call order.
    pub fn fetches(&self) -> Vec<AdvisoryId> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn fetch_count(&self, id: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.as_str() == id)
            .count()
    }
}

#[async_trait]
impl AdvisoryService for MemoryAdvisoryService {
    async fn advisory(&self, id: &AdvisoryId) -> AdvisoryResult<AdvisoryRecord> {
        self.fetches.lock().unwrap().push(id.clone());
        let url = Self::url_for(id);
        match self.advisories.get(id) {
            Some(AdvisoryFixture::Record(body)) => Ok(AdvisoryRecord::new(body.clone())),
            Some(AdvisoryFixture::Status(status, reason)) => Err(AdvisoryError::Status {
                url,
                status: *status,
                reason: reason.clone(),
            }),
            Some(AdvisoryFixture::Unreachable) => Err(AdvisoryError::Transport {
                url,
                message: "connection refused".to_string(),
            }),
            None => Err(AdvisoryError::Status {
                url,
                status: 404,
                reason: "Not Found".to_string(),
            }),
        }
    }
}
