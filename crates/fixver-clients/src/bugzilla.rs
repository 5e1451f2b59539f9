//! Bugzilla REST client
//!
//! - `GET bug?product=..&component=..&status=..&version=..[&limit=..&offset=..]`
//! - `GET bug/{id}/comment` with `Authorization: Bearer <api key>`

use std::time::Duration;

use async_trait::async_trait;
use fixver_core::{
    BugFilter, BugId, BugPage, BugRecord, BugTracker, Comment, PageRequest, TrackerError,
    TrackerResult,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{base_url, http_client, join, Result};

/// Default Bugzilla REST root.
pub const DEFAULT_BUGZILLA_URL: &str = "https://bugzilla.redhat.com/rest/";

/// Bugzilla connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BugzillaConfig {
    /// REST root, e.g. `https://bugzilla.redhat.com/rest/`
    pub base_url: String,
    /// API key sent as a bearer token on comment requests
    pub api_key: Option<String>,
    /// Per-request timeout; `None` keeps the client default
    pub timeout: Option<Duration>,
}

impl Default for BugzillaConfig {
    fn default() -> Self {
        BugzillaConfig {
            base_url: DEFAULT_BUGZILLA_URL.to_string(),
            api_key: None,
            timeout: None,
        }
    }
}

impl BugzillaConfig {
    pub fn new(base_url: &str) -> Self {
        BugzillaConfig {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// `BugTracker` over the Bugzilla REST API
pub struct BugzillaClient {
    base: Url,
    search_url: Url,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl BugzillaClient {
    pub fn new(config: BugzillaConfig) -> Result<Self> {
        let base = base_url(&config.base_url)?;
        Ok(BugzillaClient {
            search_url: join(&base, "bug")?,
            base,
            api_key: config.api_key,
            http_client: http_client(config.timeout, false)?,
        })
    }

    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    pub fn comments_url(&self, bug: BugId) -> Result<Url> {
        join(&self.base, &format!("bug/{}/comment", bug))
    }

    async fn get_text(&self, request: reqwest::RequestBuilder, url: &Url) -> TrackerResult<String> {
        let response = request.send().await.map_err(|e| TrackerError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        response.text().await.map_err(|e| TrackerError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl BugTracker for BugzillaClient {
    async fn search(
        &self,
        filter: &BugFilter,
        page: Option<PageRequest>,
    ) -> TrackerResult<BugPage> {
        let url = self.search_url.clone();
        let mut query: Vec<(&str, String)> = filter.query_pairs();
        if let Some(page) = page {
            query.push(("limit", page.limit.to_string()));
            query.push(("offset", page.offset.to_string()));
        }
        debug!(url = %url, ?page, "searching bugs");

        let request = self.http_client.get(url.clone()).query(&query);
        let body = self.get_text(request, &url).await?;
        parse_search_response(url.as_str(), &body)
    }

    async fn comments(&self, bug: BugId) -> TrackerResult<Vec<Comment>> {
        let url = self.comments_url(bug).map_err(|e| TrackerError::Transport {
            url: format!("{}bug/{}/comment", self.base, bug),
            message: e.to_string(),
        })?;
        let mut request = self.http_client.get(url.clone());
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        debug!(url = %url, "fetching comments");

        let body = self.get_text(request, &url).await?;
        parse_comments_response(url.as_str(), bug, &body)
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Bugzilla has sent paging numbers both as JSON numbers and as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LenientU64 {
    Number(u64),
    Text(String),
}

impl LenientU64 {
    fn value(&self) -> Option<u64> {
        match self {
            LenientU64::Number(n) => Some(*n),
            LenientU64::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BugRow {
    id: u64,
    #[serde(default)]
    summary: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    bugs: Option<Vec<BugRow>>,
    #[serde(default)]
    limit: Option<LenientU64>,
    #[serde(default)]
    total_matches: Option<LenientU64>,
}

/// Decode a `GET bug` body.
pub fn parse_search_response(url: &str, body: &str) -> TrackerResult<BugPage> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| TrackerError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    let rows = response.bugs.ok_or_else(|| TrackerError::MissingField {
        url: url.to_string(),
        field: "bugs".to_string(),
    })?;

    Ok(BugPage {
        bugs: rows
            .into_iter()
            .map(|row| BugRecord::new(row.id, row.summary))
            .collect(),
        limit: response.limit.as_ref().and_then(LenientU64::value),
        total_matches: response.total_matches.as_ref().and_then(LenientU64::value),
    })
}

/// Decode a `GET bug/{id}/comment` body: `bugs.<id>.comments`.
pub fn parse_comments_response(url: &str, bug: BugId, body: &str) -> TrackerResult<Vec<Comment>> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| TrackerError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    let pointer = format!("/bugs/{}/comments", bug);
    let comments = value
        .pointer(&pointer)
        .cloned()
        .ok_or_else(|| TrackerError::MissingField {
            url: url.to_string(),
            field: format!("bugs.{}.comments", bug),
        })?;

    serde_json::from_value(comments).map_err(|e| TrackerError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}
