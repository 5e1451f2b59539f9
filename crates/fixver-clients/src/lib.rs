//! fixver-clients: REST adapters for Bugzilla and the Errata Tool
//!
//! Implements the `fixver_core` ports over `reqwest`:
//! - [`BugzillaClient`]: `BugTracker` (bug search, bug comments)
//! - [`ErrataClient`]: `AdvisoryService` (advisory records)
//!
//! Kerberos support for the Errata Tool is behind the `kerberos` feature.
//!
//! Response bodies are parsed by free functions so they can be tested
//! without a server.

use std::time::Duration;

use reqwest::Url;

pub mod bugzilla;
pub mod errata;
mod error;
pub mod negotiate;

pub use bugzilla::{parse_comments_response, parse_search_response, BugzillaClient, BugzillaConfig};
pub use errata::{parse_advisory_response, ErrataClient, ErrataConfig};
pub use error::{ClientError, Result};
pub use negotiate::{NegotiateTokenSource, StaticNegotiateToken};

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("fixver/", env!("CARGO_PKG_VERSION"));

/// Parse `raw` as a base URL, forcing a trailing slash so relative joins
/// append instead of replacing the last segment.
pub(crate) fn base_url(raw: &str) -> Result<Url> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    let url = Url::parse(&with_slash).map_err(|e| ClientError::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidUrl {
            url: raw.to_string(),
            message: "cannot be a base".to_string(),
        });
    }
    Ok(url)
}

pub(crate) fn join(base: &Url, path: &str) -> Result<Url> {
    base.join(path).map_err(|e| ClientError::InvalidUrl {
        url: format!("{}{}", base, path),
        message: e.to_string(),
    })
}

pub(crate) fn http_client(
    timeout: Option<Duration>,
    accept_invalid_certs: bool,
) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    if accept_invalid_certs {
        builder = builder.danger_accept_invalid_certs(true);
    }
    Ok(builder.build()?)
}
