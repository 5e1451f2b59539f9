//! Errata Tool REST client
//!
//! `GET {base}/{id}.json`, authenticated with SPNEGO. Every request gets a
//! fresh token from the client's [`NegotiateTokenSource`]: the Kerberos
//! credential cache when built with the `kerberos` feature, or a fixed
//! token given in [`ErrataConfig::negotiate_token`]. Without either the
//! request goes out unauthenticated and the server answers 401.

use std::time::Duration;

use async_trait::async_trait;
use fixver_core::{AdvisoryError, AdvisoryId, AdvisoryRecord, AdvisoryResult, AdvisoryService};
use reqwest::header::AUTHORIZATION;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::negotiate::{default_source, NegotiateTokenSource, StaticNegotiateToken};
use crate::{base_url, http_client, join, Result};

/// Default Errata Tool erratum API root.
pub const DEFAULT_ERRATA_URL: &str = "https://errata.devel.redhat.com/api/v1/erratum/";

/// Errata Tool connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrataConfig {
    /// Erratum API root
    pub base_url: String,
    /// Fixed SPNEGO token, replayed on every request in place of the
    /// Kerberos credential cache
    pub negotiate_token: Option<String>,
    /// Skip TLS certificate verification (internal CA deployments)
    pub accept_invalid_certs: bool,
    /// Per-request timeout; `None` keeps the client default
    pub timeout: Option<Duration>,
}

impl Default for ErrataConfig {
    fn default() -> Self {
        ErrataConfig {
            base_url: DEFAULT_ERRATA_URL.to_string(),
            negotiate_token: None,
            accept_invalid_certs: false,
            timeout: None,
        }
    }
}

impl ErrataConfig {
    pub fn new(base_url: &str) -> Self {
        ErrataConfig {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn with_negotiate_token(mut self, token: &str) -> Self {
        self.negotiate_token = Some(token.to_string());
        self
    }

    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// `AdvisoryService` over the Errata Tool REST API
pub struct ErrataClient {
    base: Url,
    negotiate: Option<Box<dyn NegotiateTokenSource>>,
    http_client: reqwest::Client,
}

impl ErrataClient {
    pub fn new(config: ErrataConfig) -> Result<Self> {
        if config.accept_invalid_certs {
            warn!(
                base_url = %config.base_url,
                "TLS certificate verification is disabled for the Errata Tool"
            );
        }
        let negotiate: Option<Box<dyn NegotiateTokenSource>> = match config.negotiate_token {
            Some(token) => {
                warn!("replaying a fixed Negotiate token; servers with a replay cache accept it once");
                Some(Box::new(StaticNegotiateToken::new(token)))
            }
            None => default_source(),
        };
        if negotiate.is_none() {
            warn!("no Kerberos support and no Negotiate token; Errata requests are unauthenticated");
        }
        Ok(ErrataClient {
            base: base_url(&config.base_url)?,
            negotiate,
            http_client: http_client(config.timeout, config.accept_invalid_certs)?,
        })
    }

    /// Replace the token source.
    pub fn with_token_source(mut self, source: impl NegotiateTokenSource + 'static) -> Self {
        self.negotiate = Some(Box::new(source));
        self
    }

    pub fn advisory_url(&self, id: &AdvisoryId) -> Result<Url> {
        join(&self.base, &format!("{}.json", id))
    }
}

#[async_trait]
impl AdvisoryService for ErrataClient {
    async fn advisory(&self, id: &AdvisoryId) -> AdvisoryResult<AdvisoryRecord> {
        let url = self.advisory_url(id).map_err(|e| AdvisoryError::Transport {
            url: format!("{}{}.json", self.base, id),
            message: e.to_string(),
        })?;
        let mut request = self.http_client.get(url.clone());
        if let Some(source) = &self.negotiate {
            let token = source.token(&url).map_err(|e| AdvisoryError::Auth {
                url: url.to_string(),
                message: e.to_string(),
            })?;
            request = request.header(AUTHORIZATION, format!("Negotiate {}", token));
        }
        debug!(url = %url, "fetching advisory");

        let response = request.send().await.map_err(|e| AdvisoryError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdvisoryError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.text().await.map_err(|e| AdvisoryError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        parse_advisory_response(url.as_str(), &body)
    }
}

/// Decode a `GET {id}.json` body.
pub fn parse_advisory_response(url: &str, body: &str) -> AdvisoryResult<AdvisoryRecord> {
    serde_json::from_str(body)
        .map(AdvisoryRecord::new)
        .map_err(|e| AdvisoryError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
}
