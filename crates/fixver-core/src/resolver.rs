//! Advisory version resolution.
//!
//! Fetches an advisory, takes its synopsis and pulls out the first dotted
//! `X.Y.Z` version. Every failure becomes an `<unknown version>` placeholder;
//! resolution itself never fails.

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::domain::{AdvisoryError, AdvisoryId, VersionResult};
use crate::ports::AdvisoryService;

fn version_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+\.[0-9]+\.[0-9]+").ok())
        .as_ref()
}

/// First `X.Y.Z` substring of `synopsis`, verbatim.
pub fn extract_version(synopsis: &str) -> Option<&str> {
    version_regex()?.find(synopsis).map(|m| m.as_str())
}

/// Operator hint printed for a failed advisory fetch.
pub fn access_hint(err: &AdvisoryError) -> String {
    match err {
        AdvisoryError::Status {
            url,
            status: 401,
            reason,
        } => format!(
            "Cannot access errata at {}: 401 {}. Do you have a valid Kerberos TGT?",
            url, reason
        ),
        AdvisoryError::Status {
            url,
            status,
            reason,
        } => format!(
            "Cannot access errata at {}: {} {}. Are you sure you have access?",
            url, status, reason
        ),
        AdvisoryError::Auth { .. } => format!(
            "Cannot access errata: {}. Do you have a valid Kerberos TGT?",
            err
        ),
        other => format!("Cannot access errata: {}", other),
    }
}

/// Resolve one advisory to a product version.
pub async fn resolve_version<S: AdvisoryService + ?Sized>(
    service: &S,
    advisory: &AdvisoryId,
) -> VersionResult {
    let record = match service.advisory(advisory).await {
        Ok(record) => record,
        Err(err) => {
            warn!(advisory_id = %advisory, error = %err, "{}", access_hint(&err));
            return VersionResult::unknown();
        }
    };

    let Some(synopsis) = record.synopsis() else {
        warn!(advisory_id = %advisory, "can't read synopsis for errata id {}", advisory);
        return VersionResult::unknown_with(format!("No synopsis in Errata {}", advisory));
    };

    match extract_version(synopsis) {
        Some(version) => VersionResult::Resolved(version.to_string()),
        None => VersionResult::unknown_with(format!(
            "No version in Errata {} synopsis:{}",
            advisory, synopsis
        )),
    }
}
