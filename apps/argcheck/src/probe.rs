//! # Source Liveness Probe
//!
//! Opt-in network check for cited URLs. Each `http(s)` citation gets one
//! `HEAD` request bounded by the configured timeout. Requests run
//! concurrently, at most `max_concurrent` at a time, and results come back
//! in citation order.
//!
//! A failed probe is a `SOURCE URL:` diagnostic. It never aborts the run.

use crate::config::ProbeConfig;
use argcheck_core::{ArgcheckError, Category, Diagnostic};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// A citation to probe: `(statement id, url)`.
pub type Citation = (String, String);

/// What one probe observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The server answered with this status code.
    Status(u16),
    /// The request failed before a status arrived.
    Failed(String),
}

impl ProbeOutcome {
    /// The diagnostic for this outcome, if it is a failure.
    ///
    /// Any status of 400 or above counts as a failure; redirects are
    /// followed before the status is read.
    #[must_use]
    pub fn into_diagnostic(self, id: &str, url: &str) -> Option<Diagnostic> {
        let message = match self {
            ProbeOutcome::Status(code) if code < 400 => return None,
            ProbeOutcome::Status(code) => format!("[{id}]: {url} returned {code}"),
            ProbeOutcome::Failed(cause) => format!("[{id}]: {url} error: {cause}"),
        };
        Some(Diagnostic::new(Category::SourceUrl, message))
    }
}

/// Whether a URL is probed at all. Surrounding whitespace is ignored.
#[must_use]
pub fn is_probeable(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// HTTP prober for citation URLs.
#[derive(Debug, Clone)]
pub struct SourceProber {
    client: reqwest::Client,
    max_concurrent: usize,
}

impl SourceProber {
    /// Build a prober with the configured timeout.
    pub fn new(config: &ProbeConfig) -> Result<Self, ArgcheckError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("argcheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ArgcheckError::ConfigError(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            max_concurrent: config.max_concurrent.max(1),
        })
    }

    /// Probe every `http(s)` citation and return failures in citation order.
    ///
    /// URLs are trimmed once; the request and the diagnostic both use the
    /// trimmed form.
    pub async fn probe(&self, citations: Vec<Citation>) -> Vec<Diagnostic> {
        let targets: Vec<Citation> = citations
            .into_iter()
            .map(|(id, url)| (id, url.trim().to_string()))
            .filter(|(_, url)| is_probeable(url))
            .collect();
        if targets.is_empty() {
            return Vec::new();
        }
        tracing::info!("Probing {} source URL(s)", targets.len());

        let permits = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();
        for (index, (_, url)) in targets.iter().enumerate() {
            let client = self.client.clone();
            let permits = Arc::clone(&permits);
            let url = url.clone();
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                (index, head(&client, &url).await)
            });
        }

        let mut outcomes: Vec<Option<ProbeOutcome>> = vec![None; targets.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(e) => tracing::warn!("Probe task failed: {}", e),
            }
        }

        targets
            .iter()
            .zip(outcomes)
            .filter_map(|((id, url), outcome)| {
                let outcome =
                    outcome.unwrap_or_else(|| ProbeOutcome::Failed("probe did not complete".into()));
                outcome.into_diagnostic(id, url)
            })
            .collect()
    }
}

async fn head(client: &reqwest::Client, url: &str) -> ProbeOutcome {
    match client.head(url).send().await {
        Ok(resp) => {
            let status = resp.status();
            if status.is_client_error() || status.is_server_error() {
                tracing::warn!("{} returned {}", url, status);
            } else {
                tracing::debug!("{} returned {}", url, status);
            }
            ProbeOutcome::Status(status.as_u16())
        }
        Err(e) => {
            tracing::warn!("{} failed: {}", url, e);
            ProbeOutcome::Failed(e.to_string())
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_http_urls_are_probed() {
        assert!(is_probeable("https://example.org/a"));
        assert!(is_probeable("HTTP://example.org"));
        assert!(!is_probeable("ftp://example.org"));
        assert!(!is_probeable("doi:10.1000/182"));
        assert!(!is_probeable("httpfoo"));
        assert!(is_probeable("  https://example.org/a\n"));
    }

    #[test]
    fn success_and_redirect_statuses_pass() {
        assert_eq!(ProbeOutcome::Status(200).into_diagnostic("a", "u"), None);
        assert_eq!(ProbeOutcome::Status(304).into_diagnostic("a", "u"), None);
    }

    #[test]
    fn error_status_renders() {
        let d = ProbeOutcome::Status(404)
            .into_diagnostic("arg1/p1", "https://example.org/gone")
            .expect("failure");
        assert_eq!(
            d.to_string(),
            "SOURCE URL: [arg1/p1]: https://example.org/gone returned 404"
        );
    }

    #[test]
    fn transport_error_renders() {
        let d = ProbeOutcome::Failed("connection refused".to_string())
            .into_diagnostic("s", "http://localhost:1")
            .expect("failure");
        assert_eq!(
            d.to_string(),
            "SOURCE URL: [s]: http://localhost:1 error: connection refused"
        );
    }

    #[tokio::test]
    async fn no_probeable_citations_means_no_requests() {
        let prober = SourceProber::new(&ProbeConfig::default()).expect("client");
        let citations = vec![("a".to_string(), "file:///tmp/x".to_string())];
        assert!(prober.probe(citations).await.is_empty());
    }
}
