use std::time::Duration;

use thiserror::Error;

/// Failures that abort a check before a result exists.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("malformed target {url:?}: {reason}")]
    MalformedTarget { url: String, reason: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("could not build http client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ProbeError {
    /// True for network level failures, timeouts included.
    pub fn is_request_error(&self) -> bool {
        matches!(self, Self::Request { .. } | Self::Timeout { .. })
    }

    pub(crate) fn from_reqwest(url: &str, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else {
            Self::Request {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

/// A metrics backend call that did not go through. Logged, never propagated.
#[derive(Debug, Error)]
#[error("publishing to namespace {namespace} failed: {source}")]
pub struct PublishError {
    pub namespace: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl PublishError {
    pub fn new(
        namespace: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            source: source.into(),
        }
    }
}
