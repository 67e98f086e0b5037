use reqwest::Url;
use serde::Deserialize;

use crate::error::ProbeError;

/// The site a single invocation checks. Built fresh from the triggering event.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Target {
    pub url: String,
}

impl Target {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Validate the url before anything goes on the wire. The url is used
    /// verbatim as the metrics dimension, so surrounding whitespace is rejected
    /// rather than trimmed away.
    pub fn parse(&self) -> Result<Url, ProbeError> {
        let malformed = |reason: String| ProbeError::MalformedTarget {
            url: self.url.clone(),
            reason,
        };

        if self.url.trim() != self.url {
            return Err(malformed("leading or trailing whitespace".to_string()));
        }
        let url = Url::parse(&self.url).map_err(|e| malformed(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(malformed(format!("unsupported scheme {other:?}"))),
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(malformed("missing host".to_string()));
        }
        Ok(url)
    }
}
