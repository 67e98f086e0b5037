use std::time::Duration;

use anyhow::Result;

const DEFAULT_TIMEOUT_MS: u64 = 2000;
const DEFAULT_NAMESPACE: &str = "vmtest";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    pub timeout_ms: u64,
    pub namespace: String,
    pub log_level: String,
    pub log_format: LogFormat,
    pub publish_metrics: bool,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Text
}

fn default_publish_metrics() -> bool {
    true
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            namespace: default_namespace(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            publish_metrics: default_publish_metrics(),
        }
    }
}

impl ProbeConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("PROBE_TIMEOUT_MS") {
            config.timeout_ms = v
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid PROBE_TIMEOUT_MS {:?}: {}", v, e))?;
        }
        if let Some(v) = lookup("METRICS_NAMESPACE") {
            config.namespace = v.trim().to_string();
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v.trim().to_string();
        }
        if let Some(v) = lookup("LOG_FORMAT") {
            config.log_format = match v.trim().to_lowercase().as_str() {
                "text" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => {
                    return Err(anyhow::anyhow!(
                        "Invalid LOG_FORMAT: {}. Valid formats are: text, json",
                        v
                    ));
                }
            };
        }
        if let Some(v) = lookup("PUBLISH_METRICS") {
            config.publish_metrics = v
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid PUBLISH_METRICS {:?}: {}", v, e))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(anyhow::anyhow!("PROBE_TIMEOUT_MS must be greater than zero"));
        }
        if self.namespace.is_empty() {
            return Err(anyhow::anyhow!("METRICS_NAMESPACE must not be empty"));
        }
        self.validate_log_level()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get the log level as a tracing::Level
    pub fn get_tracing_level(&self) -> Result<tracing::Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(tracing::Level::TRACE),
            "debug" => Ok(tracing::Level::DEBUG),
            "info" => Ok(tracing::Level::INFO),
            "warn" | "warning" => Ok(tracing::Level::WARN),
            "error" => Ok(tracing::Level::ERROR),
            _ => Err(anyhow::anyhow!(
                "Invalid log level: {}. Valid levels are: trace, debug, info, warn, error",
                self.log_level
            )),
        }
    }

    /// Validate the log level is one of the supported values
    pub fn validate_log_level(&self) -> Result<()> {
        self.get_tracing_level().map(|_| ())
    }
}
