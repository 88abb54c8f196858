use std::time::Duration;

use crate::retry::RetryPolicy;

/// Configures HTTP timeout and retry behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: usize,
    /// Base retry delay in milliseconds (exponential strategy).
    pub retry_delay_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
            max_retries: 3,
            retry_delay_ms: 1_000,
        }
    }
}

impl ClientOptions {
    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub(crate) fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub(crate) fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_delay())
    }

    /// Reads overrides from `DOCLING_SERVE_TIMEOUT_MS`,
    /// `DOCLING_SERVE_MAX_RETRIES` and `DOCLING_SERVE_RETRY_DELAY_MS`.
    ///
    /// Unset variables keep their default; unparsable ones are an error.
    pub fn from_env() -> std::result::Result<Self, String> {
        let mut options = Self::default();
        if let Some(value) = read_env("DOCLING_SERVE_TIMEOUT_MS")? {
            options.timeout_ms = value;
        }
        if let Some(value) = read_env("DOCLING_SERVE_MAX_RETRIES")? {
            options.max_retries = value;
        }
        if let Some(value) = read_env("DOCLING_SERVE_RETRY_DELAY_MS")? {
            options.retry_delay_ms = value;
        }
        Ok(options)
    }
}

fn read_env<T: std::str::FromStr>(name: &str) -> std::result::Result<Option<T>, String> {
    match std::env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("{name} must be a non-negative integer, got '{raw}'")),
        Err(_) => Ok(None),
    }
}
