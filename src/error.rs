/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum DoclingError {
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    /// An attempt, or a task wait, exceeded its configured timeout.
    #[error("timed out after {timeout_ms} ms")]
    Timeout {
        /// Limit that was exceeded.
        timeout_ms: u64,
        /// Transport error when a single attempt timed out.
        #[source]
        source: Option<reqwest::Error>,
    },
    /// Non-success HTTP status code with raw response body.
    #[error("api error {status}: {body}")]
    Api { status: u16, body: String },
    /// The call was cancelled before the next attempt was issued.
    #[error("request cancelled")]
    Cancelled,
    /// Request payload failed local validation and was never sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Request payload could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),
    /// Response decoding or shape validation error.
    #[error("decode error: {0}")]
    Decode(String),
    /// Reading a local input file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DoclingError {
    /// HTTP status code carried by a [`DoclingError::Api`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure is transient and the same request may succeed later.
    ///
    /// 429 and 5xx responses, timeouts and connection-level faults are
    /// transient. Every other error is permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status == 429 || (500..600).contains(status),
            Self::Timeout { .. } => true,
            Self::Transport(err) => is_retryable_transport(err),
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

fn is_retryable_transport(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
}
