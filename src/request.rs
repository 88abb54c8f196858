use std::time::{Duration, Instant};

use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Method, StatusCode,
};
use serde::Serialize;

use crate::{
    retry::AttemptOutcome, ChunkDocumentsRequest, ConvertDocumentsRequest, DoclingError, Result,
};

pub(crate) const HEALTH_PATH: &str = "/health";
pub(crate) const VERSION_PATH: &str = "/version";
pub(crate) const CONVERT_SOURCE_PATH: &str = "/v1/convert/source";
pub(crate) const CONVERT_SOURCE_ASYNC_PATH: &str = "/v1/convert/source/async";
pub(crate) const API_KEY_HEADER: &str = "x-api-key";

/// Shortest pause between status polls when the caller asks for no
/// server-side wait.
pub(crate) const MIN_IDLE_POLL_PAUSE: Duration = Duration::from_millis(100);

/// Millisecond count for error payloads and logs, saturating at `u64::MAX`.
pub(crate) fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

pub(crate) fn task_status_path(task_id: &str) -> String {
    format!("/v1/status/poll/{}", task_id.trim())
}

pub(crate) fn task_result_path(task_id: &str) -> String {
    format!("/v1/result/{}", task_id.trim())
}

pub(crate) fn chunk_source_path(chunker: &str, asynchronous: bool) -> String {
    let suffix = if asynchronous { "/async" } else { "" };
    format!("/v1/chunk/{chunker}/source{suffix}")
}

pub(crate) fn health_request() -> ApiRequest {
    ApiRequest::get(HEALTH_PATH)
}

pub(crate) fn version_request() -> ApiRequest {
    ApiRequest::get(VERSION_PATH)
}

pub(crate) fn convert_request(
    request: &ConvertDocumentsRequest,
    asynchronous: bool,
) -> Result<ApiRequest> {
    request.validate()?;
    let path = if asynchronous {
        CONVERT_SOURCE_ASYNC_PATH
    } else {
        CONVERT_SOURCE_PATH
    };
    ApiRequest::post_json(path, request)
}

pub(crate) fn chunk_request(
    request: &ChunkDocumentsRequest,
    asynchronous: bool,
) -> Result<ApiRequest> {
    request.validate()?;
    ApiRequest::post_json(
        chunk_source_path(request.chunker.endpoint_name(), asynchronous),
        request,
    )
}

/// Builds a status poll. With `wait`, the service holds the response open up
/// to that long, so the attempt timeout is extended by the same amount.
pub(crate) fn task_status_request(
    task_id: &str,
    wait: Option<Duration>,
    attempt_timeout: Duration,
) -> Result<ApiRequest> {
    ensure_task_id(task_id)?;
    let request = ApiRequest::get(task_status_path(task_id));
    Ok(match wait {
        Some(wait) => request
            .with_query("wait", wait.as_secs_f64())
            .with_timeout(attempt_timeout.saturating_add(wait)),
        None => request,
    })
}

pub(crate) fn task_result_request(task_id: &str) -> Result<ApiRequest> {
    ensure_task_id(task_id)?;
    Ok(ApiRequest::get(task_result_path(task_id)))
}

fn ensure_task_id(task_id: &str) -> Result<()> {
    if task_id.trim().is_empty() {
        return Err(DoclingError::InvalidRequest(
            "task id must not be empty".to_owned(),
        ));
    }
    Ok(())
}

/// Joins a base URL and an absolute endpoint path without doubling slashes.
pub(crate) fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// One HTTP call, fully described before the first attempt is made.
#[derive(Clone, Debug)]
pub(crate) struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(&'static str, String)>,
    body: Option<Vec<u8>>,
    timeout: Option<Duration>,
}

impl ApiRequest {
    pub(crate) fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub(crate) fn post_json<T: Serialize + ?Sized>(
        path: impl Into<String>,
        payload: &T,
    ) -> Result<Self> {
        let body = serde_json::to_vec(payload)
            .map_err(|err| DoclingError::Encode(format!("invalid request payload: {err}")))?;
        Ok(Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
            timeout: None,
        })
    }

    pub(crate) fn with_query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    /// Overrides the client-wide per-attempt timeout for this request.
    pub(crate) fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub(crate) fn method(&self) -> &Method {
        &self.method
    }

    pub(crate) fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn query(&self) -> &[(&'static str, String)] {
        &self.query
    }

    pub(crate) fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub(crate) fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout.unwrap_or(default)
    }

    /// Resolves the URL, headers and timeout shared by every attempt.
    pub(crate) fn prepare(
        &self,
        base_url: &str,
        api_key: Option<&str>,
        default_timeout: Duration,
    ) -> Result<PreparedRequest> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let mut value = HeaderValue::from_str(key).map_err(|_| {
                DoclingError::InvalidRequest("API key is not a valid header value".to_owned())
            })?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
        }
        if self.body().is_some() {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }

        Ok(PreparedRequest {
            method: self.method().clone(),
            url: endpoint_url(base_url, self.path()),
            headers,
            query: self.query().to_vec(),
            body: self.body().map(<[u8]>::to_vec),
            timeout: self.timeout_or(default_timeout),
        })
    }
}

/// An [`ApiRequest`] bound to one client's base URL, credentials and timeout.
///
/// Both the async and the blocking client send it as is.
#[derive(Debug)]
pub(crate) struct PreparedRequest {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) headers: HeaderMap,
    pub(crate) query: Vec<(&'static str, String)>,
    pub(crate) body: Option<Vec<u8>>,
    pub(crate) timeout: Duration,
}

/// Deadline and pacing for `wait_for_task`.
#[derive(Debug)]
pub(crate) struct TaskWait {
    timeout: Duration,
    /// `None` when `timeout` reaches past what `Instant` can represent.
    deadline: Option<Instant>,
    poll_wait: Duration,
    idle_pause: Duration,
}

impl TaskWait {
    /// With a zero `poll_wait` the service answers immediately, so the
    /// client pauses for `retry_delay` (at least [`MIN_IDLE_POLL_PAUSE`])
    /// between polls instead.
    pub(crate) fn new(poll_wait: Duration, timeout: Duration, retry_delay: Duration) -> Self {
        let idle_pause = if poll_wait.is_zero() {
            retry_delay.max(MIN_IDLE_POLL_PAUSE)
        } else {
            Duration::ZERO
        };
        Self {
            timeout,
            deadline: Instant::now().checked_add(timeout),
            poll_wait,
            idle_pause,
        }
    }

    /// Server-side wait for the next poll, or a timeout once the deadline passed.
    pub(crate) fn next_poll(&self) -> Result<Duration> {
        let remaining = self.remaining();
        if remaining.is_zero() {
            return Err(DoclingError::Timeout {
                timeout_ms: duration_millis(self.timeout),
                source: None,
            });
        }
        Ok(self.poll_wait.min(remaining))
    }

    /// Client-side pause after a non-terminal status.
    pub(crate) fn pause(&self) -> Duration {
        self.idle_pause.min(self.remaining())
    }

    fn remaining(&self) -> Duration {
        match self.deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => Duration::MAX,
        }
    }
}

/// Classifies a completed HTTP exchange.
///
/// 2xx succeeds, 429 and 5xx are transient, everything else is permanent.
pub(crate) fn classify_response(status: StatusCode, body: Vec<u8>) -> AttemptOutcome<Vec<u8>> {
    if status.is_success() {
        return AttemptOutcome::Success(body);
    }

    let err = DoclingError::Api {
        status: status.as_u16(),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        AttemptOutcome::TransientFailure(err)
    } else {
        AttemptOutcome::PermanentFailure(err)
    }
}

/// Classifies a transport-level failure from either reqwest client.
pub(crate) fn classify_transport_error(
    err: reqwest::Error,
    timeout: Duration,
) -> AttemptOutcome<Vec<u8>> {
    if err.is_timeout() {
        return AttemptOutcome::TransientFailure(DoclingError::Timeout {
            timeout_ms: duration_millis(timeout),
            source: Some(err),
        });
    }
    AttemptOutcome::from_result(Err(DoclingError::Transport(err)))
}
