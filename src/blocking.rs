//! Blocking counterpart of [`DoclingClient`](crate::DoclingClient).
//!
//! Same operations, same retry decisions; the calling thread sleeps through
//! backoff waits, which cannot be interrupted.
//!
//! Like `reqwest::blocking`, this client must not be created or used from
//! inside an async runtime.

use std::fmt;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use crate::{
    client::{ensure_inbody, read_connection_env, single_source_request},
    decode::{decode_convert_output, decode_json},
    request::{
        self, classify_response, classify_transport_error, ApiRequest, PreparedRequest, TaskWait,
    },
    retry::{AttemptOutcome, RetryDecision, RetryState},
    ChunkDocumentResponse, ChunkDocumentsRequest, ClientOptions, ConvertDocumentResponse,
    ConvertDocumentsRequest, ConvertDocumentsRequestOptions, ConvertOutput,
    HealthCheckResponse, HierarchicalChunkerOptions, HybridChunkerOptions, Result, Source,
    TaskStatusResponse,
};

#[derive(Clone)]
/// Blocking HTTP client for the Docling Serve API.
pub struct DoclingClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: Option<String>,
    options: ClientOptions,
}

impl fmt::Debug for DoclingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("blocking::DoclingClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("options", &self.options)
            .finish()
    }
}

impl DoclingClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
            api_key: None,
            options: ClientOptions::default(),
        }
    }

    /// Reads the same variables as [`crate::DoclingClient::from_env`].
    pub fn from_env() -> std::result::Result<Self, String> {
        let (base_url, api_key) = read_connection_env()?;
        let mut client = Self::new(base_url).with_options(ClientOptions::from_env()?);
        client.api_key = api_key;
        Ok(client)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn health_check(&self) -> Result<HealthCheckResponse> {
        let body = self.send_with_retry(&request::health_request())?;
        decode_json(&body, "health")
    }

    pub fn version(&self) -> Result<serde_json::Value> {
        let body = self.send_with_retry(&request::version_request())?;
        decode_json(&body, "version")
    }

    pub fn convert(&self, request: &ConvertDocumentsRequest) -> Result<ConvertOutput> {
        let api_request = request::convert_request(request, false)?;
        let body = self.send_with_retry(&api_request)?;
        decode_convert_output(&request.target, body)
    }

    pub fn convert_source(
        &self,
        request: &ConvertDocumentsRequest,
    ) -> Result<ConvertDocumentResponse> {
        ensure_inbody(&request.target)?;
        let api_request = request::convert_request(request, false)?;
        let body = self.send_with_retry(&api_request)?;
        decode_json(&body, "convert")
    }

    pub fn convert_file(
        &self,
        path: impl AsRef<Path>,
        options: Option<ConvertDocumentsRequestOptions>,
    ) -> Result<ConvertDocumentResponse> {
        let source = Source::from_path(path)?;
        self.convert_source(&single_source_request(source, options))
    }

    pub fn convert_url(
        &self,
        url: impl Into<String>,
        options: Option<ConvertDocumentsRequestOptions>,
    ) -> Result<ConvertDocumentResponse> {
        self.convert_source(&single_source_request(Source::http(url), options))
    }

    pub fn convert_async(&self, request: &ConvertDocumentsRequest) -> Result<TaskStatusResponse> {
        let api_request = request::convert_request(request, true)?;
        let body = self.send_with_retry(&api_request)?;
        decode_json(&body, "task status")
    }

    pub fn chunk(&self, request: &ChunkDocumentsRequest) -> Result<ChunkDocumentResponse> {
        ensure_inbody(&request.target)?;
        let api_request = request::chunk_request(request, false)?;
        let body = self.send_with_retry(&api_request)?;
        decode_json(&body, "chunk")
    }

    pub fn chunk_hierarchical(
        &self,
        sources: impl IntoIterator<Item = Source>,
        options: HierarchicalChunkerOptions,
    ) -> Result<ChunkDocumentResponse> {
        self.chunk(&ChunkDocumentsRequest::new(sources, options))
    }

    pub fn chunk_hybrid(
        &self,
        sources: impl IntoIterator<Item = Source>,
        options: HybridChunkerOptions,
    ) -> Result<ChunkDocumentResponse> {
        self.chunk(&ChunkDocumentsRequest::new(sources, options))
    }

    pub fn chunk_async(&self, request: &ChunkDocumentsRequest) -> Result<TaskStatusResponse> {
        let api_request = request::chunk_request(request, true)?;
        let body = self.send_with_retry(&api_request)?;
        decode_json(&body, "task status")
    }

    pub fn task_status(&self, task_id: &str, wait: Option<Duration>) -> Result<TaskStatusResponse> {
        let api_request = request::task_status_request(task_id, wait, self.options.timeout())?;
        let body = self.send_with_retry(&api_request)?;
        decode_json(&body, "task status")
    }

    pub fn task_result(&self, task_id: &str) -> Result<ConvertDocumentResponse> {
        let api_request = request::task_result_request(task_id)?;
        let body = self.send_with_retry(&api_request)?;
        decode_json(&body, "task result")
    }

    pub fn chunk_task_result(&self, task_id: &str) -> Result<ChunkDocumentResponse> {
        let api_request = request::task_result_request(task_id)?;
        let body = self.send_with_retry(&api_request)?;
        decode_json(&body, "chunk task result")
    }

    pub fn wait_for_task(
        &self,
        task_id: &str,
        poll_wait: Duration,
        timeout: Duration,
    ) -> Result<TaskStatusResponse> {
        let polling = TaskWait::new(poll_wait, timeout, self.options.retry_delay());
        loop {
            let status = self.task_status(task_id, Some(polling.next_poll()?))?;
            if status.task_status.is_terminal() {
                return Ok(status);
            }
            let pause = polling.pause();
            if !pause.is_zero() {
                sleep(pause);
            }
        }
    }

    fn send_with_retry(&self, request: &ApiRequest) -> Result<Vec<u8>> {
        let prepared = request.prepare(
            &self.base_url,
            self.api_key.as_deref(),
            self.options.timeout(),
        )?;
        let mut state = RetryState::new(self.options.retry_policy());
        loop {
            let outcome = self.execute(&prepared);
            match state.record(outcome) {
                RetryDecision::Done(body) => return Ok(body),
                RetryDecision::Fail(err) => return Err(err),
                RetryDecision::RetryAfter(delay) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("retrying request after {} ms", delay.as_millis());
                    sleep(delay);
                }
            }
        }
    }

    fn execute(&self, prepared: &PreparedRequest) -> AttemptOutcome<Vec<u8>> {
        #[cfg(feature = "tracing")]
        tracing::debug!(method = %prepared.method, url = %prepared.url, "sending request");

        let mut builder = self
            .http
            .request(prepared.method.clone(), &prepared.url)
            .headers(prepared.headers.clone())
            .timeout(prepared.timeout);
        if !prepared.query.is_empty() {
            builder = builder.query(&prepared.query);
        }
        if let Some(body) = &prepared.body {
            builder = builder.body(body.clone());
        }

        let response = match builder.send() {
            Ok(response) => response,
            Err(err) => return classify_transport_error(err, prepared.timeout),
        };
        let status = response.status();
        match response.bytes() {
            Ok(body) => classify_response(status, body.to_vec()),
            Err(err) => classify_transport_error(err, prepared.timeout),
        }
    }
}
