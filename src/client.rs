use std::fmt;
use std::path::Path;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    decode::{decode_convert_output, decode_json},
    request::{
        self, classify_response, classify_transport_error, ApiRequest, PreparedRequest, TaskWait,
    },
    retry::{AttemptOutcome, RetryDecision, RetryState},
    ChunkDocumentResponse, ChunkDocumentsRequest, ClientOptions, ConvertDocumentResponse,
    ConvertDocumentsRequest, ConvertDocumentsRequestOptions, ConvertOutput, DoclingError,
    HealthCheckResponse, HierarchicalChunkerOptions, HybridChunkerOptions, Result, Source,
    Target, TaskStatusResponse,
};

/// Default Docling Serve address when running the service locally.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5001";

#[derive(Clone)]
/// Async HTTP client for the Docling Serve API.
///
/// Cloning is cheap and clones share one connection pool. Every call keeps
/// its own retry bookkeeping, so clones can be used concurrently.
pub struct DoclingClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    options: ClientOptions,
    cancel: Option<CancellationToken>,
}

impl fmt::Debug for DoclingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DoclingClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("options", &self.options)
            .finish()
    }
}

impl Default for DoclingClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl DoclingClient {
    /// Creates a client for the service at `base_url`, e.g. `http://localhost:5001`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: None,
            options: ClientOptions::default(),
            cancel: None,
        }
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `DOCLING_SERVE_URL`: service base URL (required)
    /// - `DOCLING_SERVE_API_KEY`: value for the `X-Api-Key` header (optional)
    /// - `DOCLING_SERVE_TIMEOUT_MS`, `DOCLING_SERVE_MAX_RETRIES`,
    ///   `DOCLING_SERVE_RETRY_DELAY_MS`: see [`ClientOptions::from_env`]
    ///
    /// # Example
    ///
    /// ```no_run
    /// use docling_serve_http::DoclingClient;
    ///
    /// let client = DoclingClient::from_env().expect("missing DOCLING_SERVE_URL");
    /// ```
    pub fn from_env() -> std::result::Result<Self, String> {
        let (base_url, api_key) = read_connection_env()?;
        let mut client = Self::new(base_url).with_options(ClientOptions::from_env()?);
        client.api_key = api_key;
        Ok(client)
    }

    /// Sends `key` in the `X-Api-Key` header of every request.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Binds calls made through the returned client to `token`.
    ///
    /// Once the token is cancelled, pending backoff waits end immediately and
    /// no further attempt is sent; the call returns [`DoclingError::Cancelled`].
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Checks that the service is up.
    pub async fn health_check(&self) -> Result<HealthCheckResponse> {
        let body = self.send_with_retry(&request::health_request()).await?;
        decode_json(&body, "health")
    }

    /// Returns component versions reported by the service.
    pub async fn version(&self) -> Result<serde_json::Value> {
        let body = self.send_with_retry(&request::version_request()).await?;
        decode_json(&body, "version")
    }

    /// Converts the request's sources and decodes the result according to its target.
    pub async fn convert(&self, request: &ConvertDocumentsRequest) -> Result<ConvertOutput> {
        let api_request = request::convert_request(request, false)?;
        let body = self.send_with_retry(&api_request).await?;
        decode_convert_output(&request.target, body)
    }

    /// Converts sources whose results come back in the response body.
    ///
    /// Fails with [`DoclingError::InvalidRequest`] for any other target;
    /// use [`DoclingClient::convert`] for zip or upload targets.
    pub async fn convert_source(
        &self,
        request: &ConvertDocumentsRequest,
    ) -> Result<ConvertDocumentResponse> {
        ensure_inbody(&request.target)?;
        let api_request = request::convert_request(request, false)?;
        let body = self.send_with_retry(&api_request).await?;
        decode_json(&body, "convert")
    }

    /// Reads a local file and converts it.
    pub async fn convert_file(
        &self,
        path: impl AsRef<Path>,
        options: Option<ConvertDocumentsRequestOptions>,
    ) -> Result<ConvertDocumentResponse> {
        let source = Source::from_path(path)?;
        self.convert_source(&single_source_request(source, options))
            .await
    }

    /// Has the service download `url` and convert it.
    pub async fn convert_url(
        &self,
        url: impl Into<String>,
        options: Option<ConvertDocumentsRequestOptions>,
    ) -> Result<ConvertDocumentResponse> {
        self.convert_source(&single_source_request(Source::http(url), options))
            .await
    }

    /// Queues a conversion and returns its task handle.
    pub async fn convert_async(
        &self,
        request: &ConvertDocumentsRequest,
    ) -> Result<TaskStatusResponse> {
        let api_request = request::convert_request(request, true)?;
        let body = self.send_with_retry(&api_request).await?;
        decode_json(&body, "task status")
    }

    /// Converts and chunks sources with the chunker named in the request.
    pub async fn chunk(&self, request: &ChunkDocumentsRequest) -> Result<ChunkDocumentResponse> {
        ensure_inbody(&request.target)?;
        let api_request = request::chunk_request(request, false)?;
        let body = self.send_with_retry(&api_request).await?;
        decode_json(&body, "chunk")
    }

    pub async fn chunk_hierarchical(
        &self,
        sources: impl IntoIterator<Item = Source>,
        options: HierarchicalChunkerOptions,
    ) -> Result<ChunkDocumentResponse> {
        self.chunk(&ChunkDocumentsRequest::new(sources, options))
            .await
    }

    pub async fn chunk_hybrid(
        &self,
        sources: impl IntoIterator<Item = Source>,
        options: HybridChunkerOptions,
    ) -> Result<ChunkDocumentResponse> {
        self.chunk(&ChunkDocumentsRequest::new(sources, options))
            .await
    }

    /// Queues a chunking job and returns its task handle.
    pub async fn chunk_async(&self, request: &ChunkDocumentsRequest) -> Result<TaskStatusResponse> {
        let api_request = request::chunk_request(request, true)?;
        let body = self.send_with_retry(&api_request).await?;
        decode_json(&body, "task status")
    }

    /// Polls a task once.
    ///
    /// With `wait`, the service long-polls for up to that duration before
    /// answering; the attempt timeout is extended accordingly.
    pub async fn task_status(
        &self,
        task_id: &str,
        wait: Option<Duration>,
    ) -> Result<TaskStatusResponse> {
        let api_request = request::task_status_request(task_id, wait, self.options.timeout())?;
        let body = self.send_with_retry(&api_request).await?;
        decode_json(&body, "task status")
    }

    /// Fetches the result of a finished conversion task.
    pub async fn task_result(&self, task_id: &str) -> Result<ConvertDocumentResponse> {
        let api_request = request::task_result_request(task_id)?;
        let body = self.send_with_retry(&api_request).await?;
        decode_json(&body, "task result")
    }

    /// Fetches the result of a finished chunking task.
    pub async fn chunk_task_result(&self, task_id: &str) -> Result<ChunkDocumentResponse> {
        let api_request = request::task_result_request(task_id)?;
        let body = self.send_with_retry(&api_request).await?;
        decode_json(&body, "chunk task result")
    }

    /// Long-polls a task until it reaches a terminal status.
    ///
    /// Each poll asks the service to hold the response for up to `poll_wait`.
    /// A zero `poll_wait` makes the client pause between polls instead. Returns
    /// [`DoclingError::Timeout`] when `timeout` elapses first; `Duration::MAX`
    /// waits indefinitely.
    pub async fn wait_for_task(
        &self,
        task_id: &str,
        poll_wait: Duration,
        timeout: Duration,
    ) -> Result<TaskStatusResponse> {
        let polling = TaskWait::new(poll_wait, timeout, self.options.retry_delay());
        loop {
            let status = self.task_status(task_id, Some(polling.next_poll()?)).await?;
            if status.task_status.is_terminal() {
                return Ok(status);
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(task_id, status = ?status.task_status, "task still running");

            let pause = polling.pause();
            if !pause.is_zero() {
                self.sleep_unless_cancelled(pause).await?;
            }
        }
    }

    async fn send_with_retry(&self, request: &ApiRequest) -> Result<Vec<u8>> {
        let prepared = request.prepare(
            &self.base_url,
            self.api_key.as_deref(),
            self.options.timeout(),
        )?;
        let mut state = RetryState::new(self.options.retry_policy());
        loop {
            if self.is_cancelled() {
                return Err(DoclingError::Cancelled);
            }

            let outcome = self.execute(&prepared).await;
            match state.record(outcome) {
                RetryDecision::Done(body) => return Ok(body),
                RetryDecision::Fail(err) => return Err(err),
                RetryDecision::RetryAfter(delay) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("retrying request after {} ms", delay.as_millis());
                    self.sleep_unless_cancelled(delay).await?;
                }
            }
        }
    }

    /// Sends one attempt and classifies the result. Never retries.
    async fn execute(&self, prepared: &PreparedRequest) -> AttemptOutcome<Vec<u8>> {
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

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => return classify_transport_error(err, prepared.timeout),
        };
        let status = response.status();
        match response.bytes().await {
            Ok(body) => classify_response(status, body.to_vec()),
            Err(err) => classify_transport_error(err, prepared.timeout),
        }
    }

    /// Sleeps for `delay` unless the call is cancelled first.
    async fn sleep_unless_cancelled(&self, delay: Duration) -> Result<()> {
        match &self.cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(DoclingError::Cancelled),
                _ = sleep(delay) => Ok(()),
            },
            None => {
                sleep(delay).await;
                Ok(())
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

pub(crate) fn read_connection_env() -> std::result::Result<(String, Option<String>), String> {
    let base_url = std::env::var("DOCLING_SERVE_URL")
        .map_err(|_| "missing DOCLING_SERVE_URL environment variable".to_owned())?;
    if base_url.trim().is_empty() {
        return Err("DOCLING_SERVE_URL is set but empty".to_owned());
    }
    let api_key = std::env::var("DOCLING_SERVE_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    Ok((base_url, api_key))
}

pub(crate) fn single_source_request(
    source: Source,
    options: Option<ConvertDocumentsRequestOptions>,
) -> ConvertDocumentsRequest {
    ConvertDocumentsRequest::new([source]).with_options(options.unwrap_or_default())
}

pub(crate) fn ensure_inbody(target: &Target) -> Result<()> {
    if *target != Target::Inbody {
        return Err(DoclingError::InvalidRequest(
            "this operation only supports the inbody target; use convert() instead".to_owned(),
        ));
    }
    Ok(())
}
