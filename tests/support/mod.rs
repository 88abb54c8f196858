//! Scripted in-process Docling Serve stand-in shared by the integration tests.

#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    Router,
};
use serde_json::{json, Value as JsonValue};

#[derive(Clone)]
pub struct MockResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub delay: Duration,
}

impl MockResponse {
    pub fn json(status: StatusCode, body: JsonValue) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string().into_bytes(),
            delay: Duration::from_millis(0),
        }
    }

    pub fn bytes(status: StatusCode, content_type: &'static str, body: &[u8]) -> Self {
        Self {
            status,
            content_type,
            body: body.to_vec(),
            delay: Duration::from_millis(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// One request as seen by the mock server.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub api_key: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn json(&self) -> JsonValue {
        serde_json::from_slice(&self.body).expect("request body must be JSON")
    }
}

#[derive(Clone)]
struct MockState {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    hits: Arc<AtomicUsize>,
}

async fn scripted_handler(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state
        .requests
        .lock()
        .expect("request log mutex must not be poisoned")
        .push(RecordedRequest {
            method,
            path: uri.path().to_owned(),
            query: uri.query().map(str::to_owned),
            api_key: headers
                .get("x-api-key")
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned),
            body: body.to_vec(),
        });

    let response = {
        let mut queue = state
            .responses
            .lock()
            .expect("response queue mutex must not be poisoned");
        queue.pop_front().unwrap_or_else(|| {
            MockResponse::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"detail": "no mock response available"}),
            )
        })
    };

    if !response.delay.is_zero() {
        tokio::time::sleep(response.delay).await;
    }

    (
        response.status,
        [(header::CONTENT_TYPE, response.content_type)],
        response.body,
    )
}

pub struct TestServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Option<tokio::sync::oneshot::Sender<()>>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

impl TestServer {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .expect("request log mutex must not be poisoned")
            .clone()
    }
}

fn mock_state(responses: Vec<MockResponse>) -> MockState {
    MockState {
        responses: Arc::new(Mutex::new(responses.into())),
        requests: Arc::new(Mutex::new(Vec::new())),
        hits: Arc::new(AtomicUsize::new(0)),
    }
}

async fn serve(state: MockState) -> (String, tokio::sync::oneshot::Sender<()>) {
    let app = Router::new().fallback(scripted_handler).with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("must bind test listener");
    let address = listener.local_addr().expect("must have local addr");
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("mock server must run");
    });

    (format!("http://{address}"), shutdown_tx)
}

/// Starts the mock server on the current tokio runtime.
pub async fn spawn_server(responses: Vec<MockResponse>) -> TestServer {
    let state = mock_state(responses);
    let (base_url, shutdown) = serve(state.clone()).await;
    TestServer {
        base_url,
        hits: state.hits,
        requests: state.requests,
        shutdown: Some(shutdown),
    }
}

/// Starts the mock server on its own thread and runtime, for blocking clients.
pub fn spawn_server_thread(responses: Vec<MockResponse>) -> TestServer {
    let state = mock_state(responses);
    let server_state = state.clone();
    let (ready_tx, ready_rx) = std::sync::mpsc::channel();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("must build server runtime");
        runtime.block_on(async move {
            let (base_url, shutdown) = serve(server_state).await;
            ready_tx
                .send((base_url, shutdown))
                .expect("test must wait for server address");
            std::future::pending::<()>().await;
        });
    });

    let (base_url, shutdown) = ready_rx.recv().expect("mock server thread must start");
    TestServer {
        base_url,
        hits: state.hits,
        requests: state.requests,
        shutdown: Some(shutdown),
    }
}

pub fn health_body() -> JsonValue {
    json!({ "status": "ok" })
}

pub fn convert_body(filename: &str) -> JsonValue {
    json!({
        "document": {
            "filename": filename,
            "md_content": "# Test Document\n\nThis is a test document.",
            "html_content": null,
            "json_content": null,
            "text_content": null,
            "doctags_content": null
        },
        "status": "success",
        "errors": [],
        "processing_time": 0.25,
        "timings": {}
    })
}

pub fn task_body(task_id: &str, status: &str) -> JsonValue {
    json!({
        "task_id": task_id,
        "task_type": "convert",
        "task_status": status,
        "task_position": 0,
        "task_meta": null
    })
}

pub fn chunk_body() -> JsonValue {
    json!({
        "chunks": [
            {
                "filename": "doc.pdf",
                "chunk_index": 0,
                "text": "Introduction\nDocling converts documents.",
                "raw_text": "Docling converts documents.",
                "num_tokens": 5,
                "headings": ["Introduction"],
                "captions": [],
                "doc_items": ["#/texts/1"],
                "page_numbers": [1],
                "metadata": null
            }
        ],
        "documents": [
            { "content": null, "status": "success", "errors": [] }
        ],
        "processing_time": 0.5
    })
}
