// Mock REST node for testing - these functions are used by integration tests
#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::{Form, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use inference_dispatch::protocols::{Meta, SeldonMessage};

/// One form POST as the node saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: HashMap<String, String>,
    pub fields: HashMap<String, String>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Clone)]
pub struct MockNodeConfig {
    pub status: StatusCode,
    pub response_delay_ms: u64,
}

impl Default for MockNodeConfig {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            response_delay_ms: 0,
        }
    }
}

#[derive(Clone)]
struct NodeState {
    config: MockNodeConfig,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Mock graph node serving every REST verb path.
///
/// Replies carry the request path as `strData` and echo the
/// `Seldon-model-name` header as the puid.
pub struct MockNode {
    config: MockNodeConfig,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    port: Option<u16>,
    shutdown_handle: Option<tokio::task::JoinHandle<()>>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockNode {
    pub fn new(config: MockNodeConfig) -> Self {
        Self {
            config,
            requests: Arc::new(Mutex::new(Vec::new())),
            port: None,
            shutdown_handle: None,
            shutdown_tx: None,
        }
    }

    /// Start the node on an ephemeral port and return that port
    pub async fn start(&mut self) -> Result<u16, Box<dyn std::error::Error>> {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await?;
        let port = listener.local_addr()?.port();

        let state = NodeState {
            config: self.config.clone(),
            requests: self.requests.clone(),
        };
        let app = Router::new()
            .route("/route", post(verb_handler))
            .route("/send-feedback", post(verb_handler))
            .route("/predict", post(verb_handler))
            .route("/transform-input", post(verb_handler))
            .route("/transform-output", post(verb_handler))
            .route("/aggregate", post(verb_handler))
            .with_state(state);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        let handle = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });

            if let Err(e) = server.await {
                eprintln!("Server error: {}", e);
            }
        });

        self.shutdown_handle = Some(handle);
        self.port = Some(port);
        Ok(port)
    }

    pub fn port(&self) -> u16 {
        self.port.expect("mock node not started")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub async fn stop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }

        if let Some(handle) = self.shutdown_handle.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }
    }
}

impl Drop for MockNode {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
    }
}

async fn verb_handler(
    State(state): State<NodeState>,
    uri: Uri,
    headers: HeaderMap,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    let path = uri.path().to_string();
    let headers: HashMap<String, String> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let puid = headers
        .get("seldon-model-name")
        .cloned()
        .unwrap_or_default();

    state.requests.lock().unwrap().push(RecordedRequest {
        path: path.clone(),
        headers,
        fields,
    });

    if state.config.response_delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(state.config.response_delay_ms)).await;
    }

    if !state.config.status.is_success() {
        return (state.config.status, "mock node failure").into_response();
    }

    let mut reply = SeldonMessage::str_data(path);
    reply.meta = Some(Meta {
        puid,
        ..Default::default()
    });
    Json(reply).into_response()
}
