// crates/eox-enrollment-client/src/tests/support.rs
// ============================================================================
// Module: Loopback Test Server
// Description: Scripted axum server for client unit tests.
// Purpose: Capture outgoing requests and return programmed responses.
// Dependencies: axum, tokio
// ============================================================================

#![allow(dead_code, reason = "Helpers are shared by several test modules.")]

use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use tokio::runtime::Builder;
use tokio::sync::oneshot;

use crate::fixture::CourseFixture;
use crate::fixture::FixtureConfig;
use crate::fixture::SiteFixture;

/// Request captured by the test server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub host: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    /// Decodes the form-encoded body into ordered pairs.
    pub fn form(&self) -> Vec<(String, String)> {
        url::form_urlencoded::parse(self.body.as_bytes()).into_owned().collect()
    }
}

/// Programmed response.
#[derive(Debug, Clone)]
pub struct TestResponse {
    pub status: u16,
    pub body: String,
}

impl TestResponse {
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

type Responder = dyn Fn(&RecordedRequest) -> TestResponse + Send + Sync;

#[derive(Clone)]
struct ServerState {
    responder: Arc<Responder>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Loopback server handle; shuts down on drop.
pub struct TestServer {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
}

impl TestServer {
    /// Spawns a server answering every request through `responder`.
    pub fn spawn<F>(responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> TestResponse + Send + Sync + 'static,
    {
        let listener = StdTcpListener::bind("127.0.0.1:0").expect("bind loopback");
        listener.set_nonblocking(true).expect("nonblocking listener");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = ServerState {
            responder: Arc::new(responder),
            requests: Arc::clone(&requests),
        };
        let app = Router::new().fallback(handle).with_state(state);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let join = thread::spawn(move || {
            let runtime = Builder::new_current_thread().enable_all().build().expect("runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).expect("listener");
                let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                });
                let _ = server.await;
            });
        });
        Self {
            base_url: format!("http://{addr}"),
            requests,
            shutdown: Some(shutdown_tx),
            join: Some(join),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

async fn handle(
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| headers.get(name).and_then(|value| value.to_str().ok()).map(str::to_string);
    let request = RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        host: header("host"),
        authorization: header("authorization"),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    let reply = (state.responder)(&request);
    if let Ok(mut guard) = state.requests.lock() {
        guard.push(request);
    }
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(CONTENT_TYPE, "application/json")], reply.body).into_response()
}

/// Builds a fixture pointing at `base_url`.
pub fn fixture(base_url: &str) -> FixtureConfig {
    FixtureConfig {
        base_url: base_url.to_string(),
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        grant_type: "client_credentials".to_string(),
        site1: SiteFixture {
            host: "site1.localhost".to_string(),
            user_email: "honor@example.com".to_string(),
            user_id: "honor".to_string(),
            fake_user: "ghost".to_string(),
            course: CourseFixture {
                id: "course-v1:Org+Demo+2024".to_string(),
                mode: "audit".to_string(),
            },
        },
        site2: SiteFixture {
            host: "site2.localhost".to_string(),
            user_email: "verified@example.com".to_string(),
            user_id: "verified".to_string(),
            fake_user: "phantom".to_string(),
            course: CourseFixture {
                id: "course-v1:Org+Other+2024".to_string(),
                mode: "audit".to_string(),
            },
        },
    }
}
