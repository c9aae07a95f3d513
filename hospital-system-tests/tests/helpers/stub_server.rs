// hospital-system-tests/tests/helpers/stub_server.rs
// ============================================================================
// Module: Downstream Stub Server
// Description: A real axum server bound to an OS port, standing in for a
// proxied downstream service (patient-service, doctor-service, ...) so a
// test can observe exactly which headers the gateway forwarded.
// Dependencies: axum, tokio
// ============================================================================

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tokio::sync::oneshot;

#[derive(Default)]
struct Captured {
    headers: Mutex<Vec<(String, String)>>,
}

/// Handle to a running stub; captures the headers of the last request it
/// received and shuts the server down on drop.
pub struct StubHandle {
    pub base_url: String,
    captured: Arc<Captured>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl StubHandle {
    /// Returns the header value the stub's last received request carried,
    /// if any.
    #[must_use]
    pub fn last_header(&self, name: &str) -> Option<String> {
        self.captured
            .headers
            .lock()
            .expect("stub header lock")
            .iter()
            .find(|(header_name, _)| header_name.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
    }
}

impl Drop for StubHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

async fn capture(State(captured): State<Arc<Captured>>, headers: HeaderMap) -> impl IntoResponse {
    let recorded = headers.iter().filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string()))).collect();
    *captured.headers.lock().expect("stub header lock") = recorded;
    Json(serde_json::json!({"id": "p1", "name": "Stub Patient"}))
}

/// Binds a stub server on an ephemeral localhost port and serves it on a
/// background task until the returned handle is dropped.
pub async fn spawn() -> StubHandle {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("stub binds");
    let addr: SocketAddr = listener.local_addr().expect("stub has a local addr");
    let captured = Arc::new(Captured::default());
    let router = Router::new().route("/api/patients/:id", get(capture)).with_state(captured.clone());

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("stub server runs");
    });

    StubHandle { base_url: format!("http://{addr}"), captured, shutdown: Some(shutdown_tx) }
}
