// hospital-system-tests/tests/helpers/http.rs
// ============================================================================
// Module: HTTP Fixture
// Description: Sends one request through an assembled router via
// `tower::ServiceExt::oneshot` and decodes the response body as JSON.
// Dependencies: axum, http-body-util, serde_json, tower
// ============================================================================

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// A request to send, built up fluently before `send`/`send_json`.
pub struct Call {
    method: &'static str,
    uri: String,
    token: Option<String>,
    body: Option<Value>,
    headers: Vec<(&'static str, String)>,
}

impl Call {
    #[must_use]
    pub fn new(method: &'static str, uri: impl Into<String>) -> Self {
        Self { method, uri: uri.into(), token: None, body: None, headers: Vec::new() }
    }

    #[must_use]
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    fn into_request(self) -> Request<Body> {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        if let Some(token) = &self.token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        for (name, value) in &self.headers {
            builder = builder.header(*name, value.as_str());
        }
        match self.body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).expect("serializable body")))
                .expect("well-formed request"),
            None => builder.body(Body::empty()).expect("well-formed request"),
        }
    }

    /// Sends the request through `router` and returns the raw response.
    pub async fn send(self, router: &Router) -> Response<Body> {
        router.clone().oneshot(self.into_request()).await.expect("router never returns a transport error")
    }

    /// Sends the request and decodes the body as JSON alongside the status.
    pub async fn send_json(self, router: &Router) -> (StatusCode, Value) {
        let response = self.send(router).await;
        read_json(response).await
    }
}

/// Drains a response body and parses it as JSON, tolerating an empty body
/// (204s, and error responses with no envelope) as `Value::Null`.
pub async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body collects").to_bytes();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).expect("response body is JSON") };
    (status, value)
}
