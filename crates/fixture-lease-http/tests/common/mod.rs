// crates/fixture-lease-http/tests/common/mod.rs
// ============================================================================
// Module: HTTP Test Helpers
// Description: Recording tiny_http backend shared by HTTP collaborator tests.
// Purpose: Serve canned JSON responses and capture what the client sent.
// Dependencies: tiny_http
// ============================================================================

//! ## Overview
//! [`MockBackend`] answers a bounded number of requests on `127.0.0.1:0` and
//! returns the recorded requests when the test finishes. Waiting for a
//! request times out so a client that stops early cannot hang the test.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    dead_code,
    reason = "Shared helpers are not used by every test binary."
)]

use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

/// Request captured by the mock backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    /// HTTP method.
    pub method: String,
    /// Path plus query string.
    pub url: String,
    /// `Authorization` header value.
    pub authorization: Option<String>,
    /// Request body.
    pub body: String,
}

impl Recorded {
    /// Parses the body as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body json")
    }
}

/// Recording backend running on a background thread.
pub struct MockBackend {
    /// Base URL of the server.
    pub base_url: String,
    /// Server thread returning captured requests.
    handle: JoinHandle<Vec<Recorded>>,
}

impl MockBackend {
    /// Serves up to `requests` requests using `handler` for responses.
    pub fn serve<F>(requests: usize, handler: F) -> Self
    where
        F: Fn(&Recorded) -> (u16, String) + Send + 'static,
    {
        let server = Server::http("127.0.0.1:0").expect("http server");
        let addr = server.server_addr().to_ip().expect("ip addr");
        let handle = thread::spawn(move || {
            let mut recorded = Vec::new();
            for _ in 0..requests {
                let Ok(Some(mut request)) = server.recv_timeout(Duration::from_secs(5)) else {
                    break;
                };
                let captured = capture(&mut request);
                let (status, body) = handler(&captured);
                let response = Response::from_string(body)
                    .with_status_code(status)
                    .with_header(json_header());
                let _ = request.respond(response);
                recorded.push(captured);
            }
            recorded
        });
        Self {
            base_url: format!("http://{addr}"),
            handle,
        }
    }

    /// Serves `requests` requests that all receive the same response.
    pub fn fixed(requests: usize, status: u16, body: &str) -> Self {
        let body = body.to_string();
        Self::serve(requests, move |_| (status, body.clone()))
    }

    /// Waits for the server thread and returns the captured requests.
    pub fn finish(self) -> Vec<Recorded> {
        self.handle.join().expect("server thread")
    }
}

/// Reads method, url, auth header, and body from a request.
fn capture(request: &mut tiny_http::Request) -> Recorded {
    let authorization = request
        .headers()
        .iter()
        .find(|header| header.field.equiv("Authorization"))
        .map(|header| header.value.as_str().to_string());
    let mut body = String::new();
    let _ = request.as_reader().read_to_string(&mut body);
    Recorded {
        method: request.method().to_string(),
        url: request.url().to_string(),
        authorization,
        body,
    }
}

/// Returns a JSON content-type header.
fn json_header() -> Header {
    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).expect("header")
}
