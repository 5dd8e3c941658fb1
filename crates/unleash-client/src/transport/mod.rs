//! Transport seam between the client and the network.
//!
//! [`Transport`] sends one [`ApiRequest`] and hands back the raw
//! [`ApiResponse`] whatever its status. Status checking lives in
//! [`crate::validate`], so a transport never decides what counts as success.
//!
//! # Testing
//!
//! Use [`MockTransport`] to script responses without network access:
//!
//! ```
//! use unleash_client::transport::{ApiRequest, Method, MockTransport, Transport};
//! use serde_json::json;
//!
//! let mock = MockTransport::new();
//! mock.respond(Method::Get, "/api/admin/environments/dev", 200, json!({"name": "dev", "type": "development"}));
//!
//! let response = mock.send(&ApiRequest::get("/api/admin/environments/dev")).unwrap();
//! assert_eq!(response.status, 200);
//! ```

pub mod http;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// HTTP methods used by the admin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// A request relative to the server base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path starting with `/`, e.g. `/api/admin/projects`.
    pub path: String,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Create a request without body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// `GET path`
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// `POST path`
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// `PUT path`
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    /// `DELETE path`
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    pub fn json<T: Serialize>(mut self, body: &T) -> crate::Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Path plus encoded query, as it appears in URLs.
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query: Vec<String> = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect();
        format!("{}?{}", self.path, query.join("&"))
    }
}

fn encode_component(raw: &str) -> String {
    raw.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}

/// A response of any status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// Status code.
    pub status: u16,
    /// Canonical reason phrase, empty when unknown.
    pub reason: String,
    /// Raw body.
    pub body: String,
}

impl ApiResponse {
    /// Create a response, filling in the canonical reason phrase.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason_phrase(status).to_string(),
            body: body.into(),
        }
    }

    /// Status line such as `409 Conflict`.
    pub fn status_line(&self) -> String {
        if self.reason.is_empty() {
            self.status.to_string()
        } else {
            format!("{} {}", self.status, self.reason)
        }
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> crate::Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Canonical reason phrase for a status code.
pub fn reason_phrase(status: u16) -> &'static str {
    ureq::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("")
}

/// A failure below HTTP: no response was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Sends requests to an admin API server.
pub trait Transport: Send + Sync {
    /// Base URL without trailing slash.
    fn base_url(&self) -> &str;

    /// Send one request.
    ///
    /// Any HTTP status is a successful send; only failures to get a
    /// response at all are errors.
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

type Route = (Method, String);

/// In-memory transport with scripted responses.
///
/// Responses are queued per method and path (query ignored). Each request
/// consumes the front of its queue; the last queued response is reused for
/// every later request. Requests without a scripted response fail at the
/// transport level. Every request is recorded.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<HashMap<Route, VecDeque<ApiResponse>>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl MockTransport {
    /// Base URL reported by mock transports.
    pub const BASE_URL: &'static str = "http://unleash.test";

    /// Create a mock with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        let body = if body.is_null() {
            String::new()
        } else {
            body.to_string()
        };
        self.respond_raw(method, path, ApiResponse::new(status, body))
    }

    /// Queue a response with an empty body.
    pub fn respond_empty(&self, method: Method, path: &str, status: u16) -> &Self {
        self.respond_raw(method, path, ApiResponse::new(status, ""))
    }

    /// Queue an arbitrary response.
    pub fn respond_raw(&self, method: Method, path: &str, response: ApiResponse) -> &Self {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
        self
    }

    /// All requests sent so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests sent to one method and path.
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// Body of the last request sent to one method and path.
    pub fn last_body(&self, method: Method, path: &str) -> Option<Value> {
        self.requests_to(method, path)
            .pop()
            .and_then(|r| r.body)
    }
}

impl Transport for MockTransport {
    fn base_url(&self) -> &str {
        Self::BASE_URL
    }

    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        let queue = routes
            .get_mut(&(request.method, request.path.clone()))
            .filter(|queue| !queue.is_empty())
            .ok_or_else(|| {
                TransportError(format!(
                    "no mock response for {} {}",
                    request.method, request.path
                ))
            })?;

        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        response.ok_or_else(|| TransportError("mock response queue is empty".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_path_and_query_encodes() {
        let request = ApiRequest::get("/api/admin/user-admin/search").query("q", "a+b@example.com");
        assert_eq!(
            request.path_and_query(),
            "/api/admin/user-admin/search?q=a%2Bb%40example.com"
        );
        assert_eq!(ApiRequest::get("/x").path_and_query(), "/x");
    }

    #[test]
    fn test_status_line() {
        assert_eq!(ApiResponse::new(409, "").status_line(), "409 Conflict");
        assert_eq!(ApiResponse::new(201, "").status_line(), "201 Created");
        assert_eq!(ApiResponse::new(599, "").status_line(), "599");
    }

    #[test]
    fn test_mock_transport_queue_then_sticky() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "/a", 200, json!({"n": 1}))
            .respond(Method::Get, "/a", 200, json!({"n": 2}));

        let first = mock.send(&ApiRequest::get("/a")).unwrap();
        let second = mock.send(&ApiRequest::get("/a")).unwrap();
        let third = mock.send(&ApiRequest::get("/a")).unwrap();

        assert_eq!(first.json::<Value>().unwrap()["n"], 1);
        assert_eq!(second.json::<Value>().unwrap()["n"], 2);
        assert_eq!(third.json::<Value>().unwrap()["n"], 2);
        assert_eq!(mock.requests().len(), 3);
    }

    #[test]
    fn test_mock_transport_unmatched_is_transport_error() {
        let mock = MockTransport::new();
        let err = mock.send(&ApiRequest::post("/missing")).unwrap_err();
        assert!(err.0.contains("POST /missing"));
        assert_eq!(mock.requests().len(), 1);
    }

    #[test]
    fn test_mock_transport_records_bodies() {
        let mock = MockTransport::new();
        mock.respond_empty(Method::Put, "/b", 204);
        let request = ApiRequest::put("/b").json(&json!({"enabled": true})).unwrap();
        mock.send(&request).unwrap();
        assert_eq!(mock.last_body(Method::Put, "/b"), Some(json!({"enabled": true})));
    }
}
