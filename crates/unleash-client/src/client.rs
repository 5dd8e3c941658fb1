//! Authenticated admin API client.
//!
//! One [`Client`] is built at provider start and handed to every adapter
//! at construction time. It is cheap to clone: clones share the transport.

use crate::error::Result;
use crate::transport::http::UreqTransport;
use crate::transport::{ApiRequest, ApiResponse, Transport};
use crate::validate::{Exchange, validate, validate_read};
use declarative::ReadOutcome;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

/// Prefix of every admin endpoint.
pub const ADMIN_PREFIX: &str = "/api/admin";

/// Build an admin endpoint path, e.g. `admin("/projects")`.
pub fn admin(path: impl fmt::Display) -> String {
    format!("{ADMIN_PREFIX}{path}")
}

/// Client for the Unleash admin API.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client over any transport.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Create a client talking HTTP to a server.
    pub fn http(base_url: &str, authorization: impl Into<String>) -> Self {
        Self::new(UreqTransport::new(base_url, authorization))
    }

    /// Base URL of the server.
    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    fn exchange(&self, request: &ApiRequest) -> Exchange {
        Exchange {
            method: request.method,
            url: format!("{}{}", self.base_url(), request.path_and_query()),
            outcome: self.transport.send(request),
        }
    }

    /// Send a request and require one of `codes`.
    pub fn expect(&self, request: ApiRequest, codes: &[u16]) -> Result<ApiResponse> {
        validate(self.exchange(&request), codes)
    }

    /// Send a request, require one of `codes`, decode the body.
    pub fn expect_json<T: DeserializeOwned>(&self, request: ApiRequest, codes: &[u16]) -> Result<T> {
        self.expect(request, codes)?.json()
    }

    /// Send a request where 404 means the object is already gone.
    pub fn expect_read(
        &self,
        request: ApiRequest,
        codes: &[u16],
    ) -> Result<ReadOutcome<ApiResponse>> {
        validate_read(self.exchange(&request), codes)
    }

    /// Send a read request; 404 yields [`ReadOutcome::Gone`].
    pub fn fetch<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        codes: &[u16],
    ) -> Result<ReadOutcome<T>> {
        match self.expect_read(request, codes)? {
            ReadOutcome::Found(response) => Ok(ReadOutcome::Found(response.json()?)),
            ReadOutcome::Gone => Ok(ReadOutcome::Gone),
        }
    }
}
