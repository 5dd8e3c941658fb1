//! Blocking HTTP transport over `ureq`.
//!
//! Every request carries the authorization token, JSON content negotiation
//! and the client identification headers. Exchanges are logged at `debug`,
//! bodies at `trace`.

use super::{ApiRequest, ApiResponse, Method, Transport, TransportError, reason_phrase};

/// Application name sent with every request.
pub const APP_NAME: &str = "unleash-provider";

/// Identification sent in the `unleash-sdk` header.
pub fn sdk_version() -> String {
    format!("{APP_NAME}:{}", env!("CARGO_PKG_VERSION"))
}

/// Transport backed by a `ureq` agent.
pub struct UreqTransport {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// Server base URL without trailing slash.
    base_url: String,
    /// Value of the `Authorization` header.
    authorization: String,
}

impl UreqTransport {
    /// Create a transport for a server.
    ///
    /// A trailing `/` on `base_url` is trimmed.
    #[must_use]
    pub fn new(base_url: &str, authorization: impl Into<String>) -> Self {
        // Non-2xx responses must reach the validator instead of surfacing as errors.
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization: authorization.into(),
        }
    }

    fn decorate<B>(&self, builder: ureq::RequestBuilder<B>, request: &ApiRequest) -> ureq::RequestBuilder<B> {
        let builder = builder
            .header("Authorization", &self.authorization)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("X-Unleash-AppName", APP_NAME)
            .header("unleash-sdk", &sdk_version())
            .header("User-Agent", &format!("{APP_NAME}/{}", env!("CARGO_PKG_VERSION")));
        request
            .query
            .iter()
            .fold(builder, |builder, (key, value)| builder.query(key, value))
    }

    fn dispatch(&self, url: &str, request: &ApiRequest) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        match (request.method, &request.body) {
            (Method::Get, _) => self.decorate(self.agent.get(url), request).call(),
            (Method::Delete, _) => self.decorate(self.agent.delete(url), request).call(),
            (Method::Post, Some(body)) => self.decorate(self.agent.post(url), request).send_json(body),
            (Method::Post, None) => self.decorate(self.agent.post(url), request).send_empty(),
            (Method::Put, Some(body)) => self.decorate(self.agent.put(url), request).send_json(body),
            (Method::Put, None) => self.decorate(self.agent.put(url), request).send_empty(),
        }
    }
}

impl Transport for UreqTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        if let Some(body) = &request.body {
            log::trace!("{} {url} request body: {body}", request.method);
        }

        let mut response = self
            .dispatch(&url, request)
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError(format!("failed to read response body: {e}")))?;

        log::debug!("{} {} -> {status}", request.method, request.path_and_query());
        log::trace!("{} {url} response body: {body}", request.method);

        Ok(ApiResponse {
            status,
            reason: reason_phrase(status).to_string(),
            body,
        })
    }
}
