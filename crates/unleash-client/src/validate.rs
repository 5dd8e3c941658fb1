//! Response validation.
//!
//! Every call names the status codes it accepts. Anything else becomes an
//! [`Error::UnexpectedStatus`] carrying method, URL, expected and actual
//! codes and the body. Read paths use [`validate_read`], where 404 means the
//! remote object is gone rather than an error.

use crate::error::{Error, Result};
use crate::transport::{ApiResponse, Method, TransportError};
use declarative::ReadOutcome;

/// One request and what came back.
#[derive(Debug, Clone)]
pub struct Exchange {
    /// HTTP method.
    pub method: Method,
    /// Full request URL.
    pub url: String,
    /// The response, or why none was received.
    pub outcome: std::result::Result<ApiResponse, TransportError>,
}

/// Gate a response on the accepted status codes.
pub fn validate(exchange: Exchange, codes: &[u16]) -> Result<ApiResponse> {
    let response = match exchange.outcome {
        Ok(response) => response,
        Err(err) => {
            return Err(Error::Transport {
                method: exchange.method.to_string(),
                url: exchange.url,
                message: err.0,
            });
        }
    };

    // Checked before anything else; 409 is an accepted answer for some calls.
    if codes.contains(&response.status) {
        return Ok(response);
    }

    Err(Error::UnexpectedStatus {
        method: exchange.method.to_string(),
        url: exchange.url,
        expected: codes.to_vec(),
        status: response.status,
        status_text: response.status_line(),
        body: response.body,
    })
}

/// Like [`validate`], but a 404 is reported as [`ReadOutcome::Gone`].
pub fn validate_read(exchange: Exchange, codes: &[u16]) -> Result<ReadOutcome<ApiResponse>> {
    if matches!(&exchange.outcome, Ok(response) if response.status == 404) {
        return Ok(ReadOutcome::Gone);
    }
    validate(exchange, codes).map(ReadOutcome::Found)
}
