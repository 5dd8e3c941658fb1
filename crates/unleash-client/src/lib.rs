//! # unleash-client
//!
//! Blocking client for the Unleash admin API.
//!
//! This crate provides:
//! - A [`Transport`](transport::Transport) seam with a `ureq` implementation
//!   and an in-memory [`MockTransport`](transport::MockTransport)
//! - The authenticated [`Client`] that adapters receive at construction
//! - Status-code validation with 404-as-gone reads
//! - The error taxonomy and its conversion into diagnostics
//! - Wire schemas with tri-state [`Field`]s
//!
//! ## Example
//!
//! ```no_run
//! use unleash_client::{Client, client::admin, types::ProjectList};
//! use unleash_client::transport::ApiRequest;
//!
//! let client = Client::http("http://localhost:4242", "*:*.admin-token");
//! let projects: ProjectList = client
//!     .expect_json(ApiRequest::get(admin("/projects")), &[200])
//!     .unwrap();
//! println!("{} projects", projects.projects.len());
//! ```

pub mod client;
pub mod error;
pub mod field;
pub mod transport;
pub mod types;
pub mod validate;

pub use client::Client;
pub use error::{Error, ErrorCategory, Result};
pub use field::Field;
pub use transport::{ApiRequest, ApiResponse, Method, MockTransport, Transport};
