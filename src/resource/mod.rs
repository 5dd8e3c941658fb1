//! Managed entity kinds of the Unleash provider
//!
//! Every kind implements [`declarative::Resource`] and receives the shared
//! [`Client`] at construction. Kinds with a plain REST shape go through
//! [`rest::RestResource`]; the rest implement the trait directly.

use chrono::{DateTime, SecondsFormat};
use declarative::{Diagnostic, OpResult, Registry};
use std::collections::BTreeSet;
use unleash_client::Client;

pub mod api_token;
pub mod context_field;
pub mod environment;
pub mod group;
pub mod oidc;
pub mod project;
pub mod project_access;
pub mod project_environment;
pub mod rest;
pub mod role;
pub mod saml;
pub mod service_account;
pub mod service_account_token;
pub mod user;

pub use rest::{Call, RestDescriptor, RestResource};

/// Register every resource kind against one client
pub fn register(registry: &mut Registry, client: &Client) {
    registry.register(RestResource::new(client.clone(), api_token::ApiTokens));
    registry.register(RestResource::new(client.clone(), context_field::ContextFields));
    registry.register(RestResource::new(client.clone(), environment::Environments));
    registry.register(RestResource::new(client.clone(), group::Groups));
    registry.register(oidc::OidcResource::new(client.clone()));
    registry.register(project::ProjectResource::new(client.clone()));
    registry.register(project_access::ProjectAccessResource::new(client.clone()));
    registry.register(project_environment::ProjectEnvironmentResource::new(client.clone()));
    registry.register(RestResource::new(client.clone(), role::Roles));
    registry.register(saml::SamlResource::new(client.clone()));
    registry.register(RestResource::new(client.clone(), service_account::ServiceAccounts));
    registry.register(RestResource::new(
        client.clone(),
        service_account_token::ServiceAccountTokens,
    ));
    registry.register(RestResource::new(client.clone(), user::Users));
}

/// Parse a numeric identifier given to import
pub fn parse_numeric_id(kind: &str, id: &str) -> OpResult<i64> {
    id.trim().parse().map_err(|_| {
        Diagnostic::error(
            "Invalid import identifier",
            format!("Expected a numeric {kind} id, got '{id}'"),
        )
        .into()
    })
}

/// Split a composite `first:second` import identifier
pub fn split_pair<'a>(id: &'a str, first: &str, second: &str) -> OpResult<(&'a str, &'a str)> {
    match id.split_once(':') {
        Some((a, b)) if !a.is_empty() && !b.is_empty() => Ok((a, b)),
        _ => Err(Diagnostic::error(
            "Invalid import identifier",
            format!("Expected '{first}:{second}', got '{id}'"),
        )
        .into()),
    }
}

/// Keep the declared spelling of a timestamp when both denote the same instant
///
/// Other remote values are rewritten as RFC3339 in UTC, keeping any
/// sub-second part.
pub fn reconcile_timestamp(declared: Option<&str>, remote: Option<String>) -> Option<String> {
    let remote = remote?;
    let Ok(parsed) = DateTime::parse_from_rfc3339(&remote) else {
        return Some(remote);
    };
    match declared.and_then(|d| DateTime::parse_from_rfc3339(d).ok()) {
        Some(previous) if previous == parsed => declared.map(str::to_string),
        _ => Some(parsed.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
    }
}

/// Empty collections hydrate and normalise to unset
pub fn non_empty<T: Ord>(set: Option<BTreeSet<T>>) -> Option<BTreeSet<T>> {
    set.filter(|s| !s.is_empty())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use unleash_client::MockTransport;

    /// Mock transport and a client wired to it
    pub fn mock_client() -> (MockTransport, Client) {
        let transport = MockTransport::new();
        let client = Client::new(transport.clone());
        (transport, client)
    }

    #[test]
    fn test_parse_numeric_id() {
        assert_eq!(parse_numeric_id("user", " 42 ").unwrap(), 42);
        let err = parse_numeric_id("user", "abc").unwrap_err();
        assert!(err.to_string().contains("numeric user id"));
    }

    #[test]
    fn test_split_pair() {
        assert_eq!(split_pair("default:production", "p", "e").unwrap(), ("default", "production"));
        assert!(split_pair("default", "p", "e").is_err());
        assert!(split_pair(":production", "p", "e").is_err());
    }

    #[test]
    fn test_reconcile_timestamp() {
        let declared = Some("2031-06-30T12:00:00+02:00");
        assert_eq!(
            reconcile_timestamp(declared, Some("2031-06-30T10:00:00.000Z".into())).as_deref(),
            declared
        );
        assert_eq!(
            reconcile_timestamp(declared, Some("2031-07-01T10:00:00.000Z".into())).as_deref(),
            Some("2031-07-01T10:00:00Z")
        );
        assert_eq!(reconcile_timestamp(declared, None), None);
        assert_eq!(
            reconcile_timestamp(None, Some("2032-01-01T00:00:00.500Z".into())).as_deref(),
            Some("2032-01-01T00:00:00.500Z")
        );
        assert_eq!(
            reconcile_timestamp(
                Some("2032-01-01T00:00:00.5Z"),
                Some("2032-01-01T00:00:00.500Z".into())
            )
            .as_deref(),
            Some("2032-01-01T00:00:00.5Z")
        );
    }

    #[test]
    fn test_register_all_kinds() {
        let (_, client) = mock_client();
        let mut registry = Registry::new();
        register(&mut registry, &client);
        assert_eq!(registry.resources().count(), 13);
        assert!(registry.resource("unleash_project_access").is_some());
    }
}
