//! Provider assembly: one client shared by every entity kind

use crate::{datasource, resource};
use declarative::Registry;
use unleash_client::Client;

/// Registry of every resource and data source, bound to `client`
pub fn registry(client: &Client) -> Registry {
    let mut registry = Registry::new();
    resource::register(&mut registry, client);
    datasource::register(&mut registry, client);
    registry
}

/// Registry for schema inspection; its client is never called
pub fn offline_registry() -> Registry {
    registry(&Client::http("http://localhost:4242", String::new()))
}
