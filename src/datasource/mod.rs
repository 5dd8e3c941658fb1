//! Read-only lookups of existing Unleash entities
//!
//! A lookup that matches nothing is an error, never an empty record.

use declarative::{Diagnostic, OpResult, ReadOutcome, Registry};
use unleash_client::Client;

pub mod context_field;
pub mod environment;
pub mod permission;
pub mod project;
pub mod project_environment;
pub mod role;
pub mod service_account;
pub mod user;

/// Register every lookup kind against one client
pub fn register(registry: &mut Registry, client: &Client) {
    registry.register_data_source(context_field::ContextFieldLookup::new(client.clone()));
    registry.register_data_source(environment::EnvironmentLookup::new(client.clone()));
    registry.register_data_source(permission::PermissionLookup::new(client.clone()));
    registry.register_data_source(project::ProjectLookup::new(client.clone()));
    registry.register_data_source(project_environment::ProjectEnvironmentLookup::new(
        client.clone(),
    ));
    registry.register_data_source(role::RoleLookup::new(client.clone()));
    registry.register_data_source(service_account::ServiceAccountLookup::new(client.clone()));
    registry.register_data_source(user::UserLookup::new(client.clone()));
}

/// Turn a vanished lookup target into an error
pub fn require_found<T>(outcome: ReadOutcome<T>, kind: &str, key: &str) -> OpResult<T> {
    match outcome {
        ReadOutcome::Found(value) => Ok(value),
        ReadOutcome::Gone => Err(Diagnostic::error(
            format!("{kind} not found"),
            format!("No {} matched '{key}'", kind.to_lowercase()),
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::tests::mock_client;

    #[test]
    fn test_require_found() {
        assert_eq!(require_found(ReadOutcome::Found(3), "Role", "admin").unwrap(), 3);
        let err = require_found::<i64>(ReadOutcome::Gone, "Role", "admin").unwrap_err();
        let error = err.errors().next().unwrap();
        assert_eq!(error.summary, "Role not found");
        assert_eq!(error.detail, "No role matched 'admin'");
    }

    #[test]
    fn test_register_all_lookups() {
        let (_, client) = mock_client();
        let mut registry = Registry::new();
        register(&mut registry, &client);
        assert_eq!(registry.data_sources().count(), 8);
        assert!(registry.data_source("unleash_permission").is_some());
    }
}
