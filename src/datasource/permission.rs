//! unleash_permission lookup by name
//!
//! Permissions live in three tiers: root, project, and one list per
//! environment. Environment-scoped permissions are only found when the
//! environment is named.

use declarative::{
    Attribute, AttributeType, DataSource, Diagnostic, OpResult, Schema, find_in_tiers,
};
use serde::{Deserialize, Serialize};
use unleash_client::client::admin;
use unleash_client::types::{Permission, PermissionList};
use unleash_client::{ApiRequest, Client};

#[derive(Debug, Clone, Deserialize)]
pub struct PermissionQuery {
    pub name: String,
    #[serde(default)]
    pub environment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PermissionRecord {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub permission_type: String,
    pub environment: Option<String>,
}

impl From<&Permission> for PermissionRecord {
    fn from(permission: &Permission) -> Self {
        Self {
            id: permission.id,
            name: permission.name.clone(),
            display_name: permission.display_name.clone(),
            permission_type: permission.permission_type.clone(),
            environment: permission.environment.as_option().cloned(),
        }
    }
}

pub struct PermissionLookup {
    client: Client,
}

impl PermissionLookup {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl DataSource for PermissionLookup {
    type Query = PermissionQuery;
    type Model = PermissionRecord;

    fn type_name(&self) -> &'static str {
        "unleash_permission"
    }

    fn schema(&self) -> Schema {
        Schema::new("Fetch a permission by name.")
            .with_attribute(Attribute::required(
                "name",
                AttributeType::String,
                "The name of the permission.",
            ))
            .with_attribute(Attribute::optional_computed(
                "environment",
                AttributeType::String,
                "The environment of an environment-scoped permission.",
            ))
            .with_attribute(Attribute::computed("id", AttributeType::Int, "The id of the permission."))
            .with_attribute(Attribute::computed(
                "display_name",
                AttributeType::String,
                "Human readable name.",
            ))
            .with_attribute(Attribute::computed(
                "type",
                AttributeType::String,
                "The scope of the permission: root, project or environment.",
            ))
    }

    fn read(&self, query: &PermissionQuery) -> OpResult<PermissionRecord> {
        let list: PermissionList = self
            .client
            .expect_json(ApiRequest::get(admin("/permissions")), &[200])?;
        let tiers = list.permissions;

        let environment = query.environment.as_deref().and_then(|env| {
            tiers
                .environments
                .iter()
                .find(|e| e.name == env)
                .map(|e| e.permissions.as_slice())
        });
        let mut searched = vec![tiers.root.as_slice(), tiers.project.as_slice()];
        searched.extend(environment);

        let found = find_in_tiers(&searched, &query.name, |p| p.name == query.name);
        match found {
            Some(permission) => {
                log::debug!("Found permission {} ({})", permission.name, permission.permission_type);
                Ok(permission.into())
            }
            None => Err(Diagnostic::error(
                "Permission not found",
                format!("Permission {} not found", query.name),
            )
            .at("name")
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::tests::mock_client;
    use serde_json::json;
    use unleash_client::Method;

    fn permissions() -> serde_json::Value {
        json!({"permissions": {
            "root": [{"id": 1, "name": "ADMIN", "displayName": "Admin", "type": "root"}],
            "project": [{"id": 20, "name": "CREATE_FEATURE", "displayName": "Create feature toggles", "type": "project"}],
            "environments": [
                {"name": "development", "permissions": [
                    {"id": 31, "name": "UPDATE_FEATURE_ENVIRONMENT", "displayName": "Enable/disable toggles", "type": "environment", "environment": "development"}
                ]},
                {"name": "production", "permissions": [
                    {"id": 41, "name": "UPDATE_FEATURE_ENVIRONMENT", "displayName": "Enable/disable toggles", "type": "environment", "environment": "production"}
                ]}
            ]
        }})
    }

    fn query(name: &str, environment: Option<&str>) -> PermissionQuery {
        PermissionQuery {
            name: name.to_string(),
            environment: environment.map(str::to_string),
        }
    }

    #[test]
    fn test_environment_permission_needs_qualifier() {
        let (mock, client) = mock_client();
        mock.respond(Method::Get, "/api/admin/permissions", 200, permissions());
        let lookup = PermissionLookup::new(client);

        let found = lookup
            .read(&query("UPDATE_FEATURE_ENVIRONMENT", Some("production")))
            .unwrap();
        assert_eq!(found.id, 41);
        assert_eq!(found.environment.as_deref(), Some("production"));

        let err = lookup
            .read(&query("UPDATE_FEATURE_ENVIRONMENT", None))
            .unwrap_err();
        let error = err.errors().next().unwrap();
        assert_eq!(error.summary, "Permission not found");
        assert_eq!(error.detail, "Permission UPDATE_FEATURE_ENVIRONMENT not found");
    }

    #[test]
    fn test_root_then_project() {
        let (mock, client) = mock_client();
        mock.respond(Method::Get, "/api/admin/permissions", 200, permissions());
        let lookup = PermissionLookup::new(client);

        assert_eq!(lookup.read(&query("ADMIN", None)).unwrap().permission_type, "root");
        let project = lookup.read(&query("CREATE_FEATURE", Some("development"))).unwrap();
        assert_eq!(project.id, 20);
        assert_eq!(project.environment, None);
    }

    #[test]
    fn test_unknown_environment() {
        let (mock, client) = mock_client();
        mock.respond(Method::Get, "/api/admin/permissions", 200, permissions());
        let lookup = PermissionLookup::new(client);
        assert!(
            lookup
                .read(&query("UPDATE_FEATURE_ENVIRONMENT", Some("staging")))
                .is_err()
        );
    }
}
