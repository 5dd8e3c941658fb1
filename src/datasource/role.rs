//! unleash_role lookup by name

use declarative::{
    Attribute, AttributeType, DataSource, Diagnostic, OpResult, Schema, find_by_key,
};
use serde::{Deserialize, Serialize};
use unleash_client::client::admin;
use unleash_client::types::RoleList;
use unleash_client::{ApiRequest, Client};

#[derive(Debug, Clone, Deserialize)]
pub struct RoleQuery {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleRecord {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub role_type: String,
    pub description: Option<String>,
}

pub struct RoleLookup {
    client: Client,
}

impl RoleLookup {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl DataSource for RoleLookup {
    type Query = RoleQuery;
    type Model = RoleRecord;

    fn type_name(&self) -> &'static str {
        "unleash_role"
    }

    fn schema(&self) -> Schema {
        Schema::new("Fetch a role by name.")
            .with_attribute(Attribute::required("name", AttributeType::String, "The name of the role."))
            .with_attribute(Attribute::computed("id", AttributeType::Int, "The id of the role."))
            .with_attribute(Attribute::computed("type", AttributeType::String, "The type of the role."))
            .with_attribute(Attribute::computed(
                "description",
                AttributeType::String,
                "The description of the role.",
            ))
    }

    fn read(&self, query: &RoleQuery) -> OpResult<RoleRecord> {
        let list: RoleList = self
            .client
            .expect_json(ApiRequest::get(admin("/roles")), &[200])?;
        let role = find_by_key(list.roles, &query.name, |r| r.name == query.name).ok_or_else(|| {
            Diagnostic::error("Role not found", format!("No role named '{}'", query.name))
        })?;
        Ok(RoleRecord {
            id: role.id,
            name: role.name,
            role_type: role.role_type,
            description: role.description.into_option(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::tests::mock_client;
    use serde_json::json;
    use unleash_client::Method;

    #[test]
    fn test_first_match_wins() {
        let (mock, client) = mock_client();
        mock.respond(
            Method::Get,
            "/api/admin/roles",
            200,
            json!({"roles": [
                {"id": 1, "name": "Admin", "type": "root"},
                {"id": 5, "name": "Member", "type": "project", "description": "Users"},
                {"id": 9, "name": "Member", "type": "custom"}
            ]}),
        );
        let lookup = RoleLookup::new(client);

        let found = lookup.read(&RoleQuery { name: "Member".into() }).unwrap();
        assert_eq!(found.id, 5);
        assert_eq!(found.description.as_deref(), Some("Users"));
        assert!(lookup.read(&RoleQuery { name: "Owner".into() }).is_err());
    }
}
