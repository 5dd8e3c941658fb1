//! unleash_service_account lookup by id

use super::require_found;
use crate::resource::parse_numeric_id;
use crate::resource::service_account::find_service_account;
use declarative::{Attribute, AttributeType, DataSource, OpResult, Schema};
use serde::{Deserialize, Serialize};
use unleash_client::Client;

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountQuery {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceAccountRecord {
    pub id: String,
    pub name: Option<String>,
    pub username: Option<String>,
    pub root_role: Option<i64>,
}

pub struct ServiceAccountLookup {
    client: Client,
}

impl ServiceAccountLookup {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl DataSource for ServiceAccountLookup {
    type Query = ServiceAccountQuery;
    type Model = ServiceAccountRecord;

    fn type_name(&self) -> &'static str {
        "unleash_service_account"
    }

    fn schema(&self) -> Schema {
        Schema::new("Fetch a service account.")
            .with_attribute(Attribute::required(
                "id",
                AttributeType::String,
                "The id of the service account.",
            ))
            .with_attribute(Attribute::computed("name", AttributeType::String, "The name."))
            .with_attribute(Attribute::computed("username", AttributeType::String, "The username."))
            .with_attribute(Attribute::computed("root_role", AttributeType::Int, "The root role id."))
    }

    fn read(&self, query: &ServiceAccountQuery) -> OpResult<ServiceAccountRecord> {
        let id = parse_numeric_id("service account", &query.id)?;
        let account = require_found(
            find_service_account(&self.client, id)?,
            "Service account",
            &query.id,
        )?;
        Ok(ServiceAccountRecord {
            id: account.id.to_string(),
            name: account.name.into_option(),
            username: account.username.into_option(),
            root_role: account.root_role.into_option(),
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
    fn test_lookup_by_id() {
        let (mock, client) = mock_client();
        mock.respond(
            Method::Get,
            "/api/admin/service-account",
            200,
            json!({"serviceAccounts": [{"id": 12, "name": "ci", "username": "ci-bot", "rootRole": 2}]}),
        );
        let lookup = ServiceAccountLookup::new(client);

        let found = lookup.read(&ServiceAccountQuery { id: "12".into() }).unwrap();
        assert_eq!(found.username.as_deref(), Some("ci-bot"));

        let err = lookup.read(&ServiceAccountQuery { id: "13".into() }).unwrap_err();
        assert_eq!(err.errors().next().unwrap().detail, "No service account matched '13'");
    }
}
