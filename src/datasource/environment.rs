//! unleash_environment lookup by name

use super::require_found;
use declarative::{Attribute, AttributeType, DataSource, OpResult, Schema};
use serde::{Deserialize, Serialize};
use unleash_client::client::admin;
use unleash_client::types::Environment;
use unleash_client::{ApiRequest, Client};

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentQuery {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub environment_type: String,
    pub enabled: bool,
}

pub struct EnvironmentLookup {
    client: Client,
}

impl EnvironmentLookup {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl DataSource for EnvironmentLookup {
    type Query = EnvironmentQuery;
    type Model = EnvironmentRecord;

    fn type_name(&self) -> &'static str {
        "unleash_environment"
    }

    fn schema(&self) -> Schema {
        Schema::new("Fetch an environment.")
            .with_attribute(Attribute::required(
                "name",
                AttributeType::String,
                "The name of the environment.",
            ))
            .with_attribute(Attribute::computed(
                "type",
                AttributeType::String,
                "The type of the environment.",
            ))
            .with_attribute(Attribute::computed(
                "enabled",
                AttributeType::Bool,
                "Whether the environment is enabled.",
            ))
    }

    fn read(&self, query: &EnvironmentQuery) -> OpResult<EnvironmentRecord> {
        let outcome = self.client.fetch(
            ApiRequest::get(admin(format!("/environments/{}", query.name))),
            &[200],
        )?;
        let environment: Environment = require_found(outcome, "Environment", &query.name)?;
        Ok(EnvironmentRecord {
            name: environment.name,
            environment_type: environment.environment_type,
            enabled: environment.enabled.into_option().unwrap_or(true),
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
    fn test_lookup() {
        let (mock, client) = mock_client();
        mock.respond(
            Method::Get,
            "/api/admin/environments/staging",
            200,
            json!({"name": "staging", "type": "test", "enabled": false}),
        );
        let lookup = EnvironmentLookup::new(client);

        let found = lookup.read(&EnvironmentQuery { name: "staging".into() }).unwrap();
        assert_eq!(found.environment_type, "test");
        assert!(!found.enabled);
    }
}
