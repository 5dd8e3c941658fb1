//! unleash_environment - global environments

use super::rest::{Call, RestDescriptor};
use declarative::{Attribute, AttributeType, OpResult, ReadOutcome, Schema};
use serde::{Deserialize, Serialize};
use unleash_client::client::admin;
use unleash_client::types::{CreateEnvironment, Environment, UpdateEnvironment};
use unleash_client::{ApiRequest, Client, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentModel {
    pub name: String,
    #[serde(rename = "type")]
    pub environment_type: String,
}

pub struct Environments;

impl RestDescriptor for Environments {
    type Model = EnvironmentModel;
    type Remote = Environment;

    fn type_name(&self) -> &'static str {
        "unleash_environment"
    }

    fn schema(&self) -> Schema {
        Schema::new("An environment available to every project")
            .with_attribute(
                Attribute::required("name", AttributeType::String, "The name of the environment.")
                    .replace_on_change(),
            )
            .with_attribute(Attribute::required(
                "type",
                AttributeType::String,
                "The type of the environment, e.g. development or production.",
            ))
    }

    fn id(&self, model: &EnvironmentModel) -> String {
        model.name.clone()
    }

    fn skeleton(&self, id: &str) -> Option<OpResult<EnvironmentModel>> {
        Some(Ok(EnvironmentModel {
            name: id.to_string(),
            environment_type: String::new(),
        }))
    }

    fn create(&self, planned: &EnvironmentModel) -> Result<Call> {
        let request = ApiRequest::post(admin("/environments")).json(&CreateEnvironment {
            name: planned.name.clone(),
            environment_type: planned.environment_type.clone(),
        })?;
        Ok(Call::new(request, &[201]))
    }

    fn create_returns_object(&self) -> bool {
        true
    }

    fn carry_identity(&self, _prior: &EnvironmentModel, planned: EnvironmentModel) -> EnvironmentModel {
        planned
    }

    fn update(&self, _prior: &EnvironmentModel, planned: &EnvironmentModel) -> Result<Call> {
        let request = ApiRequest::put(admin(format!("/environments/update/{}", planned.name)))
            .json(&UpdateEnvironment {
                environment_type: planned.environment_type.clone(),
            })?;
        Ok(Call::new(request, &[200]))
    }

    fn delete(&self, current: &EnvironmentModel) -> Result<Call> {
        Ok(Call::new(
            ApiRequest::delete(admin(format!("/environments/{}", current.name))),
            &[200],
        ))
    }

    fn fetch(&self, client: &Client, current: &EnvironmentModel) -> Result<ReadOutcome<Environment>> {
        client.fetch(
            ApiRequest::get(admin(format!("/environments/{}", current.name))),
            &[200],
        )
    }

    fn hydrate(&self, remote: Environment, _basis: &EnvironmentModel) -> Result<EnvironmentModel> {
        Ok(EnvironmentModel {
            name: remote.name,
            environment_type: remote.environment_type,
        })
    }
}
