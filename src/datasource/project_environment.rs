//! unleash_project_environment lookup of change-request settings

use super::require_found;
use crate::resource::project_environment::change_request_configs;
use declarative::{Attribute, AttributeType, DataSource, OpResult, Schema};
use serde::{Deserialize, Serialize};
use unleash_client::Client;

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectEnvironmentQuery {
    pub project_id: String,
    pub environment_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectEnvironmentRecord {
    pub project_id: String,
    pub environment_name: String,
    /// Whether the environment is attached to the project
    pub enabled: bool,
    pub change_requests_enabled: bool,
    pub required_approvals: Option<i64>,
}

pub struct ProjectEnvironmentLookup {
    client: Client,
}

impl ProjectEnvironmentLookup {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl DataSource for ProjectEnvironmentLookup {
    type Query = ProjectEnvironmentQuery;
    type Model = ProjectEnvironmentRecord;

    fn type_name(&self) -> &'static str {
        "unleash_project_environment"
    }

    fn schema(&self) -> Schema {
        Schema::new("Fetch the change-request settings of an environment in a project.")
            .with_attribute(Attribute::required("project_id", AttributeType::String, "The project id."))
            .with_attribute(Attribute::required(
                "environment_name",
                AttributeType::String,
                "The environment name.",
            ))
            .with_attribute(Attribute::computed(
                "enabled",
                AttributeType::Bool,
                "Whether the environment is enabled in the project.",
            ))
            .with_attribute(Attribute::computed(
                "change_requests_enabled",
                AttributeType::Bool,
                "Whether changes need a change request.",
            ))
            .with_attribute(Attribute::computed(
                "required_approvals",
                AttributeType::Int,
                "Approvals needed before a change request can be applied.",
            ))
    }

    fn read(&self, query: &ProjectEnvironmentQuery) -> OpResult<ProjectEnvironmentRecord> {
        let configs = require_found(
            change_request_configs(&self.client, &query.project_id)?,
            "Project",
            &query.project_id,
        )?;
        let config = configs
            .into_iter()
            .find(|c| c.environment == query.environment_name);

        let mut record = ProjectEnvironmentRecord {
            project_id: query.project_id.clone(),
            environment_name: query.environment_name.clone(),
            enabled: false,
            change_requests_enabled: false,
            required_approvals: None,
        };
        if let Some(config) = config {
            record.enabled = true;
            record.change_requests_enabled = config.change_request_enabled;
            record.required_approvals = config.required_approvals.into_option();
        }
        Ok(record)
    }
}
