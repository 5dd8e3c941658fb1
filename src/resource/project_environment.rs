//! unleash_project_environment - an environment attached to a project, with
//! its change-request settings

use super::split_pair;
use declarative::{
    Attribute, AttributeType, DeleteOutcome, Diagnostics, OpResult, ReadOutcome, Resource, Schema,
};
use serde::{Deserialize, Serialize};
use unleash_client::client::admin;
use unleash_client::types::{AttachEnvironment, ChangeRequestConfig, UpdateChangeRequestConfig};
use unleash_client::{ApiRequest, Client, Field, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectEnvironmentModel {
    pub project_id: String,
    pub environment_name: String,
    #[serde(default)]
    pub change_requests_enabled: Option<bool>,
    #[serde(default)]
    pub required_approvals: Option<i64>,
}

impl ProjectEnvironmentModel {
    fn with_config(&self, config: Option<ChangeRequestConfig>) -> Self {
        let (enabled, approvals) = match config {
            Some(config) => (
                config.change_request_enabled,
                config.required_approvals.into_option(),
            ),
            None => (false, None),
        };
        Self {
            change_requests_enabled: Some(enabled),
            required_approvals: approvals,
            ..self.clone()
        }
    }
}

/// Change-request settings of every environment in a project
pub fn change_request_configs(
    client: &Client,
    project: &str,
) -> Result<ReadOutcome<Vec<ChangeRequestConfig>>> {
    client.fetch(
        ApiRequest::get(admin(format!("/projects/{project}/change-requests/config"))),
        &[200],
    )
}

fn config_path(project: &str, environment: &str) -> String {
    admin(format!(
        "/projects/{project}/environments/{environment}/change-requests/config"
    ))
}

pub struct ProjectEnvironmentResource {
    client: Client,
}

impl ProjectEnvironmentResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn configure(&self, planned: &ProjectEnvironmentModel) -> OpResult<ProjectEnvironmentModel> {
        let project = &planned.project_id;
        let environment = &planned.environment_name;
        let enabled = planned.change_requests_enabled.unwrap_or(false);
        log::debug!(
            "Configuring environment {environment} in project {project} with change requests enabled {enabled}"
        );

        let attach = ApiRequest::post(admin(format!("/projects/{project}/environments")))
            .json(&AttachEnvironment {
                environment: environment.clone(),
            })?;
        self.client.expect(attach, &[200, 409])?;

        let settings = ApiRequest::put(config_path(project, environment)).json(
            &UpdateChangeRequestConfig {
                change_requests_enabled: enabled,
                required_approvals: planned.required_approvals.into(),
            },
        )?;
        self.client.expect(settings, &[204, 409])?;

        let configs: Vec<ChangeRequestConfig> = self.client.expect_json(
            ApiRequest::get(admin(format!("/projects/{project}/change-requests/config"))),
            &[200],
        )?;
        let config = configs.into_iter().find(|c| &c.environment == environment);
        Ok(planned.with_config(config))
    }
}

impl Resource for ProjectEnvironmentResource {
    type Model = ProjectEnvironmentModel;

    fn type_name(&self) -> &'static str {
        "unleash_project_environment"
    }

    fn schema(&self) -> Schema {
        Schema::new("An environment enabled in a project, with change-request settings")
            .with_attribute(
                Attribute::required("project_id", AttributeType::String, "The project id.")
                    .replace_on_change(),
            )
            .with_attribute(
                Attribute::required(
                    "environment_name",
                    AttributeType::String,
                    "The environment name.",
                )
                .replace_on_change(),
            )
            .with_attribute(Attribute::optional_computed(
                "change_requests_enabled",
                AttributeType::Bool,
                "Whether changes in this environment need a change request.",
            ))
            .with_attribute(Attribute::optional_computed(
                "required_approvals",
                AttributeType::Int,
                "Approvals needed before a change request can be applied, 1 to 10.",
            ))
    }

    fn id(&self, model: &ProjectEnvironmentModel) -> String {
        format!("{}:{}", model.project_id, model.environment_name)
    }

    fn validate(&self, planned: &ProjectEnvironmentModel) -> Diagnostics {
        let mut diags = Diagnostics::new();
        if let Some(n) = planned.required_approvals
            && !(1..=10).contains(&n)
        {
            diags.add_attribute_error(
                "required_approvals",
                "Invalid required_approvals",
                format!("The required_approvals attribute must be between 1 and 10, but got: {n}"),
            );
        }
        diags
    }

    fn create(&self, planned: &ProjectEnvironmentModel) -> OpResult<ProjectEnvironmentModel> {
        self.configure(planned)
    }

    fn read(
        &self,
        current: &ProjectEnvironmentModel,
    ) -> OpResult<ReadOutcome<ProjectEnvironmentModel>> {
        let configs = match change_request_configs(&self.client, &current.project_id)? {
            ReadOutcome::Found(configs) => configs,
            ReadOutcome::Gone => return Ok(ReadOutcome::Gone),
        };
        match configs
            .into_iter()
            .find(|c| c.environment == current.environment_name)
        {
            Some(config) => Ok(ReadOutcome::Found(current.with_config(Some(config)))),
            None => {
                log::warn!(
                    "Environment {} not found in project {}",
                    current.environment_name,
                    current.project_id
                );
                Ok(ReadOutcome::Gone)
            }
        }
    }

    fn update(
        &self,
        _prior: &ProjectEnvironmentModel,
        planned: &ProjectEnvironmentModel,
    ) -> OpResult<ProjectEnvironmentModel> {
        self.configure(planned)
    }

    fn delete(&self, current: &ProjectEnvironmentModel) -> OpResult<DeleteOutcome> {
        let project = &current.project_id;
        let environment = &current.environment_name;

        let disable = ApiRequest::put(config_path(project, environment)).json(
            &UpdateChangeRequestConfig {
                change_requests_enabled: false,
                required_approvals: Field::Present(0),
            },
        )?;
        self.client.expect(disable, &[204])?;

        self.client.expect_read(
            ApiRequest::delete(admin(format!(
                "/projects/{project}/environments/{environment}"
            ))),
            &[200],
        )?;
        Ok(DeleteOutcome::Deleted)
    }

    fn import_skeleton(&self, id: &str) -> OpResult<ProjectEnvironmentModel> {
        let (project, environment) = split_pair(id, "project_id", "environment_name")?;
        Ok(ProjectEnvironmentModel {
            project_id: project.to_string(),
            environment_name: environment.to_string(),
            change_requests_enabled: None,
            required_approvals: None,
        })
    }
}
