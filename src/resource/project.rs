//! unleash_project - projects and their enterprise settings
//!
//! A project spans two endpoints: the project itself (name, description)
//! and its settings (mode, feature naming, link templates). The list
//! endpoint is the only read and does not echo naming or link templates,
//! so those keep their tracked values.

use declarative::{
    Attribute, AttributeType, DeleteOutcome, Diagnostic, Diagnostics, OpResult, ReadOutcome,
    Resource, Schema, find_by_key,
};
use serde::{Deserialize, Serialize};
use unleash_client::client::admin;
use unleash_client::types::{
    CreateProject, FeatureNaming, LinkTemplate, Project, ProjectList, ProjectSettings,
    UpdateProject,
};
use unleash_client::{ApiRequest, Client, Field, Result};

const MODES: [&str; 3] = ["open", "protected", "private"];
const DEFAULT_MODE: &str = "open";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureNamingModel {
    pub pattern: String,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkTemplateModel {
    #[serde(default)]
    pub title: Option<String>,
    pub url_template: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectModel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub feature_naming: Option<FeatureNamingModel>,
    #[serde(default)]
    pub link_templates: Option<Vec<LinkTemplateModel>>,
}

impl ProjectModel {
    fn resolved_mode(&self) -> &str {
        self.mode
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODE)
    }

    fn settings(&self) -> ProjectSettings {
        ProjectSettings {
            mode: Field::Present(self.resolved_mode().to_string()),
            feature_naming: self
                .feature_naming
                .as_ref()
                .map(|naming| FeatureNaming {
                    pattern: naming.pattern.clone(),
                    example: Field::nullable(naming.example.clone()),
                    description: Field::nullable(naming.description.clone()),
                })
                .into(),
            link_templates: self
                .link_templates
                .as_ref()
                .map(|templates| {
                    templates
                        .iter()
                        .map(|t| LinkTemplate {
                            title: Field::nullable(t.title.clone()),
                            url_template: t.url_template.clone(),
                        })
                        .collect()
                })
                .into(),
        }
    }
}

/// List every project and pick one by id
pub fn find_project(client: &Client, id: &str) -> Result<ReadOutcome<Project>> {
    let list: ProjectList = match client.fetch(ApiRequest::get(admin("/projects")), &[200])? {
        ReadOutcome::Found(list) => list,
        ReadOutcome::Gone => return Ok(ReadOutcome::Gone),
    };
    Ok(match find_by_key(list.projects, id, |p| p.id == id) {
        Some(project) => ReadOutcome::Found(project),
        None => ReadOutcome::Gone,
    })
}

pub struct ProjectResource {
    client: Client,
}

impl ProjectResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn put_settings(&self, planned: &ProjectModel) -> Result<()> {
        let request = ApiRequest::put(admin(format!("/projects/{}/settings", planned.id)))
            .json(&planned.settings())?;
        self.client.expect(request, &[200])?;
        Ok(())
    }

    fn read_back(&self, planned: &ProjectModel) -> OpResult<ProjectModel> {
        match find_project(&self.client, &planned.id)? {
            ReadOutcome::Found(project) => Ok(hydrate(project, planned)),
            ReadOutcome::Gone => Err(Diagnostic::error(
                "Unable to read unleash_project after writing it",
                format!("Project {} was not found right after it was written", planned.id),
            )
            .into()),
        }
    }
}

fn hydrate(remote: Project, basis: &ProjectModel) -> ProjectModel {
    ProjectModel {
        id: remote.id,
        name: remote.name,
        description: remote.description.into_option(),
        mode: Some(
            remote
                .mode
                .into_option()
                .unwrap_or_else(|| DEFAULT_MODE.to_string()),
        ),
        feature_naming: basis.feature_naming.clone(),
        link_templates: basis.link_templates.clone(),
    }
}

impl Resource for ProjectResource {
    type Model = ProjectModel;

    fn type_name(&self) -> &'static str {
        "unleash_project"
    }

    fn schema(&self) -> Schema {
        Schema::new("A project")
            .with_attribute(
                Attribute::required("id", AttributeType::String, "The id of the project.")
                    .replace_on_change(),
            )
            .with_attribute(Attribute::required("name", AttributeType::String, "The name of the project."))
            .with_attribute(Attribute::optional(
                "description",
                AttributeType::String,
                "A description of the project's purpose.",
            ))
            .with_attribute(Attribute::optional_computed(
                "mode",
                AttributeType::String,
                "The project's collaboration mode: open, protected or private. Defaults to open.",
            ))
            .with_attribute(Attribute::optional(
                "feature_naming",
                AttributeType::Object(vec![
                    Attribute::required(
                        "pattern",
                        AttributeType::String,
                        "A JavaScript regular expression feature names must match.",
                    ),
                    Attribute::optional("example", AttributeType::String, "A matching example."),
                    Attribute::optional(
                        "description",
                        AttributeType::String,
                        "A description of the pattern.",
                    ),
                ]),
                "Naming convention enforced on the project's flags.",
            ))
            .with_attribute(Attribute::optional(
                "link_templates",
                AttributeType::list_of(AttributeType::Object(vec![
                    Attribute::optional("title", AttributeType::String, "Link title."),
                    Attribute::required(
                        "url_template",
                        AttributeType::String,
                        "URL with {{project}} and {{feature}} placeholders.",
                    ),
                ])),
                "Links added to every flag in the project.",
            ))
    }

    fn id(&self, model: &ProjectModel) -> String {
        model.id.clone()
    }

    fn validate(&self, planned: &ProjectModel) -> Diagnostics {
        let mut diags = Diagnostics::new();

        if let Some(mode) = planned.mode.as_deref()
            && !mode.is_empty()
            && !MODES.contains(&mode)
        {
            diags.add_attribute_error(
                "mode",
                "Invalid project mode",
                format!(
                    "project mode must be unset or set to 'open', 'protected' or 'private'. Got: '{mode}'"
                ),
            );
        }

        if let Some(naming) = &planned.feature_naming
            && naming.pattern.is_empty()
        {
            diags.add_attribute_error(
                "feature_naming.pattern",
                "Invalid feature_naming.pattern",
                "feature_naming.pattern must be provided and cannot be empty",
            );
        }

        for (i, template) in planned.link_templates.iter().flatten().enumerate() {
            if template.url_template.is_empty() {
                diags.add_attribute_error(
                    format!("link_templates[{i}].url_template"),
                    "Invalid link_templates url",
                    format!("link_templates[{i}].url_template must be provided and cannot be empty"),
                );
            }
        }

        diags
    }

    fn create(&self, planned: &ProjectModel) -> OpResult<ProjectModel> {
        let request = ApiRequest::post(admin("/projects")).json(&CreateProject {
            id: planned.id.clone(),
            name: planned.name.clone(),
            description: planned.description.clone().into(),
            mode: Field::Absent,
        })?;
        self.client.expect(request, &[201])?;
        self.put_settings(planned)?;
        self.read_back(planned)
    }

    fn read(&self, current: &ProjectModel) -> OpResult<ReadOutcome<ProjectModel>> {
        Ok(find_project(&self.client, &current.id)?.map(|project| hydrate(project, current)))
    }

    fn update(&self, _prior: &ProjectModel, planned: &ProjectModel) -> OpResult<ProjectModel> {
        self.put_settings(planned)?;
        let request = ApiRequest::put(admin(format!("/projects/{}", planned.id))).json(
            &UpdateProject {
                name: planned.name.clone(),
                description: planned.description.clone().into(),
            },
        )?;
        self.client.expect(request, &[200])?;
        self.read_back(planned)
    }

    fn delete(&self, current: &ProjectModel) -> OpResult<DeleteOutcome> {
        self.client.expect_read(
            ApiRequest::delete(admin(format!("/projects/{}", current.id))),
            &[200],
        )?;
        Ok(DeleteOutcome::Deleted)
    }

    fn import_skeleton(&self, id: &str) -> OpResult<ProjectModel> {
        Ok(ProjectModel {
            id: id.to_string(),
            name: String::new(),
            description: None,
            mode: None,
            feature_naming: None,
            link_templates: None,
        })
    }
}
