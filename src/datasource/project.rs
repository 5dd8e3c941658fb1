//! unleash_project lookup by id

use super::require_found;
use crate::resource::project::find_project;
use declarative::{Attribute, AttributeType, DataSource, OpResult, Schema};
use serde::{Deserialize, Serialize};
use unleash_client::Client;

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectQuery {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub mode: Option<String>,
}

pub struct ProjectLookup {
    client: Client,
}

impl ProjectLookup {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl DataSource for ProjectLookup {
    type Query = ProjectQuery;
    type Model = ProjectRecord;

    fn type_name(&self) -> &'static str {
        "unleash_project"
    }

    fn schema(&self) -> Schema {
        Schema::new("Fetch a project.")
            .with_attribute(Attribute::required("id", AttributeType::String, "The id of the project."))
            .with_attribute(Attribute::computed("name", AttributeType::String, "The name of the project."))
            .with_attribute(Attribute::computed(
                "description",
                AttributeType::String,
                "A description of the project's purpose.",
            ))
            .with_attribute(Attribute::computed(
                "mode",
                AttributeType::String,
                "The project's collaboration mode.",
            ))
    }

    fn read(&self, query: &ProjectQuery) -> OpResult<ProjectRecord> {
        let project = require_found(find_project(&self.client, &query.id)?, "Project", &query.id)?;
        Ok(ProjectRecord {
            id: project.id,
            name: project.name,
            description: project.description.into_option(),
            mode: project.mode.into_option(),
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
            "/api/admin/projects",
            200,
            json!({"projects": [{"id": "default", "name": "Default project", "mode": "open"}]}),
        );
        let lookup = ProjectLookup::new(client);

        let found = lookup.read(&ProjectQuery { id: "default".into() }).unwrap();
        assert_eq!(found.name, "Default project");

        let err = lookup.read(&ProjectQuery { id: "payments".into() }).unwrap_err();
        assert_eq!(err.errors().next().unwrap().summary, "Project not found");
    }
}
