//! unleash_project_access - role membership within a project
//!
//! The server keeps membership per user and group; the record keeps it per
//! role. Deleting only forgets the record.

use declarative::{
    Attribute, AttributeType, DeleteOutcome, Diagnostic, OpResult, ReadOutcome, Resource, Schema,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use unleash_client::client::admin;
use unleash_client::types::{ProjectAccess, ProjectAccessConfig, RoleMembers};
use unleash_client::{ApiRequest, Client, Result};

const NOT_DELETED: &str = "The projectAccess resource was removed from state, but not deleted \
from the actual system. This is to avoid potential mistakes. Instead of deleting projectAccess \
you may just delete the whole project";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleWithMembers {
    pub role: i64,
    #[serde(default)]
    pub users: BTreeSet<i64>,
    #[serde(default)]
    pub groups: BTreeSet<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAccessModel {
    pub project: String,
    pub roles: BTreeSet<RoleWithMembers>,
}

pub struct ProjectAccessResource {
    client: Client,
}

impl ProjectAccessResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn path(project: &str) -> String {
        admin(format!("/projects/{project}/access"))
    }

    fn upsert(&self, planned: &ProjectAccessModel) -> OpResult<ProjectAccessModel> {
        let roles = planned
            .roles
            .iter()
            .map(|r| {
                log::debug!(
                    "Role {} gets users {:?} and groups {:?}",
                    r.role,
                    r.users,
                    r.groups
                );
                RoleMembers {
                    id: r.role,
                    users: r.users.iter().copied().collect(),
                    groups: r.groups.iter().copied().collect(),
                }
            })
            .collect();
        let request =
            ApiRequest::put(Self::path(&planned.project)).json(&ProjectAccessConfig { roles })?;
        self.client.expect(request, &[200])?;

        match self.fetch(&planned.project)? {
            ReadOutcome::Found(model) => Ok(model),
            ReadOutcome::Gone => Err(Diagnostic::error(
                "Unable to read unleash_project_access after writing it",
                format!("Project {} was not found", planned.project),
            )
            .into()),
        }
    }

    fn fetch(&self, project: &str) -> Result<ReadOutcome<ProjectAccessModel>> {
        let access: ReadOutcome<ProjectAccess> =
            self.client.fetch(ApiRequest::get(Self::path(project)), &[200])?;
        Ok(access.map(|access| ProjectAccessModel {
            project: project.to_string(),
            roles: by_role(access),
        }))
    }
}

/// Pivot per-member role lists into per-role member sets, dropping roles nobody holds
fn by_role(access: ProjectAccess) -> BTreeSet<RoleWithMembers> {
    let mut users: BTreeMap<i64, BTreeSet<i64>> = BTreeMap::new();
    let mut groups: BTreeMap<i64, BTreeSet<i64>> = BTreeMap::new();

    for user in access.users {
        for role in user.roles {
            users.entry(role).or_default().insert(user.id);
        }
    }
    for group in access.groups {
        for role in group.roles {
            groups.entry(role).or_default().insert(group.id);
        }
    }

    access
        .roles
        .into_iter()
        .map(|role| RoleWithMembers {
            role: role.id,
            users: users.remove(&role.id).unwrap_or_default(),
            groups: groups.remove(&role.id).unwrap_or_default(),
        })
        .filter(|r| !r.users.is_empty() || !r.groups.is_empty())
        .collect()
}

impl Resource for ProjectAccessResource {
    type Model = ProjectAccessModel;

    fn type_name(&self) -> &'static str {
        "unleash_project_access"
    }

    fn schema(&self) -> Schema {
        Schema::new("Role membership of users and groups within a project")
            .with_attribute(
                Attribute::required("project", AttributeType::String, "The project id.")
                    .replace_on_change(),
            )
            .with_attribute(Attribute::required(
                "roles",
                AttributeType::set_of(AttributeType::Object(vec![
                    Attribute::required("role", AttributeType::Int, "Role id."),
                    Attribute::optional(
                        "users",
                        AttributeType::set_of(AttributeType::Int),
                        "Users holding the role.",
                    ),
                    Attribute::optional(
                        "groups",
                        AttributeType::set_of(AttributeType::Int),
                        "Groups holding the role.",
                    ),
                ])),
                "Roles and their members.",
            ))
    }

    fn id(&self, model: &ProjectAccessModel) -> String {
        model.project.clone()
    }

    fn create(&self, planned: &ProjectAccessModel) -> OpResult<ProjectAccessModel> {
        self.upsert(planned)
    }

    fn read(&self, current: &ProjectAccessModel) -> OpResult<ReadOutcome<ProjectAccessModel>> {
        Ok(self.fetch(&current.project)?)
    }

    fn update(
        &self,
        _prior: &ProjectAccessModel,
        planned: &ProjectAccessModel,
    ) -> OpResult<ProjectAccessModel> {
        self.upsert(planned)
    }

    fn delete(&self, current: &ProjectAccessModel) -> OpResult<DeleteOutcome> {
        log::debug!("Leaving access of project {} in place", current.project);
        Ok(DeleteOutcome::Forgotten {
            reason: NOT_DELETED.to_string(),
        })
    }

    fn import_skeleton(&self, id: &str) -> OpResult<ProjectAccessModel> {
        Ok(ProjectAccessModel {
            project: id.to_string(),
            roles: BTreeSet::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::tests::mock_client;
    use serde_json::json;
    use unleash_client::Method;

    fn access() -> serde_json::Value {
        json!({
            "roles": [
                {"id": 4, "name": "Owner"},
                {"id": 5, "name": "Member"},
                {"id": 6, "name": "Unused"}
            ],
            "users": [
                {"id": 1, "roles": [4]},
                {"id": 2, "roles": [4, 5]}
            ],
            "groups": [
                {"id": 30, "roles": [5]}
            ]
        })
    }

    fn declared() -> ProjectAccessModel {
        ProjectAccessModel {
            project: "payments".into(),
            roles: BTreeSet::from([
                RoleWithMembers {
                    role: 4,
                    users: BTreeSet::from([1, 2]),
                    groups: BTreeSet::new(),
                },
                RoleWithMembers {
                    role: 5,
                    users: BTreeSet::from([2]),
                    groups: BTreeSet::from([30]),
                },
            ]),
        }
    }

    #[test]
    fn test_read_pivots_and_drops_empty_roles() {
        let (mock, client) = mock_client();
        mock.respond(Method::Get, "/api/admin/projects/payments/access", 200, access());
        let resource = ProjectAccessResource::new(client);

        let read = resource.read(&declared()).unwrap().found().unwrap();
        assert_eq!(read, declared());
    }

    #[test]
    fn test_create_sends_members_per_role() {
        let (mock, client) = mock_client();
        mock.respond_empty(Method::Put, "/api/admin/projects/payments/access", 200)
            .respond(Method::Get, "/api/admin/projects/payments/access", 200, access());
        let resource = ProjectAccessResource::new(client);

        assert_eq!(resource.create(&declared()).unwrap(), declared());
        assert_eq!(
            mock.last_body(Method::Put, "/api/admin/projects/payments/access"),
            Some(json!({"roles": [
                {"id": 4, "users": [1, 2], "groups": []},
                {"id": 5, "users": [2], "groups": [30]}
            ]}))
        );
    }

    #[test]
    fn test_delete_only_forgets() {
        let (mock, client) = mock_client();
        let resource = ProjectAccessResource::new(client);

        let outcome = resource.delete(&declared()).unwrap();
        assert!(matches!(outcome, DeleteOutcome::Forgotten { .. }));
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_missing_project_is_gone() {
        let (mock, client) = mock_client();
        mock.respond(Method::Get, "/api/admin/projects/payments/access", 404, json!({}));
        let resource = ProjectAccessResource::new(client);
        assert_eq!(resource.read(&declared()).unwrap(), ReadOutcome::Gone);
    }
}
