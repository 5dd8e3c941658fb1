//! unleash_role - custom root and project roles

use super::rest::{Call, RestDescriptor};
use super::{non_empty, parse_numeric_id};
use declarative::{Attribute, AttributeType, OpResult, ReadOutcome, Schema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use unleash_client::client::admin;
use unleash_client::types::{PermissionRef, Role, RoleEnvelope, UpsertRole};
use unleash_client::{ApiRequest, ApiResponse, Client, Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RolePermission {
    pub name: String,
    #[serde(default)]
    pub environment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleModel {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(rename = "type")]
    pub role_type: String,
    pub description: String,
    #[serde(default)]
    pub permissions: Option<BTreeSet<RolePermission>>,
}

impl RoleModel {
    fn require_id(&self) -> Result<i64> {
        self.id
            .ok_or_else(|| Error::validation("id", "Missing role id", "The tracked role has no id"))
    }

    fn payload(&self) -> UpsertRole {
        UpsertRole {
            name: self.name.clone(),
            role_type: self.role_type.clone(),
            description: Some(self.description.clone()).into(),
            permissions: self
                .permissions
                .iter()
                .flatten()
                .map(|p| PermissionRef {
                    name: p.name.clone(),
                    environment: p.environment.clone().into(),
                })
                .collect(),
        }
    }
}

pub struct Roles;

impl RestDescriptor for Roles {
    type Model = RoleModel;
    type Remote = Role;

    fn type_name(&self) -> &'static str {
        "unleash_role"
    }

    fn schema(&self) -> Schema {
        Schema::new("A custom role")
            .with_attribute(Attribute::computed("id", AttributeType::Int, "The id of the role."))
            .with_attribute(Attribute::required("name", AttributeType::String, "The name of the role."))
            .with_attribute(Attribute::required(
                "type",
                AttributeType::String,
                "The type of the role: root-custom or custom.",
            ))
            .with_attribute(Attribute::required(
                "description",
                AttributeType::String,
                "The description of the role.",
            ))
            .with_attribute(Attribute::optional(
                "permissions",
                AttributeType::set_of(AttributeType::Object(vec![
                    Attribute::required("name", AttributeType::String, "Permission name."),
                    Attribute::optional(
                        "environment",
                        AttributeType::String,
                        "Environment the permission applies to.",
                    ),
                ])),
                "Permissions granted by the role.",
            ))
    }

    fn id(&self, model: &RoleModel) -> String {
        model.id.map(|id| id.to_string()).unwrap_or_default()
    }

    fn normalize(&self, model: RoleModel) -> RoleModel {
        RoleModel {
            permissions: non_empty(model.permissions),
            ..model
        }
    }

    fn skeleton(&self, id: &str) -> Option<OpResult<RoleModel>> {
        Some(parse_numeric_id("role", id).map(|id| RoleModel {
            id: Some(id),
            name: String::new(),
            role_type: String::new(),
            description: String::new(),
            permissions: None,
        }))
    }

    fn create(&self, planned: &RoleModel) -> Result<Call> {
        let request = ApiRequest::post(admin("/roles")).json(&planned.payload())?;
        Ok(Call::new(request, &[200]))
    }

    // The create response omits permissions, so the role is read back by id.
    fn identify(&self, planned: &RoleModel, response: &ApiResponse) -> Result<RoleModel> {
        let envelope: RoleEnvelope = response.json()?;
        Ok(RoleModel {
            id: Some(envelope.roles.id),
            ..planned.clone()
        })
    }

    fn carry_identity(&self, prior: &RoleModel, planned: RoleModel) -> RoleModel {
        RoleModel {
            id: prior.id,
            ..planned
        }
    }

    fn update(&self, _prior: &RoleModel, planned: &RoleModel) -> Result<Call> {
        let id = planned.require_id()?;
        let request = ApiRequest::put(admin(format!("/roles/{id}"))).json(&planned.payload())?;
        Ok(Call::new(request, &[200]))
    }

    fn delete(&self, current: &RoleModel) -> Result<Call> {
        let id = current.require_id()?;
        Ok(Call::new(ApiRequest::delete(admin(format!("/roles/{id}"))), &[200]))
    }

    fn fetch(&self, client: &Client, current: &RoleModel) -> Result<ReadOutcome<Role>> {
        let id = current.require_id()?;
        client.fetch(ApiRequest::get(admin(format!("/roles/{id}"))), &[200])
    }

    fn hydrate(&self, remote: Role, _basis: &RoleModel) -> Result<RoleModel> {
        let permissions = remote
            .permissions
            .into_iter()
            .map(|p| RolePermission {
                name: p.name,
                environment: p.environment.into_option(),
            })
            .collect();
        Ok(RoleModel {
            id: Some(remote.id),
            name: remote.name,
            role_type: remote.role_type,
            description: remote.description.into_option().unwrap_or_default(),
            permissions: non_empty(Some(permissions)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::RestResource;
    use crate::resource::tests::mock_client;
    use declarative::Resource;
    use serde_json::json;
    use unleash_client::Method;

    fn declared() -> RoleModel {
        RoleModel {
            id: None,
            name: "release-manager".into(),
            role_type: "custom".into(),
            description: "Ships releases".into(),
            permissions: Some(BTreeSet::from([
                RolePermission {
                    name: "UPDATE_FEATURE_ENVIRONMENT".into(),
                    environment: Some("production".into()),
                },
                RolePermission {
                    name: "CREATE_FEATURE".into(),
                    environment: None,
                },
            ])),
        }
    }

    fn remote_role() -> serde_json::Value {
        json!({
            "id": 9,
            "name": "release-manager",
            "type": "custom",
            "description": "Ships releases",
            "permissions": [
                {"id": 1, "name": "CREATE_FEATURE"},
                {"id": 2, "name": "UPDATE_FEATURE_ENVIRONMENT", "environment": "production"}
            ]
        })
    }

    #[test]
    fn test_create_reads_back_permissions() {
        let (mock, client) = mock_client();
        mock.respond(
            Method::Post,
            "/api/admin/roles",
            200,
            json!({"roles": {"id": 9, "name": "release-manager", "type": "custom"}}),
        )
        .respond(Method::Get, "/api/admin/roles/9", 200, remote_role());
        let resource = RestResource::new(client, Roles);

        let created = resource.create(&declared()).unwrap();
        assert_eq!(
            created,
            RoleModel {
                id: Some(9),
                ..declared()
            }
        );
        assert_eq!(mock.requests_to(Method::Get, "/api/admin/roles/9").len(), 1);

        let body = mock.last_body(Method::Post, "/api/admin/roles").unwrap();
        assert_eq!(
            body["permissions"],
            json!([
                {"name": "CREATE_FEATURE"},
                {"name": "UPDATE_FEATURE_ENVIRONMENT", "environment": "production"}
            ])
        );
    }

    #[test]
    fn test_empty_permissions_hydrate_to_unset() {
        let (mock, client) = mock_client();
        mock.respond(
            Method::Get,
            "/api/admin/roles/9",
            200,
            json!({"id": 9, "name": "viewer", "type": "root-custom", "description": "", "permissions": []}),
        );
        let resource = RestResource::new(client, Roles);
        let tracked = RoleModel {
            id: Some(9),
            ..declared()
        };

        let read = resource.read(&tracked).unwrap().found().unwrap();
        assert_eq!(read.permissions, None);
    }

    #[test]
    fn test_read_missing_is_gone() {
        let (mock, client) = mock_client();
        mock.respond(Method::Get, "/api/admin/roles/9", 404, json!({}));
        let resource = RestResource::new(client, Roles);
        let tracked = RoleModel {
            id: Some(9),
            ..declared()
        };
        assert_eq!(resource.read(&tracked).unwrap(), ReadOutcome::Gone);
    }
}
