//! unleash_group - user groups with SSO mappings

use super::rest::{Call, RestDescriptor};
use super::{non_empty, parse_numeric_id};
use declarative::{Attribute, AttributeType, OpResult, ReadOutcome, Schema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use unleash_client::client::admin;
use unleash_client::types::{Group, GroupUser, UpsertGroup, UserRef};
use unleash_client::{ApiRequest, ApiResponse, Client, Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupModel {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub mappings_sso: Option<BTreeSet<String>>,
    #[serde(default)]
    pub root_role: Option<i64>,
    #[serde(default)]
    pub users: Option<BTreeSet<i64>>,
}

impl GroupModel {
    fn require_id(&self) -> Result<i64> {
        self.id
            .ok_or_else(|| Error::validation("id", "Missing group id", "The tracked group has no id"))
    }

    fn payload(&self) -> UpsertGroup {
        UpsertGroup {
            name: self.name.clone(),
            description: self.description.clone().into(),
            mappings_sso: self.mappings_sso.iter().flatten().cloned().collect(),
            root_role: self.root_role.into(),
            users: self
                .users
                .iter()
                .flatten()
                .map(|&id| GroupUser { user: UserRef { id } })
                .collect(),
        }
    }
}

pub struct Groups;

impl RestDescriptor for Groups {
    type Model = GroupModel;
    type Remote = Group;

    fn type_name(&self) -> &'static str {
        "unleash_group"
    }

    fn schema(&self) -> Schema {
        Schema::new("A group of users")
            .with_attribute(Attribute::computed("id", AttributeType::Int, "The id of the group."))
            .with_attribute(Attribute::required("name", AttributeType::String, "The name of the group."))
            .with_attribute(Attribute::optional(
                "description",
                AttributeType::String,
                "The description of the group.",
            ))
            .with_attribute(Attribute::optional(
                "mappings_sso",
                AttributeType::set_of(AttributeType::String),
                "SSO group names mapped onto this group.",
            ))
            .with_attribute(Attribute::optional(
                "root_role",
                AttributeType::Int,
                "Root role granted to every member.",
            ))
            .with_attribute(Attribute::optional(
                "users",
                AttributeType::set_of(AttributeType::Int),
                "Ids of the users in the group.",
            ))
    }

    fn id(&self, model: &GroupModel) -> String {
        model.id.map(|id| id.to_string()).unwrap_or_default()
    }

    fn normalize(&self, model: GroupModel) -> GroupModel {
        GroupModel {
            mappings_sso: non_empty(model.mappings_sso),
            users: non_empty(model.users),
            ..model
        }
    }

    fn skeleton(&self, id: &str) -> Option<OpResult<GroupModel>> {
        Some(parse_numeric_id("group", id).map(|id| GroupModel {
            id: Some(id),
            name: String::new(),
            description: None,
            mappings_sso: None,
            root_role: None,
            users: None,
        }))
    }

    fn create(&self, planned: &GroupModel) -> Result<Call> {
        let request = ApiRequest::post(admin("/groups")).json(&planned.payload())?;
        Ok(Call::new(request, &[201]))
    }

    // Membership is missing from the create response.
    fn identify(&self, planned: &GroupModel, response: &ApiResponse) -> Result<GroupModel> {
        let group: Group = response.json()?;
        Ok(GroupModel {
            id: Some(group.id),
            ..planned.clone()
        })
    }

    fn carry_identity(&self, prior: &GroupModel, planned: GroupModel) -> GroupModel {
        GroupModel {
            id: prior.id,
            ..planned
        }
    }

    fn update(&self, _prior: &GroupModel, planned: &GroupModel) -> Result<Call> {
        let id = planned.require_id()?;
        let request = ApiRequest::put(admin(format!("/groups/{id}"))).json(&planned.payload())?;
        Ok(Call::new(request, &[200]))
    }

    fn delete(&self, current: &GroupModel) -> Result<Call> {
        let id = current.require_id()?;
        Ok(Call::new(ApiRequest::delete(admin(format!("/groups/{id}"))), &[200]))
    }

    fn fetch(&self, client: &Client, current: &GroupModel) -> Result<ReadOutcome<Group>> {
        let id = current.require_id()?;
        client.fetch(ApiRequest::get(admin(format!("/groups/{id}"))), &[200])
    }

    fn hydrate(&self, remote: Group, _basis: &GroupModel) -> Result<GroupModel> {
        Ok(GroupModel {
            id: Some(remote.id),
            name: remote.name,
            description: remote.description.into_option(),
            mappings_sso: non_empty(
                remote
                    .mappings_sso
                    .into_option()
                    .map(|m| m.into_iter().collect()),
            ),
            root_role: remote.root_role.into_option(),
            users: non_empty(
                remote
                    .users
                    .into_option()
                    .map(|users| users.into_iter().map(|u| u.user.id).collect()),
            ),
        })
    }
}
