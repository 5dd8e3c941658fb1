//! unleash_service_account - non-human accounts for automation

use super::parse_numeric_id;
use super::rest::{Call, RestDescriptor};
use declarative::{Attribute, AttributeType, OpResult, ReadOutcome, Schema, find_by_key};
use serde::{Deserialize, Serialize};
use unleash_client::client::admin;
use unleash_client::types::{
    CreateServiceAccount, ServiceAccount, ServiceAccountList, UpdateServiceAccount,
};
use unleash_client::{ApiRequest, Client, Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceAccountModel {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
    pub root_role: i64,
}

impl ServiceAccountModel {
    fn require_id(&self) -> Result<i64> {
        self.id.ok_or_else(|| {
            Error::validation(
                "id",
                "Missing service account id",
                "The tracked service account has no id",
            )
        })
    }
}

/// List every service account and pick one by id
pub fn find_service_account(client: &Client, id: i64) -> Result<ReadOutcome<ServiceAccount>> {
    let list: ServiceAccountList =
        match client.fetch(ApiRequest::get(admin("/service-account")), &[200])? {
            ReadOutcome::Found(list) => list,
            ReadOutcome::Gone => return Ok(ReadOutcome::Gone),
        };
    let key = id.to_string();
    Ok(
        match find_by_key(list.service_accounts, &key, |account| account.id == id) {
            Some(account) => ReadOutcome::Found(account),
            None => ReadOutcome::Gone,
        },
    )
}

pub struct ServiceAccounts;

impl RestDescriptor for ServiceAccounts {
    type Model = ServiceAccountModel;
    type Remote = ServiceAccount;

    fn type_name(&self) -> &'static str {
        "unleash_service_account"
    }

    fn schema(&self) -> Schema {
        Schema::new("A service account")
            .with_attribute(Attribute::computed(
                "id",
                AttributeType::Int,
                "The id of the service account.",
            ))
            .with_attribute(Attribute::required(
                "name",
                AttributeType::String,
                "The name of the service account.",
            ))
            .with_attribute(
                Attribute::optional(
                    "username",
                    AttributeType::String,
                    "The username of the service account.",
                )
                .replace_on_change(),
            )
            .with_attribute(Attribute::required(
                "root_role",
                AttributeType::Int,
                "The root role id of the service account.",
            ))
    }

    fn id(&self, model: &ServiceAccountModel) -> String {
        model.id.map(|id| id.to_string()).unwrap_or_default()
    }

    fn skeleton(&self, id: &str) -> Option<OpResult<ServiceAccountModel>> {
        Some(
            parse_numeric_id("service account", id).map(|id| ServiceAccountModel {
                id: Some(id),
                name: String::new(),
                username: None,
                root_role: 0,
            }),
        )
    }

    fn create(&self, planned: &ServiceAccountModel) -> Result<Call> {
        let request = ApiRequest::post(admin("/service-account")).json(&CreateServiceAccount {
            username: planned.username.clone().into(),
            name: planned.name.clone(),
            root_role: planned.root_role,
        })?;
        Ok(Call::new(request, &[201]))
    }

    fn create_returns_object(&self) -> bool {
        true
    }

    fn carry_identity(
        &self,
        prior: &ServiceAccountModel,
        planned: ServiceAccountModel,
    ) -> ServiceAccountModel {
        ServiceAccountModel {
            id: prior.id,
            ..planned
        }
    }

    fn update(&self, _prior: &ServiceAccountModel, planned: &ServiceAccountModel) -> Result<Call> {
        let id = planned.require_id()?;
        let request = ApiRequest::put(admin(format!("/service-account/{id}"))).json(
            &UpdateServiceAccount {
                name: planned.name.clone(),
                root_role: planned.root_role,
            },
        )?;
        Ok(Call::new(request, &[200]))
    }

    fn delete(&self, current: &ServiceAccountModel) -> Result<Call> {
        let id = current.require_id()?;
        Ok(Call::new(
            ApiRequest::delete(admin(format!("/service-account/{id}"))),
            &[200],
        ))
    }

    fn fetch(
        &self,
        client: &Client,
        current: &ServiceAccountModel,
    ) -> Result<ReadOutcome<ServiceAccount>> {
        find_service_account(client, current.require_id()?)
    }

    fn hydrate(
        &self,
        remote: ServiceAccount,
        basis: &ServiceAccountModel,
    ) -> Result<ServiceAccountModel> {
        Ok(ServiceAccountModel {
            id: Some(remote.id),
            name: remote.name.into_option().unwrap_or_else(|| basis.name.clone()),
            username: remote.username.into_option(),
            root_role: remote.root_role.into_option().unwrap_or(basis.root_role),
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

    fn tracked() -> ServiceAccountModel {
        ServiceAccountModel {
            id: Some(12),
            name: "ci".into(),
            username: Some("ci-bot".into()),
            root_role: 2,
        }
    }

    #[test]
    fn test_create() {
        let (mock, client) = mock_client();
        mock.respond(
            Method::Post,
            "/api/admin/service-account",
            201,
            json!({"id": 12, "name": "ci", "username": "ci-bot", "rootRole": 2}),
        );
        let resource = RestResource::new(client, ServiceAccounts);
        let planned = ServiceAccountModel {
            id: None,
            ..tracked()
        };

        assert_eq!(resource.create(&planned).unwrap(), tracked());
    }

    #[test]
    fn test_read_finds_by_id_in_list() {
        let (mock, client) = mock_client();
        mock.respond(
            Method::Get,
            "/api/admin/service-account",
            200,
            json!({"serviceAccounts": [
                {"id": 3, "name": "other", "rootRole": 1},
                {"id": 12, "name": "ci", "username": "ci-bot", "rootRole": 3}
            ]}),
        );
        let resource = RestResource::new(client, ServiceAccounts);

        let read = resource.read(&tracked()).unwrap().found().unwrap();
        assert_eq!(read.root_role, 3);
    }

    #[test]
    fn test_read_missing_from_list_is_gone() {
        let (mock, client) = mock_client();
        mock.respond(
            Method::Get,
            "/api/admin/service-account",
            200,
            json!({"serviceAccounts": []}),
        );
        let resource = RestResource::new(client, ServiceAccounts);
        assert_eq!(resource.read(&tracked()).unwrap(), ReadOutcome::Gone);
    }

    #[test]
    fn test_update_payload() {
        let (mock, client) = mock_client();
        mock.respond(Method::Put, "/api/admin/service-account/12", 200, json!({}))
            .respond(
                Method::Get,
                "/api/admin/service-account",
                200,
                json!({"serviceAccounts": [{"id": 12, "name": "ci-renamed", "username": "ci-bot", "rootRole": 2}]}),
            );
        let resource = RestResource::new(client, ServiceAccounts);
        let planned = ServiceAccountModel {
            id: None,
            name: "ci-renamed".into(),
            ..tracked()
        };

        let updated = resource.update(&tracked(), &planned).unwrap();
        assert_eq!(updated.id, Some(12));
        assert_eq!(
            mock.last_body(Method::Put, "/api/admin/service-account/12"),
            Some(json!({"name": "ci-renamed", "rootRole": 2}))
        );
    }
}
