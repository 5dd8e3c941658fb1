//! unleash_user - admin-managed users

use super::parse_numeric_id;
use super::rest::{Call, RestDescriptor};
use declarative::{Attribute, AttributeType, OpResult, ReadOutcome, Schema};
use serde::{Deserialize, Serialize};
use unleash_client::client::admin;
use unleash_client::types::{CreateUser, UpdateUser, User};
use unleash_client::{ApiRequest, Client, Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserModel {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    pub root_role: i64,
    #[serde(default)]
    pub send_email: Option<bool>,
}

impl UserModel {
    fn require_id(&self) -> Result<i64> {
        self.id
            .ok_or_else(|| Error::validation("id", "Missing user id", "The tracked user has no id"))
    }
}

pub struct Users;

impl RestDescriptor for Users {
    type Model = UserModel;
    type Remote = User;

    fn type_name(&self) -> &'static str {
        "unleash_user"
    }

    fn schema(&self) -> Schema {
        Schema::new("A user of the Unleash instance")
            .with_attribute(Attribute::computed("id", AttributeType::Int, "Identifier of the user."))
            .with_attribute(Attribute::optional("username", AttributeType::String, "The username."))
            .with_attribute(Attribute::optional("email", AttributeType::String, "The email of the user."))
            .with_attribute(Attribute::optional("name", AttributeType::String, "The name of the user."))
            .with_attribute(
                Attribute::optional(
                    "password",
                    AttributeType::String,
                    "The password of the user. Never read back from the server.",
                )
                .sensitive(),
            )
            .with_attribute(Attribute::required(
                "root_role",
                AttributeType::Int,
                "The role id for the user.",
            ))
            .with_attribute(Attribute::optional(
                "send_email",
                AttributeType::Bool,
                "Send a welcome email to the new user. Defaults to false.",
            ))
    }

    fn id(&self, model: &UserModel) -> String {
        model.id.map(|id| id.to_string()).unwrap_or_default()
    }

    fn skeleton(&self, id: &str) -> Option<OpResult<UserModel>> {
        Some(parse_numeric_id("user", id).map(|id| UserModel {
            id: Some(id),
            username: None,
            email: None,
            name: None,
            password: None,
            root_role: 0,
            send_email: None,
        }))
    }

    fn create(&self, planned: &UserModel) -> Result<Call> {
        let request = ApiRequest::post(admin("/user-admin")).json(&CreateUser {
            username: planned.username.clone().into(),
            email: planned.email.clone().into(),
            name: planned.name.clone().into(),
            password: planned.password.clone().into(),
            root_role: planned.root_role,
            send_email: planned.send_email.unwrap_or(false),
        })?;
        Ok(Call::new(request, &[201]))
    }

    fn create_returns_object(&self) -> bool {
        true
    }

    fn carry_identity(&self, prior: &UserModel, planned: UserModel) -> UserModel {
        UserModel {
            id: prior.id,
            ..planned
        }
    }

    fn update(&self, _prior: &UserModel, planned: &UserModel) -> Result<Call> {
        let id = planned.require_id()?;
        let request = ApiRequest::put(admin(format!("/user-admin/{id}"))).json(&UpdateUser {
            name: planned.name.clone().into(),
            email: planned.email.clone().into(),
            root_role: planned.root_role,
        })?;
        Ok(Call::new(request, &[200]))
    }

    fn delete(&self, current: &UserModel) -> Result<Call> {
        let id = current.require_id()?;
        Ok(Call::new(ApiRequest::delete(admin(format!("/user-admin/{id}"))), &[200]))
    }

    fn fetch(&self, client: &Client, current: &UserModel) -> Result<ReadOutcome<User>> {
        let id = current.require_id()?;
        client.fetch(ApiRequest::get(admin(format!("/user-admin/{id}"))), &[200])
    }

    fn hydrate(&self, remote: User, basis: &UserModel) -> Result<UserModel> {
        Ok(UserModel {
            id: Some(remote.id),
            username: remote.username.into_option(),
            email: remote.email.into_option(),
            name: remote.name.into_option(),
            password: basis.password.clone(),
            root_role: remote.root_role.into_option().unwrap_or(basis.root_role),
            send_email: basis.send_email,
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

    fn declared() -> UserModel {
        UserModel {
            id: None,
            username: None,
            email: Some("jane@example.com".into()),
            name: Some("Jane".into()),
            password: Some("s3cret-pass".into()),
            root_role: 2,
            send_email: None,
        }
    }

    #[test]
    fn test_create_keeps_write_only_fields() {
        let (mock, client) = mock_client();
        mock.respond(
            Method::Post,
            "/api/admin/user-admin",
            201,
            json!({"id": 7, "email": "jane@example.com", "name": "Jane", "rootRole": 2}),
        );
        let resource = RestResource::new(client, Users);

        let created = resource.create(&declared()).unwrap();
        assert_eq!(created.id, Some(7));
        assert_eq!(created.password.as_deref(), Some("s3cret-pass"));
        assert_eq!(created.send_email, None);
        assert_eq!(created.username, None);

        let body = mock.last_body(Method::Post, "/api/admin/user-admin").unwrap();
        assert_eq!(body["sendEmail"], json!(false));
        assert_eq!(body["rootRole"], json!(2));
        assert!(body.get("username").is_none());
    }

    #[test]
    fn test_unset_optional_hydrates_to_none() {
        let (mock, client) = mock_client();
        mock.respond(
            Method::Get,
            "/api/admin/user-admin/7",
            200,
            json!({"id": 7, "email": "jane@example.com", "name": null, "rootRole": 2}),
        );
        let resource = RestResource::new(client, Users);
        let tracked = UserModel {
            id: Some(7),
            ..declared()
        };

        let read = resource.read(&tracked).unwrap().found().unwrap();
        assert_eq!(read.name, None);
        assert_eq!(read.username, None);
    }

    #[test]
    fn test_update_sends_identity_from_prior() {
        let (mock, client) = mock_client();
        mock.respond(Method::Put, "/api/admin/user-admin/7", 200, json!({"id": 7}))
            .respond(
                Method::Get,
                "/api/admin/user-admin/7",
                200,
                json!({"id": 7, "email": "jane@example.com", "name": "Jane Doe", "rootRole": 3}),
            );
        let resource = RestResource::new(client, Users);
        let prior = UserModel {
            id: Some(7),
            ..declared()
        };
        let planned = UserModel {
            name: Some("Jane Doe".into()),
            root_role: 3,
            ..declared()
        };

        let updated = resource.update(&prior, &planned).unwrap();
        assert_eq!(updated.id, Some(7));
        assert_eq!(updated.name.as_deref(), Some("Jane Doe"));
        assert_eq!(
            mock.last_body(Method::Put, "/api/admin/user-admin/7"),
            Some(json!({"name": "Jane Doe", "email": "jane@example.com", "rootRole": 3}))
        );
    }

    #[test]
    fn test_import_requires_numeric_id() {
        let (_, client) = mock_client();
        let resource = RestResource::new(client, Users);
        assert!(resource.import_skeleton("jane").is_err());
        assert_eq!(resource.import_skeleton("7").unwrap().id, Some(7));
    }
}
