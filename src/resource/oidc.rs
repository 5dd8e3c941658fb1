//! unleash_oidc - the instance-wide OpenID Connect sign-on settings
//!
//! Singleton record. The settings endpoint accepts the whole object only,
//! so undeclared values are backfilled from what the server holds.

use declarative::{Attribute, AttributeType, DeleteOutcome, OpResult, ReadOutcome, Resource, Schema};
use serde::{Deserialize, Serialize};
use unleash_client::client::admin;
use unleash_client::types::OidcSettings;
use unleash_client::{ApiRequest, Client, Field, Result};

const SINGLETON_ID: &str = "oidc";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OidcModel {
    pub enabled: bool,
    #[serde(default)]
    pub discover_url: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    pub secret: String,
    #[serde(default)]
    pub auto_create: Option<bool>,
    #[serde(default)]
    pub default_root_role: Option<i64>,
}

pub struct OidcResource {
    client: Client,
}

impl OidcResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn settings(&self) -> Result<OidcSettings> {
        self.client
            .expect_json(ApiRequest::get(admin("/auth/oidc/settings")), &[200])
    }

    fn post(&self, settings: &OidcSettings) -> Result<()> {
        let request = ApiRequest::post(admin("/auth/oidc/settings")).json(settings)?;
        self.client.expect(request, &[200])?;
        Ok(())
    }

    fn upsert(&self, planned: &OidcModel, prior: Option<&OidcModel>) -> OpResult<OidcModel> {
        let remote = self.settings()?;

        // declared, then what the server holds, then the tracked value
        let settings = OidcSettings {
            enabled: planned.enabled,
            discover_url: planned
                .discover_url
                .clone()
                .or_else(|| remote.discover_url.clone().into_option())
                .or_else(|| prior.and_then(|p| p.discover_url.clone()))
                .into(),
            client_id: planned
                .client_id
                .clone()
                .or_else(|| remote.client_id.clone().into_option())
                .or_else(|| prior.and_then(|p| p.client_id.clone()))
                .into(),
            secret: Field::Present(planned.secret.clone()),
            auto_create: planned
                .auto_create
                .or(remote.auto_create.into_option())
                .or(prior.and_then(|p| p.auto_create))
                .into(),
            default_root_role_id: planned
                .default_root_role
                .or(remote.default_root_role_id.into_option())
                .or(prior.and_then(|p| p.default_root_role))
                .into(),
        };
        self.post(&settings)?;

        Ok(hydrate(self.settings()?, planned))
    }
}

fn hydrate(remote: OidcSettings, basis: &OidcModel) -> OidcModel {
    OidcModel {
        enabled: remote.enabled,
        discover_url: remote.discover_url.into_option(),
        client_id: remote.client_id.into_option(),
        secret: remote
            .secret
            .into_option()
            .unwrap_or_else(|| basis.secret.clone()),
        auto_create: Some(remote.auto_create.into_option().unwrap_or(false)),
        default_root_role: remote.default_root_role_id.into_option(),
    }
}

impl Resource for OidcResource {
    type Model = OidcModel;

    fn type_name(&self) -> &'static str {
        "unleash_oidc"
    }

    fn schema(&self) -> Schema {
        Schema::new("OpenID Connect sign-on settings")
            .with_attribute(Attribute::required(
                "enabled",
                AttributeType::Bool,
                "Whether OIDC sign-on is enabled.",
            ))
            .with_attribute(Attribute::optional(
                "discover_url",
                AttributeType::String,
                "The OIDC discovery URL.",
            ))
            .with_attribute(Attribute::optional(
                "client_id",
                AttributeType::String,
                "The OIDC client id.",
            ))
            .with_attribute(
                Attribute::required("secret", AttributeType::String, "The OIDC client secret.")
                    .sensitive(),
            )
            .with_attribute(Attribute::optional_computed(
                "auto_create",
                AttributeType::Bool,
                "Create users on first sign-on.",
            ))
            .with_attribute(Attribute::optional_computed(
                "default_root_role",
                AttributeType::Int,
                "Root role of users created on sign-on.",
            ))
    }

    fn id(&self, _model: &OidcModel) -> String {
        SINGLETON_ID.to_string()
    }

    fn create(&self, planned: &OidcModel) -> OpResult<OidcModel> {
        self.upsert(planned, None)
    }

    fn read(&self, current: &OidcModel) -> OpResult<ReadOutcome<OidcModel>> {
        Ok(ReadOutcome::Found(hydrate(self.settings()?, current)))
    }

    fn update(&self, prior: &OidcModel, planned: &OidcModel) -> OpResult<OidcModel> {
        self.upsert(planned, Some(prior))
    }

    // Older servers reject empty strings for these two fields.
    fn delete(&self, _current: &OidcModel) -> OpResult<DeleteOutcome> {
        self.post(&OidcSettings {
            enabled: false,
            client_id: Field::Present(" ".to_string()),
            secret: Field::Present(" ".to_string()),
            ..OidcSettings::default()
        })?;
        Ok(DeleteOutcome::Deleted)
    }

    fn import_skeleton(&self, _id: &str) -> OpResult<OidcModel> {
        Ok(OidcModel {
            enabled: false,
            discover_url: None,
            client_id: None,
            secret: String::new(),
            auto_create: None,
            default_root_role: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::tests::mock_client;
    use serde_json::json;
    use unleash_client::Method;

    const SETTINGS: &str = "/api/admin/auth/oidc/settings";

    fn declared() -> OidcModel {
        OidcModel {
            enabled: true,
            discover_url: Some("https://idp.example.com/.well-known/openid-configuration".into()),
            client_id: Some("unleash".into()),
            secret: "s3cret".into(),
            auto_create: None,
            default_root_role: None,
        }
    }

    #[test]
    fn test_undeclared_values_keep_remote_setting() {
        let (mock, client) = mock_client();
        mock.respond(
            Method::Get,
            SETTINGS,
            200,
            json!({"enabled": false, "autoCreate": true, "defaultRootRoleId": 3}),
        )
        .respond(
            Method::Get,
            SETTINGS,
            200,
            json!({
                "enabled": true,
                "discoverUrl": "https://idp.example.com/.well-known/openid-configuration",
                "clientId": "unleash",
                "secret": "s3cret",
                "autoCreate": true,
                "defaultRootRoleId": 3
            }),
        )
        .respond_empty(Method::Post, SETTINGS, 200);
        let resource = OidcResource::new(client);

        let created = resource.create(&declared()).unwrap();
        assert_eq!(created.auto_create, Some(true));
        assert_eq!(created.default_root_role, Some(3));

        let body = mock.last_body(Method::Post, SETTINGS).unwrap();
        assert_eq!(body["autoCreate"], json!(true));
        assert_eq!(body["defaultRootRoleId"], json!(3));
        assert_eq!(body["secret"], json!("s3cret"));
        assert_eq!(mock.requests_to(Method::Get, SETTINGS).len(), 2);
    }

    #[test]
    fn test_declared_values_win() {
        let (mock, client) = mock_client();
        mock.respond(Method::Get, SETTINGS, 200, json!({"enabled": true, "autoCreate": true}))
            .respond_empty(Method::Post, SETTINGS, 200);
        let resource = OidcResource::new(client);
        let planned = OidcModel {
            auto_create: Some(false),
            ..declared()
        };

        resource.create(&planned).unwrap();
        let body = mock.last_body(Method::Post, SETTINGS).unwrap();
        assert_eq!(body["autoCreate"], json!(false));
    }

    #[test]
    fn test_partial_update_keeps_auto_create() {
        let prior = OidcModel {
            auto_create: Some(true),
            default_root_role: Some(3),
            ..declared()
        };
        let planned = OidcModel {
            enabled: false,
            ..declared()
        };

        // Server still holds the value
        let (mock, client) = mock_client();
        mock.respond(Method::Get, SETTINGS, 200, json!({"enabled": true, "autoCreate": true}))
            .respond_empty(Method::Post, SETTINGS, 200);
        OidcResource::new(client).update(&prior, &planned).unwrap();
        let body = mock.last_body(Method::Post, SETTINGS).unwrap();
        assert_eq!(body["enabled"], json!(false));
        assert_eq!(body["autoCreate"], json!(true));

        // Server omits it, so the tracked value is used
        let (mock, client) = mock_client();
        mock.respond(Method::Get, SETTINGS, 200, json!({"enabled": true}))
            .respond_empty(Method::Post, SETTINGS, 200);
        OidcResource::new(client).update(&prior, &planned).unwrap();
        let body = mock.last_body(Method::Post, SETTINGS).unwrap();
        assert_eq!(body["autoCreate"], json!(true));
        assert_eq!(body["defaultRootRoleId"], json!(3));
    }

    #[test]
    fn test_delete_clears_credentials() {
        let (mock, client) = mock_client();
        mock.respond_empty(Method::Post, SETTINGS, 200);
        let resource = OidcResource::new(client);

        assert_eq!(resource.delete(&declared()).unwrap(), DeleteOutcome::Deleted);
        assert_eq!(
            mock.last_body(Method::Post, SETTINGS),
            Some(json!({"enabled": false, "clientId": " ", "secret": " "}))
        );
    }

    #[test]
    fn test_read_keeps_secret_when_masked() {
        let (mock, client) = mock_client();
        mock.respond(Method::Get, SETTINGS, 200, json!({"enabled": true, "clientId": "unleash"}));
        let resource = OidcResource::new(client);

        let read = resource.read(&declared()).unwrap().found().unwrap();
        assert_eq!(read.secret, "s3cret");
        assert_eq!(read.auto_create, Some(false));
        assert_eq!(read.discover_url, None);
    }
}
