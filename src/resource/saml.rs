//! unleash_saml - the instance-wide SAML sign-on settings

use declarative::{Attribute, AttributeType, DeleteOutcome, OpResult, ReadOutcome, Resource, Schema};
use serde::{Deserialize, Serialize};
use unleash_client::client::admin;
use unleash_client::types::SamlSettings;
use unleash_client::{ApiRequest, Client, Field, Result};

const SINGLETON_ID: &str = "saml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamlModel {
    pub enabled: bool,
    #[serde(default)]
    pub certificate: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub sign_on_url: Option<String>,
    #[serde(default)]
    pub auto_create: Option<bool>,
    #[serde(default)]
    pub default_root_role: Option<i64>,
}

pub struct SamlResource {
    client: Client,
}

impl SamlResource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn settings(&self) -> Result<SamlSettings> {
        self.client
            .expect_json(ApiRequest::get(admin("/auth/saml/settings")), &[200])
    }

    fn post(&self, settings: &SamlSettings) -> Result<()> {
        let request = ApiRequest::post(admin("/auth/saml/settings")).json(settings)?;
        self.client.expect(request, &[200])?;
        Ok(())
    }

    fn upsert(&self, planned: &SamlModel, prior: Option<&SamlModel>) -> OpResult<SamlModel> {
        let remote = self.settings()?;

        let settings = SamlSettings {
            enabled: planned.enabled,
            entity_id: backfill(
                &planned.entity_id,
                remote.entity_id.into_option(),
                prior.and_then(|p| p.entity_id.clone()),
            ),
            sign_on_url: backfill(
                &planned.sign_on_url,
                remote.sign_on_url.into_option(),
                prior.and_then(|p| p.sign_on_url.clone()),
            ),
            certificate: backfill(
                &planned.certificate,
                remote.certificate.into_option(),
                prior.and_then(|p| p.certificate.clone()),
            ),
            auto_create: backfill(
                &planned.auto_create,
                remote.auto_create.into_option(),
                prior.and_then(|p| p.auto_create),
            ),
            default_root_role_id: backfill(
                &planned.default_root_role,
                remote.default_root_role_id.into_option(),
                prior.and_then(|p| p.default_root_role),
            ),
        };
        self.post(&settings)?;

        Ok(hydrate(self.settings()?))
    }
}

fn backfill<T: Clone>(
    declared: &Option<T>,
    remote: Option<T>,
    tracked: Option<T>,
) -> Field<T> {
    declared.clone().or(remote).or(tracked).into()
}

fn hydrate(remote: SamlSettings) -> SamlModel {
    SamlModel {
        enabled: remote.enabled,
        certificate: remote.certificate.into_option(),
        entity_id: remote.entity_id.into_option(),
        sign_on_url: remote.sign_on_url.into_option(),
        auto_create: Some(remote.auto_create.into_option().unwrap_or(false)),
        default_root_role: remote.default_root_role_id.into_option(),
    }
}

impl Resource for SamlResource {
    type Model = SamlModel;

    fn type_name(&self) -> &'static str {
        "unleash_saml"
    }

    fn schema(&self) -> Schema {
        Schema::new("SAML sign-on settings")
            .with_attribute(Attribute::required(
                "enabled",
                AttributeType::Bool,
                "Whether SAML sign-on is enabled.",
            ))
            .with_attribute(
                Attribute::optional(
                    "certificate",
                    AttributeType::String,
                    "The identity provider's X.509 certificate.",
                )
                .sensitive(),
            )
            .with_attribute(Attribute::optional(
                "entity_id",
                AttributeType::String,
                "The identity provider's entity id.",
            ))
            .with_attribute(Attribute::optional(
                "sign_on_url",
                AttributeType::String,
                "The identity provider's sign-on URL.",
            ))
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

    fn id(&self, _model: &SamlModel) -> String {
        SINGLETON_ID.to_string()
    }

    fn create(&self, planned: &SamlModel) -> OpResult<SamlModel> {
        self.upsert(planned, None)
    }

    fn read(&self, _current: &SamlModel) -> OpResult<ReadOutcome<SamlModel>> {
        let remote = self.settings()?;
        if !remote.enabled {
            log::warn!("SAML is not enabled");
            return Ok(ReadOutcome::Gone);
        }
        Ok(ReadOutcome::Found(hydrate(remote)))
    }

    fn update(&self, prior: &SamlModel, planned: &SamlModel) -> OpResult<SamlModel> {
        self.upsert(planned, Some(prior))
    }

    fn delete(&self, _current: &SamlModel) -> OpResult<DeleteOutcome> {
        let current = self.settings()?;
        self.post(&SamlSettings {
            enabled: false,
            ..current
        })?;
        Ok(DeleteOutcome::Deleted)
    }

    fn import_skeleton(&self, _id: &str) -> OpResult<SamlModel> {
        Ok(SamlModel {
            enabled: true,
            certificate: None,
            entity_id: None,
            sign_on_url: None,
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

    const SETTINGS: &str = "/api/admin/auth/saml/settings";

    fn declared() -> SamlModel {
        SamlModel {
            enabled: true,
            certificate: Some("MIIC...".into()),
            entity_id: Some("https://idp.example.com".into()),
            sign_on_url: None,
            auto_create: None,
            default_root_role: None,
        }
    }

    #[test]
    fn test_upsert_backfills_from_server() {
        let (mock, client) = mock_client();
        mock.respond(
            Method::Get,
            SETTINGS,
            200,
            json!({"enabled": false, "signOnUrl": "https://idp.example.com/sso", "autoCreate": true}),
        )
        .respond(
            Method::Get,
            SETTINGS,
            200,
            json!({
                "enabled": true,
                "certificate": "MIIC...",
                "entityId": "https://idp.example.com",
                "signOnUrl": "https://idp.example.com/sso",
                "autoCreate": true
            }),
        )
        .respond_empty(Method::Post, SETTINGS, 200);
        let resource = SamlResource::new(client);

        let created = resource.create(&declared()).unwrap();
        assert_eq!(created.sign_on_url.as_deref(), Some("https://idp.example.com/sso"));
        assert_eq!(created.auto_create, Some(true));
        assert_eq!(
            mock.last_body(Method::Post, SETTINGS),
            Some(json!({
                "enabled": true,
                "entityId": "https://idp.example.com",
                "signOnUrl": "https://idp.example.com/sso",
                "certificate": "MIIC...",
                "autoCreate": true
            }))
        );
    }

    #[test]
    fn test_partial_update_falls_back_to_tracked() {
        let (mock, client) = mock_client();
        mock.respond(Method::Get, SETTINGS, 200, json!({"enabled": true}))
            .respond_empty(Method::Post, SETTINGS, 200);
        let resource = SamlResource::new(client);
        let prior = SamlModel {
            sign_on_url: Some("https://idp.example.com/sso".into()),
            auto_create: Some(true),
            ..declared()
        };
        let planned = SamlModel {
            enabled: false,
            ..declared()
        };

        resource.update(&prior, &planned).unwrap();
        let body = mock.last_body(Method::Post, SETTINGS).unwrap();
        assert_eq!(body["enabled"], json!(false));
        assert_eq!(body["signOnUrl"], json!("https://idp.example.com/sso"));
        assert_eq!(body["autoCreate"], json!(true));
    }

    #[test]
    fn test_disabled_remotely_is_gone() {
        let (mock, client) = mock_client();
        mock.respond(Method::Get, SETTINGS, 200, json!({"enabled": false}));
        let resource = SamlResource::new(client);
        assert_eq!(resource.read(&declared()).unwrap(), ReadOutcome::Gone);
    }

    #[test]
    fn test_delete_disables_current_settings() {
        let (mock, client) = mock_client();
        mock.respond(
            Method::Get,
            SETTINGS,
            200,
            json!({"enabled": true, "entityId": "https://idp.example.com"}),
        )
        .respond_empty(Method::Post, SETTINGS, 200);
        let resource = SamlResource::new(client);

        resource.delete(&declared()).unwrap();
        assert_eq!(
            mock.last_body(Method::Post, SETTINGS),
            Some(json!({"enabled": false, "entityId": "https://idp.example.com"}))
        );
    }
}
