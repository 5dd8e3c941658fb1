//! unleash_service_account_token - personal access tokens of service accounts
//!
//! Tokens are immutable: every declared attribute forces a replacement and
//! Update is refused. The secret is only revealed by the create response.

use super::rest::{Call, RestDescriptor};
use super::{parse_numeric_id, reconcile_timestamp, split_pair};
use chrono::DateTime;
use declarative::{
    Attribute, AttributeType, Diagnostic, Diagnostics, OpResult, ReadOutcome, Schema, find_by_key,
};
use serde::{Deserialize, Serialize};
use unleash_client::client::admin;
use unleash_client::types::{CreatePat, Pat, PatList};
use unleash_client::{ApiRequest, ApiResponse, Client, Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceAccountTokenModel {
    #[serde(default)]
    pub id: Option<i64>,
    pub service_account_id: i64,
    pub description: String,
    pub expires_at: String,
    #[serde(default)]
    pub secret: Option<String>,
}

impl ServiceAccountTokenModel {
    fn require_id(&self) -> Result<i64> {
        self.id.ok_or_else(|| {
            Error::validation("id", "Missing token id", "The tracked service account token has no id")
        })
    }

    fn tokens_path(&self) -> String {
        admin(format!("/service-account/{}/token", self.service_account_id))
    }
}

pub struct ServiceAccountTokens;

impl RestDescriptor for ServiceAccountTokens {
    type Model = ServiceAccountTokenModel;
    type Remote = Pat;

    fn type_name(&self) -> &'static str {
        "unleash_service_account_token"
    }

    fn schema(&self) -> Schema {
        Schema::new("A token belonging to a service account")
            .with_attribute(Attribute::computed("id", AttributeType::Int, "The id of the token."))
            .with_attribute(
                Attribute::required(
                    "service_account_id",
                    AttributeType::Int,
                    "The id of the service account owning the token.",
                )
                .replace_on_change(),
            )
            .with_attribute(
                Attribute::required(
                    "description",
                    AttributeType::String,
                    "The description of the token.",
                )
                .replace_on_change(),
            )
            .with_attribute(
                Attribute::required(
                    "expires_at",
                    AttributeType::String,
                    "The expiration date of the token, as an RFC3339 timestamp.",
                )
                .replace_on_change(),
            )
            .with_attribute(
                Attribute::computed("secret", AttributeType::String, "The secret of the token.")
                    .sensitive(),
            )
    }

    fn id(&self, model: &ServiceAccountTokenModel) -> String {
        match model.id {
            Some(id) => format!("{}:{id}", model.service_account_id),
            None => model.service_account_id.to_string(),
        }
    }

    fn validate(&self, planned: &ServiceAccountTokenModel) -> Diagnostics {
        let mut diags = Diagnostics::new();
        if let Err(e) = DateTime::parse_from_rfc3339(&planned.expires_at) {
            diags.push(
                Diagnostic::error(
                    "Failed to create service account token",
                    format!("Failed to parse expiration date: {e}"),
                )
                .at("expires_at"),
            );
        }
        diags
    }

    fn skeleton(&self, id: &str) -> Option<OpResult<ServiceAccountTokenModel>> {
        let parsed = split_pair(id, "service_account_id", "token_id").and_then(|(account, token)| {
            Ok(ServiceAccountTokenModel {
                id: Some(parse_numeric_id("token", token)?),
                service_account_id: parse_numeric_id("service account", account)?,
                description: String::new(),
                expires_at: String::new(),
                secret: None,
            })
        });
        Some(parsed)
    }

    fn create(&self, planned: &ServiceAccountTokenModel) -> Result<Call> {
        let request = ApiRequest::post(planned.tokens_path()).json(&CreatePat {
            description: planned.description.clone(),
            expires_at: planned.expires_at.clone(),
        })?;
        Ok(Call::new(request, &[201]))
    }

    fn create_returns_object(&self) -> bool {
        true
    }

    fn identify(
        &self,
        planned: &ServiceAccountTokenModel,
        response: &ApiResponse,
    ) -> Result<ServiceAccountTokenModel> {
        let pat: Pat = response.json()?;
        if pat.secret.as_option().is_none() {
            return Err(Error::InvalidResponse(
                "Secret was null when token was created, token is not valid".to_string(),
            ));
        }
        Ok(ServiceAccountTokenModel {
            id: Some(pat.id),
            ..planned.clone()
        })
    }

    fn carry_identity(
        &self,
        prior: &ServiceAccountTokenModel,
        planned: ServiceAccountTokenModel,
    ) -> ServiceAccountTokenModel {
        ServiceAccountTokenModel {
            id: prior.id,
            secret: prior.secret.clone(),
            ..planned
        }
    }

    fn update(
        &self,
        _prior: &ServiceAccountTokenModel,
        _planned: &ServiceAccountTokenModel,
    ) -> Result<Call> {
        Err(Error::unsupported(
            "Service account tokens do not support updates",
            "Service account tokens are immutable",
        ))
    }

    fn delete(&self, current: &ServiceAccountTokenModel) -> Result<Call> {
        let id = current.require_id()?;
        Ok(Call::new(
            ApiRequest::delete(format!("{}/{id}", current.tokens_path())),
            &[200],
        ))
    }

    fn fetch(
        &self,
        client: &Client,
        current: &ServiceAccountTokenModel,
    ) -> Result<ReadOutcome<Pat>> {
        let id = current.require_id()?;
        let list: PatList = match client.fetch(ApiRequest::get(current.tokens_path()), &[200])? {
            ReadOutcome::Found(list) => list,
            ReadOutcome::Gone => return Ok(ReadOutcome::Gone),
        };
        Ok(match find_by_key(list.pats, &id.to_string(), |pat| pat.id == id) {
            Some(pat) => ReadOutcome::Found(pat),
            None => ReadOutcome::Gone,
        })
    }

    fn hydrate(
        &self,
        remote: Pat,
        basis: &ServiceAccountTokenModel,
    ) -> Result<ServiceAccountTokenModel> {
        let expires_at =
            reconcile_timestamp(Some(&basis.expires_at), remote.expires_at.into_option())
                .unwrap_or_else(|| basis.expires_at.clone());
        Ok(ServiceAccountTokenModel {
            id: Some(remote.id),
            service_account_id: basis.service_account_id,
            description: remote.description,
            expires_at,
            secret: remote.secret.into_option().or_else(|| basis.secret.clone()),
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

    const PATH: &str = "/api/admin/service-account/12/token";

    fn declared() -> ServiceAccountTokenModel {
        ServiceAccountTokenModel {
            id: None,
            service_account_id: 12,
            description: "deploy".into(),
            expires_at: "2030-01-01T00:00:00Z".into(),
            secret: None,
        }
    }

    #[test]
    fn test_create_captures_secret() {
        let (mock, client) = mock_client();
        mock.respond(
            Method::Post,
            PATH,
            201,
            json!({"id": 4, "description": "deploy", "expiresAt": "2030-01-01T00:00:00.000Z", "secret": "user:abc"}),
        );
        let resource = RestResource::new(client, ServiceAccountTokens);

        let created = resource.create(&declared()).unwrap();
        assert_eq!(created.id, Some(4));
        assert_eq!(created.secret.as_deref(), Some("user:abc"));
        assert_eq!(created.expires_at, "2030-01-01T00:00:00Z");
    }

    #[test]
    fn test_create_without_secret_fails() {
        let (mock, client) = mock_client();
        mock.respond(
            Method::Post,
            PATH,
            201,
            json!({"id": 4, "description": "deploy", "expiresAt": "2030-01-01T00:00:00.000Z", "secret": null}),
        );
        let resource = RestResource::new(client, ServiceAccountTokens);
        assert!(resource.create(&declared()).is_err());
    }

    #[test]
    fn test_read_keeps_secret() {
        let (mock, client) = mock_client();
        mock.respond(
            Method::Get,
            PATH,
            200,
            json!({"pats": [{"id": 4, "description": "deploy", "expiresAt": "2030-01-01T00:00:00.000Z"}]}),
        );
        let resource = RestResource::new(client, ServiceAccountTokens);
        let tracked = ServiceAccountTokenModel {
            id: Some(4),
            secret: Some("user:abc".into()),
            ..declared()
        };

        assert_eq!(resource.read(&tracked).unwrap().found().unwrap(), tracked);
    }

    #[test]
    fn test_update_is_unsupported() {
        let (mock, client) = mock_client();
        let resource = RestResource::new(client, ServiceAccountTokens);
        let tracked = ServiceAccountTokenModel {
            id: Some(4),
            ..declared()
        };

        let err = resource.update(&tracked, &declared()).unwrap_err();
        let error = err.errors().next().unwrap();
        assert_eq!(error.summary, "Service account tokens do not support updates");
        assert_eq!(error.detail, "Service account tokens are immutable");
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_import_composite_id() {
        let (_, client) = mock_client();
        let resource = RestResource::new(client, ServiceAccountTokens);
        let skeleton = resource.import_skeleton("12:4").unwrap();
        assert_eq!(skeleton.service_account_id, 12);
        assert_eq!(skeleton.id, Some(4));
        assert!(resource.import_skeleton("12").is_err());
    }
}
