//! unleash_api_token - client, frontend and admin API tokens
//!
//! Tokens are keyed by their secret, which only the server generates. The
//! API has no get-by-secret endpoint, so reads list every token and pick the
//! matching one. Only the expiry can change in place.

use super::reconcile_timestamp;
use super::rest::{Call, RestDescriptor};
use chrono::DateTime;
use declarative::{
    Attribute, AttributeType, Diagnostic, Diagnostics, OpResult, ReadOutcome, Schema, find_by_key,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use unleash_client::client::admin;
use unleash_client::types::{ApiToken, ApiTokenList, CreateApiToken, UpdateApiToken};
use unleash_client::{ApiRequest, Client, Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiTokenModel {
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub token_name: Option<String>,
    #[serde(rename = "type", default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub projects: Option<BTreeSet<String>>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

impl ApiTokenModel {
    fn require_secret(&self) -> Result<&str> {
        self.secret.as_deref().ok_or_else(|| {
            Error::validation("secret", "Missing token secret", "The tracked token has no secret")
        })
    }
}

pub struct ApiTokens;

impl RestDescriptor for ApiTokens {
    type Model = ApiTokenModel;
    type Remote = ApiToken;

    fn type_name(&self) -> &'static str {
        "unleash_api_token"
    }

    fn schema(&self) -> Schema {
        Schema::new("An API token")
            .with_attribute(
                Attribute::computed("secret", AttributeType::String, "Secret token value.")
                    .sensitive(),
            )
            .with_attribute(
                Attribute::optional("token_name", AttributeType::String, "The name of the token.")
                    .replace_on_change(),
            )
            .with_attribute(
                Attribute::optional("type", AttributeType::String, "The type of the token.")
                    .replace_on_change(),
            )
            .with_attribute(
                Attribute::optional_computed(
                    "environment",
                    AttributeType::String,
                    "An environment the token has access to.",
                )
                .replace_on_change(),
            )
            .with_attribute(
                Attribute::optional_computed(
                    "project",
                    AttributeType::String,
                    "A project the token belongs to.",
                )
                .replace_on_change(),
            )
            .with_attribute(
                Attribute::optional_computed(
                    "projects",
                    AttributeType::set_of(AttributeType::String),
                    "The projects this token has access to, `[\"*\"]` for all projects.",
                )
                .replace_on_change(),
            )
            .with_attribute(Attribute::optional(
                "expires_at",
                AttributeType::String,
                "When the token expires, as an RFC3339 timestamp.",
            ))
    }

    fn id(&self, model: &ApiTokenModel) -> String {
        model.token_name.clone().unwrap_or_default()
    }

    fn validate(&self, planned: &ApiTokenModel) -> Diagnostics {
        let mut diags = Diagnostics::new();
        if let Some(expires_at) = &planned.expires_at
            && let Err(e) = DateTime::parse_from_rfc3339(expires_at)
        {
            diags.push(
                Diagnostic::error("Unable to parse expiration date", e.to_string()).at("expires_at"),
            );
        }
        diags
    }

    fn skeleton(&self, id: &str) -> Option<OpResult<ApiTokenModel>> {
        Some(Ok(ApiTokenModel {
            secret: Some(id.to_string()),
            token_name: None,
            token_type: None,
            environment: None,
            project: None,
            projects: None,
            expires_at: None,
        }))
    }

    fn create(&self, planned: &ApiTokenModel) -> Result<Call> {
        let body = CreateApiToken {
            token_name: planned.token_name.clone().into(),
            token_type: planned.token_type.clone().into(),
            environment: planned.environment.clone().into(),
            project: planned.project.clone().filter(|p| !p.is_empty()).into(),
            projects: planned
                .projects
                .clone()
                .map(|p| p.into_iter().collect::<Vec<_>>())
                .into(),
            expires_at: planned.expires_at.clone().into(),
        };
        Ok(Call::new(ApiRequest::post(admin("/api-tokens")).json(&body)?, &[201]))
    }

    fn create_returns_object(&self) -> bool {
        true
    }

    fn carry_identity(&self, prior: &ApiTokenModel, planned: ApiTokenModel) -> ApiTokenModel {
        ApiTokenModel {
            secret: prior.secret.clone(),
            environment: planned.environment.or_else(|| prior.environment.clone()),
            project: planned.project.or_else(|| prior.project.clone()),
            projects: planned.projects.or_else(|| prior.projects.clone()),
            ..planned
        }
    }

    fn update(&self, _prior: &ApiTokenModel, planned: &ApiTokenModel) -> Result<Call> {
        let expires_at = planned.expires_at.clone().ok_or_else(|| {
            Error::validation(
                "expires_at",
                "ExpiresAt is mandatory when updating a token",
                "The value provided was null or unknown",
            )
        })?;
        let secret = planned.require_secret()?;
        let request = ApiRequest::put(admin(format!("/api-tokens/{secret}")))
            .json(&UpdateApiToken { expires_at })?;
        Ok(Call::new(request, &[200]))
    }

    // The update endpoint answers without a body; the declared expiry is authoritative.
    fn reread_after_update(&self) -> bool {
        false
    }

    fn delete(&self, current: &ApiTokenModel) -> Result<Call> {
        let secret = current.require_secret()?;
        Ok(Call::new(ApiRequest::delete(admin(format!("/api-tokens/{secret}"))), &[200]))
    }

    fn fetch(&self, client: &Client, current: &ApiTokenModel) -> Result<ReadOutcome<ApiToken>> {
        let secret = current.require_secret()?;
        let list: ApiTokenList = match client.fetch(ApiRequest::get(admin("/api-tokens")), &[200])? {
            ReadOutcome::Found(list) => list,
            ReadOutcome::Gone => return Ok(ReadOutcome::Gone),
        };
        Ok(match find_by_key(list.tokens, secret, |t| t.secret == secret) {
            Some(token) => ReadOutcome::Found(token),
            None => ReadOutcome::Gone,
        })
    }

    fn hydrate(&self, remote: ApiToken, basis: &ApiTokenModel) -> Result<ApiTokenModel> {
        Ok(ApiTokenModel {
            secret: Some(remote.secret),
            token_name: Some(remote.token_name),
            token_type: Some(remote.token_type),
            environment: remote.environment.into_option(),
            project: remote.project.into_option(),
            projects: remote
                .projects
                .into_option()
                .map(|p| p.into_iter().collect()),
            expires_at: reconcile_timestamp(
                basis.expires_at.as_deref(),
                remote.expires_at.into_option(),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::RestResource;
    use crate::resource::tests::mock_client;
    use declarative::{DeleteOutcome, Resource};
    use serde_json::json;
    use unleash_client::Method;

    const SECRET: &str = "default:development.0123456789abcdef";

    fn declared() -> ApiTokenModel {
        ApiTokenModel {
            secret: None,
            token_name: Some("client-token".into()),
            token_type: Some("client".into()),
            environment: None,
            project: Some("default".into()),
            projects: None,
            expires_at: None,
        }
    }

    fn tracked() -> ApiTokenModel {
        ApiTokenModel {
            secret: Some(SECRET.into()),
            environment: Some("development".into()),
            projects: Some(BTreeSet::from(["default".to_string()])),
            ..declared()
        }
    }

    fn remote(expires_at: serde_json::Value) -> serde_json::Value {
        json!({
            "secret": SECRET,
            "tokenName": "client-token",
            "type": "client",
            "environment": "development",
            "project": "default",
            "projects": ["default"],
            "expiresAt": expires_at,
            "createdAt": "2024-05-01T10:00:00.000Z"
        })
    }

    #[test]
    fn test_create_without_expiry() {
        let (mock, client) = mock_client();
        mock.respond(Method::Post, "/api/admin/api-tokens", 201, remote(json!(null)));
        let resource = RestResource::new(client, ApiTokens);

        let created = resource.create(&declared()).unwrap();
        assert_eq!(created.expires_at, None);
        assert_eq!(created.project.as_deref(), Some("default"));
        assert_eq!(created.secret.as_deref(), Some(SECRET));

        let body = mock.last_body(Method::Post, "/api/admin/api-tokens").unwrap();
        assert_eq!(
            body,
            json!({"tokenName": "client-token", "type": "client", "project": "default"})
        );
    }

    #[test]
    fn test_update_expiry_keeps_declared_value() {
        let (mock, client) = mock_client();
        let path = format!("/api/admin/api-tokens/{SECRET}");
        mock.respond_empty(Method::Put, &path, 200);
        let resource = RestResource::new(client, ApiTokens);
        let planned = ApiTokenModel {
            expires_at: Some("2031-06-30T12:00:00+02:00".into()),
            ..declared()
        };

        let updated = resource.update(&tracked(), &planned).unwrap();
        assert_eq!(updated.expires_at.as_deref(), Some("2031-06-30T12:00:00+02:00"));
        assert_eq!(updated.secret.as_deref(), Some(SECRET));
        assert_eq!(updated.environment.as_deref(), Some("development"));
        assert_eq!(
            mock.last_body(Method::Put, &path),
            Some(json!({"expiresAt": "2031-06-30T12:00:00+02:00"}))
        );
    }

    #[test]
    fn test_update_requires_expiry() {
        let (mock, client) = mock_client();
        let resource = RestResource::new(client, ApiTokens);

        let err = resource.update(&tracked(), &declared()).unwrap_err();
        assert!(err.to_string().contains("ExpiresAt is mandatory when updating a token"));
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_read_same_instant_keeps_spelling() {
        let (mock, client) = mock_client();
        mock.respond(
            Method::Get,
            "/api/admin/api-tokens",
            200,
            json!({"tokens": [remote(json!("2031-06-30T10:00:00.000Z"))]}),
        );
        let resource = RestResource::new(client, ApiTokens);
        let current = ApiTokenModel {
            expires_at: Some("2031-06-30T12:00:00+02:00".into()),
            ..tracked()
        };

        let read = resource.read(&current).unwrap().found().unwrap();
        assert_eq!(read, current);
    }

    #[test]
    fn test_read_normalises_changed_expiry() {
        let (mock, client) = mock_client();
        mock.respond(
            Method::Get,
            "/api/admin/api-tokens",
            200,
            json!({"tokens": [remote(json!("2032-01-01T00:00:00.000Z"))]}),
        );
        let resource = RestResource::new(client, ApiTokens);

        let read = resource.read(&tracked()).unwrap().found().unwrap();
        assert_eq!(read.expires_at.as_deref(), Some("2032-01-01T00:00:00Z"));
    }

    #[test]
    fn test_read_vanished_token_is_gone() {
        let (mock, client) = mock_client();
        mock.respond(
            Method::Get,
            "/api/admin/api-tokens",
            200,
            json!({"tokens": [{"secret": "other", "tokenName": "x", "type": "admin"}]}),
        );
        let resource = RestResource::new(client, ApiTokens);
        assert_eq!(resource.read(&tracked()).unwrap(), ReadOutcome::Gone);
    }

    #[test]
    fn test_read_not_found_is_gone() {
        let (mock, client) = mock_client();
        mock.respond(Method::Get, "/api/admin/api-tokens", 404, json!({}));
        let resource = RestResource::new(client, ApiTokens);
        assert_eq!(resource.read(&tracked()).unwrap(), ReadOutcome::Gone);
    }

    #[test]
    fn test_invalid_expiry_rejected_locally() {
        let diags = ApiTokens.validate(&ApiTokenModel {
            expires_at: Some("next tuesday".into()),
            ..declared()
        });
        let error = diags.errors().next().unwrap();
        assert_eq!(error.summary, "Unable to parse expiration date");
        assert_eq!(error.attribute.as_deref(), Some("expires_at"));
    }

    #[test]
    fn test_delete() {
        let (mock, client) = mock_client();
        mock.respond_empty(Method::Delete, &format!("/api/admin/api-tokens/{SECRET}"), 200);
        let resource = RestResource::new(client, ApiTokens);
        assert_eq!(resource.delete(&tracked()).unwrap(), DeleteOutcome::Deleted);
    }
}
