//! unleash_context_field - custom context fields used by strategy constraints

use super::rest::{Call, RestDescriptor};
use declarative::{Attribute, AttributeType, OpResult, ReadOutcome, Schema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use unleash_client::client::admin;
use unleash_client::types::{ContextField, LegalValue, UpsertContextField};
use unleash_client::{ApiRequest, Client, Result};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LegalValueModel {
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextFieldModel {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stickiness: Option<bool>,
    #[serde(default)]
    pub legal_values: Option<BTreeSet<LegalValueModel>>,
}

impl ContextFieldModel {
    fn path(&self) -> String {
        admin(format!("/context/{}", self.name))
    }

    fn payload(&self) -> UpsertContextField {
        UpsertContextField {
            name: self.name.clone(),
            description: self.description.clone().into(),
            stickiness: self.stickiness.unwrap_or(false),
            legal_values: self
                .legal_values
                .iter()
                .flatten()
                .map(|v| LegalValue {
                    value: v.value.clone(),
                    description: v.description.clone().into(),
                })
                .collect(),
        }
    }
}

pub struct ContextFields;

impl RestDescriptor for ContextFields {
    type Model = ContextFieldModel;
    type Remote = ContextField;

    fn type_name(&self) -> &'static str {
        "unleash_context_field"
    }

    fn schema(&self) -> Schema {
        Schema::new("A context field")
            .with_attribute(
                Attribute::required("name", AttributeType::String, "The name of the context field.")
                    .replace_on_change(),
            )
            .with_attribute(
                Attribute::optional(
                    "description",
                    AttributeType::String,
                    "The description of the context field.",
                )
                .replace_on_change(),
            )
            .with_attribute(Attribute::optional_computed(
                "stickiness",
                AttributeType::Bool,
                "Whether the field can be used for custom stickiness. Defaults to false.",
            ))
            .with_attribute(Attribute::optional_computed(
                "legal_values",
                AttributeType::set_of(AttributeType::Object(vec![
                    Attribute::required("value", AttributeType::String, "The legal value."),
                    Attribute::optional(
                        "description",
                        AttributeType::String,
                        "The description of the legal value.",
                    ),
                ])),
                "The values this field accepts.",
            ))
    }

    fn id(&self, model: &ContextFieldModel) -> String {
        model.name.clone()
    }

    fn skeleton(&self, id: &str) -> Option<OpResult<ContextFieldModel>> {
        Some(Ok(ContextFieldModel {
            name: id.to_string(),
            description: None,
            stickiness: None,
            legal_values: None,
        }))
    }

    fn create(&self, planned: &ContextFieldModel) -> Result<Call> {
        let request = ApiRequest::post(admin("/context")).json(&planned.payload())?;
        Ok(Call::new(request, &[201]))
    }

    fn create_returns_object(&self) -> bool {
        true
    }

    // The update payload replaces the whole field, so undeclared values are resubmitted.
    fn carry_identity(
        &self,
        prior: &ContextFieldModel,
        planned: ContextFieldModel,
    ) -> ContextFieldModel {
        ContextFieldModel {
            stickiness: planned.stickiness.or(prior.stickiness),
            legal_values: planned.legal_values.or_else(|| prior.legal_values.clone()),
            ..planned
        }
    }

    fn update(&self, _prior: &ContextFieldModel, planned: &ContextFieldModel) -> Result<Call> {
        let request = ApiRequest::put(planned.path()).json(&planned.payload())?;
        Ok(Call::new(request, &[200]))
    }

    fn delete(&self, current: &ContextFieldModel) -> Result<Call> {
        Ok(Call::new(ApiRequest::delete(current.path()), &[200]))
    }

    fn fetch(
        &self,
        client: &Client,
        current: &ContextFieldModel,
    ) -> Result<ReadOutcome<ContextField>> {
        client.fetch(ApiRequest::get(current.path()), &[200])
    }

    fn hydrate(
        &self,
        remote: ContextField,
        _basis: &ContextFieldModel,
    ) -> Result<ContextFieldModel> {
        Ok(ContextFieldModel {
            name: remote.name,
            description: remote.description.into_option(),
            stickiness: Some(remote.stickiness.into_option().unwrap_or(false)),
            legal_values: Some(
                remote
                    .legal_values
                    .into_option()
                    .unwrap_or_default()
                    .into_iter()
                    .map(|v| LegalValueModel {
                        value: v.value,
                        description: v.description.into_option(),
                    })
                    .collect(),
            ),
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

    fn region() -> ContextFieldModel {
        ContextFieldModel {
            name: "region".into(),
            description: Some("Deployment region".into()),
            stickiness: None,
            legal_values: None,
        }
    }

    #[test]
    fn test_create_fills_defaults() {
        let (mock, client) = mock_client();
        mock.respond(
            Method::Post,
            "/api/admin/context",
            201,
            json!({"name": "region", "description": "Deployment region", "stickiness": false, "legalValues": []}),
        );
        let resource = RestResource::new(client, ContextFields);

        let created = resource.create(&region()).unwrap();
        assert_eq!(created.stickiness, Some(false));
        assert_eq!(created.legal_values, Some(BTreeSet::new()));
        assert_eq!(
            mock.last_body(Method::Post, "/api/admin/context"),
            Some(json!({
                "name": "region",
                "description": "Deployment region",
                "stickiness": false,
                "legalValues": []
            }))
        );
    }

    #[test]
    fn test_update_resubmits_undeclared_values() {
        let (mock, client) = mock_client();
        let remote = json!({
            "name": "region",
            "description": "Deployment region",
            "stickiness": true,
            "legalValues": [{"value": "eu"}, {"value": "us", "description": "United States"}]
        });
        mock.respond_empty(Method::Put, "/api/admin/context/region", 200)
            .respond(Method::Get, "/api/admin/context/region", 200, remote);
        let resource = RestResource::new(client, ContextFields);
        let prior = ContextFieldModel {
            stickiness: Some(true),
            legal_values: Some(BTreeSet::from([
                LegalValueModel {
                    value: "us".into(),
                    description: Some("United States".into()),
                },
                LegalValueModel {
                    value: "eu".into(),
                    description: None,
                },
            ])),
            ..region()
        };

        let updated = resource.update(&prior, &region()).unwrap();
        assert_eq!(updated, prior);

        let body = mock.last_body(Method::Put, "/api/admin/context/region").unwrap();
        assert_eq!(body["stickiness"], json!(true));
        assert_eq!(
            body["legalValues"],
            json!([{"value": "eu"}, {"value": "us", "description": "United States"}])
        );
    }

    #[test]
    fn test_read_missing_is_gone() {
        let (mock, client) = mock_client();
        mock.respond(Method::Get, "/api/admin/context/region", 404, json!({}));
        let resource = RestResource::new(client, ContextFields);
        assert_eq!(resource.read(&region()).unwrap(), ReadOutcome::Gone);
    }
}
