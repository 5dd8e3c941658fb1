//! unleash_context_field lookup by name

use super::require_found;
use crate::resource::context_field::LegalValueModel;
use declarative::{Attribute, AttributeType, DataSource, OpResult, Schema};
use serde::{Deserialize, Serialize};
use unleash_client::client::admin;
use unleash_client::types::ContextField;
use unleash_client::{ApiRequest, Client};

#[derive(Debug, Clone, Deserialize)]
pub struct ContextFieldQuery {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextFieldRecord {
    pub name: String,
    pub description: Option<String>,
    pub stickiness: bool,
    pub legal_values: Vec<LegalValueModel>,
}

pub struct ContextFieldLookup {
    client: Client,
}

impl ContextFieldLookup {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl DataSource for ContextFieldLookup {
    type Query = ContextFieldQuery;
    type Model = ContextFieldRecord;

    fn type_name(&self) -> &'static str {
        "unleash_context_field"
    }

    fn schema(&self) -> Schema {
        Schema::new("Fetch a context field.")
            .with_attribute(Attribute::required(
                "name",
                AttributeType::String,
                "The name of the context field.",
            ))
            .with_attribute(Attribute::computed(
                "description",
                AttributeType::String,
                "The description of the context field.",
            ))
            .with_attribute(Attribute::computed(
                "stickiness",
                AttributeType::Bool,
                "Whether the field can be used for custom stickiness.",
            ))
            .with_attribute(Attribute::computed(
                "legal_values",
                AttributeType::list_of(AttributeType::Object(vec![
                    Attribute::computed("value", AttributeType::String, "The legal value."),
                    Attribute::computed("description", AttributeType::String, "Its description."),
                ])),
                "The values this field accepts.",
            ))
    }

    fn read(&self, query: &ContextFieldQuery) -> OpResult<ContextFieldRecord> {
        let outcome = self.client.fetch(
            ApiRequest::get(admin(format!("/context/{}", query.name))),
            &[200],
        )?;
        let field: ContextField = require_found(outcome, "Context field", &query.name)?;
        Ok(ContextFieldRecord {
            name: field.name,
            description: field.description.into_option(),
            stickiness: field.stickiness.into_option().unwrap_or(false),
            legal_values: field
                .legal_values
                .into_option()
                .unwrap_or_default()
                .into_iter()
                .map(|v| LegalValueModel {
                    value: v.value,
                    description: v.description.into_option(),
                })
                .collect(),
        })
    }
}
