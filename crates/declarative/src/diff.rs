//! Attribute-level diff between a tracked record and its declaration
//!
//! The comparison is field by field at the top level of the record, guided
//! by the schema classification. Nested values compare as whole values, so
//! declarations must be normalised (sets sorted) before diffing.

use crate::schema::{AttributeKind, Schema};
use crate::types::Address;
use serde::Serialize;
use serde_json::Value;

/// One changed attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeChange {
    pub name: String,
    pub before: Value,
    pub after: Value,
    /// The attribute is replace-on-change
    pub forces_replacement: bool,
    pub sensitive: bool,
}

/// Changed attributes of one record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDiff {
    pub address: Address,
    pub changes: Vec<AttributeChange>,
}

fn field<'a>(record: &'a Value, name: &str) -> &'a Value {
    record.get(name).unwrap_or(&Value::Null)
}

impl ResourceDiff {
    /// Compare a tracked record against a normalised declaration
    ///
    /// Required and optional attributes always compare, so dropping an
    /// optional attribute from a declaration unsets it. Optional+computed
    /// attributes compare only when declared. Computed attributes never do.
    pub fn compute(address: Address, schema: &Schema, tracked: &Value, declared: &Value) -> Self {
        let changes = schema
            .attributes
            .iter()
            .filter_map(|attribute| {
                let before = field(tracked, attribute.name);
                let after = field(declared, attribute.name);
                let compare = match attribute.kind {
                    AttributeKind::Computed => false,
                    AttributeKind::OptionalComputed => !after.is_null(),
                    AttributeKind::Required | AttributeKind::Optional => true,
                };
                (compare && before != after).then(|| AttributeChange {
                    name: attribute.name.to_string(),
                    before: before.clone(),
                    after: after.clone(),
                    forces_replacement: attribute.replace_on_change,
                    sensitive: attribute.sensitive,
                })
            })
            .collect();

        Self { address, changes }
    }

    /// All attributes of a new declaration, as additions
    pub fn for_creation(address: Address, schema: &Schema, declared: &Value) -> Self {
        Self::compute(address, schema, &Value::Null, declared)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Whether any change forces destroy-then-recreate
    pub fn requires_replace(&self) -> bool {
        self.changes.iter().any(|c| c.forces_replacement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, AttributeType};
    use serde_json::json;

    fn token_schema() -> Schema {
        Schema::new("token")
            .with_attribute(Attribute::computed("secret", AttributeType::String, "s").sensitive())
            .with_attribute(
                Attribute::optional("token_name", AttributeType::String, "n").replace_on_change(),
            )
            .with_attribute(Attribute::optional_computed("project", AttributeType::String, "p"))
            .with_attribute(Attribute::optional("expires_at", AttributeType::String, "e"))
    }

    fn address() -> Address {
        Address::new("unleash_api_token", "client")
    }

    #[test]
    fn test_no_changes_when_computed_undeclared() {
        let tracked = json!({"secret": "abc", "token_name": "t", "project": "default", "expires_at": null});
        let declared = json!({"secret": null, "token_name": "t", "project": null, "expires_at": null});
        let diff = ResourceDiff::compute(address(), &token_schema(), &tracked, &declared);
        assert!(diff.is_empty());
    }

    #[test]
    fn test_in_place_change() {
        let tracked = json!({"token_name": "t", "expires_at": null});
        let declared = json!({"token_name": "t", "expires_at": "2030-01-01T00:00:00Z"});
        let diff = ResourceDiff::compute(address(), &token_schema(), &tracked, &declared);
        assert_eq!(diff.changes.len(), 1);
        assert_eq!(diff.changes[0].name, "expires_at");
        assert!(!diff.requires_replace());
    }

    #[test]
    fn test_replace_change() {
        let tracked = json!({"token_name": "old"});
        let declared = json!({"token_name": "new"});
        let diff = ResourceDiff::compute(address(), &token_schema(), &tracked, &declared);
        assert!(diff.requires_replace());
    }

    #[test]
    fn test_removing_optional_attribute_is_a_change() {
        let tracked = json!({"token_name": "t", "expires_at": "2030-01-01T00:00:00Z"});
        let declared = json!({"token_name": "t"});
        let diff = ResourceDiff::compute(address(), &token_schema(), &tracked, &declared);
        assert_eq!(diff.changes[0].after, Value::Null);
    }

    #[test]
    fn test_for_creation_lists_declared() {
        let declared = json!({"token_name": "t", "project": "default"});
        let diff = ResourceDiff::for_creation(address(), &token_schema(), &declared);
        let names: Vec<_> = diff.changes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["token_name", "project"]);
    }
}
