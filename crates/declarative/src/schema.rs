//! Field descriptors for resources and data sources
//!
//! Every attribute is classified once here and the classification drives
//! validation, planning and display:
//!
//! - **Required**: present in every declaration
//! - **Optional**: omitted unless declared, unset marker when absent remotely
//! - **OptionalComputed**: server or previous state fills it when undeclared
//! - **Computed**: only ever set from the server
//!
//! Orthogonal flags mark sensitive values and replace-on-change attributes.

use crate::diagnostics::Diagnostics;
use serde::Serialize;
use serde_json::Value;

/// How an attribute is supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Required,
    Optional,
    OptionalComputed,
    Computed,
}

impl AttributeKind {
    /// Whether a declaration may set this attribute
    pub fn is_declarable(&self) -> bool {
        !matches!(self, Self::Computed)
    }

    /// Whether the server may fill this attribute
    pub fn is_computed(&self) -> bool {
        matches!(self, Self::OptionalComputed | Self::Computed)
    }
}

/// Value type of an attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Int,
    Bool,
    /// Ordered list
    List(Box<AttributeType>),
    /// Unordered set keyed by natural key
    Set(Box<AttributeType>),
    /// Nested object with its own attributes
    Object(Vec<Attribute>),
}

impl AttributeType {
    pub fn list_of(inner: AttributeType) -> Self {
        Self::List(Box::new(inner))
    }

    pub fn set_of(inner: AttributeType) -> Self {
        Self::Set(Box::new(inner))
    }

    /// Short name for display
    pub fn label(&self) -> String {
        match self {
            Self::String => "string".to_string(),
            Self::Int => "int".to_string(),
            Self::Bool => "bool".to_string(),
            Self::List(inner) => format!("list({})", inner.label()),
            Self::Set(inner) => format!("set({})", inner.label()),
            Self::Object(_) => "object".to_string(),
        }
    }
}

/// A single attribute descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    pub kind: AttributeKind,
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    pub description: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub replace_on_change: bool,
}

impl Attribute {
    fn new(
        name: &'static str,
        kind: AttributeKind,
        attr_type: AttributeType,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            kind,
            attr_type,
            description,
            sensitive: false,
            replace_on_change: false,
        }
    }

    pub fn required(name: &'static str, attr_type: AttributeType, description: &'static str) -> Self {
        Self::new(name, AttributeKind::Required, attr_type, description)
    }

    pub fn optional(name: &'static str, attr_type: AttributeType, description: &'static str) -> Self {
        Self::new(name, AttributeKind::Optional, attr_type, description)
    }

    pub fn optional_computed(
        name: &'static str,
        attr_type: AttributeType,
        description: &'static str,
    ) -> Self {
        Self::new(name, AttributeKind::OptionalComputed, attr_type, description)
    }

    pub fn computed(name: &'static str, attr_type: AttributeType, description: &'static str) -> Self {
        Self::new(name, AttributeKind::Computed, attr_type, description)
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn replace_on_change(mut self) -> Self {
        self.replace_on_change = true;
        self
    }
}

/// Schema of a resource or data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub description: &'static str,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(description: &'static str) -> Self {
        Self {
            description,
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn is_sensitive(&self, name: &str) -> bool {
        self.attribute(name).is_some_and(|a| a.sensitive)
    }

    /// Check a declared record against the schema
    ///
    /// Reports every missing required attribute, every attempt to set a
    /// computed-only attribute and every unknown key in one pass. Nested
    /// objects are checked recursively with dotted/indexed paths.
    pub fn check_declaration(&self, record: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();
        match record {
            Value::Object(_) => check_object(&self.attributes, record, "", &mut diags),
            _ => diags.add_error(
                "Invalid declaration",
                "A declaration must be a table of attributes",
            ),
        }
        diags
    }
}

fn is_set(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null))
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn check_object(attributes: &[Attribute], record: &Value, prefix: &str, diags: &mut Diagnostics) {
    let Value::Object(map) = record else {
        return;
    };

    for attribute in attributes {
        let path = join_path(prefix, attribute.name);
        let value = map.get(attribute.name);
        match attribute.kind {
            AttributeKind::Required if !is_set(value) => diags.add_attribute_error(
                &path,
                "Missing required argument",
                format!("The argument \"{path}\" is required, but no definition was found."),
            ),
            AttributeKind::Computed if is_set(value) => diags.add_attribute_error(
                &path,
                "Invalid configuration",
                format!("\"{path}\" is computed by the server and cannot be set."),
            ),
            _ => {}
        }

        if let Some(value) = value {
            check_nested(&attribute.attr_type, value, &path, diags);
        }
    }

    for key in map.keys() {
        if !attributes.iter().any(|a| a.name == key) {
            let path = join_path(prefix, key);
            diags.add_attribute_error(
                &path,
                "Unsupported argument",
                format!("An argument named \"{key}\" is not expected here."),
            );
        }
    }
}

fn check_nested(attr_type: &AttributeType, value: &Value, path: &str, diags: &mut Diagnostics) {
    match (attr_type, value) {
        (AttributeType::Object(attributes), Value::Object(_)) => {
            check_object(attributes, value, path, diags);
        }
        (AttributeType::List(inner) | AttributeType::Set(inner), Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                check_nested(inner, item, &format!("{path}[{i}]"), diags);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn project_schema() -> Schema {
        Schema::new("project")
            .with_attribute(
                Attribute::required("id", AttributeType::String, "id").replace_on_change(),
            )
            .with_attribute(Attribute::required("name", AttributeType::String, "name"))
            .with_attribute(Attribute::optional("description", AttributeType::String, "d"))
            .with_attribute(Attribute::computed("secret", AttributeType::String, "s").sensitive())
            .with_attribute(Attribute::optional(
                "link_templates",
                AttributeType::list_of(AttributeType::Object(vec![
                    Attribute::optional("title", AttributeType::String, "t"),
                    Attribute::required("url_template", AttributeType::String, "u"),
                ])),
                "links",
            ))
    }

    #[test]
    fn test_valid_declaration() {
        let diags = project_schema().check_declaration(&json!({"id": "p", "name": "P"}));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_reports_all_missing_required() {
        let diags = project_schema().check_declaration(&json!({"description": null}));
        let paths: Vec<_> = diags.iter().filter_map(|d| d.attribute.clone()).collect();
        assert_eq!(paths, vec!["id".to_string(), "name".to_string()]);
    }

    #[test]
    fn test_rejects_computed_and_unknown() {
        let diags =
            project_schema().check_declaration(&json!({"id": "p", "name": "P", "secret": "x", "bogus": 1}));
        assert_eq!(diags.errors().count(), 2);
    }

    #[test]
    fn test_nested_paths() {
        let diags = project_schema().check_declaration(&json!({
            "id": "p",
            "name": "P",
            "link_templates": [{"title": "ok", "url_template": "x"}, {"title": "missing"}]
        }));
        let diag = diags.iter().next().unwrap();
        assert_eq!(diag.attribute.as_deref(), Some("link_templates[1].url_template"));
    }

    #[test]
    fn test_flags() {
        let schema = project_schema();
        assert!(schema.is_sensitive("secret"));
        assert!(schema.attribute("id").unwrap().replace_on_change);
        assert!(!AttributeKind::Computed.is_declarable());
        assert!(AttributeKind::OptionalComputed.is_computed());
        assert_eq!(AttributeType::set_of(AttributeType::Int).label(), "set(int)");
    }
}
