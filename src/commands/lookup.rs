//! lookup <data-source> key=value...

use super::{Session, failure};
use crate::Context;
use anyhow::{Context as AnyhowContext, Result, anyhow, bail};
use declarative::{AttributeType, Schema};
use serde_json::{Map, Value};

pub fn run(ctx: &Context, data_source: &str, args: &[String]) -> Result<()> {
    let session = Session::open(ctx)?;
    let Some(source) = session.registry.data_source(data_source) else {
        let known: Vec<&str> = session.registry.data_sources().map(|d| d.type_name()).collect();
        bail!("Unknown data source '{data_source}' (known: {})", known.join(", "));
    };

    let query = parse_arguments(&source.schema(), args)?;
    log::debug!("Looking up {data_source} with {query}");
    let found = source.read(&query).map_err(failure)?;

    let json = serde_json::to_string_pretty(&found).context("Failed to render lookup result")?;
    println!("{json}");
    Ok(())
}

/// Build the query object, typing values by the schema
pub fn parse_arguments(schema: &Schema, args: &[String]) -> Result<Value> {
    let mut query = Map::new();
    for arg in args {
        let (key, raw) = arg
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected KEY=VALUE, got '{arg}'"))?;
        let value = match schema.attribute(key).map(|a| &a.attr_type) {
            Some(AttributeType::Int) => Value::from(
                raw.parse::<i64>()
                    .with_context(|| format!("{key} must be an integer, got '{raw}'"))?,
            ),
            Some(AttributeType::Bool) => Value::Bool(
                raw.parse::<bool>()
                    .with_context(|| format!("{key} must be true or false, got '{raw}'"))?,
            ),
            // Unknown keys are passed through for the schema check to report.
            _ => Value::String(raw.to_string()),
        };
        query.insert(key.to_string(), value);
    }
    Ok(Value::Object(query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::Attribute;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new("lookup")
            .with_attribute(Attribute::required("name", AttributeType::String, ""))
            .with_attribute(Attribute::optional("id", AttributeType::Int, ""))
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_values_typed_by_schema() {
        let query = parse_arguments(&schema(), &args(&["name=a=b", "id=7"])).unwrap();
        assert_eq!(query, json!({"name": "a=b", "id": 7}));
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(parse_arguments(&schema(), &args(&["name"])).is_err());
        let err = parse_arguments(&schema(), &args(&["id=seven"])).unwrap_err();
        assert_eq!(err.to_string(), "id must be an integer, got 'seven'");
    }
}
