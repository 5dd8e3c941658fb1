//! Declaration file loading
//!
//! ```toml
//! [provider]
//! base_url = "http://localhost:4242"
//!
//! [resource.unleash_environment.staging]
//! name = "staging"
//! type = "test"
//! ```

use crate::config::ProviderBlock;
use anyhow::{Context, Result, bail};
use declarative::Address;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeclarationFile {
    #[serde(default)]
    provider: ProviderBlock,
    #[serde(default)]
    resource: BTreeMap<String, BTreeMap<String, toml::Table>>,
}

/// Provider settings and declared records of one file
#[derive(Debug, Default)]
pub struct Declarations {
    pub provider: ProviderBlock,
    pub records: BTreeMap<Address, Value>,
}

impl Declarations {
    /// Load a declaration file; a missing file declares nothing
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No declaration file at {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read declaration file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse declaration file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let file: DeclarationFile = toml::from_str(content)?;

        let mut records = BTreeMap::new();
        for (type_name, entries) in file.resource {
            for (name, table) in entries {
                if name.is_empty() || name.contains('.') {
                    bail!("Invalid name '{name}' for {type_name}: names must be non-empty without '.'");
                }
                records.insert(Address::new(&type_name, name), table_to_json(table));
            }
        }

        log::debug!("Declared {} records", records.len());
        Ok(Self {
            provider: file.provider,
            records,
        })
    }
}

fn table_to_json(table: toml::Table) -> Value {
    Value::Object(
        table
            .into_iter()
            .map(|(key, value)| (key, to_json(value)))
            .collect::<Map<_, _>>(),
    )
}

/// TOML values as JSON; datetimes keep their literal spelling
pub fn to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(to_json).collect()),
        toml::Value::Table(table) => table_to_json(table),
    }
}
