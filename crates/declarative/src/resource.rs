//! Lifecycle traits for managed records and read-only lookups
//!
//! Adapters implement the typed [`Resource`] and [`DataSource`] traits with
//! their own record structs. The engine works with JSON records through the
//! object-safe [`DynResource`] / [`DynDataSource`] forms, produced by
//! [`erase`] and [`erase_data_source`]. The erased layer is where declared
//! input is checked against the schema and the adapter's own validation,
//! so no adapter issues a network call for invalid input.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::schema::Schema;
use crate::types::{DeleteOutcome, ReadOutcome};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Result of a lifecycle operation
pub type OpResult<T> = Result<T, Diagnostics>;

/// A managed entity kind with the Create/Read/Update/Delete/Import lifecycle
pub trait Resource: Send + Sync {
    /// Tracked record for this kind
    type Model: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync;

    /// Type name, e.g. `unleash_project`
    fn type_name(&self) -> &'static str;

    /// Field descriptors
    fn schema(&self) -> Schema;

    /// Identifier of a tracked record, used in logs and messages
    fn id(&self, model: &Self::Model) -> String;

    /// Canonical form of a record (sorted sets, empty lists to unset)
    fn normalize(&self, model: Self::Model) -> Self::Model {
        model
    }

    /// Local validation of declared input, run before any remote call
    fn validate(&self, _planned: &Self::Model) -> Diagnostics {
        Diagnostics::new()
    }

    fn create(&self, planned: &Self::Model) -> OpResult<Self::Model>;

    fn read(&self, current: &Self::Model) -> OpResult<ReadOutcome<Self::Model>>;

    fn update(&self, prior: &Self::Model, planned: &Self::Model) -> OpResult<Self::Model>;

    fn delete(&self, current: &Self::Model) -> OpResult<DeleteOutcome>;

    /// Minimal record skeleton for an external identifier
    ///
    /// Import fills the rest through [`Resource::read`].
    fn import_skeleton(&self, id: &str) -> OpResult<Self::Model> {
        Err(Diagnostic::error(
            "Import not supported",
            format!("{} cannot be imported (id '{id}')", self.type_name()),
        )
        .into())
    }
}

/// A read-only lookup
pub trait DataSource: Send + Sync {
    /// Lookup arguments
    type Query: DeserializeOwned + Send + Sync;
    /// Resolved record
    type Model: Serialize;

    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    fn validate(&self, _query: &Self::Query) -> Diagnostics {
        Diagnostics::new()
    }

    fn read(&self, query: &Self::Query) -> OpResult<Self::Model>;
}

/// Object-safe resource working on JSON records
pub trait DynResource: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn schema(&self) -> Schema;
    fn id(&self, record: &Value) -> OpResult<String>;
    /// Check a raw declaration and return its canonical JSON form
    fn normalize(&self, declared: &Value) -> OpResult<Value>;
    fn create(&self, planned: &Value) -> OpResult<Value>;
    fn read(&self, current: &Value) -> OpResult<ReadOutcome<Value>>;
    fn update(&self, prior: &Value, planned: &Value) -> OpResult<Value>;
    fn delete(&self, current: &Value) -> OpResult<DeleteOutcome>;
    /// Import an existing remote object by identifier
    fn import(&self, id: &str) -> OpResult<Value>;
}

/// Boxed type-erased resource
pub type BoxedResource = Box<dyn DynResource>;

/// Object-safe data source working on JSON
pub trait DynDataSource: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn schema(&self) -> Schema;
    fn read(&self, query: &Value) -> OpResult<Value>;
}

/// Boxed type-erased data source
pub type BoxedDataSource = Box<dyn DynDataSource>;

struct Erased<R>(R);

struct ErasedDataSource<D>(D);

/// Erase a typed resource
pub fn erase<R: Resource + 'static>(resource: R) -> BoxedResource {
    Box::new(Erased(resource))
}

/// Erase a typed data source
pub fn erase_data_source<D: DataSource + 'static>(source: D) -> BoxedDataSource {
    Box::new(ErasedDataSource(source))
}

fn decode<T: DeserializeOwned>(value: &Value, what: &str) -> OpResult<T> {
    serde_json::from_value(value.clone()).map_err(|e| {
        Diagnostic::error(
            format!("Invalid {what}"),
            format!("Unable to decode attributes: {e}"),
        )
        .into()
    })
}

fn encode<T: Serialize>(value: &T) -> OpResult<Value> {
    serde_json::to_value(value).map_err(|e| {
        Diagnostic::error("Unable to encode record", e.to_string()).into()
    })
}

impl<R: Resource> Erased<R> {
    fn decode_declared(&self, declared: &Value) -> OpResult<R::Model> {
        self.0.schema().check_declaration(declared).into_result()?;
        let model: R::Model = decode(declared, "declaration")?;
        let model = self.0.normalize(model);
        self.0.validate(&model).into_result()?;
        Ok(model)
    }

    fn decode_tracked(&self, tracked: &Value) -> OpResult<R::Model> {
        decode(tracked, "tracked record")
    }
}

impl<R: Resource> DynResource for Erased<R> {
    fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    fn schema(&self) -> Schema {
        self.0.schema()
    }

    fn id(&self, record: &Value) -> OpResult<String> {
        Ok(self.0.id(&self.decode_tracked(record)?))
    }

    fn normalize(&self, declared: &Value) -> OpResult<Value> {
        encode(&self.decode_declared(declared)?)
    }

    fn create(&self, planned: &Value) -> OpResult<Value> {
        let planned = self.decode_declared(planned)?;
        let created = self.0.create(&planned)?;
        log::debug!("Created {} {}", self.0.type_name(), self.0.id(&created));
        encode(&self.0.normalize(created))
    }

    fn read(&self, current: &Value) -> OpResult<ReadOutcome<Value>> {
        let current = self.decode_tracked(current)?;
        match self.0.read(&current)? {
            ReadOutcome::Found(model) => Ok(ReadOutcome::Found(encode(&self.0.normalize(model))?)),
            ReadOutcome::Gone => {
                log::warn!(
                    "{} with id {} not found, removing from state",
                    self.0.type_name(),
                    self.0.id(&current)
                );
                Ok(ReadOutcome::Gone)
            }
        }
    }

    fn update(&self, prior: &Value, planned: &Value) -> OpResult<Value> {
        let prior = self.decode_tracked(prior)?;
        let planned = self.decode_declared(planned)?;
        let updated = self.0.update(&prior, &planned)?;
        log::debug!("Updated {} {}", self.0.type_name(), self.0.id(&updated));
        encode(&self.0.normalize(updated))
    }

    fn delete(&self, current: &Value) -> OpResult<DeleteOutcome> {
        let current = self.decode_tracked(current)?;
        self.0.delete(&current)
    }

    fn import(&self, id: &str) -> OpResult<Value> {
        let skeleton = self.0.import_skeleton(id)?;
        match self.0.read(&skeleton)? {
            ReadOutcome::Found(model) => encode(&self.0.normalize(model)),
            ReadOutcome::Gone => Err(Diagnostic::error(
                "Cannot import non-existent remote object",
                format!(
                    "While attempting to import an existing object, no {} with id '{id}' was found.",
                    self.0.type_name()
                ),
            )
            .into()),
        }
    }
}

impl<D: DataSource> DynDataSource for ErasedDataSource<D> {
    fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    fn schema(&self) -> Schema {
        self.0.schema()
    }

    fn read(&self, query: &Value) -> OpResult<Value> {
        self.0.schema().check_declaration(query).into_result()?;
        let query: D::Query = decode(query, "lookup arguments")?;
        self.0.validate(&query).into_result()?;
        encode(&self.0.read(&query)?)
    }
}

/// Resources and data sources of a provider, by type name
#[derive(Default)]
pub struct Registry {
    resources: BTreeMap<&'static str, BoxedResource>,
    data_sources: BTreeMap<&'static str, BoxedDataSource>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<R: Resource + 'static>(&mut self, resource: R) {
        let boxed = erase(resource);
        self.resources.insert(boxed.type_name(), boxed);
    }

    pub fn register_data_source<D: DataSource + 'static>(&mut self, source: D) {
        let boxed = erase_data_source(source);
        self.data_sources.insert(boxed.type_name(), boxed);
    }

    pub fn resource(&self, type_name: &str) -> Option<&dyn DynResource> {
        self.resources.get(type_name).map(AsRef::as_ref)
    }

    pub fn data_source(&self, type_name: &str) -> Option<&dyn DynDataSource> {
        self.data_sources.get(type_name).map(AsRef::as_ref)
    }

    /// Look up a resource, reporting unknown types as a diagnostic
    pub fn require(&self, type_name: &str) -> OpResult<&dyn DynResource> {
        self.resource(type_name).ok_or_else(|| {
            Diagnostic::error(
                "Unknown resource type",
                format!("This provider does not support resource type \"{type_name}\"."),
            )
            .into()
        })
    }

    pub fn resources(&self) -> impl Iterator<Item = &dyn DynResource> {
        self.resources.values().map(AsRef::as_ref)
    }

    pub fn data_sources(&self) -> impl Iterator<Item = &dyn DynDataSource> {
        self.data_sources.values().map(AsRef::as_ref)
    }
}
