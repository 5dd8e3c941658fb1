//! Generic lifecycle adapter for REST-backed entity kinds
//!
//! Most kinds share one shape: create, hydrate from the create response or
//! re-fetch, update then re-fetch, delete by identifier, read by identifier
//! or by list-and-find. A [`RestDescriptor`] supplies the endpoints, the
//! expected status codes and the two mapping directions; [`RestResource`]
//! runs the lifecycle.

use declarative::{DeleteOutcome, Diagnostic, Diagnostics, OpResult, ReadOutcome, Resource, Schema};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use unleash_client::{ApiRequest, ApiResponse, Client, Result};

/// A request together with the status codes that count as success
#[derive(Debug, Clone)]
pub struct Call {
    pub request: ApiRequest,
    pub codes: &'static [u16],
}

impl Call {
    pub fn new(request: ApiRequest, codes: &'static [u16]) -> Self {
        Self { request, codes }
    }
}

/// Endpoints and field mapping of one entity kind
pub trait RestDescriptor: Send + Sync {
    /// Tracked record
    type Model: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync;
    /// Wire representation returned by reads
    type Remote: DeserializeOwned;

    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    fn id(&self, model: &Self::Model) -> String;

    fn normalize(&self, model: Self::Model) -> Self::Model {
        model
    }

    fn validate(&self, _planned: &Self::Model) -> Diagnostics {
        Diagnostics::new()
    }

    /// Record skeleton for import, `None` when the kind cannot be imported
    fn skeleton(&self, _id: &str) -> Option<OpResult<Self::Model>> {
        None
    }

    /// Expand a declaration into the create request
    fn create(&self, planned: &Self::Model) -> Result<Call>;

    /// Whether the create response carries the full object
    ///
    /// When it does not, the object is fetched again right after creation.
    fn create_returns_object(&self) -> bool {
        false
    }

    /// Attach the server-assigned identifier from the create response
    fn identify(&self, planned: &Self::Model, _response: &ApiResponse) -> Result<Self::Model> {
        Ok(planned.clone())
    }

    /// Copy identifiers and server-only values from the tracked record
    fn carry_identity(&self, prior: &Self::Model, planned: Self::Model) -> Self::Model;

    /// Expand a declaration into the update request
    ///
    /// `planned` already carries the identity of `prior`.
    fn update(&self, prior: &Self::Model, planned: &Self::Model) -> Result<Call>;

    /// Whether Update re-reads the object; otherwise the planned record is kept
    fn reread_after_update(&self) -> bool {
        true
    }

    fn delete(&self, current: &Self::Model) -> Result<Call>;

    /// Fetch the remote object, `Gone` when it no longer exists
    fn fetch(&self, client: &Client, current: &Self::Model) -> Result<ReadOutcome<Self::Remote>>;

    /// Map a remote object onto a record
    ///
    /// `basis` is the planned or tracked record, the source for values the
    /// server never returns.
    fn hydrate(&self, remote: Self::Remote, basis: &Self::Model) -> Result<Self::Model>;
}

/// [`Resource`] implementation driving a [`RestDescriptor`]
pub struct RestResource<D> {
    client: Client,
    descriptor: D,
}

impl<D: RestDescriptor> RestResource<D> {
    pub fn new(client: Client, descriptor: D) -> Self {
        Self { client, descriptor }
    }

    /// Read back an object that was just written
    fn refetch(&self, basis: &D::Model) -> OpResult<D::Model> {
        match self.descriptor.fetch(&self.client, basis)? {
            ReadOutcome::Found(remote) => Ok(self.descriptor.hydrate(remote, basis)?),
            ReadOutcome::Gone => Err(Diagnostic::error(
                format!("Unable to read {} after writing it", self.descriptor.type_name()),
                format!(
                    "{} with id {} was not found right after it was written",
                    self.descriptor.type_name(),
                    self.descriptor.id(basis)
                ),
            )
            .into()),
        }
    }
}

impl<D: RestDescriptor> Resource for RestResource<D> {
    type Model = D::Model;

    fn type_name(&self) -> &'static str {
        self.descriptor.type_name()
    }

    fn schema(&self) -> Schema {
        self.descriptor.schema()
    }

    fn id(&self, model: &D::Model) -> String {
        self.descriptor.id(model)
    }

    fn normalize(&self, model: D::Model) -> D::Model {
        self.descriptor.normalize(model)
    }

    fn validate(&self, planned: &D::Model) -> Diagnostics {
        self.descriptor.validate(planned)
    }

    fn create(&self, planned: &D::Model) -> OpResult<D::Model> {
        let call = self.descriptor.create(planned)?;
        let response = self.client.expect(call.request, call.codes)?;
        let identified = self.descriptor.identify(planned, &response)?;

        if self.descriptor.create_returns_object() {
            let remote: D::Remote = response.json()?;
            return Ok(self.descriptor.hydrate(remote, &identified)?);
        }
        self.refetch(&identified)
    }

    fn read(&self, current: &D::Model) -> OpResult<ReadOutcome<D::Model>> {
        match self.descriptor.fetch(&self.client, current)? {
            ReadOutcome::Found(remote) => {
                Ok(ReadOutcome::Found(self.descriptor.hydrate(remote, current)?))
            }
            ReadOutcome::Gone => Ok(ReadOutcome::Gone),
        }
    }

    fn update(&self, prior: &D::Model, planned: &D::Model) -> OpResult<D::Model> {
        let planned = self.descriptor.carry_identity(prior, planned.clone());
        let call = self.descriptor.update(prior, &planned)?;
        self.client.expect(call.request, call.codes)?;

        if self.descriptor.reread_after_update() {
            self.refetch(&planned)
        } else {
            Ok(planned)
        }
    }

    fn delete(&self, current: &D::Model) -> OpResult<DeleteOutcome> {
        let call = self.descriptor.delete(current)?;
        if let ReadOutcome::Gone = self.client.expect_read(call.request, call.codes)? {
            log::debug!(
                "{} {} was already gone",
                self.descriptor.type_name(),
                self.descriptor.id(current)
            );
        }
        Ok(DeleteOutcome::Deleted)
    }

    fn import_skeleton(&self, id: &str) -> OpResult<D::Model> {
        match self.descriptor.skeleton(id) {
            Some(skeleton) => skeleton,
            None => Err(Diagnostic::error(
                "Import not supported",
                format!("{} cannot be imported (id '{id}')", self.descriptor.type_name()),
            )
            .into()),
        }
    }
}
