//! # Declarative
//!
//! A framework for declarative resource lifecycles.
//!
//! This crate provides the contract shared by every managed entity kind:
//! declare desired records, read what exists remotely, and converge through
//! Create/Read/Update/Delete/Import calls.
//!
//! ## Core Concepts
//!
//! - **Schema**: per-attribute classification (required, optional,
//!   optional+computed, computed) with sensitive and replace-on-change flags
//! - **Resource**: a typed lifecycle adapter for one entity kind
//! - **DataSource**: a typed read-only lookup
//! - **Diagnostics**: accumulated errors and warnings with attribute paths
//! - **ExecutionPlan**: creations, updates, replacements and deletions
//!   computed from declarations and tracked records
//! - **Executor**: applies a plan with parallelism across records
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{
//!     Attribute, AttributeType, DeleteOutcome, OpResult, ReadOutcome, Registry,
//!     Resource, Schema,
//! };
//!
//! struct Environments { client: Client }
//!
//! impl Resource for Environments {
//!     type Model = Environment;
//!
//!     fn type_name(&self) -> &'static str { "unleash_environment" }
//!
//!     fn schema(&self) -> Schema {
//!         Schema::new("An environment")
//!             .with_attribute(
//!                 Attribute::required("name", AttributeType::String, "Name")
//!                     .replace_on_change(),
//!             )
//!             .with_attribute(Attribute::required("type", AttributeType::String, "Type"))
//!     }
//!
//!     fn id(&self, model: &Environment) -> String { model.name.clone() }
//!
//!     fn create(&self, planned: &Environment) -> OpResult<Environment> { /* ... */ }
//!     fn read(&self, current: &Environment) -> OpResult<ReadOutcome<Environment>> { /* ... */ }
//!     fn update(&self, prior: &Environment, planned: &Environment) -> OpResult<Environment> { /* ... */ }
//!     fn delete(&self, current: &Environment) -> OpResult<DeleteOutcome> { /* ... */ }
//! }
//!
//! let mut registry = Registry::new();
//! registry.register(Environments { client });
//! let plan = ExecutionPlan::build(&registry, &declared, &tracked)?;
//! let report = execute_simple(&plan, &registry, &ExecuteOptions::default())?;
//! ```
//!
//! ## Provider Traits
//!
//! The crate uses traits for dependency injection:
//!
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations
//!
//! This allows the crate to be used without hard dependencies on
//! specific UI frameworks or remote clients.

pub mod context;
pub mod diagnostics;
pub mod diff;
pub mod executor;
pub mod lookup;
pub mod planner;
pub mod resource;
pub mod schema;
pub mod types;

// Re-export main types at crate root
pub use context::{AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use diff::{AttributeChange, ResourceDiff};
pub use executor::{
    ChangeOutcome, ExecutionReport, RecordUpdate, RefreshReport, execute, execute_simple, refresh,
};
pub use lookup::{find_by_key, find_in_tiers};
pub use planner::{Action, ExecutionPlan, PlannedChange, matches_target};
pub use resource::{
    BoxedDataSource, BoxedResource, DataSource, DynDataSource, DynResource, OpResult, Registry,
    Resource, erase, erase_data_source,
};
pub use schema::{Attribute, AttributeKind, AttributeType, Schema};
pub use types::{
    Address, AddressParseError, ApplyResult, DeleteOutcome, ExecuteOptions, ExecuteSummary,
    ReadOutcome,
};
