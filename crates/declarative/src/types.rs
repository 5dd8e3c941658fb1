//! Core types for declarative resource management

use crate::diagnostics::Diagnostics;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Address of a managed record: `type_name.name`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    pub type_name: String,
    pub name: String,
}

impl Address {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.name)
    }
}

/// Error returned when an address string is malformed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid address '{0}', expected <type>.<name>")]
pub struct AddressParseError(String);

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((type_name, name))
                if !type_name.is_empty() && !name.is_empty() && !name.contains('.') =>
            {
                Ok(Self::new(type_name, name))
            }
            _ => Err(AddressParseError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Address {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

/// Outcome of a Read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome<M> {
    /// Remote object exists; hydrated record
    Found(M),
    /// Remote object no longer exists; drop the record
    Gone,
}

impl<M> ReadOutcome<M> {
    pub fn map<N>(self, f: impl FnOnce(M) -> N) -> ReadOutcome<N> {
        match self {
            Self::Found(m) => ReadOutcome::Found(f(m)),
            Self::Gone => ReadOutcome::Gone,
        }
    }

    pub fn found(self) -> Option<M> {
        match self {
            Self::Found(m) => Some(m),
            Self::Gone => None,
        }
    }
}

/// Outcome of a Delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Remote object removed (or already absent)
    Deleted,
    /// Record dropped from tracking but left in place remotely
    Forgotten { reason: String },
}

/// Result of applying a planned change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyResult {
    /// No changes needed
    NoChange,
    /// Record was created
    Created,
    /// Record was updated in place
    Updated,
    /// Record was destroyed and recreated
    Replaced,
    /// Record was removed
    Removed,
    /// Record was dropped from tracking without a remote delete
    Forgotten { reason: String },
    /// Apply failed
    Failed { diagnostics: Diagnostics },
    /// Apply was skipped
    Skipped { reason: String },
}

impl ApplyResult {
    /// Check if the result represents success (no failure)
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            Self::Created | Self::Updated | Self::Replaced | Self::Removed | Self::Forgotten { .. }
        )
    }
}

/// Summary of execution results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub updated: usize,
    pub replaced: usize,
    pub removed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub no_change: usize,
}

impl ExecuteSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.updated + self.replaced + self.removed
    }

    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of records processed
    pub fn total(&self) -> usize {
        self.total_changes() + self.skipped + self.failed + self.no_change
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, result: &ApplyResult) {
        match result {
            ApplyResult::NoChange => self.no_change += 1,
            ApplyResult::Created => self.created += 1,
            ApplyResult::Updated => self.updated += 1,
            ApplyResult::Replaced => self.replaced += 1,
            ApplyResult::Removed | ApplyResult::Forgotten { .. } => self.removed += 1,
            ApplyResult::Failed { .. } => self.failed += 1,
            ApplyResult::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Options for execution
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Number of parallel jobs for independent records
    pub jobs: usize,
    /// Verbose output
    pub verbose: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 4,
            verbose: false,
        }
    }
}
