//! Execution planner - pairs declarations with tracked records

use crate::diagnostics::Diagnostics;
use crate::diff::ResourceDiff;
use crate::resource::{OpResult, Registry};
use crate::types::Address;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// What the executor will do with one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    /// Delete then create, triggered by a replace-on-change attribute
    Replace,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Replace => write!(f, "replace"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// A single planned change
#[derive(Debug, Clone)]
pub struct PlannedChange {
    pub address: Address,
    pub action: Action,
    /// Tracked record, absent for creations
    pub prior: Option<Value>,
    /// Normalised declaration, absent for deletions
    pub planned: Option<Value>,
    pub diff: ResourceDiff,
}

/// Ordered set of changes
#[derive(Debug, Clone, Default)]
pub struct ExecutionPlan {
    pub changes: Vec<PlannedChange>,
    /// Declared records already matching their tracked state
    pub unchanged: usize,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan changes converging `tracked` onto `declared`
    ///
    /// Every declaration is checked and normalised first; problems in
    /// several declarations are reported together.
    pub fn build(
        registry: &Registry,
        declared: &BTreeMap<Address, Value>,
        tracked: &BTreeMap<Address, Value>,
    ) -> OpResult<Self> {
        let mut plan = Self::new();
        let mut diags = Diagnostics::new();

        for (address, declaration) in declared {
            let resource = match registry.require(&address.type_name) {
                Ok(resource) => resource,
                Err(e) => {
                    diags.extend(e.for_address(&address.to_string()));
                    continue;
                }
            };
            let planned = match resource.normalize(declaration) {
                Ok(planned) => planned,
                Err(e) => {
                    diags.extend(e.for_address(&address.to_string()));
                    continue;
                }
            };
            let schema = resource.schema();

            match tracked.get(address) {
                None => plan.changes.push(PlannedChange {
                    address: address.clone(),
                    action: Action::Create,
                    prior: None,
                    diff: ResourceDiff::for_creation(address.clone(), &schema, &planned),
                    planned: Some(planned),
                }),
                Some(prior) => {
                    let diff = ResourceDiff::compute(address.clone(), &schema, prior, &planned);
                    if diff.is_empty() {
                        plan.unchanged += 1;
                        continue;
                    }
                    let action = if diff.requires_replace() {
                        Action::Replace
                    } else {
                        Action::Update
                    };
                    plan.changes.push(PlannedChange {
                        address: address.clone(),
                        action,
                        prior: Some(prior.clone()),
                        planned: Some(planned),
                        diff,
                    });
                }
            }
        }

        for (address, prior) in tracked {
            if !declared.contains_key(address) {
                plan.changes.push(Self::deletion(address, prior));
            }
        }

        diags.into_result()?;
        Ok(plan)
    }

    /// Plan deletion of every tracked record
    pub fn destroy_all(tracked: &BTreeMap<Address, Value>) -> Self {
        Self {
            changes: tracked
                .iter()
                .map(|(address, prior)| Self::deletion(address, prior))
                .collect(),
            unchanged: 0,
        }
    }

    fn deletion(address: &Address, prior: &Value) -> PlannedChange {
        PlannedChange {
            address: address.clone(),
            action: Action::Delete,
            prior: Some(prior.clone()),
            planned: None,
            diff: ResourceDiff {
                address: address.clone(),
                changes: Vec::new(),
            },
        }
    }

    /// Filter plan to only include changes matching a target pattern
    ///
    /// Target format: "type" or "type.name"
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (type_name, name) = parse_target(t);
                Self {
                    changes: self
                        .changes
                        .into_iter()
                        .filter(|c| matches_filter(&c.address, type_name, name))
                        .collect(),
                    unchanged: self.unchanged,
                }
            }
        }
    }

    /// Deletions, executed before everything else
    pub fn deletions(&self) -> impl Iterator<Item = &PlannedChange> {
        self.changes.iter().filter(|c| c.action == Action::Delete)
    }

    /// Creations, updates and replacements
    pub fn upserts(&self) -> impl Iterator<Item = &PlannedChange> {
        self.changes.iter().filter(|c| c.action != Action::Delete)
    }

    pub fn count(&self, action: Action) -> usize {
        self.changes.iter().filter(|c| c.action == action).count()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Parse a target string like "type.name" into (type, name)
fn parse_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('.') {
        Some((type_name, name)) => (type_name, Some(name)),
        None => (target, None),
    }
}

/// Check if an address matches the filter criteria
pub fn matches_filter(address: &Address, type_name: &str, name: Option<&str>) -> bool {
    address.type_name == type_name && name.is_none_or(|n| address.name == n)
}

/// Check if an address matches an optional target pattern
pub fn matches_target(address: &Address, target: Option<&str>) -> bool {
    target.is_none_or(|t| {
        let (type_name, name) = parse_target(t);
        matches_filter(address, type_name, name)
    })
}
