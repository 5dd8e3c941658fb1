//! Execution engine - applies planned changes and refreshes tracked records
//!
//! Changes to different records are independent, so each batch runs on a
//! rayon pool sized by [`ExecuteOptions::jobs`]. Deletions run as a batch
//! before creations and updates.

use crate::context::{ConfirmCallback, ProgressCallback};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::planner::{Action, ExecutionPlan, PlannedChange};
use crate::resource::{DynResource, Registry};
use crate::types::{Address, ApplyResult, DeleteOutcome, ExecuteOptions, ExecuteSummary, ReadOutcome};
use anyhow::Result;
use rayon::prelude::*;
use serde_json::Value;
use std::collections::BTreeMap;

/// What happens to the tracked record after a change
#[derive(Debug, Clone, PartialEq)]
pub enum RecordUpdate {
    /// Leave tracking untouched
    Keep,
    /// Track this record
    Store(Value),
    /// Stop tracking
    Drop,
}

/// Result of one change, to be folded into tracked state by the caller
#[derive(Debug, Clone)]
pub struct ChangeOutcome {
    pub address: Address,
    pub action: Action,
    pub result: ApplyResult,
    pub record: RecordUpdate,
    /// Non-fatal diagnostics raised while applying
    pub warnings: Diagnostics,
}

/// Everything an execution produced
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub summary: ExecuteSummary,
    pub outcomes: Vec<ChangeOutcome>,
}

impl ExecutionReport {
    /// Fold outcomes into a tracked-record map
    pub fn apply_to(&self, tracked: &mut BTreeMap<Address, Value>) {
        for outcome in &self.outcomes {
            match &outcome.record {
                RecordUpdate::Keep => {}
                RecordUpdate::Store(value) => {
                    tracked.insert(outcome.address.clone(), value.clone());
                }
                RecordUpdate::Drop => {
                    tracked.remove(&outcome.address);
                }
            }
        }
    }

    /// All error diagnostics, tagged with their address
    pub fn errors(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();
        for outcome in &self.outcomes {
            if let ApplyResult::Failed { diagnostics } = &outcome.result {
                diags.extend(diagnostics.clone().for_address(&outcome.address.to_string()));
            }
        }
        diags
    }
}

/// Execute a plan with the given options and callbacks
///
/// # Arguments
/// * `plan` - The execution plan to run
/// * `registry` - Resources by type name
/// * `opts` - Execution options (dry_run, jobs, verbose)
/// * `progress` - Progress callback
/// * `confirm` - Confirmation callback
pub fn execute<P, C>(
    plan: &ExecutionPlan,
    registry: &Registry,
    opts: &ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecutionReport>
where
    P: ProgressCallback,
    C: ConfirmCallback,
{
    if plan.is_empty() {
        return Ok(ExecutionReport::default());
    }

    if opts.dry_run {
        return Ok(ExecutionReport::default());
    }

    if !confirm.confirm("Apply changes?")? {
        let mut report = ExecutionReport::default();
        report.summary.skipped = plan.len();
        return Ok(report);
    }

    let mut report = ExecutionReport::default();

    let deletions: Vec<&PlannedChange> = plan.deletions().collect();
    let upserts: Vec<&PlannedChange> = plan.upserts().collect();

    for (label, batch) in [("destroy", deletions), ("apply", upserts)] {
        if batch.is_empty() {
            continue;
        }
        progress.on_batch_start(batch.len(), label);
        let outcomes = execute_batch(&batch, registry, opts.jobs, progress)?;
        for outcome in outcomes {
            report.summary.add_result(&outcome.result);
            report.outcomes.push(outcome);
        }
        progress.on_batch_complete();
    }

    Ok(report)
}

/// Simple execution without callbacks
///
/// For basic use cases where you don't need progress or confirmation.
pub fn execute_simple(
    plan: &ExecutionPlan,
    registry: &Registry,
    opts: &ExecuteOptions,
) -> Result<ExecutionReport> {
    use crate::context::{AutoConfirm, NoProgress};

    execute(plan, registry, opts, &mut NoProgress, &mut AutoConfirm)
}

/// Execute a batch of changes
fn execute_batch<P: ProgressCallback>(
    changes: &[&PlannedChange],
    registry: &Registry,
    jobs: usize,
    progress: &mut P,
) -> Result<Vec<ChangeOutcome>> {
    if jobs <= 1 || changes.len() == 1 {
        let mut outcomes = Vec::with_capacity(changes.len());
        for change in changes {
            progress.on_change_start(&change.address, change.action);
            let outcome = apply_change(change, registry);
            progress.on_change_complete(&outcome.address, &outcome.result);
            outcomes.push(outcome);
        }
        Ok(outcomes)
    } else {
        // The progress callback is not thread-safe, so results are
        // reported after the pool finishes.
        let outcomes = run_parallel(changes, jobs, |change| apply_change(change, registry))?;
        for outcome in &outcomes {
            progress.on_change_complete(&outcome.address, &outcome.result);
        }
        Ok(outcomes)
    }
}

fn run_parallel<T, R, F>(items: &[T], jobs: usize, f: F) -> Result<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create thread pool: {}", e))?;

    Ok(pool.install(|| items.par_iter().map(&f).collect()))
}

fn failed(change: &PlannedChange, diagnostics: Diagnostics, record: RecordUpdate) -> ChangeOutcome {
    ChangeOutcome {
        address: change.address.clone(),
        action: change.action,
        result: ApplyResult::Failed { diagnostics },
        record,
        warnings: Diagnostics::new(),
    }
}

fn missing(what: &str) -> Diagnostics {
    Diagnostic::error("Invalid plan", format!("planned change has no {what} record")).into()
}

/// Apply a single change
fn apply_change(change: &PlannedChange, registry: &Registry) -> ChangeOutcome {
    let resource = match registry.require(&change.address.type_name) {
        Ok(resource) => resource,
        Err(diags) => return failed(change, diags, RecordUpdate::Keep),
    };

    match change.action {
        Action::Create => create(change, resource, ApplyResult::Created),
        Action::Update => {
            let (Some(prior), Some(planned)) = (&change.prior, &change.planned) else {
                return failed(change, missing("prior or planned"), RecordUpdate::Keep);
            };
            match resource.update(prior, planned) {
                Ok(record) => ChangeOutcome {
                    address: change.address.clone(),
                    action: change.action,
                    result: ApplyResult::Updated,
                    record: RecordUpdate::Store(record),
                    warnings: Diagnostics::new(),
                },
                Err(diags) => failed(change, diags, RecordUpdate::Keep),
            }
        }
        Action::Replace => match delete(change, resource) {
            Ok(warnings) => {
                let mut outcome = create(change, resource, ApplyResult::Replaced);
                outcome.warnings.extend(warnings);
                outcome
            }
            Err(outcome) => outcome,
        },
        Action::Delete => match delete(change, resource) {
            Ok(warnings) => {
                let result = match warnings.iter().next() {
                    Some(warning) => ApplyResult::Forgotten {
                        reason: warning.detail.clone(),
                    },
                    None => ApplyResult::Removed,
                };
                ChangeOutcome {
                    address: change.address.clone(),
                    action: change.action,
                    result,
                    record: RecordUpdate::Drop,
                    warnings,
                }
            }
            Err(outcome) => outcome,
        },
    }
}

fn create(change: &PlannedChange, resource: &dyn DynResource, success: ApplyResult) -> ChangeOutcome {
    // A replacement has already removed the old object.
    let on_failure = if change.action == Action::Replace {
        RecordUpdate::Drop
    } else {
        RecordUpdate::Keep
    };
    let Some(planned) = &change.planned else {
        return failed(change, missing("planned"), on_failure);
    };
    match resource.create(planned) {
        Ok(record) => ChangeOutcome {
            address: change.address.clone(),
            action: change.action,
            result: success,
            record: RecordUpdate::Store(record),
            warnings: Diagnostics::new(),
        },
        Err(diags) => failed(change, diags, on_failure),
    }
}

/// Delete the prior record, returning warnings for records left in place
fn delete(change: &PlannedChange, resource: &dyn DynResource) -> Result<Diagnostics, ChangeOutcome> {
    let Some(prior) = &change.prior else {
        return Err(failed(change, missing("prior"), RecordUpdate::Keep));
    };
    match resource.delete(prior) {
        Ok(DeleteOutcome::Deleted) => Ok(Diagnostics::new()),
        Ok(DeleteOutcome::Forgotten { reason }) => {
            log::warn!("{} removed from state but not deleted: {}", change.address, reason);
            Ok(Diagnostic::warning("Resource Not Deleted", reason)
                .for_address(change.address.to_string())
                .into())
        }
        Err(diags) => Err(failed(change, diags, RecordUpdate::Keep)),
    }
}

/// Result of refreshing tracked records
#[derive(Debug, Clone, Default)]
pub struct RefreshReport {
    /// Records still present remotely, freshly hydrated
    pub refreshed: BTreeMap<Address, Value>,
    /// Records whose remote object vanished
    pub dropped: Vec<Address>,
    /// Errors; records that failed to refresh keep their old value
    pub diagnostics: Diagnostics,
}

/// Read every tracked record, dropping those that vanished remotely
pub fn refresh(
    registry: &Registry,
    tracked: &BTreeMap<Address, Value>,
    jobs: usize,
) -> Result<RefreshReport> {
    let entries: Vec<(&Address, &Value)> = tracked.iter().collect();
    let results = run_parallel(&entries, jobs, |(address, record)| {
        let outcome = registry
            .require(&address.type_name)
            .and_then(|resource| resource.read(record));
        ((*address).clone(), (*record).clone(), outcome)
    })?;

    let mut report = RefreshReport::default();
    for (address, record, outcome) in results {
        match outcome {
            Ok(ReadOutcome::Found(value)) => {
                report.refreshed.insert(address, value);
            }
            Ok(ReadOutcome::Gone) => report.dropped.push(address),
            Err(diags) => {
                report.diagnostics.extend(diags.for_address(&address.to_string()));
                report.refreshed.insert(address, record);
            }
        }
    }
    Ok(report)
}
