//! plan, apply, destroy and refresh

use super::{Session, check, failure};
use crate::Context;
use crate::cli::{ApplyArgs, DestroyArgs, PlanArgs};
use crate::engine::{self, differ};
use crate::ui;
use anyhow::{Result, bail};
use declarative::{ExecuteOptions, ExecutionPlan, ExecutionReport};

const REFRESH_JOBS: usize = 4;

/// Read every tracked record, dropping those gone remotely
fn refresh_tracked(session: &mut Session, jobs: usize) -> Result<()> {
    if session.state.records.is_empty() {
        return Ok(());
    }
    log::info!("Refreshing {} tracked records", session.state.records.len());

    let report = declarative::refresh(&session.registry, &session.state.records, jobs)?;
    for address in &report.dropped {
        ui::warn(&format!("{address} no longer exists remotely, removed from state"));
    }
    session.state.records = report.refreshed;
    check(report.diagnostics)
}

fn build_plan(session: &Session, target: Option<&str>) -> Result<ExecutionPlan> {
    let plan = ExecutionPlan::build(
        &session.registry,
        &session.declarations.records,
        &session.state.records,
    )
    .map_err(failure)?;
    Ok(plan.filter_by_target(target))
}

fn finish(ctx: &Context, session: &mut Session, report: &ExecutionReport) -> Result<()> {
    report.apply_to(&mut session.state.records);
    session.save(ctx)?;
    if !report.summary.is_success() {
        bail!("{} failed", ui::count(report.summary.failed, "change"));
    }
    Ok(())
}

pub fn plan(ctx: &Context, args: &PlanArgs) -> Result<()> {
    let mut session = Session::open(ctx)?;
    refresh_tracked(&mut session, args.jobs)?;
    let plan = build_plan(&session, args.target.as_deref())?;
    differ::display_plan(&plan);
    Ok(())
}

pub fn apply(ctx: &Context, args: &ApplyArgs) -> Result<()> {
    let mut session = Session::open(ctx)?;
    refresh_tracked(&mut session, args.jobs)?;
    let plan = build_plan(&session, args.target.as_deref())?;

    let opts = ExecuteOptions {
        dry_run: args.dry_run,
        jobs: args.jobs,
        verbose: ctx.verbose > 0,
    };
    match engine::run(&plan, &session.registry, &opts, args.yes)? {
        Some(report) => finish(ctx, &mut session, &report),
        None => Ok(()),
    }
}

pub fn destroy(ctx: &Context, args: &DestroyArgs) -> Result<()> {
    let mut session = Session::open(ctx)?;
    refresh_tracked(&mut session, args.jobs)?;
    let plan = ExecutionPlan::destroy_all(&session.state.records)
        .filter_by_target(args.target.as_deref());

    let opts = ExecuteOptions {
        dry_run: false,
        jobs: args.jobs,
        verbose: ctx.verbose > 0,
    };
    match engine::run(&plan, &session.registry, &opts, args.yes)? {
        Some(report) => finish(ctx, &mut session, &report),
        None => Ok(()),
    }
}

pub fn refresh(ctx: &Context) -> Result<()> {
    let mut session = Session::open(ctx)?;
    refresh_tracked(&mut session, REFRESH_JOBS)?;
    session.save(ctx)?;
    if !ctx.quiet {
        ui::success(&format!(
            "Refreshed {}",
            ui::count(session.state.records.len(), "record")
        ));
    }
    Ok(())
}
