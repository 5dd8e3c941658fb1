//! Console integration for the declarative executor

use anyhow::Result;
use colored::Colorize;
use declarative::{
    Action, Address, ApplyResult, ConfirmCallback, ExecuteOptions, ExecuteSummary,
    ExecutionPlan, ExecutionReport, ProgressCallback, Registry,
};

use super::differ::display_plan;
use crate::ui;

/// Prompts on the terminal unless `--yes` was given
pub struct TerminalConfirm {
    pub assume_yes: bool,
}

impl ConfirmCallback for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        println!();
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(confirmed)
    }
}

/// Prints one line per finished change
pub struct ConsoleProgress {
    pub verbose: bool,
}

impl ProgressCallback for ConsoleProgress {
    fn on_batch_start(&mut self, count: usize, label: &str) {
        let verb = match label {
            "destroy" => "Destroying",
            _ => "Applying",
        };
        println!();
        println!("  {} {verb} {}...", "→".cyan(), ui::count(count, "change"));
    }

    fn on_change_start(&mut self, address: &Address, action: Action) {
        if self.verbose {
            println!("    {} {address} ({action})", "…".dimmed());
        }
    }

    fn on_change_complete(&mut self, address: &Address, result: &ApplyResult) {
        match result {
            ApplyResult::Created => println!("    {} {address} created", "✓".green()),
            ApplyResult::Updated => println!("    {} {address} updated", "✓".green()),
            ApplyResult::Replaced => println!("    {} {address} replaced", "✓".green()),
            ApplyResult::Removed => println!("    {} {address} destroyed", "✓".green()),
            ApplyResult::Forgotten { .. } => {
                println!("    {} {address} removed from state only", "⚠".yellow());
            }
            ApplyResult::Failed { diagnostics } => {
                println!("    {} {address} {}", "✗".red(), "failed".red());
                for diag in diagnostics.errors() {
                    println!("      {}", diag.summary.dimmed());
                }
            }
            ApplyResult::Skipped { reason } => {
                println!("    {} {address} skipped: {reason}", "○".dimmed());
            }
            ApplyResult::NoChange => {}
        }
    }

    fn on_batch_complete(&mut self) {}
}

/// Show the plan, confirm and run it
///
/// Returns `None` for a dry run.
pub fn run(
    plan: &ExecutionPlan,
    registry: &Registry,
    opts: &ExecuteOptions,
    assume_yes: bool,
) -> Result<Option<ExecutionReport>> {
    display_plan(plan);

    if plan.is_empty() {
        return Ok(Some(ExecutionReport::default()));
    }

    if opts.dry_run {
        println!();
        println!("  {} Dry run - no changes made", "ℹ".blue());
        return Ok(None);
    }

    let mut progress = ConsoleProgress {
        verbose: opts.verbose,
    };
    let mut confirm = TerminalConfirm { assume_yes };
    let report = declarative::execute(plan, registry, opts, &mut progress, &mut confirm)?;

    if report.outcomes.is_empty() && report.summary.skipped > 0 {
        println!();
        println!("  {} Aborted", "✗".red());
        return Ok(Some(report));
    }

    for outcome in &report.outcomes {
        ui::diagnostics(&outcome.warnings);
    }
    ui::diagnostics(&report.errors());
    print_summary(&report.summary);
    Ok(Some(report))
}

/// Print final summary
pub fn print_summary(summary: &ExecuteSummary) {
    println!();
    if summary.is_success() {
        println!("  {} Changes applied successfully!", "✓".green().bold());
    } else {
        println!("  {} Changes applied with errors", "⚠".yellow().bold());
    }

    if summary.created > 0 {
        println!("    • {} created", ui::count(summary.created, "record"));
    }
    if summary.updated > 0 {
        println!("    • {} updated", ui::count(summary.updated, "record"));
    }
    if summary.replaced > 0 {
        println!("    • {} replaced", ui::count(summary.replaced, "record"));
    }
    if summary.removed > 0 {
        println!("    • {} removed", ui::count(summary.removed, "record"));
    }
    if summary.skipped > 0 {
        println!("    • {} skipped", ui::count(summary.skipped, "record"));
    }
    if summary.failed > 0 {
        println!("    • {} {}", summary.failed, "failed".red());
    }
}
