//! Callback traits for execution
//!
//! These traits allow the executor to report progress and ask for
//! confirmation without depending on a particular terminal UI.

use crate::planner::Action;
use crate::types::{Address, ApplyResult};
use anyhow::Result;

/// Progress callback for execution operations
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback: Send {
    /// Called when starting a batch of changes
    fn on_batch_start(&mut self, count: usize, label: &str);

    /// Called before a change is applied (sequential batches only)
    fn on_change_start(&mut self, address: &Address, action: Action);

    /// Called when a change completes
    fn on_change_complete(&mut self, address: &Address, result: &ApplyResult);

    /// Called when a batch completes
    fn on_batch_complete(&mut self);
}

/// Confirmation callback for user interaction
pub trait ConfirmCallback: Send {
    /// Ask the user to confirm an action
    ///
    /// # Returns
    /// `true` if the user confirmed, `false` otherwise
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_batch_start(&mut self, _count: usize, _label: &str) {}
    fn on_change_start(&mut self, _address: &Address, _action: Action) {}
    fn on_change_complete(&mut self, _address: &Address, _result: &ApplyResult) {}
    fn on_batch_complete(&mut self) {}
}

/// Auto-confirm callback (always returns true)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Auto-decline callback (always returns false)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}
