//! Subcommand implementations

pub mod import;
pub mod lookup;
pub mod plan;
pub mod schema;
pub mod state;

use crate::Context;
use crate::config::ProviderConfig;
use crate::declaration::Declarations;
use crate::provider;
use crate::state::TrackedState;
use crate::ui;
use anyhow::{Result, anyhow};
use declarative::{Diagnostics, Registry};

/// Everything a server-facing command needs
pub struct Session {
    pub declarations: Declarations,
    pub state: TrackedState,
    pub registry: Registry,
}

impl Session {
    /// Load files and connect; settings are checked before any call
    pub fn open(ctx: &Context) -> Result<Self> {
        let declarations = Declarations::load(&ctx.file)?;
        let config = ProviderConfig::resolve(&ctx.provider, &declarations.provider)
            .map_err(failure)?;
        let state = TrackedState::load(&ctx.state)?;
        Ok(Self {
            declarations,
            state,
            registry: provider::registry(&config.client()),
        })
    }

    pub fn save(&mut self, ctx: &Context) -> Result<()> {
        self.state.touch(&ctx.state)
    }
}

/// Print diagnostics and turn them into a command failure
pub fn failure(diags: Diagnostics) -> anyhow::Error {
    ui::diagnostics(&diags);
    let errors = diags.errors().count();
    anyhow!("{} reported", ui::count(errors, "error"))
}

/// Print warnings, failing if any diagnostic is an error
pub fn check(diags: Diagnostics) -> Result<()> {
    if diags.has_errors() {
        return Err(failure(diags));
    }
    ui::diagnostics(&diags);
    Ok(())
}
