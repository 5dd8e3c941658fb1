mod cli;
mod commands;
mod config;
mod datasource;
mod declaration;
mod engine;
mod provider;
mod resource;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use config::ProviderBlock;
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    /// Declaration file
    pub file: PathBuf,
    /// Tracked state file
    pub state: PathBuf,
    /// Provider settings given as flags
    pub provider: ProviderBlock,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        file: cli.file,
        state: cli.state,
        provider: ProviderBlock {
            base_url: cli.base_url,
            authorization: cli.authorization,
        },
    };

    match cli.command {
        Command::Plan(args) => commands::plan::plan(&ctx, &args),
        Command::Apply(args) => commands::plan::apply(&ctx, &args),
        Command::Destroy(args) => commands::plan::destroy(&ctx, &args),
        Command::Refresh => commands::plan::refresh(&ctx),
        Command::Import { address, id } => commands::import::run(&ctx, &address, &id),
        Command::State(cmd) => commands::state::run(&ctx, cmd),
        Command::Lookup { data_source, args } => {
            commands::lookup::run(&ctx, &data_source, &args)
        }
        Command::Schema { type_name, json } => {
            commands::schema::run(&ctx, type_name.as_deref(), json)
        }
        Command::Completions { shell } => {
            generate(shell, &mut Cli::command(), "unleash-provider", &mut io::stdout());
            Ok(())
        }
    }
}
