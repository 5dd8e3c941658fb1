use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "unleash-provider")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative management of an Unleash instance", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Declaration file
    #[arg(short, long, global = true, default_value = "unleash.toml")]
    pub file: PathBuf,

    /// Tracked state file
    #[arg(long, global = true, default_value = "unleash.state.json")]
    pub state: PathBuf,

    /// Unleash server URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Admin API token sent as the Authorization header
    #[arg(long, global = true)]
    pub authorization: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show what apply would change
    Plan(PlanArgs),

    /// Converge the server onto the declaration file
    Apply(ApplyArgs),

    /// Delete every tracked record
    Destroy(DestroyArgs),

    /// Re-read every tracked record from the server
    Refresh,

    /// Start tracking an existing object
    Import {
        /// Address to track it under, e.g. unleash_project.checkout
        address: String,

        /// Server-side identifier of the object
        id: String,
    },

    /// Inspect and edit tracked state
    #[command(subcommand)]
    State(StateCommand),

    /// Run a read-only lookup and print the result as JSON
    Lookup {
        /// Data source name, e.g. unleash_permission
        data_source: String,

        /// Lookup arguments as key=value
        #[arg(value_name = "KEY=VALUE")]
        args: Vec<String>,
    },

    /// Print attribute descriptors
    Schema {
        /// Resource or data source name; lists every kind if omitted
        type_name: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Plan / Apply / Destroy
// ============================================================================

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Limit to a type or a single address (type or type.name)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Number of parallel reads
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Limit to a type or a single address (type or type.name)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Show the plan without executing it
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Number of parallel jobs for independent records
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}

#[derive(Debug, Args)]
pub struct DestroyArgs {
    /// Limit to a type or a single address (type or type.name)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Number of parallel jobs for independent records
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}

// ============================================================================
// State Commands
// ============================================================================

#[derive(Subcommand)]
pub enum StateCommand {
    /// List tracked addresses
    List {
        /// Limit to a type or a single address
        target: Option<String>,
    },

    /// Show one tracked record
    Show {
        /// Address, e.g. unleash_user.ada
        address: String,
    },

    /// Stop tracking records without deleting them
    Rm {
        /// Addresses to forget
        #[arg(required = true)]
        addresses: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "unleash-provider",
            "apply",
            "--yes",
            "--target",
            "unleash_project",
            "--base-url",
            "http://localhost:4242",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:4242"));
        assert_eq!(cli.state, PathBuf::from("unleash.state.json"));
        match cli.command {
            Command::Apply(args) => {
                assert!(args.yes);
                assert_eq!(args.target.as_deref(), Some("unleash_project"));
                assert_eq!(args.jobs, 4);
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_lookup_arguments() {
        let cli = Cli::try_parse_from([
            "unleash-provider",
            "lookup",
            "unleash_permission",
            "name=UPDATE_FEATURE_ENVIRONMENT",
            "environment=production",
        ])
        .unwrap();
        match cli.command {
            Command::Lookup { data_source, args } => {
                assert_eq!(data_source, "unleash_permission");
                assert_eq!(args.len(), 2);
            }
            _ => panic!("expected lookup"),
        }
    }
}
