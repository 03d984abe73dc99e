//! classfold CLI: collapses utility-class lists into generated class names.
//!
//! Provides `classfold init` for project scaffolding, `classfold run` for the
//! incremental rewrite, and `classfold status` for inspecting what the next
//! run would touch.

#![warn(missing_docs)]

mod init;
mod pipeline;
mod run;
mod status;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// classfold: incremental utility-class rewriting.
#[derive(Parser, Debug)]
#[command(name = "classfold", version, about = "Incremental utility-class rewriter")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `classfold.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default `classfold.toml` and an example utility table.
    Init {
        /// Directory to initialize. Defaults to the current directory.
        dir: Option<String>,
    },
    /// Rewrite changed files under the scan root.
    Run(RunArgs),
    /// Show which files changed since the last run.
    Status(StatusArgs),
}

/// Arguments for the `classfold run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Compute the rewrite without writing files or the cache.
    #[arg(long)]
    pub dry_run: bool,

    /// Treat class lists with the same tokens in a different order as distinct.
    #[arg(long)]
    pub order_matters: bool,

    /// Never call the naming service; use hash-derived names only.
    #[arg(long)]
    pub no_naming: bool,

    /// Maximum number of naming service calls for this run.
    #[arg(long)]
    pub max_invocations: Option<usize>,

    /// Output format for the run report.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `classfold status` subcommand.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Output format for the status report.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.quiet, cli.verbose);

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Init { dir } => init::run(dir, &global),
        Command::Run(ref args) => run::run(args, &global),
        Command::Status(ref args) => status::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Returns the default log filter for the verbosity flags.
fn default_filter(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the flags.
fn init_tracing(quiet: bool, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(quiet, verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
