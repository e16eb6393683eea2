use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod dispatch;
mod output;

use cli::Cli;
use commands::config::load_config;
use commands::workspace::Workspace;
use commands::{CommandContext, CommandError};
use dispatch::{NoStoreCommand, NoStoreDispatch, StoreCommand, StoreDispatch};

/// Environment variable holding the log filter directives.
const LOG_ENV: &str = "TV_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                    }
                });
                eprintln!("{error_json:#}");
            } else {
                eprintln!("Error: {e}");
            }
            error_exit_code(&e)
        }
    }
}

/// Default log filter: `--verbose` lowers it to debug for taskview crates.
fn default_filter(cli: &Cli) -> &'static str {
    if cli.verbose {
        "warn,tv=debug,taskview_core=debug,taskview_model=debug"
    } else {
        "warn"
    }
}

/// Sends logs to stderr so JSON on stdout stays parseable.
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter(cli)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run(cli: &Cli) -> commands::Result<()> {
    // Config, completions and help never open the task file
    if let Some(dispatch) = NoStoreDispatch::try_from_cli(cli) {
        let ctx = CommandContext::from_cli(cli);
        return dispatch.execute(&ctx).await;
    }

    let config = load_config()?;
    let ctx = CommandContext::from_cli(cli).with_config(&config);
    let store = Workspace::resolve_store(cli.store.clone(), &config)?;
    let mut workspace = Workspace::open(store, &config).await?;

    match StoreDispatch::from_cli(cli) {
        Some(dispatch) => dispatch.execute(&ctx, &mut workspace, &config).await,
        None => Ok(()),
    }
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Store(_) => "STORE_ERROR",
        CommandError::Lookup(_) => "NOT_FOUND",
        CommandError::Filter(_) => "FILTER_ERROR",
        CommandError::Recurrence(_) => "RECURRENCE_ERROR",
        CommandError::InvalidDate(_) => "INVALID_DATE",
        CommandError::NotRecurring(_) => "NOT_RECURRING",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the process status for an error.
fn error_status(e: &CommandError) -> u8 {
    match e {
        CommandError::Config(_) | CommandError::Store(_) => 5,
        CommandError::Io(_) => 3,
        CommandError::Lookup(_)
        | CommandError::Filter(_)
        | CommandError::Recurrence(_)
        | CommandError::InvalidDate(_)
        | CommandError::NotRecurring(_)
        | CommandError::Json(_) => 1,
    }
}

/// Returns the exit code for an error.
fn error_exit_code(e: &CommandError) -> ExitCode {
    ExitCode::from(error_status(e))
}
