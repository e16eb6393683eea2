//! Command implementations for the tv CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod agenda;
pub mod completions;
pub mod config;
pub mod done;
pub mod list;
pub mod options;
pub mod query;
pub mod status;
pub mod views;
pub mod workspace;

use chrono::NaiveDate;
use taskview_core::filter::FilterError;
use taskview_core::recurrence::RecurrenceError;
use taskview_core::{LookupError, StoreError};

use crate::cli::Cli;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Task file error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Task or view lookup failed.
    #[error("{0}")]
    Lookup(#[from] LookupError),

    /// Invalid filter argument.
    #[error("filter error: {0}")]
    Filter(String),

    /// Unparseable recurrence rule on a task.
    #[error("recurrence error: {0}")]
    Recurrence(#[from] RecurrenceError),

    /// Invalid date argument.
    #[error("invalid date '{0}'. Use YYYY-MM-DD or today, tomorrow, in-3-days, 2-days-ago")]
    InvalidDate(String),

    /// Skip was asked for on a one-off task.
    #[error("'{0}' is not a recurring task; only recurring instances can be skipped")]
    NotRecurring(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<FilterError> for CommandError {
    fn from(err: FilterError) -> Self {
        CommandError::Filter(err.to_string())
    }
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Whether to be verbose.
    pub verbose: bool,
    /// Day relative dates resolve against.
    pub today: NaiveDate,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color && std::env::var_os("NO_COLOR").is_none(),
            quiet: cli.quiet,
            verbose: cli.verbose,
            today: taskview_model::date::today(),
        }
    }

    /// Applies the `[output]` settings from the config file.
    pub fn with_config(mut self, config: &config::Config) -> Self {
        if config.output.color == Some(false) {
            self.use_colors = false;
        }
        self
    }
}
