//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the tv CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use taskview_core::filter::SortKey;

/// tv - Filtered task lists and agenda views over a local task file
#[derive(Parser, Debug)]
#[command(name = "tv")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Task file to read and write (default: from config, then the data dir)
    #[arg(long, global = true, env = "TV_STORE")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List tasks matching a filter
    #[command(alias = "l")]
    List {
        #[command(flatten)]
        filter: FilterArgs,

        /// Sort by field (default: the view's sort, else due)
        #[arg(long, value_enum)]
        sort: Option<SortField>,

        /// Reverse sort order
        #[arg(long)]
        reverse: bool,

        /// Group by key (status, priority, tags, context, project, due, scheduled, user:<id>)
        #[arg(short, long)]
        group: Option<String>,

        /// Subgroup key within each group
        #[arg(long, requires = "group")]
        subgroup: Option<String>,

        /// Limit results (default: 50)
        #[arg(long, default_value = "50")]
        limit: usize,

        /// Show all matches (no limit)
        #[arg(long)]
        all: bool,
    },

    /// Show tasks per day with an overdue section
    #[command(alias = "a")]
    Agenda {
        #[command(flatten)]
        filter: FilterArgs,

        /// Number of days to show (default: from config, else 7)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=366))]
        days: Option<u32>,

        /// First day of the agenda (YYYY-MM-DD or today, tomorrow, in-3-days...)
        #[arg(long)]
        from: Option<String>,

        /// Hide the overdue section
        #[arg(long)]
        no_overdue: bool,
    },

    /// Show the status of a task on a day
    #[command(alias = "st")]
    Status {
        /// Task path, title or file name
        task: String,

        /// Day to inspect (default: today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Toggle completion of a task instance
    #[command(alias = "d", alias = "toggle")]
    Done {
        /// Task path, title or file name
        task: String,

        /// Instance day (default: today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Toggle the skip mark of a recurring task instance
    Skip {
        /// Task path, title or file name
        task: String,

        /// Instance day (default: today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Manage saved views
    #[command(alias = "v")]
    Views {
        #[command(subcommand)]
        command: Option<ViewsCommands>,
    },

    /// Show filterable properties, operators and known values
    #[command(alias = "props")]
    Options,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Filter arguments shared by list, agenda and views save.
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Start from a saved view (name or id)
    #[arg(long)]
    pub view: Option<String>,

    /// Condition as property:operator[:value] (repeatable)
    #[arg(short = 'w', long = "where", value_name = "CONDITION", action = clap::ArgAction::Append)]
    pub conditions: Vec<String>,

    /// Match any condition instead of all
    #[arg(long)]
    pub any: bool,

    /// Quick search on title
    #[arg(short, long)]
    pub search: Option<String>,
}

/// Sort fields for list command
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Due,
    Scheduled,
    Priority,
    Status,
    Title,
    Created,
    Completed,
    None,
}

impl From<SortField> for SortKey {
    fn from(field: SortField) -> Self {
        match field {
            SortField::Due => SortKey::Due,
            SortField::Scheduled => SortKey::Scheduled,
            SortField::Priority => SortKey::Priority,
            SortField::Status => SortKey::Status,
            SortField::Title => SortKey::Title,
            SortField::Created => SortKey::DateCreated,
            SortField::Completed => SortKey::CompletedDate,
            SortField::None => SortKey::None,
        }
    }
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Saved view subcommands
#[derive(Subcommand, Debug)]
pub enum ViewsCommands {
    /// List saved views
    List,

    /// Show a view's query
    Show {
        /// View name or id
        name: String,
    },

    /// Save the given filter as a view
    Save {
        /// View name
        name: String,

        #[command(flatten)]
        filter: FilterArgs,

        /// Sort key stored with the view
        #[arg(long, value_enum)]
        sort: Option<SortField>,

        /// Group key stored with the view
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Delete a saved view
    Delete {
        /// View name or id
        name: String,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Open config in $EDITOR
    Edit,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// Configuration value
        value: String,
    },

    /// Print config file path
    Path,
}
