//! Command dispatch module for routing CLI commands to their handlers.
//!
//! Commands split into two kinds: those that never touch the task file
//! (config, completions, help) and those that run against an opened
//! [`Workspace`].

use crate::cli::{Cli, Commands, ConfigCommands, FilterArgs, Shell, SortField, ViewsCommands};
use crate::commands::config::Config;
use crate::commands::done::ToggleKind;
use crate::commands::workspace::Workspace;
use crate::commands::{self, CommandContext, CommandError, Result};

/// Trait for commands that run without opening the task file.
#[allow(async_fn_in_trait)]
pub trait NoStoreCommand {
    async fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// Trait for commands that read or write the task file.
#[allow(async_fn_in_trait)]
pub trait StoreCommand {
    async fn execute(
        &self,
        ctx: &CommandContext,
        workspace: &mut Workspace,
        config: &Config,
    ) -> Result<()>;
}

/// Commands that don't need the task file.
#[derive(Debug)]
pub enum NoStoreDispatch<'a> {
    Config(&'a Option<ConfigCommands>),
    Completions(Shell),
    Help,
}

impl<'a> NoStoreDispatch<'a> {
    /// Returns None if the command needs the task file.
    pub fn try_from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::Config { command }) => Some(Self::Config(command)),
            Some(Commands::Completions { shell }) => Some(Self::Completions(*shell)),
            None => Some(Self::Help),
            _ => None,
        }
    }
}

impl NoStoreCommand for NoStoreDispatch<'_> {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::Config(command) => dispatch_config(ctx, command).await,
            Self::Completions(shell) => {
                commands::completions::execute(*shell).map_err(CommandError::Io)
            }
            Self::Help => {
                if !ctx.quiet {
                    println!("tv - filtered task views and agenda");
                    println!("Use --help for usage information");
                }
                Ok(())
            }
        }
    }
}

async fn dispatch_config(ctx: &CommandContext, command: &Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::execute_show(ctx),
        Some(ConfigCommands::Edit) => commands::config::execute_edit(ctx).await,
        Some(ConfigCommands::Set { key, value }) => {
            let opts = commands::config::ConfigSetOptions {
                key: key.clone(),
                value: value.clone(),
            };
            commands::config::execute_set(ctx, &opts)
        }
        Some(ConfigCommands::Path) => commands::config::execute_path(ctx),
    }
}

/// Commands that run against the task file.
#[derive(Debug)]
pub enum StoreDispatch<'a> {
    List {
        filter: &'a FilterArgs,
        sort: Option<SortField>,
        reverse: bool,
        group: &'a Option<String>,
        subgroup: &'a Option<String>,
        limit: usize,
        all: bool,
    },
    Agenda {
        filter: &'a FilterArgs,
        days: Option<u32>,
        from: &'a Option<String>,
        no_overdue: bool,
    },
    Status {
        task: &'a str,
        date: &'a Option<String>,
    },
    Toggle {
        task: &'a str,
        date: &'a Option<String>,
        kind: ToggleKind,
    },
    Views(&'a Option<ViewsCommands>),
    Options,
}

impl<'a> StoreDispatch<'a> {
    /// Returns None for commands handled by [`NoStoreDispatch`].
    pub fn from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::List {
                filter,
                sort,
                reverse,
                group,
                subgroup,
                limit,
                all,
            }) => Some(Self::List {
                filter,
                sort: *sort,
                reverse: *reverse,
                group,
                subgroup,
                limit: *limit,
                all: *all,
            }),
            Some(Commands::Agenda {
                filter,
                days,
                from,
                no_overdue,
            }) => Some(Self::Agenda {
                filter,
                days: *days,
                from,
                no_overdue: *no_overdue,
            }),
            Some(Commands::Status { task, date }) => Some(Self::Status { task, date }),
            Some(Commands::Done { task, date }) => Some(Self::Toggle {
                task,
                date,
                kind: ToggleKind::Done,
            }),
            Some(Commands::Skip { task, date }) => Some(Self::Toggle {
                task,
                date,
                kind: ToggleKind::Skip,
            }),
            Some(Commands::Views { command }) => Some(Self::Views(command)),
            Some(Commands::Options) => Some(Self::Options),
            Some(Commands::Config { .. }) | Some(Commands::Completions { .. }) | None => None,
        }
    }
}

impl StoreCommand for StoreDispatch<'_> {
    async fn execute(
        &self,
        ctx: &CommandContext,
        workspace: &mut Workspace,
        config: &Config,
    ) -> Result<()> {
        match self {
            Self::List {
                filter,
                sort,
                reverse,
                group,
                subgroup,
                limit,
                all,
            } => {
                let opts = commands::list::ListOptions {
                    filter: (*filter).clone(),
                    sort: *sort,
                    reverse: *reverse,
                    group: (*group).clone(),
                    subgroup: (*subgroup).clone(),
                    limit: *limit,
                    all: *all,
                };
                commands::list::execute(ctx, workspace, &opts)
            }
            Self::Agenda {
                filter,
                days,
                from,
                no_overdue,
            } => {
                let opts = commands::agenda::AgendaOptions {
                    filter: (*filter).clone(),
                    days: *days,
                    from: (*from).clone(),
                    no_overdue: *no_overdue,
                };
                commands::agenda::execute(ctx, workspace, config, &opts)
            }
            Self::Status { task, date } => {
                commands::status::execute(ctx, workspace, task, date.as_deref())
            }
            Self::Toggle { task, date, kind } => {
                commands::done::execute(ctx, workspace, task, date.as_deref(), *kind).await
            }
            Self::Views(command) => dispatch_views(ctx, workspace, command).await,
            Self::Options => commands::options::execute(ctx, workspace),
        }
    }
}

async fn dispatch_views(
    ctx: &CommandContext,
    workspace: &mut Workspace,
    command: &Option<ViewsCommands>,
) -> Result<()> {
    match command {
        Some(ViewsCommands::List) | None => commands::views::execute_list(ctx, workspace),
        Some(ViewsCommands::Show { name }) => commands::views::execute_show(ctx, workspace, name),
        Some(ViewsCommands::Save {
            name,
            filter,
            sort,
            group,
        }) => {
            let opts = commands::views::ViewSaveOptions {
                name: name.clone(),
                filter: filter.clone(),
                sort: *sort,
                group: group.clone(),
            };
            commands::views::execute_save(ctx, workspace, &opts).await
        }
        Some(ViewsCommands::Delete { name }) => {
            commands::views::execute_delete(ctx, workspace, name).await
        }
    }
}
