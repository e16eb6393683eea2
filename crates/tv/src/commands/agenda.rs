//! Agenda command implementation.
//!
//! Shows the filtered tasks for each day of a window, plus the tasks that
//! fell behind before it.

use chrono::NaiveDate;
use taskview_core::filter::FilterContext;
use taskview_core::{agenda_dates, get_agenda_data, RRuleExpander};

use super::config::{Config, MAX_AGENDA_DAYS};
use super::query::{build_query, parse_day_or_today};
use super::workspace::Workspace;
use super::{CommandContext, Result};
use crate::cli::FilterArgs;
use crate::output::{format_agenda_json, format_agenda_text, TaskStyle};

/// Options for the agenda command.
#[derive(Debug, Default)]
pub struct AgendaOptions {
    /// View, conditions and search term.
    pub filter: FilterArgs,
    /// Number of days (default from config).
    pub days: Option<u32>,
    /// First day of the window.
    pub from: Option<String>,
    /// Hide the overdue section.
    pub no_overdue: bool,
}

/// The agenda window resolved against the config and today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaWindow {
    pub dates: Vec<NaiveDate>,
    pub show_overdue: bool,
}

/// Resolves the window: flags first, then `[agenda]` settings.
///
/// The length is kept within 1..=[`MAX_AGENDA_DAYS`] whatever its source.
pub fn resolve_window(opts: &AgendaOptions, config: &Config, today: NaiveDate) -> Result<AgendaWindow> {
    let start = parse_day_or_today(opts.from.as_deref(), today)?;
    let days = opts
        .days
        .unwrap_or_else(|| config.agenda_days())
        .clamp(1, MAX_AGENDA_DAYS);
    Ok(AgendaWindow {
        dates: agenda_dates(start, days),
        show_overdue: !opts.no_overdue && config.show_overdue(),
    })
}

/// Executes the agenda command.
///
/// # Errors
///
/// Returns an error if the start date or a condition is invalid, or the
/// named view does not exist.
pub fn execute(
    ctx: &CommandContext,
    workspace: &Workspace,
    config: &Config,
    opts: &AgendaOptions,
) -> Result<()> {
    let snapshot = workspace.snapshot();
    let window = resolve_window(opts, config, ctx.today)?;
    let query = build_query(&opts.filter, &snapshot.saved_views, &snapshot.user_fields)?;

    let statuses = workspace.status_registry();
    let priorities = workspace.priority_registry();
    let context = FilterContext::new(&statuses, &priorities, &snapshot.user_fields).with_today(ctx.today);

    let data = get_agenda_data(
        &snapshot.tasks,
        &window.dates,
        &query,
        window.show_overdue,
        &context,
        &RRuleExpander,
    );

    let style = TaskStyle {
        statuses: &statuses,
        priorities: &priorities,
        today: ctx.today,
        use_colors: ctx.use_colors,
    };
    if ctx.json_output {
        println!("{}", format_agenda_json(&data, window.show_overdue, &style)?);
    } else if !ctx.quiet {
        print!("{}", format_agenda_text(&data, window.show_overdue, &style));
    }

    Ok(())
}
