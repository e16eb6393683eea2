//! Status command implementation.
//!
//! Reports the state of one task on one day and, for recurring tasks, the
//! next instance after it.

use chrono::NaiveDate;
use taskview_core::lookups::find_task;
use taskview_core::recurrence::{instance_date_on_or_after, try_is_instance_on};
use taskview_core::{effective_status, RRuleExpander};
use taskview_model::date::{add_days, format_date_for_storage};
use taskview_model::models::{StatusRegistry, TaskRecord};

use super::query::parse_day_or_today;
use super::workspace::Workspace;
use super::{CommandContext, Result};
use crate::output::{format_instance, format_instance_json, InstanceOutput};

/// Describes `task` on `date`.
///
/// Recurring tasks report the next instance strictly after `date`.
pub fn describe<'a>(
    task: &'a TaskRecord,
    date: NaiveDate,
    statuses: &StatusRegistry,
) -> Result<InstanceOutput<'a>> {
    let next = if task.is_recurring() {
        instance_date_on_or_after(task, add_days(date, 1), &RRuleExpander)?
    } else {
        None
    };
    Ok(InstanceOutput {
        path: &task.path,
        title: &task.title,
        date: format_date_for_storage(date),
        recurring: task.is_recurring(),
        status: effective_status(task, date, statuses),
        next: next.map(format_date_for_storage),
    })
}

/// Executes the status command.
///
/// # Errors
///
/// Returns an error if the task cannot be found, the date is invalid or the
/// task's recurrence rule cannot be parsed.
pub fn execute(
    ctx: &CommandContext,
    workspace: &Workspace,
    task: &str,
    date: Option<&str>,
) -> Result<()> {
    let task = find_task(&workspace.snapshot().tasks, task)?;
    let date = parse_day_or_today(date, ctx.today)?;
    let statuses = workspace.status_registry();
    let output = describe(task, date, &statuses)?;

    if ctx.json_output {
        println!("{}", format_instance_json(&output)?);
    } else if !ctx.quiet {
        println!("{}", format_instance(&output, ctx.use_colors));
        if task.is_recurring() && !try_is_instance_on(task, date, &RRuleExpander)? {
            println!("(no instance falls on {})", output.date);
        }
    }

    Ok(())
}
